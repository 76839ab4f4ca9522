//! Glyph advance widths for the built-in fallback fonts.
//!
//! Widths are the Adobe AFM values in 1/1000 em for WinAnsi codes 32..=126.
//! The upper half of WinAnsi falls back to the width of a digit, which is
//! close enough for the accented Latin letters that show up in item names.

/// A standard PDF font that needs no embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,                               // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015,                                             // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,                // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,                // 'N'..'Z'
    278, 278, 278, 469, 556, 333,                                                   // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,                // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,                // 'n'..'z'
    334, 260, 334, 584,                                                             // '{'..'~'
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Advance width of a WinAnsi code in 1/1000 em.
    pub fn code_width(&self, code: u8) -> u16 {
        let table = match self {
            Self::Helvetica => &HELVETICA,
            Self::HelveticaBold => &HELVETICA_BOLD,
        };
        match code {
            32..=126 => table[(code - 32) as usize],
            0xA0 => 278,
            0..=31 => 0,
            _ => 556,
        }
    }

    /// Ascender in 1/1000 em.
    pub fn ascender(&self) -> f64 {
        718.0
    }

    /// Descender in 1/1000 em (negative).
    pub fn descender(&self) -> f64 {
        -207.0
    }
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// WinAnsiEncoding is based on Windows-1252. Most codepoints in
/// 0x20..=0x7E and 0xA0..=0xFF map directly; 0x80..=0x9F holds the
/// typographic extras.
pub fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2122 => Some(0x99), // Trade mark sign
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_space_and_digits() {
        assert_eq!(StandardFont::Helvetica.code_width(b' '), 278);
        assert_eq!(StandardFont::Helvetica.code_width(b'0'), 556);
        assert_eq!(StandardFont::Helvetica.code_width(b'9'), 556);
    }

    #[test]
    fn test_table_alignment() {
        assert_eq!(StandardFont::Helvetica.code_width(b'@'), 1015);
        assert_eq!(StandardFont::Helvetica.code_width(b'M'), 833);
        assert_eq!(StandardFont::Helvetica.code_width(b'i'), 222);
        assert_eq!(StandardFont::Helvetica.code_width(b'~'), 584);
        assert_eq!(StandardFont::HelveticaBold.code_width(b'@'), 975);
        assert_eq!(StandardFont::HelveticaBold.code_width(b'm'), 889);
        assert_eq!(StandardFont::HelveticaBold.code_width(b'~'), 584);
    }

    #[test]
    fn test_bold_wider_than_regular() {
        let regular: u32 = "Brand".bytes().map(|b| StandardFont::Helvetica.code_width(b) as u32).sum();
        let bold: u32 = "Brand".bytes().map(|b| StandardFont::HelveticaBold.code_width(b) as u32).sum();
        assert!(bold > regular);
    }

    #[test]
    fn test_winansi_mapping() {
        assert_eq!(unicode_to_winansi('A'), Some(b'A'));
        assert_eq!(unicode_to_winansi('é'), Some(0xE9));
        assert_eq!(unicode_to_winansi('€'), Some(0x80));
        assert_eq!(unicode_to_winansi('م'), None);
    }
}
