//! # Barcodes
//!
//! Code 128 symbols for the item code, encoded with `barcoders`. Text goes
//! through character set B, which covers printable ASCII; runs of four or
//! more digits switch to set C, which packs two digits per symbol and keeps
//! 13-digit retail codes narrow enough for a card. The symbol is a run of modules;
//! its physical size is `modules x module_width` by `bar_height` with no
//! quiet zone, since the card's own margins already provide one.
//!
//! Encoding is memoized per render pass. Failures are cached too, so a bad
//! code that repeats across rows is only reported once.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use barcoders::sym::code128::Code128;

use crate::error::LabelError;

/// Character set selectors understood by `barcoders`.
const CHARSET_B: char = '\u{0181}';
const CHARSET_C: char = '\u{0106}';

/// Shortest digit run worth a switch to set C.
const MIN_SET_C_RUN: usize = 4;

/// Encoded module pattern (1 = bar, 0 = space).
pub fn encode(code: &str) -> Result<Vec<u8>, LabelError> {
    if code.is_empty() {
        return Err(LabelError::Barcode("empty code".to_string()));
    }
    if let Some(bad) = code.chars().find(|c| !(' '..='~').contains(c)) {
        return Err(LabelError::Barcode(format!(
            "'{}' contains {:?}, which Code 128 set B cannot encode",
            code, bad
        )));
    }
    let symbol = Code128::new(code128_data(code))
        .map_err(|e| LabelError::Barcode(format!("Code 128 encoding of '{}' failed: {}", code, e)))?;
    Ok(symbol.encode())
}

/// `code` with character set selectors inserted. `code` must be printable
/// ASCII.
fn code128_data(code: &str) -> String {
    let mut out = String::with_capacity(code.len() + 4);
    let mut current = None;
    let mut select = |out: &mut String, set: char| {
        if current != Some(set) {
            out.push(set);
            current = Some(set);
        }
    };

    let mut rest = code;
    let mut first = true;
    while !rest.is_empty() {
        let is_digit = rest.as_bytes()[0].is_ascii_digit();
        let len = rest
            .bytes()
            .position(|b| b.is_ascii_digit() != is_digit)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(len);

        if is_digit && len >= MIN_SET_C_RUN {
            // Set C takes digit pairs; an odd digit goes to set B, at the
            // end of a leading run and at the start of any other.
            let (b_head, c_part, b_tail) = match (len % 2 == 1, first) {
                (false, _) => ("", run, ""),
                (true, true) => ("", &run[..len - 1], &run[len - 1..]),
                (true, false) => (&run[..1], &run[1..], ""),
            };
            if !b_head.is_empty() {
                select(&mut out, CHARSET_B);
                out.push_str(b_head);
            }
            select(&mut out, CHARSET_C);
            out.push_str(c_part);
            if !b_tail.is_empty() {
                select(&mut out, CHARSET_B);
                out.push_str(b_tail);
            }
        } else {
            select(&mut out, CHARSET_B);
            out.push_str(run);
        }

        rest = tail;
        first = false;
    }
    out
}

/// An encoded symbol with its physical dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct BarcodeSymbol {
    pub modules: Rc<[u8]>,
    pub module_width: f64,
    pub bar_height: f64,
}

impl BarcodeSymbol {
    pub fn width(&self) -> f64 {
        self.modules.len() as f64 * self.module_width
    }

    pub fn height(&self) -> f64 {
        self.bar_height
    }

    /// Contiguous bars as `(start_module, module_count)`.
    pub fn bars(&self) -> Vec<(usize, usize)> {
        let mut bars = Vec::new();
        let mut i = 0;
        while i < self.modules.len() {
            if self.modules[i] == 1 {
                let start = i;
                while i < self.modules.len() && self.modules[i] == 1 {
                    i += 1;
                }
                bars.push((start, i - start));
            } else {
                i += 1;
            }
        }
        bars
    }
}

/// Per-pass encoding memo.
#[derive(Debug, Default)]
pub struct BarcodeCache {
    symbols: RefCell<HashMap<String, Result<Rc<[u8]>, String>>>,
}

impl BarcodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `code` at the given module width and height, reusing an
    /// earlier encoding of the same code.
    pub fn symbol(&self, code: &str, module_width: f64, bar_height: f64) -> Result<BarcodeSymbol, LabelError> {
        let cached = self.symbols.borrow().get(code).cloned();
        let modules = match cached {
            Some(result) => result,
            None => {
                let result: Result<Rc<[u8]>, String> =
                    encode(code).map(Rc::from).map_err(|e| e.to_string());
                self.symbols
                    .borrow_mut()
                    .insert(code.to_string(), result.clone());
                if let Err(ref reason) = result {
                    log::warn!("Barcode skipped, drawing code as text: {}", reason);
                }
                result
            }
        };
        modules
            .map(|modules| BarcodeSymbol {
                modules,
                module_width,
                bar_height,
            })
            .map_err(LabelError::Barcode)
    }

    pub fn len(&self) -> usize {
        self.symbols.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_numeric_code() {
        let modules = encode("12345").unwrap();
        assert!(modules.iter().all(|&m| m == 0 || m == 1));
        assert_eq!(modules[0], 1);
        assert!(encode("1234567890").unwrap().len() > modules.len());
    }

    #[test]
    fn test_retail_code_uses_digit_pairs() {
        // Start C, six digit pairs, code B, one digit, check, stop.
        let modules = encode("6291234567890").unwrap();
        assert_eq!(modules.len(), 9 * 11 + 11 + 13);
        assert!(modules.len() as f64 * 1.2 < 166.0);
    }

    #[test]
    fn test_charset_selection() {
        assert_eq!(code128_data("12"), "\u{0181}12");
        assert_eq!(code128_data("1234"), "\u{0106}1234");
        assert_eq!(code128_data("12345"), "\u{0106}1234\u{0181}5");
        assert_eq!(code128_data("AB-12345"), "\u{0181}AB-1\u{0106}2345");
        assert_eq!(code128_data("123456X"), "\u{0106}123456\u{0181}X");
        assert_eq!(code128_data("A123"), "\u{0181}A123");
    }

    #[test]
    fn test_mixed_code_shorter_than_plain_text_set() {
        let mixed = encode("SKU-00112233").unwrap();
        let plain = Code128::new(format!("{}SKU-00112233", CHARSET_B)).unwrap().encode();
        assert!(mixed.len() < plain.len());
    }

    #[test]
    fn test_encode_rejects_non_ascii() {
        let err = encode("12\u{0663}4").unwrap_err();
        assert!(matches!(err, LabelError::Barcode(_)));
    }

    #[test]
    fn test_encode_rejects_empty() {
        assert!(encode("").is_err());
    }

    #[test]
    fn test_symbol_dimensions() {
        let cache = BarcodeCache::new();
        let symbol = cache.symbol("12345", 1.2, 25.0).unwrap();
        assert!((symbol.width() - symbol.modules.len() as f64 * 1.2).abs() < 1e-9);
        assert_eq!(symbol.height(), 25.0);
    }

    #[test]
    fn test_bars_cover_all_dark_modules() {
        let cache = BarcodeCache::new();
        let symbol = cache.symbol("ABC-1", 1.0, 20.0).unwrap();
        let dark: usize = symbol.modules.iter().filter(|&&m| m == 1).count();
        let covered: usize = symbol.bars().iter().map(|(_, n)| n).sum();
        assert_eq!(dark, covered);
    }

    #[test]
    fn test_cache_reuses_encoding_and_failures() {
        let cache = BarcodeCache::new();
        let a = cache.symbol("777", 1.0, 20.0).unwrap();
        let b = cache.symbol("777", 2.0, 30.0).unwrap();
        assert!(Rc::ptr_eq(&a.modules, &b.modules));
        assert_eq!(b.width(), 2.0 * a.width());

        assert!(cache.symbol("٣٣", 1.0, 20.0).is_err());
        assert!(cache.symbol("٣٣", 1.0, 20.0).is_err());
        assert_eq!(cache.len(), 2);
    }
}
