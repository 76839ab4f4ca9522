//! Offer value normalization.
//!
//! Offer cells arrive as whatever the spreadsheet held: a discount fraction
//! (`0.25`), a whole number (`5`, or `5.0` after a float round-trip), or free
//! text (`Buy 1 Get 1`). Fractions become percentages; everything that is
//! not a number is drawn exactly as given.

/// A normalized offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Offer {
    /// A number, formatted for display (`"25"`, `"12.5"`).
    Numeric(String),
    /// Free text, unchanged.
    Literal(String),
}

impl Offer {
    pub fn as_str(&self) -> &str {
        match self {
            Offer::Numeric(s) | Offer::Literal(s) => s,
        }
    }
}

/// Normalize a raw offer cell.
///
/// - a value in (0, 1) is a fraction: `0.25` → `"25"`, `0.125` → `"12.5"`
///   (one decimal at most, no decimal for whole percentages)
/// - other integral numbers lose their decimal: `5`, `5.0` → `"5"`
/// - other numbers keep their text: `"5.5"`
/// - anything else passes through untouched
pub fn normalize_offer(raw: &str) -> Offer {
    let trimmed = raw.trim();
    let Some(value) = trimmed.parse::<f64>().ok().filter(|v| v.is_finite()) else {
        log::debug!("Offer '{}' is not numeric, drawn literally", raw);
        return Offer::Literal(raw.to_string());
    };

    if value > 0.0 && value < 1.0 {
        let percent = (value * 1000.0).round() / 10.0;
        return Offer::Numeric(format_number(percent));
    }
    if value.fract() == 0.0 {
        return Offer::Numeric(format_number(value));
    }
    Offer::Numeric(trimmed.to_string())
}

/// Whole numbers without a decimal point, others with one decimal.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Substitute `value` for the first `{}` in `template`. A template without
/// a placeholder is used as-is.
pub fn apply_template(template: &str, value: &str) -> String {
    template.replacen("{}", value, 1)
}
