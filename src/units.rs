//! # Units
//!
//! Physical lengths to PDF points (1/72 inch), the page's native unit.
//! Negative values are valid and mean leftward/downward offsets.

use std::fmt;
use std::str::FromStr;

/// Points per millimetre.
pub const PT_PER_MM: f64 = 2.83465;
/// Points per centimetre.
pub const PT_PER_CM: f64 = 28.3465;

/// A length unit a configuration value may be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Point,
    Millimeter,
    Centimeter,
}

impl LengthUnit {
    /// All units, in the order a length option's spellings are consulted.
    pub const ALL: [LengthUnit; 3] = [
        LengthUnit::Point,
        LengthUnit::Millimeter,
        LengthUnit::Centimeter,
    ];

    /// Key suffix used by configuration options (`gap`, `gap_mm`, `gap_cm`).
    pub fn suffix(&self) -> &'static str {
        match self {
            LengthUnit::Point => "",
            LengthUnit::Millimeter => "_mm",
            LengthUnit::Centimeter => "_cm",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthUnit::Point => write!(f, "pt"),
            LengthUnit::Millimeter => write!(f, "mm"),
            LengthUnit::Centimeter => write!(f, "cm"),
        }
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pt" | "point" | "points" => Ok(LengthUnit::Point),
            "mm" | "millimeter" | "millimetre" => Ok(LengthUnit::Millimeter),
            "cm" | "centimeter" | "centimetre" => Ok(LengthUnit::Centimeter),
            other => Err(format!("unknown length unit '{}'", other)),
        }
    }
}

/// Convert a length to native page units.
pub fn to_native(value: f64, unit: LengthUnit) -> f64 {
    match unit {
        LengthUnit::Point => value,
        LengthUnit::Millimeter => value * PT_PER_MM,
        LengthUnit::Centimeter => value * PT_PER_CM,
    }
}

pub fn mm(value: f64) -> f64 {
    to_native(value, LengthUnit::Millimeter)
}

pub fn cm(value: f64) -> f64 {
    to_native(value, LengthUnit::Centimeter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centimeter_scale() {
        assert!((cm(1.0) - 28.3465).abs() < 1e-9);
        assert!((cm(10.0) - mm(100.0)).abs() < 1e-9);
    }

    #[test]
    fn test_negative_offsets_convert() {
        assert!((mm(-5.0) + 14.17325).abs() < 1e-9);
    }

    #[test]
    fn test_points_pass_through() {
        assert_eq!(to_native(42.5, LengthUnit::Point), 42.5);
    }

    #[test]
    fn test_a4_in_points() {
        assert!((mm(210.0) - 595.2765).abs() < 1e-6);
        assert!((mm(297.0) - 841.89105).abs() < 1e-6);
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!("MM".parse::<LengthUnit>(), Ok(LengthUnit::Millimeter));
        assert_eq!("cm".parse::<LengthUnit>(), Ok(LengthUnit::Centimeter));
        assert!("furlong".parse::<LengthUnit>().is_err());
    }
}
