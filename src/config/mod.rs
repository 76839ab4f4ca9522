//! # Layout Configuration
//!
//! A flat mapping of named options (numbers, flags, and a few keyword or
//! text values) as produced by a calibration panel or a JSON file.
//!
//! The mapping itself never substitutes defaults. `LayoutConfig::preset()`
//! is an explicit, complete calibration that callers merge their overrides
//! onto; once a pass starts, every option the layout consumes must resolve
//! or the pass fails with a configuration error before any page exists.
//!
//! Length options may be spelled in several units. For an option `gap` the
//! keys `gap` (points), `gap_mm` and `gap_cm` are consulted in that order,
//! and a text value such as `"4.5mm"` is also accepted under the bare key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::LabelError;
use crate::layout::card::CardSpec;
use crate::layout::grid::GridSpec;
use crate::units::{to_native, LengthUnit};

/// A single option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Number(v)
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Flag(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Text(v.to_string())
    }
}

/// Flat named-option mapping. Unrecognised names are carried but ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutConfig {
    options: BTreeMap<String, ConfigValue>,
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat JSON object.
    pub fn from_json(json: &str) -> Result<Self, LabelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, LabelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The calibration the offer sheets were originally printed with:
    /// A4, 3 x 2 cards, zero-line flow.
    pub fn preset() -> Self {
        let mut c = Self::new();
        // Page and grid
        c.set("page_width_mm", 210.0);
        c.set("page_height_mm", 297.0);
        c.set("grid_columns", 3.0);
        c.set("grid_rows", 2.0);
        c.set("column_mode", "even");
        c.set("margin_x", 20.0);
        c.set("row_mode", "even");
        c.set("margin_y", 20.0);
        c.set("top_dx", 0.0);
        c.set("top_dy", -10.0);
        c.set("bottom_dx", 0.0);
        c.set("bottom_dy", -10.0);

        // Flow
        c.set("flow", "zero_line");
        c.set("zero_line_ratio", 0.38);
        c.set("brand_offset", 68.0);
        c.set("name_offset", 45.0);
        c.set("arabic_offset", 25.0);
        c.set("offer_offset", -20.0);
        c.set("offer_secondary_offset", -45.0);
        c.set("flow_top", 60.0);
        c.set("brand_gap", 0.0);
        c.set("name_gap", 22.0);
        c.set("arabic_gap", 20.0);
        c.set("offer_gap", 45.0);
        c.set("offer_secondary_gap", 25.0);
        c.set("header_size", 12.0);
        c.set("header_offset", 24.0);

        // Text
        c.set("width_margin", 0.9);
        c.set("line_height", 1.2);
        c.set("brand_max_size", 14.0);
        c.set("brand_min_size", 7.0);
        c.set("name_fit", "truncate");
        c.set("truncate_chars", 28.0);
        c.set("name_size", 11.0);
        c.set("name_min_size", 7.0);
        c.set("name_max_lines", 2.0);
        c.set("arabic_size", 11.0);
        c.set("arabic_min_size", 7.0);
        c.set("offer_style", "single");
        c.set("offer_size", 30.0);
        c.set("offer_min_size", 14.0);
        c.set("offer_max_lines", 2.0);
        c.set("offer_secondary_size", 18.0);
        c.set("offer_color", "#d10000");
        c.set("normalize_offer", true);
        c.set("offer_template", "{}% off");
        c.set("offer_secondary_template", "خصم {}%");
        c.set("bold_stroke", 0.6);

        // Barcode
        c.set("barcode_bottom", 67.0);
        c.set("barcode_module_width", 1.2);
        c.set("barcode_height", 25.0);
        c.set("code_size", 10.0);
        c.set("code_gap", 12.0);

        c.set("debug_borders", false);
        c.set("require_font", false);
        c
    }

    pub fn set(&mut self, name: &str, value: impl Into<ConfigValue>) {
        self.options.insert(name.to_string(), value.into());
    }

    /// Remove an option and every unit spelling of it.
    pub fn remove(&mut self, name: &str) {
        for unit in LengthUnit::ALL {
            self.options.remove(&format!("{}{}", name, unit.suffix()));
        }
    }

    /// Overlay `other` on top of `self`. A length given in any unit replaces
    /// every existing spelling of that length.
    pub fn merge(&mut self, other: &LayoutConfig) {
        for (key, value) in &other.options {
            let base = strip_unit_suffix(key);
            self.remove(base);
            self.options.insert(key.clone(), value.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.options.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// A required plain number.
    pub fn number(&self, name: &str) -> Result<f64, LabelError> {
        match self.get(name) {
            Some(ConfigValue::Number(v)) if v.is_finite() => Ok(*v),
            Some(ConfigValue::Number(_)) => Err(LabelError::invalid(name, "must be finite")),
            Some(_) => Err(LabelError::invalid(name, "must be a number")),
            None => Err(LabelError::MissingOption(name.to_string())),
        }
    }

    /// A required number that must be strictly positive.
    pub fn positive(&self, name: &str) -> Result<f64, LabelError> {
        let v = self.number(name)?;
        if v > 0.0 {
            Ok(v)
        } else {
            Err(LabelError::invalid(name, format!("must be positive, got {}", v)))
        }
    }

    /// A required whole count of at least one.
    pub fn count(&self, name: &str) -> Result<usize, LabelError> {
        let v = self.number(name)?;
        if v >= 1.0 && v.fract() == 0.0 {
            Ok(v as usize)
        } else {
            Err(LabelError::invalid(name, format!("must be a whole number >= 1, got {}", v)))
        }
    }

    /// A required length, converted to points.
    pub fn length(&self, name: &str) -> Result<f64, LabelError> {
        self.optional_length(name)?
            .ok_or_else(|| LabelError::MissingOption(name.to_string()))
    }

    /// A length that may be absent.
    pub fn optional_length(&self, name: &str) -> Result<Option<f64>, LabelError> {
        for unit in LengthUnit::ALL {
            let key = format!("{}{}", name, unit.suffix());
            match self.get(&key) {
                None => continue,
                Some(ConfigValue::Number(v)) if v.is_finite() => {
                    return Ok(Some(to_native(*v, unit)))
                }
                Some(ConfigValue::Text(s)) if unit == LengthUnit::Point => {
                    return parse_length(s)
                        .map(Some)
                        .map_err(|reason| LabelError::invalid(&key, reason));
                }
                Some(_) => return Err(LabelError::invalid(&key, "must be a length")),
            }
        }
        Ok(None)
    }

    pub fn flag(&self, name: &str) -> Result<bool, LabelError> {
        match self.get(name) {
            Some(ConfigValue::Flag(b)) => Ok(*b),
            Some(_) => Err(LabelError::invalid(name, "must be true or false")),
            None => Err(LabelError::MissingOption(name.to_string())),
        }
    }

    pub fn text(&self, name: &str) -> Result<&str, LabelError> {
        self.optional_text(name)?
            .ok_or_else(|| LabelError::MissingOption(name.to_string()))
    }

    pub fn optional_text(&self, name: &str) -> Result<Option<&str>, LabelError> {
        match self.get(name) {
            Some(ConfigValue::Text(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(LabelError::invalid(name, "must be text")),
            None => Ok(None),
        }
    }

    /// A keyword option, matched against `choices`.
    pub fn keyword<'a>(&self, name: &str, choices: &[&'a str]) -> Result<&'a str, LabelError> {
        let value = self.text(name)?;
        choices
            .iter()
            .find(|c| c.eq_ignore_ascii_case(value.trim()))
            .copied()
            .ok_or_else(|| {
                LabelError::invalid(
                    name,
                    format!("must be one of {}, got '{}'", choices.join(", "), value),
                )
            })
    }
}

/// Parse a length with an optional unit suffix: `"12"`, `"4.5mm"`, `"-1 cm"`.
pub fn parse_length(s: &str) -> Result<f64, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a length", s))?;
    let unit = if unit.is_empty() {
        LengthUnit::Point
    } else {
        unit.parse::<LengthUnit>()?
    };
    Ok(to_native(value, unit))
}

fn strip_unit_suffix(key: &str) -> &str {
    key.strip_suffix("_mm")
        .or_else(|| key.strip_suffix("_cm"))
        .unwrap_or(key)
}

/// Everything a render pass needs, resolved and validated from a
/// `LayoutConfig`.
#[derive(Debug, Clone)]
pub struct LabelLayout {
    pub grid: GridSpec,
    pub card: CardSpec,
    pub debug_borders: bool,
    pub require_font: bool,
}

impl LabelLayout {
    /// Resolve every consumed option and validate the page geometry: every
    /// slot box must lie on the page, and every card element inside the
    /// shortest box.
    pub fn resolve(config: &LayoutConfig) -> Result<Self, LabelError> {
        let grid = GridSpec::from_config(config)?;
        grid.validate()?;
        let card = CardSpec::from_config(config)?;
        card.validate(grid.min_card_height())?;
        Ok(Self {
            grid,
            card,
            debug_borders: config.flag("debug_borders")?,
            require_font: config.flag("require_font")?,
        })
    }
}
