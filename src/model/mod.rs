//! # Record Model
//!
//! The input representation for the renderer: one `LabelRecord` per printable
//! card, already filtered and keyed by logical field name.
//!
//! Records usually come straight out of a spreadsheet export, so every field
//! accepts any JSON scalar. Numbers are kept as their literal text (the offer
//! field is normalised later, in layout), `null` becomes the empty string,
//! and anything structured is rendered as its JSON text rather than rejected.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One printable unit's data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRecord {
    /// Item code encoded as the barcode. May be empty.
    #[serde(default, alias = "Item Code", deserialize_with = "lenient_text")]
    pub item_code: String,
    /// Primary (Latin) name.
    #[serde(default, alias = "English Name", deserialize_with = "lenient_text")]
    pub english_name: String,
    /// Secondary (Arabic) name. May be empty.
    #[serde(default, alias = "Arabic Name", deserialize_with = "lenient_text")]
    pub arabic_name: String,
    /// Brand line. May be empty.
    #[serde(default, alias = "Brand", deserialize_with = "lenient_text")]
    pub brand: String,
    /// Offer or price text, possibly a raw number such as `0.25`.
    #[serde(default, alias = "Current Offer", deserialize_with = "lenient_text")]
    pub offer: String,
}

impl LabelRecord {
    pub fn new(
        item_code: &str,
        english_name: &str,
        arabic_name: &str,
        brand: &str,
        offer: &str,
    ) -> Self {
        Self {
            item_code: item_code.to_string(),
            english_name: english_name.to_string(),
            arabic_name: arabic_name.to_string(),
            brand: brand.to_string(),
            offer: offer.to_string(),
        }
    }

    /// The item code with spreadsheet float artefacts removed
    /// (`"12345.0"` becomes `"12345"`).
    pub fn clean_code(&self) -> &str {
        let code = self.item_code.trim();
        match code.strip_suffix(".0") {
            Some(stem) if !stem.is_empty() && stem.chars().all(|c| c.is_ascii_digit()) => stem,
            _ => code,
        }
    }
}

/// Parse a JSON array of records.
pub fn records_from_json(json: &str) -> Result<Vec<LabelRecord>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Accept any JSON value as field text.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => {
            log::debug!("Non-scalar field value rendered literally: {}", other);
            other.to_string()
        }
    }
}
