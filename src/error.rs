//! Structured error types for the label sheet renderer.
//!
//! Only structural problems surface here as hard failures. Per-record and
//! per-field problems (an unencodable barcode, a value that is not a number)
//! are recovered where they happen and never abort a render pass.

use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum LabelError {
    /// A layout option the pass needs has no value.
    #[error("Configuration error: missing required option '{0}'")]
    MissingOption(String),

    /// A layout option is present but unusable.
    #[error("Configuration error: option '{name}' {reason}")]
    InvalidOption { name: String, reason: String },

    /// The grid cannot hold any card.
    #[error("Configuration error: invalid grid shape {columns} x {rows}")]
    InvalidGrid { columns: f64, rows: f64 },

    /// A card slot's box does not fit on the page.
    #[error(
        "Configuration error: card slot {slot} ({x:.2}, {y:.2}, {width:.2} x {height:.2}) \
         lies outside the {page_width:.2} x {page_height:.2} page"
    )]
    OutOfBounds {
        slot: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        page_width: f64,
        page_height: f64,
    },

    /// A card element would be drawn outside its card box.
    #[error(
        "Configuration error: {element} at y={y:.2} lies outside the card \
         (0 to {card_height:.2} above the card bottom)"
    )]
    ElementOutOfBounds {
        element: String,
        y: f64,
        card_height: f64,
    },

    /// JSON input failed to parse.
    #[error("Failed to parse input: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A mandatory font could not be loaded or parsed.
    #[error("Font error: {0}")]
    Font(String),

    /// The preview template image could not be loaded.
    #[error("Image error: {0}")]
    Image(String),

    /// A code could not be encoded as a barcode symbol.
    #[error("Barcode error: {0}")]
    Barcode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl LabelError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        LabelError::InvalidOption {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors raised while validating the configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LabelError::MissingOption(_)
                | LabelError::InvalidOption { .. }
                | LabelError::InvalidGrid { .. }
                | LabelError::OutOfBounds { .. }
                | LabelError::ElementOutOfBounds { .. }
        )
    }
}

impl From<serde_json::Error> for LabelError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but has the wrong shape. Records must be an array of objects; \
                 layout config must be a flat object of numbers, booleans and strings."
                    .to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        LabelError::Parse { source: e, hint }
    }
}
