//! Structured error types for SVG rendering.
//!
//! Structural problems in the SVG itself (unknown tags, missing attributes)
//! are not errors: they become warnings and the walk carries on. What is left
//! are input that can't be read at all, bad draw options, and faults raised
//! by the rendering surface.

use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The SVG data is not well-formed XML, or has no `<svg>` root.
    #[error("Failed to parse SVG: {0}")]
    Parse(String),

    /// Draw options JSON failed to parse.
    #[error("Failed to parse options: {source}{}", hint_suffix(.hint))]
    Options {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// The rendering surface rejected a call (bad argument, state underflow).
    #[error("Surface error: {0}")]
    Surface(String),

    /// A font could not be loaded or parsed.
    #[error("Font error: {0}")]
    Font(String),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the options schema. Expected keys: at, width, height.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input, is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        RenderError::Options { source: e, hint }
    }
}

impl From<quick_xml::Error> for RenderError {
    fn from(e: quick_xml::Error) -> Self {
        RenderError::Parse(e.to_string())
    }
}
