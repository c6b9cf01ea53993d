//! Widget error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("Invalid value for option '{option}': {reason}")]
    InvalidOptionValue { option: String, reason: String },

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Invalid element id: {0:?}")]
    InvalidElementId(String),

    #[error("Render called before compose for widget {0}")]
    RenderBeforeCompose(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Failed to write markup: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WidgetError {
    pub(crate) fn invalid_value(option: &str, reason: impl Into<String>) -> Self {
        WidgetError::InvalidOptionValue {
            option: option.to_string(),
            reason: reason.into(),
        }
    }
}
