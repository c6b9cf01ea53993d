//! Host error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("Widget error: {0}")]
    Widget(#[from] quill_core::WidgetError),

    #[error("Tabs error: {0}")]
    Tabs(#[from] quill_tabs::TabsError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Duplicate widget id: {0}")]
    DuplicateWidget(String),
}
