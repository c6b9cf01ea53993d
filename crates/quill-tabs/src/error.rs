//! Tab set error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabsError {
    #[error("Tab page not found: {0}")]
    PageNotFound(String),

    #[error(transparent)]
    Widget(#[from] quill_core::WidgetError),
}
