//! Quill Tabs
//!
//! Server-side tab set. Each `TabPage` becomes one navigation entry and one
//! content panel; option values become the payload of the client-side
//! `tabs` constructor, and a client `select` is posted back as a
//! `SelectedTabChanged` notification.

mod descriptors;
mod error;
mod page;
mod tabs;

pub use descriptors::{TABS_EVENTS, TABS_OPTIONS};
pub use error::TabsError;
pub use page::TabPage;
pub use tabs::Tabs;

pub type Result<T> = std::result::Result<T, TabsError>;
