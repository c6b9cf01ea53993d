//! Quill Core
//!
//! Translates a typed widget description into three outputs:
//! - markup for the container and its children
//! - an initialization payload handed to the client-side widget constructor
//! - postback bindings that turn client events into server notifications
//!
//! Option and event metadata live in static descriptor tables, one per widget
//! type, shared read-only by every instance.

mod error;
mod events;
pub mod markup;
mod options;
mod script;
mod state;
mod widget;

pub use error::WidgetError;
pub use events::{
    EventDescriptor, EventRegistry, Notification, PostbackBinder, RoundTrip, TriggeredEvent,
};
pub use markup::{HtmlWriter, Node};
pub use options::{
    DefaultValue, Disabled, EmitPolicy, InitPayload, OptionDescriptor, OptionKind,
    OptionRegistry, OptionSet, OptionValue,
};
pub use script::{combine_scripts, InitScript, ScriptOptions, ScriptWrapper};
pub use state::{Lifecycle, WidgetState};
pub use widget::Widget;

pub type Result<T> = std::result::Result<T, WidgetError>;
