//! Host-facing widget contract

use std::any::Any;
use std::fmt;

use crate::events::{Notification, RoundTrip};
use crate::script::InitScript;
use crate::state::WidgetState;
use crate::Result;

/// A server-side component the host drives through one request cycle.
///
/// The host calls `compose` before every `render`; widgets must not assume
/// composition happens on its own.
pub trait Widget {
    /// Root element id, also the postback target
    fn id(&self) -> &str;

    /// Client-side constructor name
    fn widget_name(&self) -> &'static str;

    fn state(&self) -> WidgetState;

    /// Rebuild the presentational child list from the current collection
    fn compose(&mut self) -> Result<()>;

    /// Write the widget's markup. Nothing is written on error.
    fn render(&mut self, sink: &mut dyn fmt::Write) -> Result<()>;

    fn init_script(&self) -> Result<InitScript>;

    /// Deliver one round trip addressed to this widget
    fn deliver(&mut self, round_trip: &RoundTrip) -> Vec<Notification>;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
