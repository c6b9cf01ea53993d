//! Client events and postback delivery
//!
//! Events flagged for postback get a client-side hook in the init script.
//! When the round trip arrives, the binder raises one `Notification` per
//! distinct bound event to the handlers registered by the host integration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Static metadata for one client event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventDescriptor {
    /// Client event name, e.g. `select`
    pub wire_name: &'static str,
    /// Whether firing the event triggers a server round trip
    pub postback: bool,
    /// Server-side event raised on round trip, e.g. `SelectedTabChanged`
    pub server_event: Option<&'static str>,
    /// Client expression sent along as the postback argument
    pub argument: Option<&'static str>,
}

impl EventDescriptor {
    pub const fn new(wire_name: &'static str) -> Self {
        Self {
            wire_name,
            postback: false,
            server_event: None,
            argument: None,
        }
    }

    pub const fn postback(mut self, server_event: &'static str) -> Self {
        self.postback = true;
        self.server_event = Some(server_event);
        self
    }

    pub const fn with_argument(mut self, expression: &'static str) -> Self {
        self.argument = Some(expression);
        self
    }
}

/// Read-only view over a widget type's event table
#[derive(Debug, Clone, Copy)]
pub struct EventRegistry {
    descriptors: &'static [EventDescriptor],
}

impl EventRegistry {
    pub const fn new(descriptors: &'static [EventDescriptor]) -> Self {
        Self { descriptors }
    }

    pub fn find(&self, wire_name: &str) -> Option<&'static EventDescriptor> {
        let descriptors: &'static [EventDescriptor] = self.descriptors;
        descriptors.iter().find(|d| d.wire_name == wire_name)
    }

    pub fn postback_events(&self) -> impl Iterator<Item = &'static EventDescriptor> {
        let descriptors: &'static [EventDescriptor] = self.descriptors;
        descriptors.iter().filter(|d| d.postback)
    }
}

/// Server-side delivery of a bound client event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub widget_id: String,
    /// Client event name
    pub event: String,
    pub server_event: Option<String>,
    pub argument: Option<String>,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggeredEvent {
    pub name: String,
    pub argument: Option<String>,
}

/// Events reported by one client round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTrip {
    /// Id of the widget the round trip is addressed to
    pub target: String,
    pub events: Vec<TriggeredEvent>,
}

impl RoundTrip {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            events: Vec::new(),
        }
    }

    pub fn with_event(mut self, name: impl Into<String>) -> Self {
        self.events.push(TriggeredEvent {
            name: name.into(),
            argument: None,
        });
        self
    }

    pub fn with_event_argument(
        mut self,
        name: impl Into<String>,
        argument: impl Into<String>,
    ) -> Self {
        self.events.push(TriggeredEvent {
            name: name.into(),
            argument: Some(argument.into()),
        });
        self
    }

    /// Parse a transport argument of the form `event[:arg][;event[:arg]...]`.
    ///
    /// Empty segments are skipped; an event name is trimmed and lowercased.
    pub fn parse(target: &str, argument: &str) -> Self {
        let events = argument
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|segment| {
                let mut parts = segment.splitn(2, ':');
                let name = parts.next()?.trim().to_lowercase();
                if name.is_empty() {
                    return None;
                }
                let argument = parts
                    .next()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty());
                Some(TriggeredEvent { name, argument })
            })
            .collect();

        Self {
            target: target.trim().to_string(),
            events,
        }
    }
}

type Handler = Box<dyn FnMut(&Notification)>;

/// Per-instance postback binding
pub struct PostbackBinder {
    widget_id: String,
    registry: EventRegistry,
    handlers: Vec<(Option<&'static str>, Handler)>,
}

impl PostbackBinder {
    pub fn new(widget_id: impl Into<String>, registry: EventRegistry) -> Self {
        Self {
            widget_id: widget_id.into(),
            registry,
            handlers: Vec::new(),
        }
    }

    /// Client events whose hook must be emitted in the init script
    pub fn bound_events(&self) -> Vec<&'static EventDescriptor> {
        self.registry.postback_events().collect()
    }

    /// Register a handler for every bound event
    pub fn on_notification<F>(&mut self, handler: F)
    where
        F: FnMut(&Notification) + 'static,
    {
        self.handlers.push((None, Box::new(handler)));
    }

    /// Register a handler for one bound event. Returns false, registering
    /// nothing, if the event is unknown or not bound to a postback.
    pub fn on_event<F>(&mut self, wire_name: &str, handler: F) -> bool
    where
        F: FnMut(&Notification) + 'static,
    {
        match self.registry.find(wire_name) {
            Some(descriptor) if descriptor.postback => {
                self.handlers
                    .push((Some(descriptor.wire_name), Box::new(handler)));
                true
            }
            _ => false,
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Raise notifications for one round trip.
    ///
    /// Repeated triggers of the same event coalesce into one notification;
    /// the first occurrence's argument is kept. Unknown and unbound events are
    /// logged and dropped. Returns the notifications that were raised.
    pub fn deliver(&mut self, round_trip: &RoundTrip) -> Vec<Notification> {
        if round_trip.target != self.widget_id {
            tracing::warn!(
                widget_id = %self.widget_id,
                target = %round_trip.target,
                "Ignoring round trip addressed to another widget"
            );
            return Vec::new();
        }

        let mut raised: Vec<Notification> = Vec::new();

        for triggered in &round_trip.events {
            let descriptor = match self.registry.find(&triggered.name) {
                Some(descriptor) if descriptor.postback => descriptor,
                Some(_) => {
                    tracing::warn!(
                        widget_id = %self.widget_id,
                        event = %triggered.name,
                        "Ignoring round trip for event not bound to postback"
                    );
                    continue;
                }
                None => {
                    tracing::warn!(
                        widget_id = %self.widget_id,
                        event = %triggered.name,
                        "Ignoring round trip for unknown event"
                    );
                    continue;
                }
            };

            if raised.iter().any(|n| n.event == descriptor.wire_name) {
                tracing::debug!(
                    widget_id = %self.widget_id,
                    event = %descriptor.wire_name,
                    "Coalescing repeated trigger"
                );
                continue;
            }

            raised.push(Notification {
                widget_id: self.widget_id.clone(),
                event: descriptor.wire_name.to_string(),
                server_event: descriptor.server_event.map(str::to_string),
                argument: triggered.argument.clone(),
                raised_at: Utc::now(),
            });
        }

        for notification in &raised {
            tracing::info!(
                widget_id = %notification.widget_id,
                event = %notification.event,
                argument = ?notification.argument,
                "Raising notification"
            );

            for (filter, handler) in self.handlers.iter_mut() {
                if filter.map_or(true, |name| name == notification.event) {
                    handler(notification);
                }
            }
        }

        raised
    }
}

impl std::fmt::Debug for PostbackBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostbackBinder")
            .field("widget_id", &self.widget_id)
            .field("registry", &self.registry)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
