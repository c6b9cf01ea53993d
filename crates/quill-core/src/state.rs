//! Widget lifecycle state machine
//!
//! One pass per request/response cycle:
//! ```text
//! Initialized
//!   ↓ compose
//! ChildrenComposed  ←─┐
//!   ↓ render          │ compose (next pass)
//! Rendered ───────────┘
//! ```
//! Any mutation of the child collection drops the widget back to
//! `Initialized`, so a stale composition can never be rendered.

use serde::{Deserialize, Serialize};

use crate::error::WidgetError;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetState {
    /// Constructed, or mutated since the last composition
    Initialized,
    /// Child list rebuilt from the current collection
    ChildrenComposed,
    /// Markup written for the current composition
    Rendered,
}

impl WidgetState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: WidgetState) -> bool {
        match (self, target) {
            // Composition may always be redone
            (_, WidgetState::ChildrenComposed) => true,
            // Rendering needs a fresh composition
            (WidgetState::ChildrenComposed, WidgetState::Rendered) => true,
            // Invalidation
            (_, WidgetState::Initialized) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetState::Initialized => "initialized",
            WidgetState::ChildrenComposed => "children_composed",
            WidgetState::Rendered => "rendered",
        }
    }
}

impl std::fmt::Display for WidgetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle tracker owned by a widget instance
#[derive(Debug, Clone)]
pub struct Lifecycle {
    widget_id: String,
    state: WidgetState,
}

impl Lifecycle {
    pub fn new(widget_id: impl Into<String>) -> Self {
        Self {
            widget_id: widget_id.into(),
            state: WidgetState::Initialized,
        }
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    /// Attempt to transition to a new state
    pub fn transition_to(&mut self, new_state: WidgetState) -> Result<()> {
        if !self.state.can_transition_to(new_state) {
            return Err(WidgetError::InvalidTransition {
                from: self.state.to_string(),
                to: new_state.to_string(),
            });
        }

        tracing::debug!(
            widget_id = %self.widget_id,
            from = %self.state,
            to = %new_state,
            "Widget state transition"
        );

        self.state = new_state;
        Ok(())
    }

    /// Mark the child list as rebuilt
    pub fn composed(&mut self) -> Result<()> {
        self.transition_to(WidgetState::ChildrenComposed)
    }

    /// Enter `Rendered`. Without a fresh composition for this pass the
    /// transition is refused and reported as `RenderBeforeCompose`.
    pub fn begin_render(&mut self) -> Result<()> {
        self.transition_to(WidgetState::Rendered)
            .map_err(|e| match e {
                WidgetError::InvalidTransition { .. } => {
                    WidgetError::RenderBeforeCompose(self.widget_id.clone())
                }
                other => other,
            })
    }

    /// Drop back to `Initialized` after a mutation
    pub fn invalidate(&mut self) {
        if self.state == WidgetState::Initialized {
            return;
        }
        if let Err(e) = self.transition_to(WidgetState::Initialized) {
            tracing::warn!(
                widget_id = %self.widget_id,
                error = %e,
                "Failed to invalidate composition"
            );
        }
    }
}
