//! Quill Host
//!
//! Integration layer for a host framework: configuration, logging, and the
//! `RequestCycle` that drives every widget of one request through
//! postback delivery, composition and rendering.

mod config;
mod cycle;
mod error;

pub use config::Config;
pub use cycle::RequestCycle;
pub use error::HostError;

// Re-export widget components
pub use quill_core::{
    Disabled, InitScript, Node, Notification, RoundTrip, ScriptOptions, ScriptWrapper, Widget,
    WidgetError, WidgetState,
};
pub use quill_tabs::{TabPage, Tabs, TabsError};

pub type Result<T> = std::result::Result<T, HostError>;

/// Initialize logging. `RUST_LOG` takes precedence over the configured filter.
pub fn init_logging(config: &Config) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    fmt().with_env_filter(filter).with_target(true).init();
}
