//! Request cycle driver
//!
//! One `RequestCycle` per inbound request. Widgets are registered after
//! construction, round trips are delivered before rendering, and
//! `render_document` composes then renders every widget in registration
//! order, followed by a single init script block.

use quill_core::{combine_scripts, InitScript, Notification, RoundTrip, Widget};

use crate::config::Config;
use crate::error::HostError;
use crate::Result;

pub struct RequestCycle {
    config: Config,
    widgets: Vec<Box<dyn Widget>>,
}

impl RequestCycle {
    /// Start a cycle. The config is validated here as well, since a
    /// hand-built `Config` never went through `Config::from_json_str`.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            widgets: Vec::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a constructed widget. Ids must be unique within the cycle
    /// since they address round trips.
    pub fn add_widget<W>(&mut self, widget: W) -> Result<()>
    where
        W: Widget + 'static,
    {
        if self.widgets.iter().any(|w| w.id() == widget.id()) {
            return Err(HostError::DuplicateWidget(widget.id().to_string()));
        }

        tracing::debug!(
            widget_id = %widget.id(),
            widget = widget.widget_name(),
            "Registered widget"
        );
        self.widgets.push(Box::new(widget));
        Ok(())
    }

    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    pub fn widget(&self, id: &str) -> Option<&dyn Widget> {
        self.widgets.iter().find(|w| w.id() == id).map(|w| &**w)
    }

    /// Typed access to a registered widget, e.g. to add pages
    pub fn widget_mut<W>(&mut self, id: &str) -> Option<&mut W>
    where
        W: Widget + 'static,
    {
        self.widgets
            .iter_mut()
            .find(|w| w.id() == id)
            .and_then(|w| w.as_any_mut().downcast_mut::<W>())
    }

    /// Deliver a round trip from the transport. Unknown targets and events
    /// are logged and ignored.
    pub fn deliver_postback(&mut self, target: &str, argument: &str) -> Vec<Notification> {
        let round_trip = RoundTrip::parse(target, argument);

        match self.widgets.iter_mut().find(|w| w.id() == round_trip.target) {
            Some(widget) => widget.deliver(&round_trip),
            None => {
                tracing::warn!(
                    target = %round_trip.target,
                    "Ignoring round trip for unknown widget"
                );
                Vec::new()
            }
        }
    }

    /// Compose and render every widget, then append the init script block.
    /// On error nothing is returned for the whole document.
    pub fn render_document(&mut self) -> Result<String> {
        let mut out = String::new();
        let mut scripts: Vec<InitScript> = Vec::with_capacity(self.widgets.len());

        for widget in self.widgets.iter_mut() {
            widget.compose()?;
            widget.render(&mut out)?;
            scripts.push(widget.init_script()?);
        }

        if !scripts.is_empty() {
            let body = combine_scripts(&scripts, &self.config.script_options())?;
            if self.config.emit_script_tag {
                out.push_str("<script type=\"text/javascript\">");
                out.push_str(&body);
                out.push_str("</script>");
            } else {
                out.push_str(&body);
            }
        }

        tracing::debug!(widget_count = self.widgets.len(), bytes = out.len(), "Rendered document");
        Ok(out)
    }
}

impl std::fmt::Debug for RequestCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCycle")
            .field("config", &self.config)
            .field(
                "widgets",
                &self.widgets.iter().map(|w| w.id()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
