//! Client initialization script

use serde::{Deserialize, Serialize};

use crate::events::EventDescriptor;
use crate::options::{script_safe, InitPayload};
use crate::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptWrapper {
    /// Run once the DOM is ready: `jQuery(function ($) { ... });`
    #[default]
    DomReady,
    /// Run where the script appears: `(function ($) { ... })(jQuery);`
    Immediate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOptions {
    /// Client function invoked as `fn(target, argument)` to start a round trip
    pub postback_function: String,
    pub wrapper: ScriptWrapper,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            postback_function: "__doPostBack".to_string(),
            wrapper: ScriptWrapper::DomReady,
        }
    }
}

/// Everything the client widget needs to initialize one instance
#[derive(Debug, Clone, PartialEq)]
pub struct InitScript {
    /// Client widget constructor, e.g. `tabs`
    pub widget: &'static str,
    pub element_id: String,
    pub payload: InitPayload,
    pub postback_events: Vec<EventDescriptor>,
}

impl InitScript {
    /// The statement constructing the widget and binding its postback hooks,
    /// without any wrapper.
    pub fn to_statement(&self, options: &ScriptOptions) -> Result<String> {
        let id_literal = js_string(&self.element_id)?;

        let mut out = format!(
            "$(document.getElementById({id})).{widget}({payload})",
            id = id_literal,
            widget = self.widget,
            payload = self.payload.to_script_literal()?,
        );

        for event in &self.postback_events {
            let argument = match event.argument {
                Some(expression) => format!(
                    "{} + \":\" + {}",
                    js_string(event.wire_name)?,
                    expression
                ),
                None => js_string(event.wire_name)?,
            };

            out.push_str(&format!(
                ".bind({client_event}, function (event, ui) {{ {postback}({id}, {argument}); }})",
                client_event = js_string(&format!("{}{}", self.widget, event.wire_name))?,
                postback = options.postback_function,
                id = id_literal,
                argument = argument,
            ));
        }

        out.push(';');
        Ok(out)
    }

    pub fn to_script(&self, options: &ScriptOptions) -> Result<String> {
        Ok(wrap(&self.to_statement(options)?, options.wrapper))
    }
}

/// Wrap one or more statements according to `wrapper`
pub(crate) fn wrap(body: &str, wrapper: ScriptWrapper) -> String {
    match wrapper {
        ScriptWrapper::DomReady => format!("jQuery(function ($) {{ {} }});", body),
        ScriptWrapper::Immediate => format!("(function ($) {{ {} }})(jQuery);", body),
    }
}

/// Wrap the statements of several widgets into a single script body
pub fn combine_scripts(scripts: &[InitScript], options: &ScriptOptions) -> Result<String> {
    let statements = scripts
        .iter()
        .map(|script| script.to_statement(options))
        .collect::<Result<Vec<_>>>()?;
    Ok(wrap(&statements.join(" "), options.wrapper))
}

fn js_string(s: &str) -> Result<String> {
    Ok(script_safe(&serde_json::to_string(s)?))
}
