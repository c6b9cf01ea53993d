//! Host configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use quill_core::{ScriptOptions, ScriptWrapper};

use crate::error::HostError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Client function that starts a round trip, called as `fn(target, argument)`
    pub postback_function: String,
    /// How init scripts are wrapped
    pub script_wrapper: ScriptWrapper,
    /// Wrap the combined init script in a `<script>` element
    pub emit_script_tag: bool,
    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;

        tracing::debug!(path = %path.display(), "Loaded host configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let name = self.postback_function.as_str();
        let valid = !name.is_empty()
            && !name.starts_with(|c: char| c.is_ascii_digit())
            && name.split('.').all(|part| {
                !part.is_empty()
                    && part
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
            });

        if !valid {
            return Err(HostError::Config(format!(
                "postback_function must be a JavaScript identifier path, got {:?}",
                name
            )));
        }
        Ok(())
    }

    pub fn script_options(&self) -> ScriptOptions {
        ScriptOptions {
            postback_function: self.postback_function.clone(),
            wrapper: self.script_wrapper,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            postback_function: "__doPostBack".to_string(),
            script_wrapper: ScriptWrapper::DomReady,
            emit_script_tag: true,
            log_filter: "info".to_string(),
        }
    }
}
