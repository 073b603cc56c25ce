//! Configuration for the message builder

use serde::{Deserialize, Serialize};

/// Message builder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix of generated message identifications
    pub message_id_prefix: String,

    /// Indent the rendered XML
    pub pretty_print: bool,

    /// Spaces per indentation level when pretty printing
    pub indent_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            message_id_prefix: "SEPA".to_string(),
            pretty_print: true,
            indent_width: 2,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(prefix) = std::env::var("SEPA_MESSAGE_ID_PREFIX") {
            config.message_id_prefix = prefix;
        }

        if let Ok(pretty) = std::env::var("SEPA_PRETTY_PRINT") {
            config.pretty_print = pretty.parse().map_err(|_| {
                crate::Error::Config(format!("SEPA_PRETTY_PRINT must be true or false, got {}", pretty))
            })?;
        }

        if let Ok(width) = std::env::var("SEPA_INDENT_WIDTH") {
            config.indent_width = width.parse().map_err(|_| {
                crate::Error::Config(format!("SEPA_INDENT_WIDTH must be a number, got {}", width))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants
    pub fn validate(&self) -> crate::Result<()> {
        // Leaves room for "/" and a 32 char identifier tail
        if self.message_id_prefix.is_empty() || self.message_id_prefix.chars().count() > 16 {
            return Err(crate::Error::Config(format!(
                "message_id_prefix must be 1-16 characters, got {:?}",
                self.message_id_prefix
            )));
        }
        if !crate::validation::is_sepa_text(&self.message_id_prefix) {
            return Err(crate::Error::Config(format!(
                "message_id_prefix contains characters outside the SEPA character set: {:?}",
                self.message_id_prefix
            )));
        }
        if self.indent_width > 8 {
            return Err(crate::Error::Config(format!(
                "indent_width must be at most 8, got {}",
                self.indent_width
            )));
        }
        Ok(())
    }
}
