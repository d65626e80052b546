//! Runtime limits for the command engine.
//!
//! Every field has a default matching a small embedded target, so an empty
//! TOML document yields a usable configuration.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SimCliError};

/// Separates the command name and its arguments on a line.
pub const ARG_DELIMITER: char = ' ';

/// First character of every flag token (`-n`, `-help`).
pub const FLAG_PREFIX: char = '-';

/// Engine limits, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CliConfig {
    /// Capacity of the command table.
    #[serde(default = "default_max_commands")]
    pub max_commands: usize,
    /// Argument specs per command.
    #[serde(default = "default_max_args")]
    pub max_args: usize,
    /// Saved-stack capacity, i.e. the deepest context nesting allowed.
    #[serde(default = "default_context_stack_size")]
    pub context_stack_size: usize,
    /// Longest line (terminator excluded) the dispatcher accepts.
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    #[serde(default = "default_max_name_len")]
    pub max_name_len: usize,
    #[serde(default = "default_max_flag_len")]
    pub max_flag_len: usize,
    #[serde(default = "default_max_info_len")]
    pub max_info_len: usize,
}

fn default_max_commands() -> usize {
    10
}
fn default_max_args() -> usize {
    8
}
fn default_context_stack_size() -> usize {
    4
}
fn default_max_line_len() -> usize {
    128
}
fn default_max_name_len() -> usize {
    15
}
fn default_max_flag_len() -> usize {
    9
}
fn default_max_info_len() -> usize {
    63
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            max_commands: default_max_commands(),
            max_args: default_max_args(),
            context_stack_size: default_context_stack_size(),
            max_line_len: default_max_line_len(),
            max_name_len: default_max_name_len(),
            max_flag_len: default_max_flag_len(),
            max_info_len: default_max_info_len(),
        }
    }
}

impl CliConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject limits the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("max_commands", self.max_commands),
            ("context_stack_size", self.context_stack_size),
            ("max_line_len", self.max_line_len),
            ("max_name_len", self.max_name_len),
            ("max_flag_len", self.max_flag_len),
        ];
        for (field, value) in checks {
            if value == 0 {
                return Err(SimCliError::Config(format!("{field} must be non-zero")));
            }
        }
        if self.max_commands > usize::from(u8::MAX) {
            return Err(SimCliError::Config(format!(
                "max_commands {} exceeds the id space of 255",
                self.max_commands
            )));
        }
        Ok(())
    }

    /// Most argument tokens a single line may carry.
    pub fn max_arg_tokens(&self) -> usize {
        self.max_args * 2
    }
}
