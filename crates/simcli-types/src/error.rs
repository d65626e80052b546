//! Error types for simcli.

use std::io;

/// Reasons a command descriptor is refused by the registry.
///
/// A rejected registration never mutates the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
    #[error("command '{0}' has no handler")]
    MissingHandler(String),

    #[error("command id 0 is reserved")]
    ReservedId,

    #[error("command id {0} is already registered")]
    DuplicateId(u8),

    #[error("command name '{0}' is already registered")]
    DuplicateName(String),

    #[error("command table is full ({0} entries)")]
    TableFull(usize),

    #[error("command name '{name}' exceeds {max} bytes")]
    NameTooLong { name: String, max: usize },

    #[error("command '{name}' declares {count} arguments, limit is {max}")]
    TooManyArgs {
        name: String,
        count: usize,
        max: usize,
    },

    #[error("flag '{flag}' exceeds {max} bytes")]
    FlagTooLong { flag: String, max: usize },

    #[error("flag '{0}' is declared twice")]
    DuplicateFlag(String),

    #[error("info text of '{name}' exceeds {max} bytes")]
    InfoTooLong { name: String, max: usize },
}

/// Argument parsing failures, one kind per diagnostic.
///
/// Destinations written before the failing token keep their values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgError {
    #[error("unknown argument '{0}'")]
    Unknown(String),

    #[error("bad value after {flag}")]
    BadValue { flag: String, value: Option<String> },

    #[error("missing value after {0}")]
    MissingValue(String),

    #[error("destination for {0} does not match its kind")]
    BindingMismatch(String),
}

/// Context stack transitions that were refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("context stack full at depth {0}")]
    StackFull(usize),

    #[error("no context to release")]
    NothingToRelease,

    #[error("delivery already in progress")]
    Reentrant,
}

/// Errors produced by simcli.
#[derive(Debug, thiserror::Error)]
pub enum SimCliError {
    #[error("registration error: {0}")]
    Register(#[from] RegisterError),

    #[error("argument error: {0}")]
    Arg(#[from] ArgError),

    #[error("context error: {0}")]
    Context(#[from] ContextError),

    #[error("command error: {0}")]
    Command(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T, E = SimCliError> = std::result::Result<T, E>;
