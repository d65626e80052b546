//! Command engine for line-oriented embedded consoles.
//!
//! Commands are registered once into a fixed-capacity [`CommandRegistry`].
//! The [`Dispatcher`] tokenizes each line, resolves the command by exact
//! name, and runs its handler. Raw input always flows through the
//! [`ContextManager`], whose active [`Context`] is the dispatcher until a
//! command acquires a context of its own to stream data, then releases it.

pub mod args;
pub mod context;
pub mod dispatcher;
pub mod registry;
pub mod sink;

/// Argument kinds, specs, destination slots and the parser.
pub use args::{ArgKind, ArgSlot, ArgSpec, StrSlot, parse_args};
/// Raw-input consumers and the stack that routes input between them.
pub use context::{Context, ContextHandler, ContextManager};
/// Line splitting and command invocation.
pub use dispatcher::{Dispatcher, split_line, strip_terminator};
/// Command descriptors, handlers and the command table.
pub use registry::{CommandDescriptor, CommandHandler, CommandRegistry};
/// Response byte sinks.
pub use sink::{MemorySink, NullSink, OutputSink};
/// Error taxonomy shared with the rest of the workspace.
pub use simcli_types::error::{ArgError, ContextError, RegisterError, Result, SimCliError};
/// Engine limits.
pub use simcli_types::config::CliConfig;
