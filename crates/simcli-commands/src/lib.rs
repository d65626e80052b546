//! Sample commands for a simcli console.
//!
//! `sendfile` shows a stream-owning command: it parses its flags, opens a
//! file on the storage driver, then acquires its context and consumes raw
//! input until the declared size arrives. `mountsd` is a plain stateless
//! command.

mod charset;
mod mountsd;
mod sendfile;
pub mod storage;

#[cfg(test)]
mod tests;

/// Filename character check used by `sendfile`.
pub use charset::check_allowed_characters;
/// `mountsd` descriptor builder.
pub use mountsd::{MOUNTSD_ID, mountsd_command};
/// `sendfile` descriptor builder.
pub use sendfile::{DEFAULT_FILE_SIZE, SENDFILE_ID, sendfile_command};
/// Storage driver trait and the in-memory implementation.
pub use storage::{MemoryStorage, SharedStorage, Storage};

use simcli_core::{CommandRegistry, RegisterError};

/// Register every sample command into a registry.
pub fn register_builtins(
    reg: &mut CommandRegistry,
    storage: SharedStorage,
) -> Result<(), RegisterError> {
    reg.register(sendfile_command(std::rc::Rc::clone(&storage)))?;
    reg.register(mountsd_command(storage))?;
    Ok(())
}
