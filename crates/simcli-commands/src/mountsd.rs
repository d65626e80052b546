//! `mountsd`: bring up the SD card interface.

use simcli_core::{CommandDescriptor, CommandHandler, ContextManager, Result, SimCliError};

use crate::storage::SharedStorage;

pub const MOUNTSD_ID: u8 = 2;

const MSG_NO_ARGS: &str = "Command doesn't have arguments\n";
const MSG_MOUNT_OK: &str = "Mount success\n";
const MSG_MOUNT_FAIL: &str = "Mount failed\n";

struct MountSdCmd {
    storage: SharedStorage,
}

impl CommandHandler for MountSdCmd {
    fn execute(
        &self,
        args: &[&str],
        cmd: &CommandDescriptor,
        cli: &mut ContextManager,
    ) -> Result<()> {
        if !args.is_empty() && cmd.arg_specs().is_empty() {
            cli.print(MSG_NO_ARGS);
            return Err(SimCliError::Command("mountsd takes no arguments".into()));
        }
        let mounted = self.storage.borrow_mut().mount();
        match mounted {
            Ok(()) => {
                cli.print(MSG_MOUNT_OK);
                Ok(())
            },
            Err(e) => {
                log::warn!("SD mount failed: {e}");
                cli.print(MSG_MOUNT_FAIL);
                Err(e)
            },
        }
    }
}

/// Descriptor for `mountsd`.
pub fn mountsd_command(storage: SharedStorage) -> CommandDescriptor {
    CommandDescriptor::new("mountsd", MOUNTSD_ID)
        .info("Initializes SD card interface")
        .handler(MountSdCmd { storage })
}
