//! `sendfile`: receive a file body over the console link.
//!
//! `sendfile -n <size> [-o] -f <name>` opens `<name>` on storage and
//! acquires the `sendfile` context. Every following buffer is file data
//! until `<size>` bytes have arrived; the context then closes the file and
//! releases, handing the link back to command parsing.

use std::cell::Cell;
use std::rc::Rc;

use simcli_core::{
    ArgError, ArgSlot, ArgSpec, CommandDescriptor, CommandHandler, Context, ContextHandler,
    ContextManager, Result, SimCliError,
};

use crate::charset::check_allowed_characters;
use crate::storage::SharedStorage;

pub const SENDFILE_ID: u8 = 1;

/// Size assumed when `-n` is not given.
pub const DEFAULT_FILE_SIZE: i32 = 1024;

const DEFAULT_FILE_NAME: &str = "Default";
const FILE_NAME_CAPACITY: usize = 31;

const MSG_UNKNOWN_ARG: &str = "Unknown argument\n";
const MSG_BAD_VALUE: &str = "Bad argument value\n";
const MSG_MISSING_VALUE: &str = "Missing argument value\n";
const MSG_BAD_BINDING: &str = "Argument binding error\n";
const MSG_RESTRICTED: &str = "Restricted character in filename\n";
const MSG_OPEN_FAILED: &str = "Cannot open file\n";
const MSG_NO_CONTEXT: &str = "Context not acquired\n";

/// Progress of the transfer in flight, shared by command and context.
#[derive(Debug, Default)]
struct Transfer {
    expected: Cell<usize>,
    written: Cell<usize>,
}

impl Transfer {
    fn start(&self, expected: usize) {
        self.expected.set(expected);
        self.written.set(0);
    }

    fn remaining(&self) -> usize {
        self.expected.get().saturating_sub(self.written.get())
    }

    fn reset(&self) {
        self.start(0);
    }
}

fn arg_error_message(e: &ArgError) -> &'static str {
    match e {
        ArgError::Unknown(_) => MSG_UNKNOWN_ARG,
        ArgError::BadValue { .. } => MSG_BAD_VALUE,
        ArgError::MissingValue(_) => MSG_MISSING_VALUE,
        ArgError::BindingMismatch(_) => MSG_BAD_BINDING,
    }
}

struct SendFileCmd {
    storage: SharedStorage,
    transfer: Rc<Transfer>,
}

impl CommandHandler for SendFileCmd {
    fn execute(
        &self,
        args: &[&str],
        cmd: &CommandDescriptor,
        cli: &mut ContextManager,
    ) -> Result<()> {
        let mut file_size = DEFAULT_FILE_SIZE;
        let mut overwrite = false;
        let mut file_name = String::from(DEFAULT_FILE_NAME);

        let parsed = cmd.parse_args(
            args,
            &mut [
                ArgSlot::Int(&mut file_size),
                ArgSlot::Flag(&mut overwrite),
                ArgSlot::string(&mut file_name, FILE_NAME_CAPACITY),
            ],
        );
        if let Err(e) = parsed {
            cli.print(arg_error_message(&e));
            return Err(e.into());
        }

        let Ok(size) = usize::try_from(file_size) else {
            cli.print(MSG_BAD_VALUE);
            return Err(ArgError::BadValue {
                flag: "-n".into(),
                value: Some(file_size.to_string()),
            }
            .into());
        };

        if !check_allowed_characters(&file_name) {
            cli.print(MSG_RESTRICTED);
            return Err(SimCliError::Command(format!(
                "restricted character in '{file_name}'"
            )));
        }

        if file_size == DEFAULT_FILE_SIZE {
            log::info!("Will open file named {file_name}. Size is not set");
        } else {
            log::info!("Will open file named {file_name} with the size of {size} bytes");
        }

        let context = cmd
            .owned_context()
            .ok_or_else(|| SimCliError::Command("sendfile has no context".into()))?;

        let opened = self.storage.borrow_mut().open(&file_name, overwrite, size);
        if let Err(e) = opened {
            cli.print(MSG_OPEN_FAILED);
            return Err(e);
        }

        if let Err(e) = cli.acquire(Rc::clone(context)) {
            log::warn!("sendfile: context not acquired");
            if let Err(e) = self.storage.borrow_mut().close() {
                log::warn!("sendfile: close failed: {e}");
            }
            cli.print(MSG_NO_CONTEXT);
            return Err(e.into());
        }
        self.transfer.start(size);
        Ok(())
    }
}

/// Drop a C-style `\r\n\0` tail from a received chunk.
///
/// Only the exact three-byte tail is framing; a lone `\n`, `\r` or NUL is
/// file data.
fn strip_chunk_terminator(data: &[u8]) -> &[u8] {
    data.strip_suffix(b"\r\n\0").unwrap_or(data)
}

struct SendFileStream {
    storage: SharedStorage,
    transfer: Rc<Transfer>,
}

impl SendFileStream {
    fn finish(&self, cli: &mut ContextManager) {
        if let Err(e) = self.storage.borrow_mut().close() {
            log::warn!("sendfile: close failed: {e}");
        }
        self.transfer.reset();
        if cli.release().is_ok() {
            log::info!("Context released");
        }
    }
}

impl ContextHandler for SendFileStream {
    fn handle(&self, data: &[u8], cli: &mut ContextManager) -> bool {
        let data = strip_chunk_terminator(data);
        let chunk = &data[..data.len().min(self.transfer.remaining())];

        let stored = self.storage.borrow_mut().write(chunk);
        match stored {
            Ok(n) => {
                log::info!("{n} bytes have been written");
                self.transfer.written.set(self.transfer.written.get() + n);
            },
            Err(e) => {
                log::warn!("sendfile: write failed: {e}");
                self.finish(cli);
                return false;
            },
        }

        if self.transfer.remaining() > 0 {
            return true;
        }
        self.finish(cli);
        false
    }
}

/// Descriptor for `sendfile`, with its streaming context attached.
pub fn sendfile_command(storage: SharedStorage) -> CommandDescriptor {
    let transfer = Rc::new(Transfer::default());
    let stream = Context::new(
        "sendfile",
        SendFileStream {
            storage: Rc::clone(&storage),
            transfer: Rc::clone(&transfer),
        },
    );
    CommandDescriptor::new("sendfile", SENDFILE_ID)
        .info("Sends file over UART")
        .arg(ArgSpec::int("-n"))
        .arg(ArgSpec::flag("-o"))
        .arg(ArgSpec::string("-f"))
        .handler(SendFileCmd { storage, transfer })
        .context(Rc::new(stream))
}
