//! Line splitting and command dispatch.
//!
//! A line is `name arg arg ...`, separated by single spaces, with an
//! optional `\r`/`\n` terminator. No quoting, no escapes.

use std::rc::Rc;

use simcli_types::config::ARG_DELIMITER;

use crate::context::{Context, ContextHandler, ContextManager};
use crate::registry::CommandRegistry;

/// Strip up to two trailing line-terminator characters (`\n`, `\r\n`,
/// `\n\r`, `\r`).
pub fn strip_terminator(line: &str) -> &str {
    let mut rest = line;
    for _ in 0..2 {
        match rest.strip_suffix(['\r', '\n']) {
            Some(r) => rest = r,
            None => break,
        }
    }
    rest
}

/// Split a line into its command token and argument tokens.
///
/// Runs of delimiters produce no empty tokens. Returns `None` for the
/// command when the line holds no tokens at all.
pub fn split_line(line: &str) -> (Option<&str>, Vec<&str>) {
    let mut tokens = line.split(ARG_DELIMITER).filter(|t| !t.is_empty());
    let command = tokens.next();
    (command, tokens.collect())
}

/// Maps lines to registered commands and runs them.
///
/// Also the usual top-level [`Context`]: install it with
/// [`Dispatcher::into_context`] so that raw input is parsed as commands
/// whenever no command owns the stream.
#[derive(Debug)]
pub struct Dispatcher {
    registry: Rc<CommandRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Rc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Rc<CommandRegistry> {
        &self.registry
    }

    /// Run one command line.
    ///
    /// Returns the id of the command that ran successfully, or 0 when the
    /// line was empty, too long, named no registered command, or the
    /// command's handler failed.
    pub fn process(&self, line: &str, cli: &mut ContextManager) -> u8 {
        let config = self.registry.config();
        let line = strip_terminator(line);
        if line.len() > config.max_line_len {
            log::warn!(
                "Line of {} bytes exceeds limit of {}",
                line.len(),
                config.max_line_len
            );
            return 0;
        }

        let (Some(name), args) = split_line(line) else {
            return 0;
        };
        log::debug!("cmd token = {name}, {} args", args.len());

        let Some(cmd) = self.registry.find_by_name(name) else {
            log::debug!("Command '{name}' unknown");
            return 0;
        };
        if args.len() > config.max_arg_tokens() {
            log::warn!(
                "Command '{name}' given {} tokens, limit is {}",
                args.len(),
                config.max_arg_tokens()
            );
            return 0;
        }
        let Some(handler) = cmd.command_handler() else {
            return 0;
        };

        match handler.execute(&args, cmd, cli) {
            Ok(()) => {
                log::debug!("Command '{name}' done (id {})", cmd.id());
                cmd.id()
            },
            Err(e) => {
                log::debug!("Command '{name}' failed: {e}");
                0
            },
        }
    }

    /// Wrap this dispatcher as a named top-level context.
    pub fn into_context(self, name: impl Into<String>) -> Rc<Context> {
        Rc::new(Context::new(name, self))
    }
}

impl ContextHandler for Dispatcher {
    /// Treat the buffer as a C-style line: everything past the first NUL is
    /// ignored, and non-UTF-8 input runs nothing.
    fn handle(&self, data: &[u8], cli: &mut ContextManager) -> bool {
        let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        match std::str::from_utf8(&data[..end]) {
            Ok(line) => self.process(line, cli) != 0,
            Err(e) => {
                log::warn!("Dropping non-UTF-8 line: {e}");
                false
            },
        }
    }
}
