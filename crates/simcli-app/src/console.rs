//! Top-level context and stdout sink for the host console.

use std::io::{self, Write};

use simcli_core::{
    ContextHandler, ContextManager, Dispatcher, OutputSink, split_line, strip_terminator,
};

const MSG_UNKNOWN_CMD: &str = "Command unknown\n";
const MSG_LINE_TOO_LONG: &str = "Command line too long\n";
const MSG_TOO_MANY_ARGS: &str = "Too many arguments\n";

/// Parses lines as commands and reports lines the dispatcher refused
/// before any command ran.
pub struct MainContext {
    dispatcher: Dispatcher,
}

impl MainContext {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Diagnostic for a line that never reached a command handler.
    fn rejection(&self, data: &[u8]) -> Option<&'static str> {
        let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        let text = String::from_utf8_lossy(&data[..end]);
        let line = strip_terminator(&text);
        let registry = self.dispatcher.registry();
        let config = registry.config();

        let (name, args) = split_line(line);
        let name = name?;
        if line.len() > config.max_line_len {
            return Some(MSG_LINE_TOO_LONG);
        }
        if registry.find_by_name(name).is_none() {
            return Some(MSG_UNKNOWN_CMD);
        }
        (args.len() > config.max_arg_tokens()).then_some(MSG_TOO_MANY_ARGS)
    }
}

impl ContextHandler for MainContext {
    fn handle(&self, data: &[u8], cli: &mut ContextManager) -> bool {
        let ok = self.dispatcher.handle(data, cli);
        let diagnostic = if ok { None } else { self.rejection(data) };
        if let Some(msg) = diagnostic {
            cli.print(msg);
        }
        ok
    }
}

/// Writes response bytes straight to stdout.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write(&mut self, data: &[u8]) -> usize {
        let mut out = io::stdout().lock();
        match out.write_all(data).and_then(|()| out.flush()) {
            Ok(()) => data.len(),
            Err(e) => {
                log::warn!("stdout write failed: {e}");
                0
            },
        }
    }
}
