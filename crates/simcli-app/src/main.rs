//! simcli host console.
//!
//! Reads stdin line by line and delivers each line, terminator included, to
//! the context manager. Command output goes to stdout. While `sendfile` owns
//! the input, lines are file data rather than commands.
//!
//! The config file path comes from the first argument or `SIMCLI_CONFIG`.

mod console;

use std::cell::RefCell;
use std::io::{self, BufRead};
use std::rc::Rc;

use anyhow::{Context as _, Result};

use simcli_commands::{MemoryStorage, SharedStorage, register_builtins};
use simcli_core::{CliConfig, CommandRegistry, Context, ContextManager, Dispatcher};

use console::{MainContext, StdoutSink};

fn load_config() -> Result<CliConfig> {
    match std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SIMCLI_CONFIG").ok())
    {
        Some(path) => CliConfig::load(&path).with_context(|| format!("loading config {path}")),
        None => Ok(CliConfig::default()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    log::info!(
        "Starting simcli ({} commands max, context depth {})",
        config.max_commands,
        config.context_stack_size,
    );

    let storage: SharedStorage = Rc::new(RefCell::new(MemoryStorage::new()));
    let mut registry = CommandRegistry::with_config(config.clone());
    register_builtins(&mut registry, storage)?;
    for cmd in registry.iter() {
        log::info!("  {:<10} {}", cmd.name(), cmd.description());
    }

    let dispatcher = Dispatcher::new(Rc::new(registry));
    let top = Rc::new(Context::new("Main_context", MainContext::new(dispatcher)));
    let mut cli = ContextManager::with_config(top, &config).with_sink(StdoutSink);

    let mut stdin = io::stdin().lock();
    let mut line = String::new();
    loop {
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        if let Err(e) = cli.deliver(line.as_bytes()) {
            log::warn!("Input dropped: {e}");
        }
    }

    if !cli.is_top_level() {
        log::warn!(
            "Input ended inside context '{}' (depth {})",
            cli.active().name(),
            cli.depth()
        );
    }
    log::info!("simcli shut down cleanly");
    Ok(())
}
