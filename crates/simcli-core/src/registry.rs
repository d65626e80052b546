//! Command descriptors and the fixed-capacity command table.

use std::fmt;
use std::rc::Rc;

use simcli_types::config::CliConfig;
use simcli_types::error::{ArgError, RegisterError, Result};

use crate::args::{ArgSlot, ArgSpec, parse_args};
use crate::context::{Context, ContextManager};

/// Body of a command.
///
/// Receives the argument tokens (command name stripped), its own
/// descriptor, and the context manager for output and context acquisition.
pub trait CommandHandler {
    fn execute(
        &self,
        args: &[&str],
        cmd: &CommandDescriptor,
        cli: &mut ContextManager,
    ) -> Result<()>;
}

impl<F> CommandHandler for F
where
    F: Fn(&[&str], &CommandDescriptor, &mut ContextManager) -> Result<()>,
{
    fn execute(
        &self,
        args: &[&str],
        cmd: &CommandDescriptor,
        cli: &mut ContextManager,
    ) -> Result<()> {
        self(args, cmd, cli)
    }
}

/// A registered command: name, id, argument specs, body, and the context
/// it may acquire.
///
/// Built with chained setters, then moved into the registry:
///
/// ```ignore
/// let cmd = CommandDescriptor::new("sendfile", 1)
///     .info("Sends file over UART")
///     .arg(ArgSpec::int("-n"))
///     .handler(SendFileCmd::new(storage));
/// ```
pub struct CommandDescriptor {
    name: String,
    id: u8,
    info: String,
    args: Vec<ArgSpec>,
    handler: Option<Box<dyn CommandHandler>>,
    context: Option<Rc<Context>>,
}

impl CommandDescriptor {
    pub fn new(name: impl Into<String>, id: u8) -> Self {
        Self {
            name: name.into(),
            id,
            info: String::new(),
            args: Vec::new(),
            handler: None,
            context: None,
        }
    }

    /// One-line description.
    pub fn info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    /// Append an argument spec. Slot `i` of every call binds spec `i`.
    pub fn arg(mut self, spec: ArgSpec) -> Self {
        self.args.push(spec);
        self
    }

    pub fn handler(mut self, handler: impl CommandHandler + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// The context a successful invocation may acquire.
    pub fn context(mut self, context: Rc<Context>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.info
    }

    pub fn arg_specs(&self) -> &[ArgSpec] {
        &self.args
    }

    pub fn owned_context(&self) -> Option<&Rc<Context>> {
        self.context.as_ref()
    }

    pub(crate) fn command_handler(&self) -> Option<&dyn CommandHandler> {
        self.handler.as_deref()
    }

    /// Bind `tokens` against this command's specs into fresh `slots`.
    pub fn parse_args(&self, tokens: &[&str], slots: &mut [ArgSlot<'_>]) -> Result<(), ArgError> {
        parse_args(tokens, &self.args, slots)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("info", &self.info)
            .field("args", &self.args)
            .field("has_handler", &self.handler.is_some())
            .field("context", &self.context)
            .finish()
    }
}

/// Append-only table of commands, bounded by `max_commands`.
///
/// Names and ids are unique; lookups are exact and linear, in registration
/// order.
pub struct CommandRegistry {
    commands: Vec<CommandDescriptor>,
    config: CliConfig,
}

impl CommandRegistry {
    /// Create an empty registry with default limits.
    pub fn new() -> Self {
        Self::with_config(CliConfig::default())
    }

    pub fn with_config(config: CliConfig) -> Self {
        Self {
            commands: Vec::with_capacity(config.max_commands),
            config,
        }
    }

    /// Add a command, returning the new number of entries.
    ///
    /// A rejected descriptor leaves the table untouched.
    pub fn register(&mut self, cmd: CommandDescriptor) -> Result<usize, RegisterError> {
        if let Err(e) = self.check(&cmd) {
            log::warn!("Command '{}' (id {}) rejected: {e}", cmd.name, cmd.id);
            return Err(e);
        }
        log::info!("Registered command '{}' (id {})", cmd.name, cmd.id);
        self.commands.push(cmd);
        Ok(self.commands.len())
    }

    fn check(&self, cmd: &CommandDescriptor) -> Result<(), RegisterError> {
        let cfg = &self.config;
        if cmd.handler.is_none() {
            return Err(RegisterError::MissingHandler(cmd.name.clone()));
        }
        if cmd.id == 0 {
            return Err(RegisterError::ReservedId);
        }
        if self.find_by_id(cmd.id).is_some() {
            return Err(RegisterError::DuplicateId(cmd.id));
        }
        if self.find_by_name(&cmd.name).is_some() {
            return Err(RegisterError::DuplicateName(cmd.name.clone()));
        }
        if self.commands.len() >= cfg.max_commands {
            return Err(RegisterError::TableFull(cfg.max_commands));
        }
        if cmd.name.len() > cfg.max_name_len {
            return Err(RegisterError::NameTooLong {
                name: cmd.name.clone(),
                max: cfg.max_name_len,
            });
        }
        if cmd.info.len() > cfg.max_info_len {
            return Err(RegisterError::InfoTooLong {
                name: cmd.name.clone(),
                max: cfg.max_info_len,
            });
        }
        if cmd.args.len() > cfg.max_args {
            return Err(RegisterError::TooManyArgs {
                name: cmd.name.clone(),
                count: cmd.args.len(),
                max: cfg.max_args,
            });
        }
        for (i, spec) in cmd.args.iter().enumerate() {
            if spec.name().len() > cfg.max_flag_len {
                return Err(RegisterError::FlagTooLong {
                    flag: spec.name().to_string(),
                    max: cfg.max_flag_len,
                });
            }
            if cmd.args[..i].iter().any(|s| s.name() == spec.name()) {
                return Err(RegisterError::DuplicateFlag(spec.name().to_string()));
            }
        }
        Ok(())
    }

    /// First command whose name equals `name` exactly.
    pub fn find_by_name(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// First command with the given id.
    pub fn find_by_id(&self, id: u8) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|c| c.id == id)
    }

    /// Commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.max_commands
    }

    pub fn config(&self) -> &CliConfig {
        &self.config
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.commands)
            .field("capacity", &self.config.max_commands)
            .finish()
    }
}
