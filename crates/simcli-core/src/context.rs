//! Raw-input ownership.
//!
//! Exactly one [`Context`] receives every delivered buffer. At start-up that
//! is the top-level context, normally the dispatcher. A command that needs
//! the raw stream (a file body, a firmware image) acquires its own context;
//! from then on buffers go to it until it releases, restoring whoever owned
//! the input before.
//!
//! Nesting is bounded. The manager keeps the current owner, its caller, and
//! a fixed-capacity stack of earlier callers; acquiring past that capacity is
//! refused rather than grown.

use std::fmt;
use std::rc::Rc;

use simcli_types::config::CliConfig;
use simcli_types::error::ContextError;

use crate::sink::{NullSink, OutputSink};

/// Consumer of raw input buffers.
///
/// Returning `false` means "finished or failed". The manager does not act on
/// it; a handler that is done streaming releases its context itself.
pub trait ContextHandler {
    fn handle(&self, data: &[u8], cli: &mut ContextManager) -> bool;
}

impl<F> ContextHandler for F
where
    F: Fn(&[u8], &mut ContextManager) -> bool,
{
    fn handle(&self, data: &[u8], cli: &mut ContextManager) -> bool {
        self(data, cli)
    }
}

/// A named raw-input consumer.
///
/// Contexts are shared as `Rc<Context>`; identity is pointer identity.
pub struct Context {
    name: String,
    handler: Box<dyn ContextHandler>,
}

impl Context {
    pub fn new(name: impl Into<String>, handler: impl ContextHandler + 'static) -> Self {
        Self {
            name: name.into(),
            handler: Box::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("name", &self.name).finish()
    }
}

/// Routes raw input to the active context and tracks nesting.
pub struct ContextManager {
    active: Rc<Context>,
    caller: Option<Rc<Context>>,
    saved: Vec<Option<Rc<Context>>>,
    capacity: usize,
    sink: Box<dyn OutputSink>,
    delivering: bool,
}

impl ContextManager {
    /// Start at depth 0 with `top_level` active and a no-op sink.
    pub fn new(top_level: Rc<Context>) -> Self {
        Self::with_config(top_level, &CliConfig::default())
    }

    /// Like [`ContextManager::new`], with the nesting limit from `config`.
    pub fn with_config(top_level: Rc<Context>, config: &CliConfig) -> Self {
        let capacity = config.context_stack_size;
        log::debug!(
            "Context manager started with '{}' (stack capacity {capacity})",
            top_level.name()
        );
        Self {
            active: top_level,
            caller: None,
            saved: Vec::with_capacity(capacity),
            capacity,
            sink: Box::new(NullSink),
            delivering: false,
        }
    }

    /// Replace the output sink.
    pub fn with_sink(mut self, sink: impl OutputSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Hand all future input to `context`.
    ///
    /// Called by a command handler once its command has matched. Fails
    /// without touching any state when the nesting limit is reached.
    pub fn acquire(&mut self, context: Rc<Context>) -> Result<(), ContextError> {
        if self.saved.len() >= self.capacity {
            log::warn!(
                "Context '{}' refused: stack full at depth {}",
                context.name(),
                self.depth()
            );
            return Err(ContextError::StackFull(self.depth()));
        }
        self.saved.push(self.caller.take());
        let previous = std::mem::replace(&mut self.active, context);
        self.caller = Some(previous);
        log::info!(
            "Context '{}' acquired (depth {})",
            self.active.name(),
            self.depth()
        );
        Ok(())
    }

    /// Return input ownership to the context active before the matching
    /// [`acquire`](ContextManager::acquire).
    pub fn release(&mut self) -> Result<(), ContextError> {
        let Some(caller) = self.caller.take() else {
            log::warn!("Release with no context to restore");
            return Err(ContextError::NothingToRelease);
        };
        let released = std::mem::replace(&mut self.active, caller);
        self.caller = self.saved.pop().flatten();
        log::info!(
            "Context '{}' released, '{}' restored (depth {})",
            released.name(),
            self.active.name(),
            self.depth()
        );
        Ok(())
    }

    /// Route one raw buffer to the active context.
    ///
    /// Returns the handler's verdict. A delivery started from inside another
    /// delivery is refused.
    pub fn deliver(&mut self, data: &[u8]) -> Result<bool, ContextError> {
        if self.delivering {
            log::warn!("Nested delivery refused");
            return Err(ContextError::Reentrant);
        }
        let target = Rc::clone(&self.active);
        log::debug!("Delivering {} bytes to '{}'", data.len(), target.name());
        self.delivering = true;
        let ok = target.handler.handle(data, self);
        self.delivering = false;
        Ok(ok)
    }

    /// Emit response bytes through the sink.
    pub fn write(&mut self, data: &[u8]) -> usize {
        self.sink.write(data)
    }

    /// Emit response text through the sink.
    pub fn print(&mut self, text: &str) {
        self.sink.write(text.as_bytes());
    }

    /// The context receiving input right now.
    pub fn active(&self) -> &Rc<Context> {
        &self.active
    }

    /// The context that will be restored on the next release.
    pub fn caller(&self) -> Option<&Rc<Context>> {
        self.caller.as_ref()
    }

    /// Number of acquisitions currently in effect.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_top_level(&self) -> bool {
        self.caller.is_none()
    }
}

impl fmt::Debug for ContextManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextManager")
            .field("active", &self.active.name())
            .field("caller", &self.caller.as_ref().map(|c| c.name()))
            .field("depth", &self.depth())
            .field("capacity", &self.capacity)
            .finish()
    }
}
