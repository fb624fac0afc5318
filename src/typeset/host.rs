//! Narrow interface to the external math typesetter.
//!
//! The typesetter's global configuration object is reached only through
//! [`MathHost`]; overriding its configuration is an explicit
//! [`ConfigDecorator`] rather than a mutation of shared state.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::core::TypesetError;

/// Configuration entry point of the typesetter (`Hub.Config` style).
pub type ConfigFn = Arc<dyn Fn(Value) -> Result<(), TypesetError> + Send + Sync>;

/// Wraps a configuration entry point into a new one.
pub type ConfigDecorator = Arc<dyn Fn(ConfigFn) -> ConfigFn + Send + Sync>;

/// Command for the typesetter's processing queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathCommand {
    /// Switch the live output backend
    SetRenderer(String),
    /// Re-typeset all math already on the page
    Rerender,
}

/// What the renderer switch needs from the typesetter
pub trait MathHost: Send + Sync {
    /// Whether a configuration entry point (real or stub) is installed.
    fn has_config_entry_point(&self) -> bool;

    /// Replace the current entry point with `decorator(current)`.
    fn wrap_config_entry_point(&self, decorator: ConfigDecorator) -> Result<(), TypesetError>;

    /// Install a placeholder entry point so a later real initializer composes
    /// with `decorator` instead of overwriting it.
    fn install_config_stub(&self, decorator: ConfigDecorator) -> Result<(), TypesetError>;

    /// Whether the typesetter finished starting up (its queue accepts commands).
    fn has_active_queue(&self) -> bool;

    fn enqueue_command(&self, command: MathCommand) -> Result<(), TypesetError>;
}

// =============================================================================
// MathHub
// =============================================================================

#[derive(Default)]
struct HubState {
    entry: Option<ConfigFn>,
    /// Decorators installed on or over the stub, applied on initialization
    pending_decorators: Vec<ConfigDecorator>,
    queue: Option<Vec<MathCommand>>,
}

/// In-process typesetter host.
///
/// Models the typesetter's global object across its lifetime: absent, then
/// stubbed by early page scripts, then initialized by the real component.
#[derive(Default)]
pub struct MathHub {
    state: Mutex<HubState>,
    /// Configurations that went through the stub before initialization
    deferred: Arc<Mutex<Vec<Value>>>,
    /// Configurations that reached the real entry point
    applied: Arc<Mutex<Vec<Value>>>,
}

impl MathHub {
    /// A page where the typesetter has not loaded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A page where the typesetter is already loaded and running.
    pub fn loaded() -> Self {
        let hub = Self::new();
        hub.load();
        hub
    }

    /// Finish loading with the built-in entry point (records into `applied()`).
    pub fn load(&self) {
        let applied = self.applied.clone();
        self.initialize(Arc::new(move |config| {
            applied.lock().push(config);
            Ok(())
        }));
    }

    /// Install the real entry point, composing any stubbed decorators around
    /// it, replaying stubbed configurations and activating the queue.
    pub fn initialize(&self, real: ConfigFn) {
        {
            let mut state = self.state.lock();
            let decorators = std::mem::take(&mut state.pending_decorators);
            let entry = decorators.iter().fold(real.clone(), |next, wrap| wrap(next));
            state.entry = Some(entry);
            state.queue.get_or_insert_with(Vec::new);
        }

        // Stubbed configurations were already decorated on the way in.
        let deferred = std::mem::take(&mut *self.deferred.lock());
        for config in deferred {
            if let Err(e) = real(config) {
                crate::warn!("math"; "replaying configuration failed: {}", e);
            }
        }
    }

    /// Call the current configuration entry point, as a page script would.
    pub fn configure(&self, config: Value) -> Result<(), TypesetError> {
        let entry = self.state.lock().entry.clone();
        match entry {
            Some(entry) => entry(config),
            None => Err(TypesetError::Unavailable(
                "configuration entry point is not defined".into(),
            )),
        }
    }

    /// Configurations received by the real entry point, oldest first.
    pub fn applied(&self) -> Vec<Value> {
        self.applied.lock().clone()
    }

    /// Commands queued so far, oldest first.
    pub fn commands(&self) -> Vec<MathCommand> {
        self.state.lock().queue.clone().unwrap_or_default()
    }
}

impl MathHost for MathHub {
    fn has_config_entry_point(&self) -> bool {
        self.state.lock().entry.is_some()
    }

    fn wrap_config_entry_point(&self, decorator: ConfigDecorator) -> Result<(), TypesetError> {
        let mut state = self.state.lock();
        let current = state.entry.take().ok_or_else(|| {
            TypesetError::Unavailable("no configuration entry point to wrap".into())
        })?;
        state.entry = Some(decorator(current));
        // Still a stub: the real entry point must get this wrap too.
        if state.queue.is_none() {
            state.pending_decorators.push(decorator);
        }
        Ok(())
    }

    fn install_config_stub(&self, decorator: ConfigDecorator) -> Result<(), TypesetError> {
        let deferred = self.deferred.clone();
        let recorder: ConfigFn = Arc::new(move |config| {
            deferred.lock().push(config);
            Ok(())
        });

        let mut state = self.state.lock();
        state.entry = Some(decorator(recorder));
        state.pending_decorators.push(decorator);
        Ok(())
    }

    fn has_active_queue(&self) -> bool {
        self.state.lock().queue.is_some()
    }

    fn enqueue_command(&self, command: MathCommand) -> Result<(), TypesetError> {
        match self.state.lock().queue.as_mut() {
            Some(queue) => {
                queue.push(command);
                Ok(())
            }
            None => Err(TypesetError::Unavailable("command queue is not active".into())),
        }
    }
}
