//! # Binding Context
//!
//! State every native binding receives: the host, the identity bridge,
//! timers and event handlers of one resource. One context belongs to one
//! runtime; several runtimes can live side by side.

use crate::convert::ValueConverter;
use crate::events::EventRegistry;
use crate::identity::IdentityBridge;
use crate::timers::TimerManager;
use asbridge_core::EntityRef;
use asbridge_host::{HostError, HostRuntime, ResourceInfo};
use asbridge_scripting::{ScriptError, ScriptResult, ScriptValue};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

pub struct BindingContext {
    host: Arc<dyn HostRuntime>,
    resource: String,
    bridge: IdentityBridge,
    timers: TimerManager,
    events: EventRegistry,
    /// Time of the current tick
    now: Mutex<Instant>,
}

impl BindingContext {
    pub fn new(host: Arc<dyn HostRuntime>, resource: impl Into<String>) -> Self {
        Self {
            host,
            resource: resource.into(),
            bridge: IdentityBridge::new(),
            timers: TimerManager::new(),
            events: EventRegistry::new(),
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn host(&self) -> &dyn HostRuntime {
        self.host.as_ref()
    }

    pub fn resource_name(&self) -> &str {
        &self.resource
    }

    /// The resource this context runs in
    pub fn resource(&self) -> ScriptResult<ResourceInfo> {
        self.host
            .resource(&self.resource)
            .ok_or_else(|| ScriptError::RuntimeError("Resource not found".into()))
    }

    pub fn bridge(&self) -> &IdentityBridge {
        &self.bridge
    }

    pub fn timers(&self) -> &TimerManager {
        &self.timers
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    pub fn converter(&self) -> ValueConverter<'_> {
        ValueConverter::new(self.host.as_ref(), &self.bridge)
    }

    /// Runtime clock: the instant of the last tick or `set_clock` call
    ///
    /// Timers are scheduled relative to this, not to the wall clock.
    pub fn now(&self) -> Instant {
        *self.now.lock()
    }

    pub(crate) fn set_now(&self, now: Instant) {
        *self.now.lock() = now;
    }

    /// Entity behind a handle argument or `this`
    pub fn entity(&self, value: &ScriptValue) -> ScriptResult<EntityRef> {
        self.bridge.resolve_value(self.host.as_ref(), value)
    }

    /// Handle for an entity, null once it is gone
    pub fn handle(&self, entity: EntityRef) -> ScriptValue {
        self.bridge.to_script(self.host.as_ref(), entity)
    }
}

/// Host failures as seen from a script call
pub(crate) fn host_error(err: HostError) -> ScriptError {
    match err {
        HostError::InvalidEntity(id) => ScriptError::InvalidHandle(format!("entity {}", id.get())),
        HostError::ResourceNotFound(_) => ScriptError::RuntimeError("Resource not found".into()),
        HostError::FileNotFound(_) => ScriptError::RuntimeError("File not found".into()),
        other => ScriptError::RuntimeError(other.to_string()),
    }
}
