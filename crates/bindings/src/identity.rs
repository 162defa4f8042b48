//! # Object Identity Bridge
//!
//! Maps host entities to script handles. Handles never keep an entity alive;
//! the host is asked for liveness on every resolve. While any handle to an
//! entity exists, every lookup of that entity yields the same instance.

use asbridge_core::{EntityId, EntityKind, EntityRef};
use asbridge_host::HostRuntime;
use asbridge_scripting::{
    ObjectHandle, ScriptArray, ScriptError, ScriptResult, ScriptType, ScriptValue, WeakHandle,
};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Whether instances of `kind` can be stored in a `type_name@` slot
pub fn kind_matches(type_name: &str, kind: EntityKind) -> bool {
    match type_name {
        "BaseObject" | "WorldObject" => true,
        "Entity" => kind.is_entity(),
        other => other == kind.type_name(),
    }
}

/// Cache of live script handles keyed by entity id
#[derive(Default)]
pub struct IdentityBridge {
    handles: Mutex<HashMap<EntityId, WeakHandle>>,
}

impl IdentityBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for a live entity, `None` when the host no longer knows it
    pub fn handle_for(&self, host: &dyn HostRuntime, entity: EntityRef) -> Option<ObjectHandle> {
        if !host.is_alive(entity) {
            return None;
        }

        let mut handles = self.handles.lock();
        if let Some(handle) = handles.get(&entity.id).and_then(WeakHandle::upgrade) {
            if handle.entity() == entity {
                return Some(handle);
            }
        }

        let handle = ObjectHandle::new(entity.kind.type_name(), entity);
        handles.insert(entity.id, handle.downgrade());
        Some(handle)
    }

    /// Script value for an entity: a handle, or null once it is gone
    pub fn to_script(&self, host: &dyn HostRuntime, entity: EntityRef) -> ScriptValue {
        self.handle_for(host, entity).into()
    }

    /// Entity behind a handle, failing once the host destroyed it
    pub fn resolve(&self, host: &dyn HostRuntime, handle: &ObjectHandle) -> ScriptResult<EntityRef> {
        let entity = handle.entity();
        if host.is_alive(entity) {
            Ok(entity)
        } else {
            Err(ScriptError::InvalidHandle(format!(
                "{} {}",
                handle.type_name(),
                entity.id.get()
            )))
        }
    }

    /// Entity behind a handle-typed script value
    pub fn resolve_value(&self, host: &dyn HostRuntime, value: &ScriptValue) -> ScriptResult<EntityRef> {
        match value {
            ScriptValue::Handle(handle) => self.resolve(host, handle),
            ScriptValue::Any(inner) => self.resolve_value(host, inner),
            ScriptValue::Null => Err(ScriptError::NullHandle),
            other => Err(ScriptError::TypeMismatch {
                expected: "handle".into(),
                found: other.type_name(),
            }),
        }
    }

    /// `array<element@>` holding one slot per entity, in host order
    pub fn snapshot(&self, host: &dyn HostRuntime, entities: Vec<EntityRef>, element: &str) -> ScriptValue {
        let items = entities
            .into_iter()
            .map(|entity| self.to_script(host, entity))
            .collect();
        ScriptValue::Array(ScriptArray::with_items(
            ScriptType::Handle(element.to_string()),
            items,
        ))
    }

    /// Drop cache entries whose handles were all released
    pub fn purge(&self) -> usize {
        let mut handles = self.handles.lock();
        let before = handles.len();
        handles.retain(|_, handle| handle.upgrade().is_some());
        before - handles.len()
    }

    pub fn cached(&self) -> usize {
        self.handles.lock().len()
    }
}
