//! # Event Handlers
//!
//! Custom events travel on two channels: local events raised on this server
//! and remote events sent by clients. Both keep their handlers in
//! registration order per event name. Host lifecycle events use the same
//! shape keyed by [`HostEventKind`].

use asbridge_core::EntityRef;
use asbridge_scripting::ScriptFunction;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;

/// Lifecycle events raised by the host
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    PlayerConnect { player: EntityRef },
    PlayerDisconnect { player: EntityRef, reason: String },
    ResourceStart { resource: String },
    ResourceStop { resource: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEventKind {
    PlayerConnect,
    PlayerDisconnect,
    ResourceStart,
    ResourceStop,
}

impl HostEvent {
    pub fn kind(&self) -> HostEventKind {
        match self {
            Self::PlayerConnect { .. } => HostEventKind::PlayerConnect,
            Self::PlayerDisconnect { .. } => HostEventKind::PlayerDisconnect,
            Self::ResourceStart { .. } => HostEventKind::ResourceStart,
            Self::ResourceStop { .. } => HostEventKind::ResourceStop,
        }
    }
}

/// Ordered handler lists keyed by event
pub struct HandlerMap<K> {
    handlers: RwLock<HashMap<K, Vec<ScriptFunction>>>,
}

impl<K: Eq + Hash> HandlerMap<K> {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    pub fn add(&self, key: K, handler: ScriptFunction) {
        self.handlers.write().entry(key).or_default().push(handler);
    }

    /// Handlers registered for `key` at call time
    pub fn snapshot<Q>(&self, key: &Q) -> Vec<ScriptFunction>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.handlers.read().get(key).cloned().unwrap_or_default()
    }

    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.handlers.read().get(key).map_or(0, Vec::len)
    }
}

impl<K: Eq + Hash> Default for HandlerMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// All event handlers of one runtime
#[derive(Default)]
pub struct EventRegistry {
    pub local: HandlerMap<String>,
    pub remote: HandlerMap<String>,
    pub host: HandlerMap<HostEventKind>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}
