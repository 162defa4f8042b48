//! # In-process Host
//!
//! A complete [`HostRuntime`] kept in memory. Freed entity ids are reused
//! with a bumped generation, so stale references are detected the same way
//! a real server detects them.

use crate::error::{HostError, Result};
use crate::runtime::{HostRuntime, ResourceInfo, ServerInfo};
use asbridge_core::{
    DynamicValue, EntityId, EntityKind, EntityRef, IdGenerator, Vector3f, DEFAULT_DIMENSION,
};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Component, Path};
use std::time::Instant;

/// State of one spawned object
#[derive(Debug, Clone)]
struct EntityRecord {
    entity: EntityRef,
    position: Vector3f,
    rotation: Vector3f,
    dimension: i32,
    model: u32,
    name: String,
    meta: HashMap<String, DynamicValue>,
}

/// Event handed to [`HostRuntime::trigger_local_event`]
#[derive(Debug, Clone, PartialEq)]
pub struct LocalEvent {
    pub name: String,
    pub args: Vec<DynamicValue>,
}

/// Host kept entirely in memory
///
/// # Thread Safety
/// Entities live in a `DashMap`, the remaining state behind `parking_lot` locks.
pub struct MemoryHost {
    entities: DashMap<EntityId, EntityRecord>,
    ids: IdGenerator<u32>,
    /// Freed ids with the generation they had
    free_ids: Mutex<Vec<(EntityId, u32)>>,
    resources: RwLock<HashMap<String, ResourceInfo>>,
    files: RwLock<HashMap<(String, String), Vec<u8>>>,
    local_events: Mutex<Vec<LocalEvent>>,
    password: Mutex<Option<String>>,
    info: ServerInfo,
    started_at: Instant,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::with_server_info(ServerInfo::default())
    }

    pub fn with_server_info(info: ServerInfo) -> Self {
        tracing::debug!("Creating MemoryHost {} ({})", info.version, info.branch);

        Self {
            entities: DashMap::new(),
            ids: IdGenerator::new(),
            free_ids: Mutex::new(Vec::new()),
            resources: RwLock::new(HashMap::new()),
            files: RwLock::new(HashMap::new()),
            local_events: Mutex::new(Vec::new()),
            password: Mutex::new(None),
            info,
            started_at: Instant::now(),
        }
    }

    fn allocate(&self, kind: EntityKind) -> Result<EntityRef> {
        if let Some((id, generation)) = self.free_ids.lock().pop() {
            return Ok(EntityRef::new(id, kind, generation.wrapping_add(1)));
        }
        let id = self.ids.next_id().ok_or(HostError::IdsExhausted)?;
        Ok(EntityRef::new(EntityId::new(id), kind, 1))
    }

    fn spawn(&self, kind: EntityKind, name: String, model: u32, position: Vector3f) -> Result<EntityRef> {
        let entity = self.allocate(kind)?;
        tracing::debug!(
            "Spawning {} {} (generation {})",
            kind.type_name(),
            entity.id.get(),
            entity.generation
        );
        self.entities.insert(
            entity.id,
            EntityRecord {
                entity,
                position,
                rotation: Vector3f::ZERO,
                dimension: DEFAULT_DIMENSION,
                model,
                name,
                meta: HashMap::new(),
            },
        );
        Ok(entity)
    }

    pub fn spawn_player(&self, name: impl Into<String>) -> Result<EntityRef> {
        self.spawn(EntityKind::Player, name.into(), 0, Vector3f::ZERO)
    }

    pub fn spawn_vehicle(&self, model: u32, position: Vector3f) -> Result<EntityRef> {
        self.spawn(EntityKind::Vehicle, String::new(), model, position)
    }

    pub fn spawn_checkpoint(&self, position: Vector3f) -> Result<EntityRef> {
        self.spawn(EntityKind::Checkpoint, String::new(), 0, position)
    }

    /// Destroy an entity; its id becomes available again
    pub fn destroy(&self, entity: EntityRef) -> bool {
        let removed = self
            .entities
            .remove_if(&entity.id, |_, record| record.entity == entity)
            .is_some();
        if removed {
            tracing::debug!("Destroying {} {}", entity.kind.type_name(), entity.id.get());
            self.free_ids.lock().push((entity.id, entity.generation));
        }
        removed
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn add_resource(&self, info: ResourceInfo) {
        tracing::debug!("Adding resource {}", info.name);
        self.resources.write().insert(info.name.clone(), info);
    }

    /// Add an in-memory file to a resource
    pub fn add_file(&self, resource: &str, path: &str, contents: impl Into<Vec<u8>>) {
        self.files
            .write()
            .insert((resource.to_string(), path.to_string()), contents.into());
    }

    /// Drain the custom events triggered so far
    pub fn take_local_events(&self) -> Vec<LocalEvent> {
        std::mem::take(&mut *self.local_events.lock())
    }

    pub fn password(&self) -> Option<String> {
        self.password.lock().clone()
    }

    fn snapshot(&self, filter: impl Fn(EntityKind) -> bool) -> Vec<EntityRef> {
        let mut entities: Vec<_> = self
            .entities
            .iter()
            .map(|entry| entry.entity)
            .filter(|entity| filter(entity.kind))
            .collect();
        entities.sort_by_key(|entity| entity.id);
        entities
    }

    fn with_record<T>(&self, entity: EntityRef, f: impl FnOnce(&EntityRecord) -> T) -> Result<T> {
        match self.entities.get(&entity.id) {
            Some(record) if record.entity == entity => Ok(f(&record)),
            _ => Err(HostError::InvalidEntity(entity.id)),
        }
    }

    fn with_record_mut<T>(
        &self,
        entity: EntityRef,
        f: impl FnOnce(&mut EntityRecord) -> T,
    ) -> Result<T> {
        match self.entities.get_mut(&entity.id) {
            Some(mut record) if record.entity == entity => Ok(f(&mut record)),
            _ => Err(HostError::InvalidEntity(entity.id)),
        }
    }

    fn set_started(&self, name: &str, started: bool) -> Result<()> {
        let mut resources = self.resources.write();
        let resource = resources
            .get_mut(name)
            .ok_or_else(|| HostError::ResourceNotFound(name.to_string()))?;
        resource.started = started;
        tracing::info!(
            "Resource {} {}",
            name,
            if started { "started" } else { "stopped" }
        );
        Ok(())
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Relative path that stays inside its root
fn is_contained(path: &str) -> bool {
    Path::new(path)
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

impl HostRuntime for MemoryHost {
    fn players(&self) -> Vec<EntityRef> {
        self.snapshot(|kind| kind == EntityKind::Player)
    }

    fn vehicles(&self) -> Vec<EntityRef> {
        self.snapshot(|kind| kind == EntityKind::Vehicle)
    }

    fn entities(&self) -> Vec<EntityRef> {
        self.snapshot(|kind| kind.is_entity())
    }

    fn entity(&self, id: EntityId) -> Option<EntityRef> {
        self.entities.get(&id).map(|record| record.entity)
    }

    fn position(&self, entity: EntityRef) -> Result<Vector3f> {
        self.with_record(entity, |record| record.position)
    }

    fn set_position(&self, entity: EntityRef, position: Vector3f) -> Result<()> {
        self.with_record_mut(entity, |record| record.position = position)
    }

    fn dimension(&self, entity: EntityRef) -> Result<i32> {
        self.with_record(entity, |record| record.dimension)
    }

    fn set_dimension(&self, entity: EntityRef, dimension: i32) -> Result<()> {
        self.with_record_mut(entity, |record| record.dimension = dimension)
    }

    fn rotation(&self, entity: EntityRef) -> Result<Vector3f> {
        self.with_record(entity, |record| record.rotation)
    }

    fn set_rotation(&self, entity: EntityRef, rotation: Vector3f) -> Result<()> {
        self.with_record_mut(entity, |record| record.rotation = rotation)
    }

    fn model(&self, entity: EntityRef) -> Result<u32> {
        self.with_record(entity, |record| record.model)
    }

    fn player_name(&self, entity: EntityRef) -> Result<String> {
        self.with_record(entity, |record| record.name.clone())
    }

    fn get_meta(&self, entity: EntityRef, key: &str) -> Result<Option<DynamicValue>> {
        self.with_record(entity, |record| record.meta.get(key).cloned())
    }

    fn set_meta(&self, entity: EntityRef, key: &str, value: DynamicValue) -> Result<()> {
        self.with_record_mut(entity, |record| {
            record.meta.insert(key.to_string(), value);
        })
    }

    fn has_meta(&self, entity: EntityRef, key: &str) -> Result<bool> {
        self.with_record(entity, |record| record.meta.contains_key(key))
    }

    fn delete_meta(&self, entity: EntityRef, key: &str) -> Result<()> {
        self.with_record_mut(entity, |record| {
            record.meta.remove(key);
        })
    }

    fn resource(&self, name: &str) -> Option<ResourceInfo> {
        self.resources.read().get(name).cloned()
    }

    fn start_resource(&self, name: &str) -> Result<()> {
        self.set_started(name, true)
    }

    fn stop_resource(&self, name: &str) -> Result<()> {
        self.set_started(name, false)
    }

    fn restart_resource(&self, name: &str) -> Result<()> {
        self.set_started(name, false)?;
        self.set_started(name, true)
    }

    fn read_file(&self, resource: &str, path: &str) -> Result<Option<Vec<u8>>> {
        if !is_contained(path) {
            return Err(HostError::PathOutsideResource(path.to_string()));
        }
        if let Some(contents) = self
            .files
            .read()
            .get(&(resource.to_string(), path.to_string()))
        {
            return Ok(Some(contents.clone()));
        }

        let root = self
            .resource(resource)
            .ok_or_else(|| HostError::ResourceNotFound(resource.to_string()))?
            .path;
        match std::fs::read(Path::new(&root).join(path)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) => {
                tracing::trace!("Reading {} from {} failed: {}", path, resource, err);
                Ok(None)
            }
        }
    }

    fn server_info(&self) -> ServerInfo {
        self.info.clone()
    }

    fn net_time(&self) -> u32 {
        u32::try_from(self.started_at.elapsed().as_millis()).unwrap_or(u32::MAX)
    }

    fn set_password(&self, password: &str) {
        tracing::info!("Server password changed");
        *self.password.lock() = Some(password.to_string());
    }

    fn trigger_local_event(&self, name: &str, args: Vec<DynamicValue>) {
        tracing::debug!("Local event {} with {} args", name, args.len());
        self.local_events.lock().push(LocalEvent {
            name: name.to_string(),
            args,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(name: &str, path: &str, started: bool) -> ResourceInfo {
        ResourceInfo {
            name: name.to_string(),
            main: "main.as".to_string(),
            path: path.to_string(),
            started,
        }
    }

    #[test]
    fn test_spawn_and_enumerate() {
        let host = MemoryHost::new();
        let a = host.spawn_player("a").unwrap();
        let b = host.spawn_player("b").unwrap();
        let car = host.spawn_vehicle(0xB779_A091, Vector3f::new(1.0, 2.0, 3.0)).unwrap();
        host.spawn_checkpoint(Vector3f::ZERO).unwrap();

        assert_eq!(host.players(), vec![a, b]);
        assert_eq!(host.vehicles(), vec![car]);
        assert_eq!(host.entities().len(), 3);
        assert_eq!(host.entity_count(), 4);
        assert_eq!(host.player_name(b).unwrap(), "b");
        assert_eq!(host.model(car).unwrap(), 0xB779_A091);
    }

    #[test]
    fn test_reused_id_rejects_stale_reference() {
        let host = MemoryHost::new();
        let first = host.spawn_player("first").unwrap();
        assert!(host.destroy(first));
        assert!(!host.destroy(first));

        let second = host.spawn_player("second").unwrap();
        assert_eq!(second.id, first.id);
        assert_ne!(second.generation, first.generation);

        assert!(!host.is_alive(first));
        assert!(host.is_alive(second));
        assert_eq!(
            host.player_name(first),
            Err(HostError::InvalidEntity(first.id))
        );
    }

    #[test]
    fn test_world_state_accessors() {
        let host = MemoryHost::new();
        let player = host.spawn_player("p").unwrap();
        host.set_position(player, Vector3f::new(5.0, 0.0, 1.0)).unwrap();
        host.set_dimension(player, 3).unwrap();
        assert_eq!(host.position(player).unwrap(), Vector3f::new(5.0, 0.0, 1.0));
        assert_eq!(host.dimension(player).unwrap(), 3);

        host.set_meta(player, "team", DynamicValue::from("red")).unwrap();
        assert!(host.has_meta(player, "team").unwrap());
        assert_eq!(
            host.get_meta(player, "team").unwrap(),
            Some(DynamicValue::from("red"))
        );
        host.delete_meta(player, "team").unwrap();
        assert!(!host.has_meta(player, "team").unwrap());
    }

    #[test]
    fn test_resource_lifecycle() {
        let host = MemoryHost::new();
        host.add_resource(resource("race", "resources/race", false));

        host.start_resource("race").unwrap();
        assert!(host.resource("race").unwrap().started);
        host.restart_resource("race").unwrap();
        assert!(host.resource("race").unwrap().started);
        host.stop_resource("race").unwrap();
        assert!(!host.resource("race").unwrap().started);

        assert_eq!(
            host.start_resource("missing"),
            Err(HostError::ResourceNotFound("missing".into()))
        );
        assert_eq!(
            host.resource_exports("race"),
            Err(HostError::Unsupported("resource exports"))
        );
    }

    #[test]
    fn test_read_file_is_sandboxed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.txt"), b"on disk").unwrap();

        let host = MemoryHost::new();
        host.add_resource(resource("race", &dir.path().to_string_lossy(), true));
        host.add_file("race", "memory.txt", "in memory");

        assert_eq!(
            host.read_file("race", "memory.txt").unwrap(),
            Some(b"in memory".to_vec())
        );
        assert_eq!(
            host.read_file("race", "config.txt").unwrap(),
            Some(b"on disk".to_vec())
        );
        assert_eq!(host.read_file("race", "missing.txt").unwrap(), None);
        assert!(matches!(
            host.read_file("race", "../secret"),
            Err(HostError::PathOutsideResource(_))
        ));
    }

    #[test]
    fn test_local_events_and_password() {
        let host = MemoryHost::new();
        host.trigger_local_event("ping", vec![DynamicValue::from(1)]);
        let events = host.take_local_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "ping");
        assert!(host.take_local_events().is_empty());

        host.set_password("secret");
        assert_eq!(host.password().as_deref(), Some("secret"));
        assert_eq!(host.hash("adder"), 0xB779_A091);
    }
}
