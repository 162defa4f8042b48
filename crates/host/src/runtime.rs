//! # Host Runtime Interface
//!
//! Everything the bindings need from the game server. Entity accessors take
//! an [`EntityRef`] and fail with [`HostError::InvalidEntity`] once the
//! entity behind it is gone, so a stale reference can never reach a
//! different entity that reused the id.

use crate::error::{HostError, Result};
use asbridge_core::{DynamicDict, DynamicValue, EntityId, EntityRef, Vector3f};
use serde::{Deserialize, Serialize};

/// A resource known to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    pub name: String,
    /// Entry point file, relative to `path`
    pub main: String,
    pub path: String,
    pub started: bool,
}

/// Static server metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub version: String,
    pub branch: String,
    pub sdk_version: u32,
    pub root_dir: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            branch: "dev".to_string(),
            sdk_version: 1,
            root_dir: ".".to_string(),
        }
    }
}

/// Host side of the bridge
pub trait HostRuntime: Send + Sync {
    // Enumeration, snapshots at call time
    fn players(&self) -> Vec<EntityRef>;
    fn vehicles(&self) -> Vec<EntityRef>;
    /// Players and vehicles
    fn entities(&self) -> Vec<EntityRef>;

    /// Current reference for `id`, `None` once destroyed
    fn entity(&self, id: EntityId) -> Option<EntityRef>;

    fn is_alive(&self, entity: EntityRef) -> bool {
        self.entity(entity.id) == Some(entity)
    }

    fn position(&self, entity: EntityRef) -> Result<Vector3f>;
    fn set_position(&self, entity: EntityRef, position: Vector3f) -> Result<()>;
    fn dimension(&self, entity: EntityRef) -> Result<i32>;
    fn set_dimension(&self, entity: EntityRef, dimension: i32) -> Result<()>;
    fn rotation(&self, entity: EntityRef) -> Result<Vector3f>;
    fn set_rotation(&self, entity: EntityRef, rotation: Vector3f) -> Result<()>;
    fn model(&self, entity: EntityRef) -> Result<u32>;
    fn player_name(&self, entity: EntityRef) -> Result<String>;

    // Meta data attached to any object
    fn get_meta(&self, entity: EntityRef, key: &str) -> Result<Option<DynamicValue>>;
    fn set_meta(&self, entity: EntityRef, key: &str, value: DynamicValue) -> Result<()>;
    fn has_meta(&self, entity: EntityRef, key: &str) -> Result<bool>;
    fn delete_meta(&self, entity: EntityRef, key: &str) -> Result<()>;

    fn resource(&self, name: &str) -> Option<ResourceInfo>;
    fn start_resource(&self, name: &str) -> Result<()>;
    fn stop_resource(&self, name: &str) -> Result<()>;
    fn restart_resource(&self, name: &str) -> Result<()>;

    /// Values exported by a started resource
    fn resource_exports(&self, _name: &str) -> Result<DynamicDict> {
        Err(HostError::Unsupported("resource exports"))
    }

    /// Read a file of `resource`, `None` when it does not exist
    fn read_file(&self, resource: &str, path: &str) -> Result<Option<Vec<u8>>>;

    fn server_info(&self) -> ServerInfo;
    /// Milliseconds since the server started
    fn net_time(&self) -> u32;
    fn set_password(&self, password: &str);

    fn hash(&self, value: &str) -> u32 {
        crate::hash::joaat(value)
    }

    /// Deliver a custom event to every resource of this server
    fn trigger_local_event(&self, name: &str, args: Vec<DynamicValue>);
}
