//! Core type definitions

use serde::{Deserialize, Serialize};

/// Dimension every newly created world object starts in
pub const DEFAULT_DIMENSION: i32 = 0;

/// Dimension visible from every other dimension
pub const GLOBAL_DIMENSION: i32 = i32::MIN;

/// Host entity ID (32-bit unsigned)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Kind of host object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player = 0,
    Vehicle = 1,
    Checkpoint = 6,
}

impl EntityKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Player),
            1 => Some(Self::Vehicle),
            6 => Some(Self::Checkpoint),
            _ => None,
        }
    }

    /// Name of the script type representing this kind
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Player => "Player",
            Self::Vehicle => "Vehicle",
            Self::Checkpoint => "Checkpoint",
        }
    }

    /// Whether objects of this kind are entities (players and vehicles)
    pub fn is_entity(&self) -> bool {
        matches!(self, Self::Player | Self::Vehicle)
    }
}

/// Reference to a host object as seen at a given moment
///
/// The generation distinguishes two objects that happen to share an ID
/// over the lifetime of the host. A reference never keeps the object alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
    pub kind: EntityKind,
    pub generation: u32,
}

impl EntityRef {
    pub const fn new(id: EntityId, kind: EntityKind, generation: u32) -> Self {
        Self { id, kind, generation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [EntityKind::Player, EntityKind::Vehicle, EntityKind::Checkpoint] {
            assert_eq!(EntityKind::from_u8(kind as u8), Some(kind));
        }
        assert_eq!(EntityKind::from_u8(3), None);
    }

    #[test]
    fn test_entity_kinds() {
        assert!(EntityKind::Player.is_entity());
        assert!(!EntityKind::Checkpoint.is_entity());
        assert_eq!(EntityKind::Vehicle.type_name(), "Vehicle");
    }
}
