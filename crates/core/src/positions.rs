//! Position types for world objects

use serde::{Deserialize, Serialize};

/// Three component float vector used for positions and rotations
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3f {
    pub const ZERO: Vector3f = Vector3f::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Calculate distance to another position
    pub fn distance_to(self, other: Vector3f) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl From<[f32; 3]> for Vector3f {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_calculation() {
        let pos1 = Vector3f::ZERO;
        let pos2 = Vector3f::new(2.0, 3.0, 6.0);
        let dist = pos1.distance_to(pos2);
        assert!((dist - 7.0).abs() < 0.001);
    }

    #[test]
    fn test_from_array() {
        assert_eq!(Vector3f::from([1.0, 2.0, 3.0]), Vector3f::new(1.0, 2.0, 3.0));
    }
}
