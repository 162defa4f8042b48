//! Monotonic ID generation

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe generator handing out strictly increasing IDs
///
/// IDs start at 1; 0 is left free as a "no id" marker for script code.
/// Values that do not fit into `T` are skipped, so an issued ID is never
/// handed out twice by the same generator.
pub struct IdGenerator<T: TryFrom<u64>> {
    next_id: AtomicU64,
    phantom: PhantomData<fn() -> T>,
}

impl<T: TryFrom<u64>> IdGenerator<T> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            phantom: PhantomData,
        }
    }

    /// Get the next available ID
    ///
    /// Returns `None` once the ID space of `T` is exhausted.
    pub fn next_id(&self) -> Option<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        T::try_from(id).ok()
    }

    /// Number of IDs issued so far
    pub fn issued(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed) - 1
    }
}

impl<T: TryFrom<u64>> Default for IdGenerator<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generation() {
        let gen = IdGenerator::<u32>::new();
        let id1 = gen.next_id().unwrap();
        let id2 = gen.next_id().unwrap();
        assert_eq!(id1, 1);
        assert!(id2 > id1);
        assert_eq!(gen.issued(), 2);
    }

    #[test]
    fn test_exhausted_space() {
        let gen = IdGenerator::<u8>::new();
        for _ in 0..255 {
            assert!(gen.next_id().is_some());
        }
        assert!(gen.next_id().is_none());
    }
}
