//! # Script Timers
//!
//! Timeouts, intervals and tick handlers. A timer with interval 0 fires on
//! every tick (repeating) or on the next tick (one-shot). Timers fire only
//! from [`TimerManager::tick`], which the host drives.

use asbridge_core::IdGenerator;
use asbridge_scripting::{ScriptError, ScriptFunction, ScriptResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Unique identifier for a timer, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u32);

impl TimerId {
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl From<u32> for TimerId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Timer {
    callback: ScriptFunction,
    interval: Duration,
    repeat: bool,
    next_fire: Instant,
}

/// Timers of one runtime
pub struct TimerManager {
    timers: Mutex<HashMap<TimerId, Timer>>,
    ids: IdGenerator<u32>,
}

impl TimerManager {
    pub fn new() -> Self {
        Self {
            timers: Mutex::new(HashMap::new()),
            ids: IdGenerator::new(),
        }
    }

    /// Schedule `callback` to fire `interval_ms` after `now`
    pub fn create(
        &self,
        callback: ScriptFunction,
        interval_ms: u32,
        repeat: bool,
        now: Instant,
    ) -> ScriptResult<TimerId> {
        let id = self
            .ids
            .next_id()
            .map(TimerId)
            .ok_or_else(|| ScriptError::RuntimeError("Timer ids exhausted".into()))?;
        let interval = Duration::from_millis(interval_ms as u64);

        tracing::debug!(
            "Creating timer {} (interval {}ms, repeat {})",
            id,
            interval_ms,
            repeat
        );
        self.timers.lock().insert(
            id,
            Timer {
                callback,
                interval,
                repeat,
                next_fire: now + interval,
            },
        );
        Ok(id)
    }

    /// Cancel a timer; unknown ids are ignored
    pub fn cancel(&self, id: TimerId) -> bool {
        let removed = self.timers.lock().remove(&id).is_some();
        if removed {
            tracing::debug!("Cancelled timer {}", id);
        }
        removed
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.lock().contains_key(&id)
    }

    pub fn active_count(&self) -> usize {
        self.timers.lock().len()
    }

    /// Fire every timer due at `now`, returning how many fired
    ///
    /// Timers created by a callback wait for the next tick. A timer
    /// cancelled by an earlier callback of the same tick does not fire.
    pub fn tick(&self, now: Instant) -> usize {
        let mut due: Vec<TimerId> = self
            .timers
            .lock()
            .iter()
            .filter(|(_, timer)| now >= timer.next_fire)
            .map(|(id, _)| *id)
            .collect();
        due.sort();

        let mut fired = 0;
        for id in due {
            let callback = {
                let mut timers = self.timers.lock();
                let Some(timer) = timers.get_mut(&id) else {
                    continue;
                };
                let callback = timer.callback.clone();
                if timer.repeat {
                    timer.next_fire = now + timer.interval;
                } else {
                    timers.remove(&id);
                }
                callback
            };

            if let Err(err) = callback.invoke(&[]) {
                tracing::error!(target: "script", "Timer {} callback failed: {}", id, err);
            }
            fired += 1;
        }
        fired
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}
