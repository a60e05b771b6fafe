use std::sync::Arc;

use shared::{domain::BoatState, protocol::ClientCommand};
use tokio::sync::Mutex;

use crate::interpreter;

/// Handle to the one boat state shared by every session. Clones point at the
/// same value; each transition holds the lock for its whole
/// read-modify-write.
#[derive(Clone)]
pub struct StateStore {
    inner: Arc<Mutex<BoatState>>,
}

impl StateStore {
    pub fn new(initial: BoatState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial)),
        }
    }

    pub async fn get(&self) -> BoatState {
        *self.inner.lock().await
    }

    pub async fn set(&self, next: BoatState) {
        *self.inner.lock().await = next;
    }

    pub async fn reset(&self) -> BoatState {
        let mut guard = self.inner.lock().await;
        guard.reset_motion();
        *guard
    }

    /// Runs `command` through the interpreter and commits the result.
    pub async fn apply(&self, command: &ClientCommand) -> BoatState {
        let mut guard = self.inner.lock().await;
        *guard = interpreter::next_state(*guard, command);
        *guard
    }

    /// Cuts power. Returns whether the boat was powered before the call,
    /// alongside the committed state.
    pub async fn power_off(&self) -> (bool, BoatState) {
        let mut guard = self.inner.lock().await;
        let was_powered = guard.power;
        guard.power = false;
        (was_powered, *guard)
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
