//! Single-slot timer that returns the face to neutral after a mood change.

use crate::pet::{Mood, StateStore};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Holds at most one pending reset; arming again cancels the previous one.
pub struct DecayTimer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DecayTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// (Re)start the countdown to neutral
    pub fn arm(&self, store: &StateStore) {
        let store = store.clone();
        let deadline = Instant::now() + self.delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if store.set_mood(Mood::Neutral) {
                debug!("Mood decayed to neutral");
            }
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        if let Some(task) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}

impl Drop for DecayTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
