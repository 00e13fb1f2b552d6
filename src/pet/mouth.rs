//! Flaps the mouth while the pet is speaking.

use crate::pet::StateStore;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spawn the animator. It runs until the returned handle is aborted.
pub fn spawn_mouth_animator(store: StateStore, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rx = store.subscribe();
        loop {
            if rx.wait_for(|s| s.speaking).await.is_err() {
                return;
            }

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        store.update(|s| {
                            if !s.speaking {
                                return false;
                            }
                            s.mouth_open = !s.mouth_open;
                            true
                        });
                    }
                    changed = rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        if !rx.borrow_and_update().speaking {
                            break;
                        }
                    }
                }
            }

            store.update(|s| std::mem::replace(&mut s.mouth_open, false));
        }
    })
}
