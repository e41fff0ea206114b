//! Per-key trailing-edge debouncer.
//!
//! `schedule` arms (or re-arms) a timer for a key. When the timer expires
//! the last value scheduled for that key is handed to the sink, tagged with
//! a version that increases with every `schedule` call for the key.
//!
//! A send that has already started is never cancelled. Re-arming after the
//! timer fired starts a fresh timer and a second send.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Receiver of debounced values.
pub trait SaveSink<K, V>: Send + Sync + 'static {
    fn send(&self, key: K, version: u64, value: V) -> impl Future<Output = ()> + Send;
}

struct Pending<V> {
    /// Identifies the timer task that owns this entry.
    generation: u64,
    version: u64,
    value: V,
    handle: JoinHandle<()>,
}

struct State<K, V> {
    pending: HashMap<K, Pending<V>>,
    versions: HashMap<K, u64>,
    generation: u64,
}

pub struct Debouncer<K, V, S> {
    delay: Duration,
    sink: Arc<S>,
    state: Arc<Mutex<State<K, V>>>,
}

fn lock<K, V>(state: &Mutex<State<K, V>>) -> MutexGuard<'_, State<K, V>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<K, V, S> Debouncer<K, V, S>
where
    K: Clone + Eq + Hash + Send + std::fmt::Debug + 'static,
    V: Send + 'static,
    S: SaveSink<K, V>,
{
    pub fn new(delay: Duration, sink: Arc<S>) -> Self {
        Self {
            delay,
            sink,
            state: Arc::new(Mutex::new(State {
                pending: HashMap::new(),
                versions: HashMap::new(),
                generation: 0,
            })),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm the timer for `key` with `value`, replacing any value still
    /// waiting for that key. Returns the version the value will be sent with.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&self, key: K, value: V) -> u64 {
        let mut state = lock(&self.state);
        state.generation += 1;
        let generation = state.generation;
        let version = {
            let v = state.versions.entry(key.clone()).or_insert(0);
            *v += 1;
            *v
        };

        // Entries still in the map have not fired yet.
        if let Some(previous) = state.pending.remove(&key) {
            previous.handle.abort();
        }

        let handle = tokio::spawn({
            let key = key.clone();
            let delay = self.delay;
            let sink = Arc::clone(&self.sink);
            let shared = Arc::clone(&self.state);
            async move {
                tokio::time::sleep(delay).await;
                let fired = {
                    let mut state = lock(&shared);
                    match state.pending.get(&key) {
                        Some(p) if p.generation == generation => state.pending.remove(&key),
                        _ => None,
                    }
                };
                if let Some(p) = fired {
                    log::debug!("debounce fired for {key:?} v{}", p.version);
                    sink.send(key, p.version, p.value).await;
                }
            }
        });

        log::debug!("debounce armed for {key:?} v{version}");
        state.pending.insert(
            key,
            Pending {
                generation,
                version,
                value,
                handle,
            },
        );
        version
    }

    /// Send every waiting value now instead of at its deadline.
    /// Returns how many values were sent.
    pub async fn flush(&self) -> usize {
        let drained: Vec<(K, Pending<V>)> = lock(&self.state).pending.drain().collect();
        let count = drained.len();
        for (key, p) in drained {
            p.handle.abort();
            self.sink.send(key, p.version, p.value).await;
        }
        count
    }

    /// Drop the value waiting for `key`. A send already under way is not
    /// affected. Returns whether anything was dropped.
    pub fn cancel(&self, key: &K) -> bool {
        match lock(&self.state).pending.remove(key) {
            Some(p) => {
                p.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Number of keys with an armed timer.
    pub fn pending(&self) -> usize {
        lock(&self.state).pending.len()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        lock(&self.state).pending.contains_key(key)
    }

    /// Continue numbering `key` after `version`. Never lowers a version
    /// already handed out.
    pub fn prime(&self, key: K, version: u64) {
        let mut state = lock(&self.state);
        let v = state.versions.entry(key).or_insert(0);
        *v = (*v).max(version);
    }

    /// Last version handed out for `key`, 0 if never scheduled.
    pub fn version(&self, key: &K) -> u64 {
        lock(&self.state).versions.get(key).copied().unwrap_or(0)
    }
}
