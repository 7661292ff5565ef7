//! Image cache facade with timed expiry sweeps

use super::expiry::ExpiryPolicy;
use super::store::{CacheStore, LruStore};
use crate::config::CacheConfig;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

struct CacheState {
    store: Box<dyn CacheStore>,
    inserted_at: HashMap<String, Instant>,
}

impl CacheState {
    /// Drop `key` if the policy says it has expired. Returns true if it was dropped.
    fn purge_if_expired(&mut self, key: &str, policy: &ExpiryPolicy, now: Instant) -> bool {
        match self.inserted_at.get(key) {
            Some(inserted) if policy.is_expired(*inserted, now) => {
                self.inserted_at.remove(key);
                self.store.remove(key);
                true
            }
            _ => false,
        }
    }
}

/// Resized images keyed by cache key
pub struct ImageCache {
    state: Mutex<CacheState>,
    policy: ExpiryPolicy,
    sweep_interval: Duration,
}

impl ImageCache {
    pub fn new(store: Box<dyn CacheStore>, policy: ExpiryPolicy, sweep_interval: Duration) -> Self {
        Self {
            state: Mutex::new(CacheState {
                store,
                inserted_at: HashMap::new(),
            }),
            policy,
            sweep_interval,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            Box::new(LruStore::new(config.capacity)),
            ExpiryPolicy::new(config.ttl),
            config.sweep_interval,
        )
    }

    pub async fn contains(&self, key: &str) -> bool {
        let mut state = self.state.lock().await;
        if state.purge_if_expired(key, &self.policy, Instant::now()) {
            debug!("Expired on access: {}", key);
            return false;
        }
        state.store.contains(key)
    }

    pub async fn get(&self, key: &str) -> Option<Bytes> {
        let mut state = self.state.lock().await;
        if state.purge_if_expired(key, &self.policy, Instant::now()) {
            debug!("Expired on access: {}", key);
            return None;
        }
        state.store.get(key)
    }

    /// Insert a resized image and start its expiry clock
    pub async fn add(&self, key: String, value: Bytes) {
        let mut state = self.state.lock().await;
        if let Some(evicted) = state.store.add(key.clone(), value) {
            debug!("Evicted least recently used entry: {}", evicted);
            state.inserted_at.remove(&evicted);
        }
        state.inserted_at.insert(key, Instant::now());
    }

    pub async fn remove(&self, key: &str) -> bool {
        let mut state = self.state.lock().await;
        state.inserted_at.remove(key);
        state.store.remove(key)
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.store.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove every expired entry; returns how many were removed
    pub async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut state = self.state.lock().await;

        let expired: Vec<String> = state
            .inserted_at
            .iter()
            .filter(|(_, inserted)| self.policy.is_expired(**inserted, now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            state.inserted_at.remove(key);
            // Already gone if capacity evicted it first
            state.store.remove(key);
        }

        expired.len()
    }

    /// Periodic expiry loop, runs until cancelled
    pub async fn run_expiry_sweep(self: Arc<Self>, cancellation_token: CancellationToken) {
        info!(
            "Starting cache expiry sweep (ttl: {:?}, interval: {:?})",
            self.policy.ttl(),
            self.sweep_interval
        );
        let mut ticker = interval(self.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    info!("Cache expiry sweep received cancellation signal");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = self.sweep_expired().await;
                    if removed > 0 {
                        debug!("Expired {} cached images", removed);
                    }
                }
            }
        }

        info!("Cache expiry sweep stopped");
    }
}
