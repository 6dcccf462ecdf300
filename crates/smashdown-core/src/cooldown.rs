use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

/// Per-ability cooldown expiries measured against the virtual clock.
///
/// An ability is ready when it has never been used or the clock has moved
/// strictly past its expiry.
#[derive(Debug, Clone)]
pub struct Cooldowns<K> {
    expiries: HashMap<K, Duration>,
}

impl<K: Copy + Eq + Hash> Cooldowns<K> {
    pub fn new() -> Self {
        Self {
            expiries: HashMap::new(),
        }
    }

    pub fn is_ready(&self, key: K, now: Duration) -> bool {
        self.expiries.get(&key).is_none_or(|&at| now > at)
    }

    /// Start the cooldown for `key`, replacing any earlier expiry.
    pub fn trigger(&mut self, key: K, now: Duration, length: Duration) {
        self.expiries.insert(key, now.saturating_add(length));
    }

    /// Time left until `key` is ready again (zero when ready).
    pub fn remaining(&self, key: K, now: Duration) -> Duration {
        self.expiries
            .get(&key)
            .map_or(Duration::ZERO, |&at| at.saturating_sub(now))
    }

    pub fn clear(&mut self) {
        self.expiries.clear();
    }
}

impl<K: Copy + Eq + Hash> Default for Cooldowns<K> {
    fn default() -> Self {
        Self::new()
    }
}
