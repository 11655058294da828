// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-air-quality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Last successful poll, served while a failing sensor recovers

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::sensor::Reading;

/// Readings of one successful poll.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedReadings {
    pub readings: Vec<Reading>,
    pub taken_at: DateTime<Utc>,
}

/// Single-entry cache with a maximum age.
#[derive(Debug, Clone)]
pub struct ReadingCache {
    max_age: Duration,
    entry: Option<CachedReadings>,
}

impl ReadingCache {
    pub fn new(max_age: Duration) -> Self {
        Self {
            max_age,
            entry: None,
        }
    }

    /// Replace the cached entry.
    pub fn store(&mut self, readings: Vec<Reading>, taken_at: DateTime<Utc>) {
        self.entry = Some(CachedReadings { readings, taken_at });
    }

    /// The cached entry, if it is not older than the maximum age at `now`.
    ///
    /// An entry stamped in the future counts as fresh.
    pub fn lookup(&self, now: DateTime<Utc>) -> Option<&CachedReadings> {
        let entry = self.entry.as_ref()?;
        let age = (now - entry.taken_at).to_std().unwrap_or(Duration::ZERO);
        (age <= self.max_age).then_some(entry)
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::Parameter;
    use chrono::TimeDelta;

    fn readings() -> Vec<Reading> {
        vec![Reading::from_raw(Parameter::Pm2_5, Some(8))]
    }

    #[test]
    fn empty_cache_serves_nothing() {
        let cache = ReadingCache::new(Duration::from_secs(300));
        assert!(cache.lookup(Utc::now()).is_none());
    }

    #[test]
    fn entry_expires_after_max_age() {
        let mut cache = ReadingCache::new(Duration::from_secs(300));
        let taken_at = Utc::now();
        cache.store(readings(), taken_at);

        assert!(cache.lookup(taken_at + TimeDelta::seconds(299)).is_some());
        assert!(cache.lookup(taken_at + TimeDelta::seconds(300)).is_some());
        assert!(cache.lookup(taken_at + TimeDelta::seconds(301)).is_none());
    }

    #[test]
    fn store_replaces_previous_entry() {
        let mut cache = ReadingCache::new(Duration::from_secs(60));
        let first = Utc::now();
        cache.store(readings(), first);
        let second = first + TimeDelta::seconds(30);
        cache.store(vec![], second);

        let entry = cache.lookup(second).unwrap();
        assert_eq!(entry.taken_at, second);
        assert!(entry.readings.is_empty());

        cache.clear();
        assert!(cache.lookup(second).is_none());
    }
}
