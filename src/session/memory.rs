//! In-process session store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, ExpiredDeletion};
use tower_sessions::SessionStore;

const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Sessions held in a concurrent map inside this process.
///
/// Expired records are never returned by `load`. They are dropped from the
/// map by a sweep that runs on write, at most once per sweep interval, so
/// sessions whose cookie is gone do not pile up.
#[derive(Debug)]
pub struct MemoryStore {
    records: DashMap<Id, Record>,
    sweep_interval: Duration,
    started: Instant,
    last_sweep_ms: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_SWEEP_INTERVAL)
    }
}

impl MemoryStore {
    pub fn new(sweep_interval: Duration) -> Self {
        Self {
            records: DashMap::new(),
            sweep_interval,
            started: Instant::now(),
            last_sweep_ms: AtomicU64::new(0),
        }
    }

    /// Number of records held, expired ones not yet swept included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every expired record, returning how many were removed.
    fn sweep(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        let before = self.records.len();
        self.records.retain(|_, record| is_active(record, now));
        let removed = before.saturating_sub(self.records.len());
        if removed > 0 {
            tracing::debug!(removed, remaining = self.records.len(), "Swept expired sessions");
        }
        removed
    }

    fn sweep_if_due(&self) {
        let now_ms = self.started.elapsed().as_millis() as u64;
        let last = self.last_sweep_ms.load(Ordering::Relaxed);
        if now_ms.saturating_sub(last) < self.sweep_interval.as_millis() as u64 {
            return;
        }
        // Only the writer that wins the exchange sweeps.
        if self
            .last_sweep_ms
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
        {
            self.sweep();
        }
    }
}

fn is_active(record: &Record, now: OffsetDateTime) -> bool {
    record.expiry_date > now
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        self.sweep_if_due();
        loop {
            match self.records.entry(record.id) {
                Entry::Occupied(_) => record.id = Id::default(),
                Entry::Vacant(slot) => {
                    slot.insert(record.clone());
                    return Ok(());
                }
            }
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.sweep_if_due();
        self.records.insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        let now = OffsetDateTime::now_utc();
        Ok(self
            .records
            .get(id)
            .filter(|record| is_active(record, now))
            .map(|record| record.value().clone()))
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        self.records.remove(id);
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for MemoryStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        self.sweep();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(ttl: time::Duration) -> Record {
        Record {
            id: Id::default(),
            data: HashMap::new(),
            expiry_date: OffsetDateTime::now_utc() + ttl,
        }
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = MemoryStore::default();
        let record = record(time::Duration::minutes(5));

        assert!(store.load(&record.id).await.unwrap().is_none());
        store.save(&record).await.unwrap();
        assert_eq!(store.load(&record.id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_expired_record_is_not_loaded() {
        let store = MemoryStore::default();
        let record = record(time::Duration::ZERO);
        store.save(&record).await.unwrap();

        assert!(store.load(&record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_avoids_id_collision() {
        let store = MemoryStore::default();
        let mut first = record(time::Duration::minutes(5));
        let mut second = record(time::Duration::minutes(5));
        second.id = first.id;

        store.create(&mut first).await.unwrap();
        store.create(&mut second).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_expired_records_reclaimed_on_write() {
        let store = MemoryStore::new(Duration::ZERO);
        for _ in 0..1000 {
            store.save(&record(time::Duration::ZERO)).await.unwrap();
        }
        let mut live = record(time::Duration::minutes(5));
        store.create(&mut live).await.unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.load(&live.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sweep_waits_for_interval() {
        let store = MemoryStore::new(Duration::from_secs(3600));
        for _ in 0..10 {
            store.save(&record(time::Duration::ZERO)).await.unwrap();
        }
        assert_eq!(store.len(), 10);

        store.delete_expired().await.unwrap();
        assert!(store.is_empty());
    }
}
