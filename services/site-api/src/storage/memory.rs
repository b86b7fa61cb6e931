use chrono::Utc;
use dashmap::DashMap;

use super::error::StorageError;
use super::repository::{Collection, ConsumeOutcome, QuotaRecord, QuotaRepository};

/// Process-local store for development and tests. Records are lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<(Collection, String), QuotaRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl QuotaRepository for MemoryStore {
    fn connect(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn find(
        &self,
        collection: Collection,
        identity: &str,
    ) -> Result<Option<QuotaRecord>, StorageError> {
        Ok(self
            .records
            .get(&(collection, identity.to_string()))
            .map(|record| record.clone()))
    }

    fn consume(
        &self,
        collection: Collection,
        identity: &str,
        default_allowance: u32,
    ) -> Result<ConsumeOutcome, StorageError> {
        let key = (collection, identity.to_string());

        // The entry guard holds the shard lock, so lookup and decrement are atomic.
        let outcome = match self.records.entry(key) {
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let record = QuotaRecord::new(identity, default_allowance);
                slot.insert(record.clone());
                ConsumeOutcome::Created(record)
            }
            dashmap::mapref::entry::Entry::Occupied(mut slot) => {
                let record = slot.get_mut();
                if record.is_privileged {
                    ConsumeOutcome::Privileged(record.clone())
                } else if record.remaining > 0 {
                    record.remaining -= 1;
                    record.updated_at = Utc::now();
                    ConsumeOutcome::Consumed(record.clone())
                } else {
                    ConsumeOutcome::Exhausted(record.clone())
                }
            }
        };
        Ok(outcome)
    }

    fn set_privileged(
        &self,
        collection: Collection,
        identity: &str,
        privileged: bool,
        default_allowance: u32,
    ) -> Result<QuotaRecord, StorageError> {
        let mut record = self
            .records
            .entry((collection, identity.to_string()))
            .or_insert_with(|| QuotaRecord::new(identity, default_allowance));
        record.is_privileged = privileged;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_consume_creates_without_deducting() {
        let store = MemoryStore::new();
        let outcome = store.consume(Collection::Customers, "203.0.113.5", 5).unwrap();

        assert!(matches!(outcome, ConsumeOutcome::Created(ref r) if r.remaining == 5));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn exhausted_record_is_not_mutated() {
        let store = MemoryStore::new();
        store.consume(Collection::Users, "10.1.1.1", 1).unwrap();
        store.consume(Collection::Users, "10.1.1.1", 1).unwrap();

        let before = store.find(Collection::Users, "10.1.1.1").unwrap().unwrap();
        let outcome = store.consume(Collection::Users, "10.1.1.1", 1).unwrap();
        let after = store.find(Collection::Users, "10.1.1.1").unwrap().unwrap();

        assert!(matches!(outcome, ConsumeOutcome::Exhausted(_)));
        assert_eq!(before, after);
    }

    #[test]
    fn concurrent_consumers_never_overdraw() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store.consume(Collection::Customers, "10.9.9.9", 50).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        store.consume(Collection::Customers, "10.9.9.9", 50).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("consumer thread panicked");
        }

        let record = store.find(Collection::Customers, "10.9.9.9").unwrap().unwrap();
        assert_eq!(record.remaining, 0);
    }
}
