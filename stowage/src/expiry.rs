use serde::{Deserialize, Serialize};

/// One pending expiration: the logical (unprefixed) key and the epoch
/// millisecond after which it should no longer be visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryRecord {
    pub key: String,
    pub timestamp: u64,
}

/// A sequence of [`ExpiryRecord`], kept non-decreasing by timestamp.
///
/// The ordering is what makes the sweep cheap: expired records are always a
/// prefix of the sequence, so splitting them off is a binary search instead
/// of a scan. Both mutators below preserve it.
///
/// Records are not deduplicated: calling expire twice on the same key leaves
/// two records behind, and the earlier one wins once its timestamp passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpiryIndex(Vec<ExpiryRecord>);

impl ExpiryIndex {
    /// Insert a record at the position keeping the sequence sorted.
    ///
    /// Lower-bound search, a record with an already present timestamp lands
    /// before its equals.
    pub fn insert(&mut self, record: ExpiryRecord) {
        let at = self.0.partition_point(|r| r.timestamp < record.timestamp);
        self.0.insert(at, record);
    }

    /// Split off and return every record due at `now`, keeping the rest.
    pub fn take_expired(&mut self, now: u64) -> Vec<ExpiryRecord> {
        let due = self.0.partition_point(|r| r.timestamp <= now);
        self.0.drain(..due).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn records(&self) -> &[ExpiryRecord] {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(key: &str, timestamp: u64) -> ExpiryRecord {
        ExpiryRecord {
            key: key.to_owned(),
            timestamp,
        }
    }

    fn is_sorted(index: &ExpiryIndex) -> bool {
        index
            .records()
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp)
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut index = ExpiryIndex::default();
        for &ts in &[50u64, 10, 30, 20, 40, 15] {
            index.insert(record("key", ts));
            assert!(is_sorted(&index));
        }
        assert_eq!(index.len(), 6);
    }

    #[test]
    fn test_insert_keeps_duplicates() {
        let mut index = ExpiryIndex::default();
        index.insert(record("key", 10));
        index.insert(record("key", 20));
        index.insert(record("key", 10));

        // Two records for the same key and timestamp both stay
        assert_eq!(index.len(), 3);
        assert!(is_sorted(&index));
    }

    #[test]
    fn test_take_expired_splits_prefix() {
        let mut index = ExpiryIndex::default();
        index.insert(record("a", 10));
        index.insert(record("b", 20));
        index.insert(record("c", 30));

        let expired = index.take_expired(20);
        assert_eq!(expired, vec![record("a", 10), record("b", 20)]);
        assert_eq!(index.records(), &[record("c", 30)]);
    }

    #[test]
    fn test_take_expired_none_due() {
        let mut index = ExpiryIndex::default();
        index.insert(record("a", 10));

        assert!(index.take_expired(9).is_empty());
        assert_eq!(index.len(), 1);

        assert!(ExpiryIndex::default().take_expired(u64::MAX).is_empty());
    }

    #[test]
    fn test_take_expired_drains_everything() {
        let mut index = ExpiryIndex::default();
        index.insert(record("a", 10));
        index.insert(record("b", 20));

        let expired = index.take_expired(u64::MAX);
        assert_eq!(expired.len(), 2);
        assert!(index.is_empty());
    }

    #[test]
    fn test_serde_transparent() {
        let mut index = ExpiryIndex::default();
        index.insert(record("a", 10));

        let json = serde_json::to_string(&index).unwrap();
        assert_eq!(json, r#"[{"key":"a","timestamp":10}]"#);
        assert_eq!(serde_json::from_str::<ExpiryIndex>(&json).unwrap(), index);
    }
}
