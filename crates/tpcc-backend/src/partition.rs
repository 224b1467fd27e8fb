//! Partition identifiers and the per-connection attachment set.

use crate::error::BackendError;
use std::collections::BTreeSet;
use std::fmt;

/// Placeholder for the warehouse id in a partition path template.
pub const WAREHOUSE_PLACEHOLDER: &str = "{w_id}";

/// A validated warehouse id that may be spliced into SQL text as a schema name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionId(i64);

impl PartitionId {
    pub fn new(w_id: i64) -> Result<Self, BackendError> {
        if w_id < 1 {
            return Err(BackendError::InvalidPartition(w_id));
        }
        Ok(Self(w_id))
    }

    pub fn w_id(&self) -> i64 {
        self.0
    }

    /// Schema name the partition is attached under.
    pub fn schema_name(&self) -> String {
        format!("P{}", self.0)
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Most databases SQLite lets one connection attach.
pub const MAX_ATTACHED_PARTITIONS: usize = 10;

/// Partitions attached to one connection, least recently used first.
///
/// Bounded by `capacity`; the owner detaches the
/// [`eviction_candidate`](PartitionSet::eviction_candidate) before attaching
/// into a full set.
#[derive(Debug, Clone)]
pub struct PartitionSet {
    attached: Vec<PartitionId>,
    capacity: usize,
}

impl Default for PartitionSet {
    fn default() -> Self {
        Self::with_capacity(MAX_ATTACHED_PARTITIONS)
    }
}

impl PartitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            attached: Vec::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.attached.len() >= self.capacity
    }

    pub fn contains(&self, id: PartitionId) -> bool {
        self.attached.contains(&id)
    }

    /// Mark `id` as most recently used. Returns `false` if it is not attached.
    pub fn touch(&mut self, id: PartitionId) -> bool {
        match self.attached.iter().position(|p| *p == id) {
            Some(idx) => {
                self.attached.remove(idx);
                self.attached.push(id);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if the id was not present before.
    pub fn insert(&mut self, id: PartitionId) -> bool {
        if self.touch(id) {
            return false;
        }
        self.attached.push(id);
        true
    }

    pub fn remove(&mut self, id: PartitionId) -> bool {
        let before = self.attached.len();
        self.attached.retain(|p| *p != id);
        self.attached.len() != before
    }

    /// Least recently used partition not in `keep`.
    pub fn eviction_candidate(&self, keep: &BTreeSet<PartitionId>) -> Option<PartitionId> {
        self.attached.iter().copied().find(|p| !keep.contains(p))
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    /// Attached partitions, least recently used first.
    pub fn iter(&self) -> impl Iterator<Item = PartitionId> + '_ {
        self.attached.iter().copied()
    }
}

/// Maps a partition to the database file holding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionLayout {
    template: String,
}

impl PartitionLayout {
    /// `template` must contain `{w_id}`, e.g. `/data/tpcc-{w_id}.db`.
    pub fn new(template: impl Into<String>) -> Result<Self, BackendError> {
        let template = template.into();
        if !template.contains(WAREHOUSE_PLACEHOLDER) {
            return Err(BackendError::InvalidLayout(format!(
                "database path '{template}' does not contain {WAREHOUSE_PLACEHOLDER}"
            )));
        }
        Ok(Self { template })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn path_for(&self, id: PartitionId) -> String {
        self.template
            .replace(WAREHOUSE_PLACEHOLDER, &id.w_id().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_id_validation() {
        assert_eq!(
            PartitionId::new(0),
            Err(BackendError::InvalidPartition(0))
        );
        assert_eq!(
            PartitionId::new(-3),
            Err(BackendError::InvalidPartition(-3))
        );
        let id = PartitionId::new(12).unwrap();
        assert_eq!(id.schema_name(), "P12");
        assert_eq!(id.to_string(), "P12");
    }

    #[test]
    fn test_partition_set_is_idempotent() {
        let mut set = PartitionSet::new();
        let id = PartitionId::new(1).unwrap();
        assert!(set.insert(id));
        assert!(!set.insert(id));
        assert!(set.contains(id));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_partition_set_tracks_recency() {
        let ids: Vec<_> = (1..=3).map(|w| PartitionId::new(w).unwrap()).collect();
        let mut set = PartitionSet::with_capacity(3);
        for id in &ids {
            set.insert(*id);
        }
        assert!(set.is_full());
        assert_eq!(set.eviction_candidate(&BTreeSet::new()), Some(ids[0]));

        assert!(set.touch(ids[0]));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![ids[1], ids[2], ids[0]]);
        assert_eq!(
            set.eviction_candidate(&BTreeSet::from([ids[1]])),
            Some(ids[2])
        );
        assert_eq!(set.eviction_candidate(&ids.iter().copied().collect()), None);

        assert!(set.remove(ids[1]));
        assert!(!set.remove(ids[1]));
        assert!(!set.is_full());
        assert!(!set.touch(ids[1]));
    }

    #[test]
    fn test_layout() {
        let layout = PartitionLayout::new("/tmp/tpcc-{w_id}.db").unwrap();
        let id = PartitionId::new(7).unwrap();
        assert_eq!(layout.path_for(id), "/tmp/tpcc-7.db");

        assert!(matches!(
            PartitionLayout::new("/tmp/tpcc.db"),
            Err(BackendError::InvalidLayout(_))
        ));
    }
}
