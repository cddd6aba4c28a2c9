//! Immutable, versioned dataset snapshots
//!
//! A snapshot is the whole dataset as of one tick. Rows are held behind
//! `Arc` so a tick that touches one row allocates one row: every other
//! row is shared by reference with the previous snapshot. Consumers can
//! detect which rows changed with pointer comparison alone.
//!
//! Versions increase by one per derived snapshot. The seed snapshot is
//! version 0.

use std::io;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One immutable view of a dataset.
#[derive(Debug, Serialize)]
pub struct Snapshot<T> {
    version: u64,
    rows: Arc<[Arc<T>]>,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<T> Snapshot<T> {
    /// Seed snapshot, version 0.
    pub fn initial(rows: Vec<T>) -> Self {
        Self {
            version: 0,
            rows: rows.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::initial(Vec::new())
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn rows(&self) -> &[Arc<T>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.rows.get(index).map(|r| r.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.rows.iter().map(|r| r.as_ref())
    }

    /// Next version with the given rows replaced. Untouched rows keep
    /// their `Arc`. Out-of-range indices are ignored.
    pub fn with_replaced(&self, updates: Vec<(usize, T)>) -> Self {
        let mut rows: Vec<Arc<T>> = self.rows.iter().cloned().collect();
        for (index, row) in updates {
            if let Some(slot) = rows.get_mut(index) {
                *slot = Arc::new(row);
            }
        }
        Self {
            version: self.version + 1,
            rows: rows.into(),
        }
    }

    /// Next version with `row` at the front, truncated to `cap` rows.
    pub fn with_prepended(&self, row: T, cap: usize) -> Self {
        let rows: Vec<Arc<T>> = std::iter::once(Arc::new(row))
            .chain(self.rows.iter().cloned())
            .take(cap)
            .collect();
        Self {
            version: self.version + 1,
            rows: rows.into(),
        }
    }

    /// Whether row `index` is the same allocation in both snapshots.
    pub fn shares_row(&self, other: &Self, index: usize) -> bool {
        match (self.rows.get(index), other.rows.get(index)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Indices whose row is not shared with `previous`.
    pub fn changed_indices(&self, previous: &Self) -> Vec<usize> {
        (0..self.rows.len())
            .filter(|&i| !self.shares_row(previous, i))
            .collect()
    }

    /// Indices of rows that appear nowhere in `previous`. Unlike
    /// `changed_indices` this ignores rows that only moved.
    pub fn fresh_indices(&self, previous: &Self) -> Vec<usize> {
        (0..self.rows.len())
            .filter(|&i| !previous.rows.iter().any(|old| Arc::ptr_eq(old, &self.rows[i])))
            .collect()
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Compact identity of a snapshot for replay comparison and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDigest {
    pub version: u64,
    pub row_count: usize,
    pub checksum: String,
}

struct HashWriter<'a>(&'a mut Sha256);

impl io::Write for HashWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: Serialize> Snapshot<T> {
    /// SHA-256 over the JSON encoding of every row, in order.
    ///
    /// Depends on row content only, not on the version.
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        for row in self.rows.iter() {
            if serde_json::to_writer(HashWriter(&mut hasher), row.as_ref()).is_err() {
                hasher.update(b"<unserializable>");
            }
            hasher.update(b"|");
        }
        format!("{:x}", hasher.finalize())
    }

    pub fn digest(&self) -> SnapshotDigest {
        SnapshotDigest {
            version: self.version,
            row_count: self.rows.len(),
            checksum: self.checksum(),
        }
    }
}

/// Verify a digest against a snapshot.
pub fn verify_digest<T: Serialize>(snapshot: &Snapshot<T>, digest: &SnapshotDigest) -> bool {
    snapshot.version == digest.version
        && snapshot.len() == digest.row_count
        && snapshot.checksum() == digest.checksum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Row {
        id: u32,
        price: f64,
    }

    fn seed() -> Snapshot<Row> {
        Snapshot::initial(vec![
            Row { id: 1, price: 0.055 },
            Row { id: 2, price: 0.119 },
            Row { id: 3, price: 0.0464 },
        ])
    }

    #[test]
    fn test_initial_version() {
        let snap = seed();
        assert_eq!(snap.version(), 0);
        assert_eq!(snap.len(), 3);
        assert!(Snapshot::<Row>::empty().is_empty());
    }

    #[test]
    fn test_replace_shares_untouched_rows() {
        let s0 = seed();
        let s1 = s0.with_replaced(vec![(1, Row { id: 2, price: 0.12 })]);

        assert_eq!(s1.version(), 1);
        assert!(s1.shares_row(&s0, 0));
        assert!(!s1.shares_row(&s0, 1));
        assert!(s1.shares_row(&s0, 2));
        assert_eq!(s1.changed_indices(&s0), vec![1]);

        // Old snapshot is untouched
        assert_eq!(s0.get(1).unwrap().price, 0.119);
        assert_eq!(s1.get(1).unwrap().price, 0.12);
    }

    #[test]
    fn test_replace_out_of_range_ignored() {
        let s0 = seed();
        let s1 = s0.with_replaced(vec![(9, Row { id: 9, price: 1.0 })]);
        assert_eq!(s1.len(), 3);
        assert!(s1.changed_indices(&s0).is_empty());
    }

    #[test]
    fn test_prepend_caps_history() {
        let mut snap = seed();
        for i in 0..5 {
            snap = snap.with_prepended(Row { id: 100 + i, price: 1.0 }, 4);
        }
        assert_eq!(snap.len(), 4);
        assert_eq!(snap.version(), 5);
        assert_eq!(snap.get(0).unwrap().id, 104);
        assert_eq!(snap.get(3).unwrap().id, 101);
    }

    #[test]
    fn test_fresh_indices_ignore_shifted_rows() {
        let s0 = seed();
        let s1 = s0.with_prepended(Row { id: 4, price: 2.0 }, 3);
        assert_eq!(s1.changed_indices(&s0), vec![0, 1, 2]);
        assert_eq!(s1.fresh_indices(&s0), vec![0]);

        let s2 = s1.with_replaced(vec![(2, Row { id: 2, price: 0.2 })]);
        assert_eq!(s2.fresh_indices(&s1), vec![2]);
    }

    #[test]
    fn test_checksum_is_content_only() {
        let a = seed();
        let b = seed();
        assert_eq!(a.checksum(), b.checksum());

        let c = a.with_replaced(vec![(0, Row { id: 1, price: 0.056 })]);
        assert_ne!(a.checksum(), c.checksum());

        let same = a.with_replaced(vec![(0, Row { id: 1, price: 0.055 })]);
        assert_eq!(a.checksum(), same.checksum());
        assert_ne!(a.version(), same.version());
    }

    #[test]
    fn test_digest_verification() {
        let snap = seed().with_replaced(vec![(2, Row { id: 3, price: 0.05 })]);
        let digest = snap.digest();
        assert!(verify_digest(&snap, &digest));

        let mut tampered = digest.clone();
        tampered.checksum = "corrupted".to_string();
        assert!(!verify_digest(&snap, &tampered));
    }

    #[test]
    fn test_snapshot_serializes_rows() {
        let json = serde_json::to_value(seed()).unwrap();
        assert_eq!(json["version"], 0);
        assert_eq!(json["rows"][1]["id"], 2);
    }
}
