//!
//! maintrack collection store
//! --------------------------
//! In-process, per-kind record collections behind `parking_lot::RwLock`.
//! Each collection supports insert-one, find-one-by-id, find-by-predicate,
//! find-all, update-one, delete-one and count — the full operation set the
//! repositories and the aggregate reporter need. Rows are kept in insertion
//! order so listings are deterministic.
//!
//! The public API centers on `Store`, usually wrapped in the cheap-clone
//! `SharedStore` handle that the server state carries.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::models::{Defect, Proposal, Release, Remediation, User};

/// Records addressable by their identity field.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// An ordered collection of records of one kind.
pub struct Collection<T> {
    rows: RwLock<Vec<T>>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self { Self { rows: RwLock::new(Vec::new()) } }
}

impl<T: Keyed + Clone> Collection<T> {
    pub fn new() -> Self { Self::default() }

    pub fn insert_one(&self, row: T) {
        self.rows.write().push(row);
    }

    pub fn find_one(&self, id: &str) -> Option<T> {
        self.rows.read().iter().find(|r| r.key() == id).cloned()
    }

    pub fn find_where<P: Fn(&T) -> bool>(&self, pred: P) -> Option<T> {
        self.rows.read().iter().find(|r| pred(r)).cloned()
    }

    /// All records in insertion order.
    pub fn find_all(&self) -> Vec<T> {
        self.rows.read().clone()
    }

    /// Apply a mutation to the record with the given id; returns the updated
    /// record, or None if no such record exists. The lock is held across the
    /// read-modify-write, so a single update is never torn.
    pub fn update_one<F: FnOnce(&mut T)>(&self, id: &str, mutate: F) -> Option<T> {
        let mut rows = self.rows.write();
        let row = rows.iter_mut().find(|r| r.key() == id)?;
        mutate(row);
        Some(row.clone())
    }

    /// Remove the record with the given id; returns true if one was removed.
    pub fn delete_one(&self, id: &str) -> bool {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|r| r.key() != id);
        rows.len() != before
    }

    pub fn count<P: Fn(&T) -> bool>(&self, pred: P) -> usize {
        self.rows.read().iter().filter(|r| pred(r)).count()
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One collection per tracked kind plus the user collection.
#[derive(Default)]
pub struct Store {
    pub users: Collection<User>,
    pub defects: Collection<Defect>,
    pub remediations: Collection<Remediation>,
    pub releases: Collection<Release>,
    pub proposals: Collection<Proposal>,
}

impl Store {
    pub fn new() -> Self { Self::default() }
}

/// Cheap-clone handle shared across request handlers.
#[derive(Clone)]
pub struct SharedStore(pub Arc<Store>);

impl SharedStore {
    pub fn new() -> Self { SharedStore(Arc::new(Store::new())) }
}

impl Default for SharedStore {
    fn default() -> Self { Self::new() }
}
