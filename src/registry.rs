//! Wrap deduplication registry
//!
//! The registry remembers, by identity of the original callable, which
//! callables have already been wrapped, so that wrapping the same original
//! twice yields the one canonical wrapped handle instead of stacking
//! wrappers. Entries are never removed: the registry exists for
//! process-lifetime deduplication, not resource reclamation.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::func::{Func, FuncId};

/// Identity-keyed table of canonical wrapped handles, one per signature.
struct SignatureTable<A, R> {
    entries: DashMap<FuncId, Func<A, R>>,
}

impl<A, R> SignatureTable<A, R> {
    fn new() -> Self {
        SignatureTable {
            entries: DashMap::new(),
        }
    }
}

/// Registry of canonical wrapped handles.
///
/// Handles of different signatures live in separate tables, keyed by the
/// `TypeId` of the `(A, R)` pair. Within a table, the key is the identity of
/// the original handle. A wrapped handle keeps its original alive, so an
/// identity can never be recycled while its entry exists.
pub struct WrapRegistry {
    tables: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl WrapRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        WrapRegistry {
            tables: DashMap::new(),
        }
    }

    /// Get or create the table for one call signature.
    fn table<A, R>(&self) -> Arc<SignatureTable<A, R>>
    where
        A: Send + Sync + 'static,
        R: Send + Sync + 'static,
    {
        let table = {
            let entry = self
                .tables
                .entry(TypeId::of::<(A, R)>())
                .or_insert_with(|| {
                    Arc::new(SignatureTable::<A, R>::new()) as Arc<dyn Any + Send + Sync>
                });
            entry.value().clone()
        };

        // Only a SignatureTable<A, R> is ever stored under TypeId::of::<(A, R)>().
        table
            .downcast::<SignatureTable<A, R>>()
            .expect("signature mismatch in wrap registry")
    }

    /// Return the canonical wrapped handle for `original`, building it with
    /// `builder` on first registration.
    ///
    /// The builder runs at most once per original: concurrent registrations
    /// of the same original cannot construct two distinct wrappers.
    pub fn register_or_get<A, R>(
        &self,
        original: &Func<A, R>,
        builder: impl FnOnce(&Func<A, R>) -> Func<A, R>,
    ) -> Func<A, R>
    where
        A: Send + Sync + 'static,
        R: Send + Sync + 'static,
    {
        let table = self.table::<A, R>();
        let wrapped = table
            .entries
            .entry(original.id())
            .or_insert_with(|| builder(original));
        wrapped.clone()
    }

    /// The wrapped handle already registered for `original`, if any.
    pub fn get<A, R>(&self, original: &Func<A, R>) -> Option<Func<A, R>>
    where
        A: Send + Sync + 'static,
        R: Send + Sync + 'static,
    {
        let table = self.table::<A, R>();
        let found = table.entries.get(&original.id());
        found.map(|entry| entry.value().clone())
    }

    /// Number of distinct call signatures registered.
    pub fn num_signatures(&self) -> usize {
        self.tables.len()
    }
}

impl Default for WrapRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WrapRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapRegistry")
            .field("signatures", &self.tables.len())
            .finish()
    }
}
