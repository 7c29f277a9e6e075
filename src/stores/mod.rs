//! The record store abstraction: one CRUD+query contract implemented by
//! three interchangeable backends.
//!
//! The backends are a process-local in-memory map ([MemoryStore]), a
//! JSON-document store persisted one file per collection ([JsonFileStore]),
//! and a relational SQLite store ([SqliteStore]). All three expose identical
//! externally observable semantics, with one deliberate exception:
//! [RecordStore::find_all] returns matches in backend-native order, so any
//! caller that needs a deterministic order must use
//! [RecordStore::find_all_ascending].

mod document;
mod memory;
mod record;
mod sqlite;

pub use document::JsonFileStore;
pub use memory::MemoryStore;
pub use record::{Document, Filter, Patch, Record, from_document, to_document};
pub use sqlite::{SqliteStore, initialize};

use crate::Error;

/// The uniform storage contract for one record collection.
///
/// One instance serves one entity type; a backend is chosen once at process
/// startup and every collection of that process uses it.
pub trait RecordStore<T: Record>: Send + Sync {
    /// Assign a fresh id and creation timestamp to `draft`, persist it, and
    /// return the stored record.
    ///
    /// # Errors
    /// Only fails on backend I/O or codec errors; validating the draft's
    /// contents is the caller's job.
    fn create(&self, draft: T::Draft) -> Result<T, Error>;

    /// Return one record matching every condition in `filter`, or `None`.
    ///
    /// When several records match, which one is returned is backend-defined;
    /// callers use this for lookups (by id, by unique email, by
    /// user+month+year) where at most one match is expected.
    fn find_one(&self, filter: &Filter) -> Result<Option<T>, Error>;

    /// Return every record matching `filter`, in backend-native order.
    fn find_all(&self, filter: &Filter) -> Result<Vec<T>, Error>;

    /// Return every record matching `filter`, ordered by creation timestamp
    /// ascending. The order is identical across all backends.
    fn find_all_ascending(&self, filter: &Filter) -> Result<Vec<T>, Error>;

    /// Merge `patch` into the record with the given `id`, leaving fields
    /// absent from the patch unchanged.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no record has that id.
    fn update(&self, id: &str, patch: &Patch) -> Result<(), Error>;

    /// Remove the record with the given `id`; a no-op if it does not exist.
    fn delete(&self, id: &str) -> Result<(), Error>;

    /// Remove every record matching `filter`.
    fn delete_all(&self, filter: &Filter) -> Result<(), Error>;
}
