//! Implements the process-local in-memory backend.
//!
//! Nothing is persisted; the store lives exactly as long as the process.
//! `find_all` iterates the underlying map, so its order is arbitrary.

use std::{
    collections::HashMap,
    marker::PhantomData,
    sync::{Arc, Mutex},
};

use crate::{
    Error,
    stores::{
        Filter, Patch, Record, RecordStore,
        record::{assign_identity, doc_created_at, from_document, to_document},
    },
};

/// Stores one collection of records in a map keyed by id.
#[derive(Debug, Clone)]
pub struct MemoryStore<T: Record> {
    rows: Arc<Mutex<HashMap<String, super::Document>>>,
    marker: PhantomData<T>,
}

impl<T: Record> MemoryStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(HashMap::new())),
            marker: PhantomData,
        }
    }
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> RecordStore<T> for MemoryStore<T> {
    /// Persist `draft` with a fresh id and timestamp.
    ///
    /// # Panics
    /// Panics if the store lock is poisoned.
    fn create(&self, draft: T::Draft) -> Result<T, Error> {
        let mut doc = to_document(&draft)?;
        let id = assign_identity(&mut doc);

        self.rows.lock().unwrap().insert(id, doc.clone());

        from_document(doc)
    }

    fn find_one(&self, filter: &Filter) -> Result<Option<T>, Error> {
        let rows = self.rows.lock().unwrap();

        rows.values()
            .find(|doc| filter.matches(doc))
            .cloned()
            .map(from_document)
            .transpose()
    }

    fn find_all(&self, filter: &Filter) -> Result<Vec<T>, Error> {
        let rows = self.rows.lock().unwrap();

        rows.values()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .map(from_document)
            .collect()
    }

    fn find_all_ascending(&self, filter: &Filter) -> Result<Vec<T>, Error> {
        let mut matches: Vec<super::Document> = {
            let rows = self.rows.lock().unwrap();
            rows.values()
                .filter(|doc| filter.matches(doc))
                .cloned()
                .collect()
        };

        matches.sort_by_key(doc_created_at);

        matches.into_iter().map(from_document).collect()
    }

    fn update(&self, id: &str, patch: &Patch) -> Result<(), Error> {
        let mut rows = self.rows.lock().unwrap();

        let doc = rows.get_mut(id).ok_or(Error::NotFound)?;
        patch.apply_to(doc);

        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), Error> {
        self.rows.lock().unwrap().remove(id);

        Ok(())
    }

    fn delete_all(&self, filter: &Filter) -> Result<(), Error> {
        self.rows.lock().unwrap().retain(|_, doc| !filter.matches(doc));

        Ok(())
    }
}
