//! Implements the JSON-document backend.
//!
//! Each collection is persisted as one JSON array file under a shared data
//! directory, named after the collection (e.g. `earnings.json`). The file is
//! read once when the store is opened and rewritten in full after every
//! mutation, so a store reopened on the same directory sees everything that
//! was saved before. Documents keep their insertion order in the file, which
//! is what `find_all` returns.

use std::{
    fs,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use serde_json::Value;

use crate::{
    Error,
    stores::{
        Document, Filter, Patch, Record, RecordStore,
        record::{assign_identity, doc_created_at, from_document, to_document},
    },
};

/// Stores one collection of records in a JSON array file.
#[derive(Debug, Clone)]
pub struct JsonFileStore<T: Record> {
    path: PathBuf,
    rows: Arc<Mutex<Vec<Document>>>,
    marker: PhantomData<T>,
}

impl<T: Record> JsonFileStore<T> {
    /// Open the collection file under `data_dir`, creating the directory if
    /// needed. A missing file means an empty collection.
    ///
    /// # Errors
    /// Returns [Error::Io] if the directory cannot be created or the file
    /// cannot be read, and [Error::Serde] if the file holds anything other
    /// than a JSON array of objects.
    pub fn open(data_dir: &Path) -> Result<Self, Error> {
        fs::create_dir_all(data_dir)?;

        let path = data_dir.join(format!("{}.json", T::COLLECTION));
        let rows = if path.exists() {
            let text = fs::read_to_string(&path)?;
            match serde_json::from_str(&text)? {
                Value::Array(items) => items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(doc) => Ok(doc),
                        other => Err(Error::Serde(format!(
                            "expected an object in {}, got {other}",
                            T::COLLECTION
                        ))),
                    })
                    .collect::<Result<Vec<Document>, Error>>()?,
                other => {
                    return Err(Error::Serde(format!(
                        "expected a JSON array in {}, got {other}",
                        T::COLLECTION
                    )));
                }
            }
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            rows: Arc::new(Mutex::new(rows)),
            marker: PhantomData,
        })
    }

    /// Rewrite the collection file with the current rows.
    fn save(&self, rows: &[Document]) -> Result<(), Error> {
        let text = serde_json::to_string_pretty(&rows)?;
        fs::write(&self.path, text)?;

        Ok(())
    }
}

impl<T: Record> RecordStore<T> for JsonFileStore<T> {
    /// Persist `draft` with a fresh id and timestamp, appending it to the
    /// collection file.
    ///
    /// # Panics
    /// Panics if the store lock is poisoned.
    fn create(&self, draft: T::Draft) -> Result<T, Error> {
        let mut doc = to_document(&draft)?;
        assign_identity(&mut doc);

        let mut rows = self.rows.lock().unwrap();
        rows.push(doc.clone());
        self.save(&rows)?;

        from_document(doc)
    }

    fn find_one(&self, filter: &Filter) -> Result<Option<T>, Error> {
        let rows = self.rows.lock().unwrap();

        rows.iter()
            .find(|doc| filter.matches(doc))
            .cloned()
            .map(from_document)
            .transpose()
    }

    fn find_all(&self, filter: &Filter) -> Result<Vec<T>, Error> {
        let rows = self.rows.lock().unwrap();

        rows.iter()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .map(from_document)
            .collect()
    }

    fn find_all_ascending(&self, filter: &Filter) -> Result<Vec<T>, Error> {
        let mut matches: Vec<Document> = {
            let rows = self.rows.lock().unwrap();
            rows.iter()
                .filter(|doc| filter.matches(doc))
                .cloned()
                .collect()
        };

        matches.sort_by_key(doc_created_at);

        matches.into_iter().map(from_document).collect()
    }

    fn update(&self, id: &str, patch: &Patch) -> Result<(), Error> {
        let mut rows = self.rows.lock().unwrap();

        let doc = rows
            .iter_mut()
            .find(|doc| doc.get("id").and_then(Value::as_str) == Some(id))
            .ok_or(Error::NotFound)?;
        patch.apply_to(doc);

        self.save(&rows)
    }

    fn delete(&self, id: &str) -> Result<(), Error> {
        let mut rows = self.rows.lock().unwrap();

        rows.retain(|doc| doc.get("id").and_then(Value::as_str) != Some(id));

        self.save(&rows)
    }

    fn delete_all(&self, filter: &Filter) -> Result<(), Error> {
        let mut rows = self.rows.lock().unwrap();

        rows.retain(|doc| !filter.matches(doc));

        self.save(&rows)
    }
}

#[cfg(test)]
mod json_file_store_tests {
    use tempfile::TempDir;

    use super::JsonFileStore;
    use crate::{
        models::Earning,
        stores::{Filter, RecordStore, contract},
    };

    fn get_store() -> (TempDir, JsonFileStore<Earning>) {
        let dir = TempDir::new().expect("Could not create temporary directory");
        let store = JsonFileStore::open(dir.path()).expect("Could not open store");

        (dir, store)
    }

    #[test]
    fn create_assigns_identity() {
        let (_dir, store) = get_store();
        contract::assert_create_assigns_identity(&store);
    }

    #[test]
    fn amount_round_trips() {
        let (_dir, store) = get_store();
        contract::assert_amount_round_trips(&store);
    }

    #[test]
    fn find_one_filters_exactly() {
        let (_dir, store) = get_store();
        contract::assert_find_one_filters_exactly(&store);
    }

    #[test]
    fn find_all_returns_every_match() {
        let (_dir, store) = get_store();
        contract::assert_find_all_returns_every_match(&store);
    }

    #[test]
    fn ascending_order_is_creation_order() {
        let (_dir, store) = get_store();
        contract::assert_ascending_order_is_creation_order(&store);
    }

    #[test]
    fn update_merges_fields() {
        let (_dir, store) = get_store();
        contract::assert_update_merges_fields(&store);
    }

    #[test]
    fn update_missing_id_is_not_found() {
        let (_dir, store) = get_store();
        contract::assert_update_missing_id_is_not_found(&store);
    }

    #[test]
    fn delete_removes_and_tolerates_missing() {
        let (_dir, store) = get_store();
        contract::assert_delete_removes_and_tolerates_missing(&store);
    }

    #[test]
    fn delete_all_removes_matches_only() {
        let (_dir, store) = get_store();
        contract::assert_delete_all_removes_matches_only(&store);
    }

    #[test]
    fn records_survive_a_reopen() {
        let dir = TempDir::new().unwrap();

        let created = {
            let store: JsonFileStore<Earning> = JsonFileStore::open(dir.path()).unwrap();
            store
                .create(contract::earning_draft("user-1", "41.00", "2022-04-12"))
                .unwrap()
        };

        let reopened: JsonFileStore<Earning> = JsonFileStore::open(dir.path()).unwrap();
        let read_back = reopened
            .find_one(&Filter::by_id(&created.id))
            .unwrap()
            .expect("record saved before reopen should still exist");

        assert_eq!(read_back, created);
    }

    #[test]
    fn opening_a_missing_directory_creates_it() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("data").join("stores");

        let store: Result<JsonFileStore<Earning>, _> = JsonFileStore::open(&nested);

        assert!(store.is_ok());
        assert!(nested.is_dir());
    }
}
