//! Implements a struct that holds the state of the REST server.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;

use crate::{
    Error,
    auth::AuthKeys,
    models::{
        Budget, Earning, Expenditure, Finance, MonthlyEarningSum, MonthlyExpenditureSum, Tip, User,
    },
    stores::{JsonFileStore, MemoryStore, RecordStore, SqliteStore, initialize},
};

/// The state of the REST server: one record store per collection, the auth
/// keys, and the guard serializing monthly-sum adjustments.
///
/// The storage backend is chosen once, by the constructor used at startup;
/// everything above the stores runs unmodified against any of the three.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn RecordStore<User>>,
    pub earnings: Arc<dyn RecordStore<Earning>>,
    pub expenditures: Arc<dyn RecordStore<Expenditure>>,
    pub earning_sums: Arc<dyn RecordStore<MonthlyEarningSum>>,
    pub expenditure_sums: Arc<dyn RecordStore<MonthlyExpenditureSum>>,
    pub budgets: Arc<dyn RecordStore<Budget>>,
    pub finances: Arc<dyn RecordStore<Finance>>,
    pub tips: Arc<dyn RecordStore<Tip>>,
    pub auth_keys: Arc<AuthKeys>,
    /// Held for the duration of each monthly-sum read-adjust-write.
    pub summary_guard: Arc<Mutex<()>>,
}

impl AppState {
    /// Create an [AppState] backed by process-local in-memory maps.
    ///
    /// Nothing is persisted; this is the backend for tests and throwaway
    /// runs.
    pub fn in_memory(secret: &str) -> Self {
        Self {
            users: Arc::new(MemoryStore::new()),
            earnings: Arc::new(MemoryStore::new()),
            expenditures: Arc::new(MemoryStore::new()),
            earning_sums: Arc::new(MemoryStore::new()),
            expenditure_sums: Arc::new(MemoryStore::new()),
            budgets: Arc::new(MemoryStore::new()),
            finances: Arc::new(MemoryStore::new()),
            tips: Arc::new(MemoryStore::new()),
            auth_keys: Arc::new(AuthKeys::new(secret)),
            summary_guard: Arc::new(Mutex::new(())),
        }
    }

    /// Create an [AppState] backed by a SQLite database at `db_path`,
    /// initializing the schema if needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or initialized.
    pub fn with_sqlite(db_path: &Path, secret: &str) -> Result<Self, Error> {
        let connection = Connection::open(db_path)?;
        initialize(&connection)?;

        let connection = Arc::new(Mutex::new(connection));

        Ok(Self {
            users: Arc::new(SqliteStore::new(connection.clone())),
            earnings: Arc::new(SqliteStore::new(connection.clone())),
            expenditures: Arc::new(SqliteStore::new(connection.clone())),
            earning_sums: Arc::new(SqliteStore::new(connection.clone())),
            expenditure_sums: Arc::new(SqliteStore::new(connection.clone())),
            budgets: Arc::new(SqliteStore::new(connection.clone())),
            finances: Arc::new(SqliteStore::new(connection.clone())),
            tips: Arc::new(SqliteStore::new(connection)),
            auth_keys: Arc::new(AuthKeys::new(secret)),
            summary_guard: Arc::new(Mutex::new(())),
        })
    }

    /// Create an [AppState] backed by JSON document files under `data_dir`,
    /// creating the directory if needed.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or an existing
    /// collection file cannot be read.
    pub fn with_json_dir(data_dir: &Path, secret: &str) -> Result<Self, Error> {
        Ok(Self {
            users: Arc::new(JsonFileStore::open(data_dir)?),
            earnings: Arc::new(JsonFileStore::open(data_dir)?),
            expenditures: Arc::new(JsonFileStore::open(data_dir)?),
            earning_sums: Arc::new(JsonFileStore::open(data_dir)?),
            expenditure_sums: Arc::new(JsonFileStore::open(data_dir)?),
            budgets: Arc::new(JsonFileStore::open(data_dir)?),
            finances: Arc::new(JsonFileStore::open(data_dir)?),
            tips: Arc::new(JsonFileStore::open(data_dir)?),
            auth_keys: Arc::new(AuthKeys::new(secret)),
            summary_guard: Arc::new(Mutex::new(())),
        })
    }
}
