//! Implements the relational SQLite backend.
//!
//! Every collection maps onto one table: `id TEXT PRIMARY KEY`,
//! `createdAt INTEGER`, and one TEXT column per data field. Monetary values
//! are stored as their decimal-string form rather than REAL, so amounts
//! round-trip without binary floating-point drift. The SQL is assembled
//! generically from [Record::FIELDS]; field names are compile-time constants,
//! only values travel as bound parameters.

use std::{
    marker::PhantomData,
    sync::{Arc, Mutex},
};

use rusqlite::{
    Connection, Row, Transaction as SqlTransaction, TransactionBehavior, params_from_iter,
    types::Value as SqlValue,
};
use serde_json::Value;

use crate::{
    Error,
    models::{
        Budget, Earning, Expenditure, Finance, MonthlyEarningSum, MonthlyExpenditureSum, Tip, User,
    },
    stores::{
        Document, Filter, Patch, Record, RecordStore,
        record::{assign_identity, from_document, to_document},
    },
};

/// Stores one collection of records in a SQLite table, sharing the
/// connection with the other collections of the same database.
#[derive(Debug, Clone)]
pub struct SqliteStore<T: Record> {
    connection: Arc<Mutex<Connection>>,
    marker: PhantomData<T>,
}

impl<T: Record> SqliteStore<T> {
    /// Wrap an already initialized connection; see [initialize].
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            connection,
            marker: PhantomData,
        }
    }

    /// Create the collection's table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    pub fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        let fields = T::FIELDS
            .iter()
            .map(|field| format!("\"{field}\" TEXT"))
            .collect::<Vec<_>>()
            .join(", ");

        connection.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS \"{}\" (
                    \"id\" TEXT PRIMARY KEY,
                    \"createdAt\" INTEGER NOT NULL,
                    {fields}
                )",
                T::COLLECTION
            ),
            (),
        )?;

        Ok(())
    }

    /// The quoted column list, in the order [map_row] reads it back.
    fn column_list() -> String {
        let mut columns = vec!["\"id\"".to_string(), "\"createdAt\"".to_string()];
        columns.extend(T::FIELDS.iter().map(|field| format!("\"{field}\"")));

        columns.join(", ")
    }

    /// Append `WHERE ...` for `filter` to `sql`, numbering placeholders from
    /// one, and return the values to bind.
    fn push_where_clause(sql: &mut String, filter: &Filter) -> Vec<SqlValue> {
        let mut values = Vec::new();

        for (index, (name, value)) in filter.conditions().enumerate() {
            sql.push_str(if index == 0 { " WHERE " } else { " AND " });
            sql.push_str(&format!("\"{name}\" = ?{}", index + 1));
            values.push(SqlValue::Text(value.to_string()));
        }

        values
    }

    fn select(&self, filter: &Filter, ascending: bool) -> Result<Vec<Document>, Error> {
        let mut sql = format!(
            "SELECT {} FROM \"{}\"",
            Self::column_list(),
            T::COLLECTION
        );
        let values = Self::push_where_clause(&mut sql, filter);
        if ascending {
            sql.push_str(" ORDER BY \"createdAt\" ASC");
        }

        let connection = self.connection.lock().unwrap();
        let documents = connection
            .prepare(&sql)?
            .query_map(params_from_iter(values), Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(documents)
    }

    /// Read a row back into its document form. NULL columns are omitted so
    /// optional fields deserialize as absent.
    fn map_row(row: &Row) -> Result<Document, rusqlite::Error> {
        let mut doc = Document::new();

        doc.insert("id".to_string(), Value::String(row.get(0)?));
        doc.insert(
            "createdAt".to_string(),
            Value::Number(row.get::<_, i64>(1)?.into()),
        );

        for (index, field) in T::FIELDS.iter().enumerate() {
            if let Some(text) = row.get::<_, Option<String>>(index + 2)? {
                doc.insert((*field).to_string(), Value::String(text));
            }
        }

        Ok(doc)
    }

    /// A document field as its TEXT column value; absent and null map to
    /// NULL.
    fn column_value(doc: &Document, field: &str) -> SqlValue {
        match doc.get(field) {
            None | Some(Value::Null) => SqlValue::Null,
            Some(Value::String(text)) => SqlValue::Text(text.clone()),
            Some(other) => SqlValue::Text(other.to_string()),
        }
    }
}

impl<T: Record> RecordStore<T> for SqliteStore<T> {
    /// Persist `draft` with a fresh id and timestamp.
    ///
    /// # Panics
    /// Panics if the store lock is poisoned.
    fn create(&self, draft: T::Draft) -> Result<T, Error> {
        let mut doc = to_document(&draft)?;
        let id = assign_identity(&mut doc);

        let placeholders = (1..=T::FIELDS.len() + 2)
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({placeholders})",
            T::COLLECTION,
            Self::column_list()
        );

        let mut values = vec![
            SqlValue::Text(id),
            SqlValue::Integer(
                doc.get("createdAt")
                    .and_then(Value::as_i64)
                    .unwrap_or_default(),
            ),
        ];
        values.extend(T::FIELDS.iter().map(|field| Self::column_value(&doc, field)));

        let connection = self.connection.lock().unwrap();
        connection.execute(&sql, params_from_iter(values))?;

        from_document(doc)
    }

    fn find_one(&self, filter: &Filter) -> Result<Option<T>, Error> {
        // LIMIT 1 would also do; taking the first of the unordered result
        // matches the contract's "backend-defined which one" wording.
        let documents = self.select(filter, false)?;

        documents.into_iter().next().map(from_document).transpose()
    }

    fn find_all(&self, filter: &Filter) -> Result<Vec<T>, Error> {
        self.select(filter, false)?
            .into_iter()
            .map(from_document)
            .collect()
    }

    fn find_all_ascending(&self, filter: &Filter) -> Result<Vec<T>, Error> {
        self.select(filter, true)?
            .into_iter()
            .map(from_document)
            .collect()
    }

    fn update(&self, id: &str, patch: &Patch) -> Result<(), Error> {
        if patch.is_empty() {
            // Nothing to merge, but the caller still expects a NotFound
            // check on the id.
            return match self.find_one(&Filter::by_id(id))? {
                Some(_) => Ok(()),
                None => Err(Error::NotFound),
            };
        }

        let mut assignments = Vec::new();
        let mut values = Vec::new();
        for (index, (name, value)) in patch.fields().enumerate() {
            assignments.push(format!("\"{name}\" = ?{}", index + 1));
            values.push(SqlValue::Text(value.to_string()));
        }
        values.push(SqlValue::Text(id.to_string()));

        let sql = format!(
            "UPDATE \"{}\" SET {} WHERE \"id\" = ?{}",
            T::COLLECTION,
            assignments.join(", "),
            values.len()
        );

        let connection = self.connection.lock().unwrap();
        let rows_affected = connection.execute(&sql, params_from_iter(values))?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), Error> {
        let connection = self.connection.lock().unwrap();
        connection.execute(
            &format!("DELETE FROM \"{}\" WHERE \"id\" = ?1", T::COLLECTION),
            [id],
        )?;

        Ok(())
    }

    fn delete_all(&self, filter: &Filter) -> Result<(), Error> {
        let mut sql = format!("DELETE FROM \"{}\"", T::COLLECTION);
        let values = Self::push_where_clause(&mut sql, filter);

        let connection = self.connection.lock().unwrap();
        connection.execute(&sql, params_from_iter(values))?;

        Ok(())
    }
}

/// Create the tables for every collection inside one SQL transaction.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    SqliteStore::<User>::create_table(&transaction)?;
    SqliteStore::<Earning>::create_table(&transaction)?;
    SqliteStore::<Expenditure>::create_table(&transaction)?;
    SqliteStore::<MonthlyEarningSum>::create_table(&transaction)?;
    SqliteStore::<MonthlyExpenditureSum>::create_table(&transaction)?;
    SqliteStore::<Budget>::create_table(&transaction)?;
    SqliteStore::<Finance>::create_table(&transaction)?;
    SqliteStore::<Tip>::create_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
