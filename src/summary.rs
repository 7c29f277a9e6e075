//! Keeps the monthly per-category sums synchronized with the individual
//! transactions they aggregate.
//!
//! Every transaction write maps onto a read-adjust-write of the matching
//! (userId, month, year) sum row: the first transaction of a month creates
//! the row lazily, later writes patch it, and deletion patches it back down
//! without ever removing the row. The read and the write-back are separate
//! store operations, so the whole sequence runs while holding a process-wide
//! guard; concurrent adjustments to the same row cannot lose an update.

use std::sync::Mutex;

use serde_json::Value;

use crate::{
    Error,
    models::{Amount, MonthlySummary},
    stores::{Document, Filter, Patch, RecordStore, from_document, to_document},
};

/// One transaction's contribution to a monthly sum: where it lands and how
/// much it adds.
#[derive(Debug, Clone, Copy)]
pub struct SummaryEntry<'a> {
    pub month: &'a str,
    pub year: &'a str,
    /// The bucket name, one of the summary's category fields.
    pub category: &'static str,
    pub amount: Amount,
}

/// Applies transaction changes to the monthly sum rows of one aggregate
/// kind.
pub struct SummaryLedger<'a, S: MonthlySummary> {
    store: &'a dyn RecordStore<S>,
    guard: &'a Mutex<()>,
}

impl<'a, S: MonthlySummary> SummaryLedger<'a, S> {
    pub fn new(store: &'a dyn RecordStore<S>, guard: &'a Mutex<()>) -> Self {
        Self { store, guard }
    }

    /// Add a newly created transaction's amount to its month's sum row,
    /// creating the row if this is the month's first transaction.
    ///
    /// # Panics
    /// Panics if the ledger guard is poisoned.
    pub fn record_added(&self, user_id: &str, entry: SummaryEntry) -> Result<(), Error> {
        validate_bucket::<S>(entry.category)?;
        let _held = self.guard.lock().unwrap();

        self.add(user_id, entry)
    }

    /// Subtract a deleted transaction's amount from its month's sum row.
    ///
    /// The row is patched down, not deleted; a month whose transactions are
    /// all gone keeps an all-zero row. If no row exists there is nothing to
    /// adjust.
    ///
    /// # Panics
    /// Panics if the ledger guard is poisoned.
    pub fn record_removed(&self, user_id: &str, entry: SummaryEntry) -> Result<(), Error> {
        validate_bucket::<S>(entry.category)?;
        let _held = self.guard.lock().unwrap();

        self.subtract(user_id, entry)
    }

    /// Move a transaction's contribution from its pre-edit state to its
    /// post-edit state.
    ///
    /// An edit within one month adjusts that month's row in a single
    /// read-adjust-write, even when the category changed. An edit that moves
    /// the transaction to a different month subtracts from the old month's
    /// row and adds to the new month's row, creating the latter if absent.
    ///
    /// # Panics
    /// Panics if the ledger guard is poisoned.
    pub fn record_changed(
        &self,
        user_id: &str,
        old: SummaryEntry,
        new: SummaryEntry,
    ) -> Result<(), Error> {
        validate_bucket::<S>(old.category)?;
        validate_bucket::<S>(new.category)?;
        let _held = self.guard.lock().unwrap();

        if old.month == new.month && old.year == new.year {
            return self.shift_within_month(user_id, old, new);
        }

        self.subtract(user_id, old)?;
        self.add(user_id, new)
    }

    fn add(&self, user_id: &str, entry: SummaryEntry) -> Result<(), Error> {
        let filter = row_filter(user_id, entry.month, entry.year);

        match self.store.find_one(&filter)? {
            Some(row) => {
                let mut doc = to_document(&row)?;
                apply(&mut doc, "totalSum", entry.amount)?;
                apply(&mut doc, entry.category, entry.amount)?;

                let patch = Patch::new()
                    .field("totalSum", field_text(&doc, "totalSum"))
                    .field(entry.category, field_text(&doc, entry.category));
                self.store.update(row.id(), &patch)
            }
            None => {
                let mut doc = zero_document::<S>(user_id, entry.month, entry.year);
                apply(&mut doc, "totalSum", entry.amount)?;
                apply(&mut doc, entry.category, entry.amount)?;

                let draft = from_document::<S::Draft>(doc)?;
                self.store.create(draft)?;

                Ok(())
            }
        }
    }

    fn subtract(&self, user_id: &str, entry: SummaryEntry) -> Result<(), Error> {
        let filter = row_filter(user_id, entry.month, entry.year);

        let Some(row) = self.store.find_one(&filter)? else {
            return Ok(());
        };

        let mut doc = to_document(&row)?;
        apply(&mut doc, "totalSum", Amount::ZERO - entry.amount)?;
        apply(&mut doc, entry.category, Amount::ZERO - entry.amount)?;

        let patch = Patch::new()
            .field("totalSum", field_text(&doc, "totalSum"))
            .field(entry.category, field_text(&doc, entry.category));
        self.store.update(row.id(), &patch)
    }

    fn shift_within_month(
        &self,
        user_id: &str,
        old: SummaryEntry,
        new: SummaryEntry,
    ) -> Result<(), Error> {
        let filter = row_filter(user_id, new.month, new.year);

        let mut doc = match self.store.find_one(&filter)? {
            Some(row) => Some(to_document(&row)?),
            None => None,
        }
        .unwrap_or_else(|| zero_document::<S>(user_id, new.month, new.year));

        apply(&mut doc, "totalSum", new.amount - old.amount)?;
        apply(&mut doc, old.category, Amount::ZERO - old.amount)?;
        apply(&mut doc, new.category, new.amount)?;

        match doc.get("id").and_then(Value::as_str).map(str::to_string) {
            Some(id) => {
                let mut patch = Patch::new()
                    .field("totalSum", field_text(&doc, "totalSum"))
                    .field(old.category, field_text(&doc, old.category));
                if new.category != old.category {
                    patch = patch.field(new.category, field_text(&doc, new.category));
                }
                self.store.update(&id, &patch)
            }
            None => {
                let draft = from_document::<S::Draft>(doc)?;
                self.store.create(draft)?;

                Ok(())
            }
        }
    }
}

/// The all-zero sum row for a (userId, month, year), in document form.
///
/// This is also what aggregate reads return when no row exists; the zero
/// row is synthesized at the read boundary and never stored.
pub fn zero_document<S: MonthlySummary>(user_id: &str, month: &str, year: &str) -> Document {
    let mut doc = Document::new();

    doc.insert("userId".to_string(), Value::String(user_id.to_string()));
    doc.insert("month".to_string(), Value::String(month.to_string()));
    doc.insert("year".to_string(), Value::String(year.to_string()));
    doc.insert(
        "totalSum".to_string(),
        Value::String(Amount::ZERO.to_string()),
    );
    for bucket in S::BUCKETS {
        doc.insert(
            (*bucket).to_string(),
            Value::String(Amount::ZERO.to_string()),
        );
    }

    doc
}

fn validate_bucket<S: MonthlySummary>(category: &str) -> Result<(), Error> {
    if S::BUCKETS.contains(&category) {
        Ok(())
    } else {
        Err(Error::InvalidCategory(category.to_string()))
    }
}

fn row_filter(user_id: &str, month: &str, year: &str) -> Filter {
    Filter::new()
        .field("userId", user_id)
        .field("month", month)
        .field("year", year)
}

/// Add `delta` to the amount held in `doc[field]`, writing the result back
/// as its decimal string.
fn apply(doc: &mut Document, field: &str, delta: Amount) -> Result<(), Error> {
    let current = match doc.get(field).and_then(Value::as_str) {
        Some(text) => Amount::parse(text)?,
        None => Amount::ZERO,
    };

    doc.insert(
        field.to_string(),
        Value::String((current + delta).to_string()),
    );

    Ok(())
}

fn field_text(doc: &Document, field: &str) -> String {
    doc.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod summary_ledger_tests {
    use std::sync::Mutex;

    use super::{SummaryEntry, SummaryLedger};
    use crate::{
        Error,
        models::{Amount, MonthlyEarningSum},
        stores::{Filter, MemoryStore, RecordStore},
    };

    fn entry<'a>(month: &'a str, year: &'a str, category: &'static str, amount: &str) -> SummaryEntry<'a> {
        SummaryEntry {
            month,
            year,
            category,
            amount: Amount::parse(amount).unwrap(),
        }
    }

    fn read_row(store: &MemoryStore<MonthlyEarningSum>, month: &str, year: &str) -> MonthlyEarningSum {
        store
            .find_one(
                &Filter::new()
                    .field("userId", "user-1")
                    .field("month", month)
                    .field("year", year),
            )
            .unwrap()
            .expect("sum row should exist")
    }

    #[test]
    fn first_transaction_creates_the_sum_row() {
        let store = MemoryStore::new();
        let guard = Mutex::new(());
        let ledger = SummaryLedger::new(&store, &guard);

        ledger
            .record_added("user-1", entry("04", "2022", "salary", "41"))
            .unwrap();

        let row = read_row(&store, "04", "2022");
        assert_eq!(row.total_sum.to_string(), "41.00");
        assert_eq!(row.salary.to_string(), "41.00");
        assert_eq!(row.rental, Amount::ZERO);
        assert_eq!(row.dividend, Amount::ZERO);
        assert_eq!(row.refund, Amount::ZERO);
        assert_eq!(row.gift, Amount::ZERO);
        assert_eq!(row.other, Amount::ZERO);
    }

    #[test]
    fn later_transactions_patch_the_same_row() {
        let store = MemoryStore::new();
        let guard = Mutex::new(());
        let ledger = SummaryLedger::new(&store, &guard);

        ledger
            .record_added("user-1", entry("04", "2022", "salary", "41"))
            .unwrap();
        ledger
            .record_added("user-1", entry("04", "2022", "gift", "9.50"))
            .unwrap();

        let row = read_row(&store, "04", "2022");
        assert_eq!(row.total_sum.to_string(), "50.50");
        assert_eq!(row.salary.to_string(), "41.00");
        assert_eq!(row.gift.to_string(), "9.50");

        let all: Vec<MonthlyEarningSum> = store.find_all(&Filter::new()).unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn amount_edit_moves_the_difference() {
        let store = MemoryStore::new();
        let guard = Mutex::new(());
        let ledger = SummaryLedger::new(&store, &guard);

        ledger
            .record_added("user-1", entry("04", "2022", "salary", "41"))
            .unwrap();
        ledger
            .record_changed(
                "user-1",
                entry("04", "2022", "salary", "41"),
                entry("04", "2022", "salary", "12"),
            )
            .unwrap();

        let row = read_row(&store, "04", "2022");
        assert_eq!(row.total_sum.to_string(), "12.00");
        assert_eq!(row.salary.to_string(), "12.00");
    }

    #[test]
    fn category_edit_moves_the_amount_between_buckets() {
        let store = MemoryStore::new();
        let guard = Mutex::new(());
        let ledger = SummaryLedger::new(&store, &guard);

        ledger
            .record_added("user-1", entry("04", "2022", "salary", "41"))
            .unwrap();
        ledger
            .record_changed(
                "user-1",
                entry("04", "2022", "salary", "41"),
                entry("04", "2022", "dividend", "41"),
            )
            .unwrap();

        let row = read_row(&store, "04", "2022");
        assert_eq!(row.total_sum.to_string(), "41.00");
        assert_eq!(row.salary, Amount::ZERO);
        assert_eq!(row.dividend.to_string(), "41.00");
    }

    #[test]
    fn cross_month_edit_moves_the_contribution() {
        let store = MemoryStore::new();
        let guard = Mutex::new(());
        let ledger = SummaryLedger::new(&store, &guard);

        ledger
            .record_added("user-1", entry("04", "2022", "salary", "41"))
            .unwrap();
        ledger
            .record_changed(
                "user-1",
                entry("04", "2022", "salary", "41"),
                entry("05", "2022", "salary", "41"),
            )
            .unwrap();

        let april = read_row(&store, "04", "2022");
        assert_eq!(april.total_sum, Amount::ZERO);
        assert_eq!(april.salary, Amount::ZERO);

        let may = read_row(&store, "05", "2022");
        assert_eq!(may.total_sum.to_string(), "41.00");
        assert_eq!(may.salary.to_string(), "41.00");
    }

    #[test]
    fn deletion_zeroes_the_row_but_keeps_it() {
        let store = MemoryStore::new();
        let guard = Mutex::new(());
        let ledger = SummaryLedger::new(&store, &guard);

        ledger
            .record_added("user-1", entry("04", "2022", "salary", "41"))
            .unwrap();
        ledger
            .record_removed("user-1", entry("04", "2022", "salary", "41"))
            .unwrap();

        let row = read_row(&store, "04", "2022");
        assert_eq!(row.total_sum, Amount::ZERO);
        assert_eq!(row.salary, Amount::ZERO);
    }

    #[test]
    fn removal_without_a_row_is_a_no_op() {
        let store: MemoryStore<MonthlyEarningSum> = MemoryStore::new();
        let guard = Mutex::new(());
        let ledger = SummaryLedger::new(&store, &guard);

        ledger
            .record_removed("user-1", entry("04", "2022", "salary", "41"))
            .unwrap();

        assert!(store.find_one(&Filter::new()).unwrap().is_none());
    }

    #[test]
    fn unknown_bucket_is_rejected() {
        let store: MemoryStore<MonthlyEarningSum> = MemoryStore::new();
        let guard = Mutex::new(());
        let ledger = SummaryLedger::new(&store, &guard);

        let result = ledger.record_added("user-1", entry("04", "2022", "rent", "41"));

        assert_eq!(result, Err(Error::InvalidCategory("rent".to_string())));
    }

    #[test]
    fn sums_stay_consistent_through_decimal_amounts() {
        let store = MemoryStore::new();
        let guard = Mutex::new(());
        let ledger = SummaryLedger::new(&store, &guard);

        // 0.1 + 0.2 style additions must not drift.
        ledger
            .record_added("user-1", entry("04", "2022", "salary", "0.10"))
            .unwrap();
        ledger
            .record_added("user-1", entry("04", "2022", "salary", "0.20"))
            .unwrap();

        let row = read_row(&store, "04", "2022");
        assert_eq!(row.total_sum.to_string(), "0.30");
        assert_eq!(row.salary.to_string(), "0.30");
    }
}
