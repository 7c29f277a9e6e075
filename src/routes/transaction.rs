//! The shared handler core for the two transaction resources.
//!
//! Earnings and expenditures expose identical routes; the only differences
//! are the category set and which monthly sum they feed. Everything here is
//! generic over [MonthlyTransaction], and the thin per-resource modules
//! supply the concrete stores.
//!
//! Every write drives the matching sum row through [SummaryLedger], so the
//! monthly aggregates stay consistent with the records without the client
//! doing any bookkeeping.

use std::sync::Mutex;

use axum::Json;
use serde_json::{Value, json};

use crate::{
    Error,
    models::{
        Amount, Earning, EarningCategory, Expenditure, ExpenditureCategory, MonthlyEarningSum,
        MonthlyExpenditureSum, MonthlySummary, month_and_year, validate_month, validate_year,
    },
    routes::{body_text, require_amount, require_text},
    stores::{Document, Filter, Patch, Record, RecordStore, from_document},
    summary::{SummaryEntry, SummaryLedger},
};

/// A record kind whose amounts are aggregated into a monthly sum.
pub(crate) trait MonthlyTransaction: Record {
    /// The monthly sum kind this transaction feeds.
    type Sum: MonthlySummary;

    /// Validate a category name, returning its canonical form.
    fn canonical_category(text: &str) -> Result<&'static str, Error>;

    fn month(&self) -> &str;

    fn year(&self) -> &str;

    fn category_name(&self) -> &'static str;

    fn amount(&self) -> Amount;
}

impl MonthlyTransaction for Earning {
    type Sum = MonthlyEarningSum;

    fn canonical_category(text: &str) -> Result<&'static str, Error> {
        EarningCategory::parse(text).map(|category| category.as_str())
    }

    fn month(&self) -> &str {
        &self.month
    }

    fn year(&self) -> &str {
        &self.year
    }

    fn category_name(&self) -> &'static str {
        self.category.as_str()
    }

    fn amount(&self) -> Amount {
        self.amount
    }
}

impl MonthlyTransaction for Expenditure {
    type Sum = MonthlyExpenditureSum;

    fn canonical_category(text: &str) -> Result<&'static str, Error> {
        ExpenditureCategory::parse(text).map(|category| category.as_str())
    }

    fn month(&self) -> &str {
        &self.month
    }

    fn year(&self) -> &str {
        &self.year
    }

    fn category_name(&self) -> &'static str {
        self.category.as_str()
    }

    fn amount(&self) -> Amount {
        self.amount
    }
}

/// The contribution a record currently makes to its monthly sum.
fn entry_of<T: MonthlyTransaction>(record: &T) -> SummaryEntry<'_> {
    SummaryEntry {
        month: record.month(),
        year: record.year(),
        category: record.category_name(),
        amount: record.amount(),
    }
}

/// A filter matching one record owned by `user_id`. Records of other users
/// are invisible, so a foreign id reads as not-found.
fn owned_by(id: &str, user_id: &str) -> Filter {
    Filter::new().field("id", id).field("userId", user_id)
}

pub(crate) fn list<T: MonthlyTransaction>(
    records: &dyn RecordStore<T>,
    user_id: &str,
) -> Result<Json<Value>, Error> {
    let results = records.find_all(&Filter::new().field("userId", user_id))?;

    Ok(Json(json!({ "results": results })))
}

/// Validate the submitted fields, store the record with `month`/`year`
/// derived from the submitted date, and add its amount to the monthly sum.
pub(crate) fn create<T: MonthlyTransaction>(
    records: &dyn RecordStore<T>,
    sums: &dyn RecordStore<T::Sum>,
    guard: &Mutex<()>,
    user_id: &str,
    body: &Value,
) -> Result<T, Error> {
    let title = require_text(body, "title")?;
    let category = T::canonical_category(&require_text(body, "category")?)?;
    let amount = require_amount(body, "amount")?;
    let creation_date = require_text(body, "creationDate")?;
    let (month, year) = month_and_year(&creation_date)?;
    let description = body_text(body, "description").unwrap_or_default();

    let mut doc = Document::new();
    doc.insert("userId".to_string(), Value::String(user_id.to_string()));
    doc.insert("title".to_string(), Value::String(title));
    doc.insert("category".to_string(), Value::String(category.to_string()));
    doc.insert("creationDate".to_string(), Value::String(creation_date));
    doc.insert("description".to_string(), Value::String(description));
    doc.insert("amount".to_string(), Value::String(amount.to_string()));
    doc.insert("month".to_string(), Value::String(month.clone()));
    doc.insert("year".to_string(), Value::String(year.clone()));

    let created = records.create(from_document::<T::Draft>(doc)?)?;

    SummaryLedger::new(sums, guard).record_added(
        user_id,
        SummaryEntry {
            month: &month,
            year: &year,
            category,
            amount,
        },
    )?;

    Ok(created)
}

pub(crate) fn fetch<T: MonthlyTransaction>(
    records: &dyn RecordStore<T>,
    user_id: &str,
    id: &str,
) -> Result<T, Error> {
    records.find_one(&owned_by(id, user_id))?.ok_or(Error::NotFound)
}

/// Merge the submitted fields into the record and move its contribution
/// from the pre-edit to the post-edit monthly sum. A date change rederives
/// `month`/`year`; a change landing in a different month migrates the
/// amount between the two sum rows.
pub(crate) fn patch<T: MonthlyTransaction>(
    records: &dyn RecordStore<T>,
    sums: &dyn RecordStore<T::Sum>,
    guard: &Mutex<()>,
    user_id: &str,
    id: &str,
    body: &Value,
) -> Result<(), Error> {
    let existing = fetch(records, user_id, id)?;

    let mut patch = Patch::new();
    let mut new_month = existing.month().to_string();
    let mut new_year = existing.year().to_string();
    let mut new_category = existing.category_name();
    let mut new_amount = existing.amount();

    if let Some(title) = body_text(body, "title") {
        patch = patch.field("title", title);
    }
    if let Some(description) = body_text(body, "description") {
        patch = patch.field("description", description);
    }
    if let Some(text) = body_text(body, "category") {
        new_category = T::canonical_category(&text)?;
        patch = patch.field("category", new_category);
    }
    if let Some(text) = body_text(body, "amount") {
        new_amount = Amount::parse(&text)?;
        patch = patch.field("amount", new_amount.to_string());
    }
    if let Some(date) = body_text(body, "creationDate") {
        let (month, year) = month_and_year(&date)?;
        patch = patch
            .field("creationDate", date)
            .field("month", month.clone())
            .field("year", year.clone());
        new_month = month;
        new_year = year;
    }

    records.update(existing.id(), &patch)?;

    SummaryLedger::new(sums, guard).record_changed(
        user_id,
        entry_of(&existing),
        SummaryEntry {
            month: &new_month,
            year: &new_year,
            category: new_category,
            amount: new_amount,
        },
    )
}

/// Delete the record and subtract its amount from the monthly sum. Deleting
/// an id that does not exist (or belongs to someone else) is a no-op.
pub(crate) fn remove<T: MonthlyTransaction>(
    records: &dyn RecordStore<T>,
    sums: &dyn RecordStore<T::Sum>,
    guard: &Mutex<()>,
    user_id: &str,
    id: &str,
) -> Result<(), Error> {
    let Some(existing) = records.find_one(&owned_by(id, user_id))? else {
        return Ok(());
    };

    records.delete(existing.id())?;

    SummaryLedger::new(sums, guard).record_removed(user_id, entry_of(&existing))
}

/// The user's records for one month, in creation order on every backend.
pub(crate) fn list_for_month<T: MonthlyTransaction>(
    records: &dyn RecordStore<T>,
    user_id: &str,
    month: &str,
    year: &str,
) -> Result<Vec<T>, Error> {
    validate_month(month)?;
    validate_year(year)?;

    records.find_all_ascending(
        &Filter::new()
            .field("userId", user_id)
            .field("month", month)
            .field("year", year),
    )
}

/// The tail of [list_for_month]: the five most recently created records, in
/// creation order.
pub(crate) fn latest_five<T: MonthlyTransaction>(
    records: &dyn RecordStore<T>,
    user_id: &str,
    month: &str,
    year: &str,
) -> Result<Vec<T>, Error> {
    let mut results = list_for_month(records, user_id, month, year)?;

    let tail_start = results.len().saturating_sub(5);

    Ok(results.split_off(tail_start))
}
