//! Defines the `Budget` type: a per-category spending allocation for one
//! month, derived from the user's budgeting style.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    models::{Amount, BudgetingStyle, ExpenditureCategory, RecordId, Timestamp},
    stores::Record,
};

/// A spending allocation for one expenditure category in one month.
///
/// `target` and `funds` are caches of the projection at the time the budget
/// was created or last patched; reads recompute both from the current
/// monthly sums, so the stored values may be stale in between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: RecordId,
    pub created_at: Timestamp,
    pub user_id: RecordId,
    pub category: ExpenditureCategory,
    #[serde(default)]
    pub text: String,
    /// The fraction of monthly earnings allocated to `category`.
    pub target: Decimal,
    /// `target` × the month's total earnings, at the time of the last write.
    pub funds: Amount,
    pub month: String,
    pub year: String,
    pub budgeting_style: BudgetingStyle,
}

/// The fields needed to create a [Budget].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub user_id: RecordId,
    pub category: ExpenditureCategory,
    #[serde(default)]
    pub text: String,
    pub target: Decimal,
    pub funds: Amount,
    pub month: String,
    pub year: String,
    pub budgeting_style: BudgetingStyle,
}

impl Record for Budget {
    type Draft = NewBudget;

    const COLLECTION: &'static str = "budgets";
    const FIELDS: &'static [&'static str] = &[
        "userId",
        "category",
        "text",
        "target",
        "funds",
        "month",
        "year",
        "budgetingStyle",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
