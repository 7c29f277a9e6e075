//! Defines the `Finance` type, which groups a month's budgets under one
//! budgeting style setting.

use serde::{Deserialize, Serialize};

use crate::{
    models::{BudgetingStyle, RecordId, Timestamp},
    stores::Record,
};

/// A month's finance overview: the style its budgets are computed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finance {
    pub id: RecordId,
    pub created_at: Timestamp,
    pub user_id: RecordId,
    pub title: String,
    pub month: String,
    pub year: String,
    pub budgeting_style: BudgetingStyle,
}

/// The fields needed to create a [Finance].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFinance {
    pub user_id: RecordId,
    pub title: String,
    pub month: String,
    pub year: String,
    pub budgeting_style: BudgetingStyle,
}

impl Record for Finance {
    type Draft = NewFinance;

    const COLLECTION: &'static str = "finances";
    const FIELDS: &'static [&'static str] =
        &["userId", "title", "month", "year", "budgetingStyle"];

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
