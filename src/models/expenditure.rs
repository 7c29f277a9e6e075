//! Defines the `Expenditure` type, the spending counterpart to
//! [Earning](crate::models::Earning).

use serde::{Deserialize, Serialize};

use crate::{
    models::{Amount, ExpenditureCategory, RecordId, Timestamp},
    stores::Record,
};

/// Money a user spent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expenditure {
    pub id: RecordId,
    pub created_at: Timestamp,
    pub user_id: RecordId,
    pub title: String,
    pub category: ExpenditureCategory,
    /// The ISO date (`YYYY-MM-DD`) the expenditure applies to.
    pub creation_date: String,
    #[serde(default)]
    pub description: String,
    pub amount: Amount,
    pub month: String,
    pub year: String,
}

/// The fields needed to create an [Expenditure].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpenditure {
    pub user_id: RecordId,
    pub title: String,
    pub category: ExpenditureCategory,
    pub creation_date: String,
    #[serde(default)]
    pub description: String,
    pub amount: Amount,
    pub month: String,
    pub year: String,
}

impl Record for Expenditure {
    type Draft = NewExpenditure;

    const COLLECTION: &'static str = "expenditures";
    const FIELDS: &'static [&'static str] = &[
        "userId",
        "title",
        "category",
        "creationDate",
        "description",
        "amount",
        "month",
        "year",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
