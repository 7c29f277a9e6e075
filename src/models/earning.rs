//! Defines the `Earning` type, one of the two transaction kinds the monthly
//! sums aggregate.

use serde::{Deserialize, Serialize};

use crate::{
    models::{Amount, EarningCategory, RecordId, Timestamp},
    stores::Record,
};

/// Money a user received.
///
/// `month` and `year` are always derived from `creation_date`, so the three
/// fields stay consistent through edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Earning {
    pub id: RecordId,
    pub created_at: Timestamp,
    pub user_id: RecordId,
    pub title: String,
    pub category: EarningCategory,
    /// The ISO date (`YYYY-MM-DD`) the earning applies to.
    pub creation_date: String,
    #[serde(default)]
    pub description: String,
    pub amount: Amount,
    pub month: String,
    pub year: String,
}

/// The fields needed to create an [Earning].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEarning {
    pub user_id: RecordId,
    pub title: String,
    pub category: EarningCategory,
    pub creation_date: String,
    #[serde(default)]
    pub description: String,
    pub amount: Amount,
    pub month: String,
    pub year: String,
}

impl Record for Earning {
    type Draft = NewEarning;

    const COLLECTION: &'static str = "earnings";
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
