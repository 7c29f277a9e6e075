//! Defines the `Tip` type: a short savings hint, optionally attached to a
//! finance overview.

use serde::{Deserialize, Serialize};

use crate::{
    models::{RecordId, Timestamp},
    stores::Record,
};

/// A savings tip.
///
/// The category is free text rather than one of the fixed category sets, so
/// tips can cover topics the transaction categories do not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    pub id: RecordId,
    pub created_at: Timestamp,
    pub user_id: RecordId,
    pub category: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finance_id: Option<RecordId>,
}

/// The fields needed to create a [Tip].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTip {
    pub user_id: RecordId,
    pub category: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finance_id: Option<RecordId>,
}

impl Record for Tip {
    type Draft = NewTip;

    const COLLECTION: &'static str = "tips";
    const FIELDS: &'static [&'static str] = &["userId", "category", "text", "financeId"];

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
