//! Defines the two monthly aggregate types: per-user per-month sums of
//! earnings and expenditures, broken out by category.
//!
//! At most one row exists per (userId, month, year) and kind. Rows are
//! created lazily by the first transaction of a month and are patched, never
//! deleted, as transactions change.

use serde::{Deserialize, Serialize};

use crate::{
    models::{Amount, EarningCategory, ExpenditureCategory, RecordId, Timestamp},
    stores::Record,
};

/// A monthly aggregate record with one [Amount] bucket per category.
///
/// `BUCKETS` names the per-category fields in wire order; the maintenance
/// protocol adjusts buckets by name so it can treat both aggregate kinds
/// uniformly.
pub trait MonthlySummary: Record {
    const BUCKETS: &'static [&'static str];
}

/// The per-category sums of a user's earnings in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEarningSum {
    pub id: RecordId,
    pub created_at: Timestamp,
    pub user_id: RecordId,
    pub month: String,
    pub year: String,
    /// Always equals the sum of the category buckets below.
    pub total_sum: Amount,
    pub salary: Amount,
    pub rental: Amount,
    pub dividend: Amount,
    pub refund: Amount,
    pub gift: Amount,
    pub other: Amount,
}

impl MonthlyEarningSum {
    /// The bucket for one earning category.
    pub fn category_total(&self, category: EarningCategory) -> Amount {
        match category {
            EarningCategory::Salary => self.salary,
            EarningCategory::Rental => self.rental,
            EarningCategory::Dividend => self.dividend,
            EarningCategory::Refund => self.refund,
            EarningCategory::Gift => self.gift,
            EarningCategory::Other => self.other,
        }
    }
}

/// The fields needed to create a [MonthlyEarningSum].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMonthlyEarningSum {
    pub user_id: RecordId,
    pub month: String,
    pub year: String,
    pub total_sum: Amount,
    pub salary: Amount,
    pub rental: Amount,
    pub dividend: Amount,
    pub refund: Amount,
    pub gift: Amount,
    pub other: Amount,
}

impl Record for MonthlyEarningSum {
    type Draft = NewMonthlyEarningSum;

    const COLLECTION: &'static str = "sumsUserMonthEarnings";
    const FIELDS: &'static [&'static str] = &[
        "userId", "month", "year", "totalSum", "salary", "rental", "dividend", "refund", "gift",
        "other",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

impl MonthlySummary for MonthlyEarningSum {
    const BUCKETS: &'static [&'static str] =
        &["salary", "rental", "dividend", "refund", "gift", "other"];
}

/// The per-category sums of a user's expenditures in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyExpenditureSum {
    pub id: RecordId,
    pub created_at: Timestamp,
    pub user_id: RecordId,
    pub month: String,
    pub year: String,
    /// Always equals the sum of the category buckets below.
    pub total_sum: Amount,
    pub rent: Amount,
    pub house: Amount,
    pub leisure: Amount,
    pub food: Amount,
    pub clothes: Amount,
    pub travel: Amount,
    pub insurance: Amount,
    pub health: Amount,
    pub other: Amount,
}

impl MonthlyExpenditureSum {
    /// The bucket for one expenditure category.
    pub fn category_total(&self, category: ExpenditureCategory) -> Amount {
        match category {
            ExpenditureCategory::Rent => self.rent,
            ExpenditureCategory::House => self.house,
            ExpenditureCategory::Leisure => self.leisure,
            ExpenditureCategory::Food => self.food,
            ExpenditureCategory::Clothes => self.clothes,
            ExpenditureCategory::Travel => self.travel,
            ExpenditureCategory::Insurance => self.insurance,
            ExpenditureCategory::Health => self.health,
            ExpenditureCategory::Other => self.other,
        }
    }
}

/// The fields needed to create a [MonthlyExpenditureSum].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMonthlyExpenditureSum {
    pub user_id: RecordId,
    pub month: String,
    pub year: String,
    pub total_sum: Amount,
    pub rent: Amount,
    pub house: Amount,
    pub leisure: Amount,
    pub food: Amount,
    pub clothes: Amount,
    pub travel: Amount,
    pub insurance: Amount,
    pub health: Amount,
    pub other: Amount,
}

impl Record for MonthlyExpenditureSum {
    type Draft = NewMonthlyExpenditureSum;

    const COLLECTION: &'static str = "sumsUserMonthExpenditures";
    const FIELDS: &'static [&'static str] = &[
        "userId",
        "month",
        "year",
        "totalSum",
        "rent",
        "house",
        "leisure",
        "food",
        "clothes",
        "travel",
        "insurance",
        "health",
        "other",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

impl MonthlySummary for MonthlyExpenditureSum {
    const BUCKETS: &'static [&'static str] = &[
        "rent",
        "house",
        "leisure",
        "food",
        "clothes",
        "travel",
        "insurance",
        "health",
        "other",
    ];
}

#[cfg(test)]
mod summary_model_tests {
    use super::{MonthlyEarningSum, MonthlySummary, MonthlyExpenditureSum};
    use crate::models::{EarningCategory, ExpenditureCategory};

    #[test]
    fn buckets_match_the_category_sets() {
        let earning_names: Vec<&str> = EarningCategory::ALL
            .iter()
            .map(|category| category.as_str())
            .collect();
        assert_eq!(MonthlyEarningSum::BUCKETS, earning_names.as_slice());

        let expenditure_names: Vec<&str> = ExpenditureCategory::ALL
            .iter()
            .map(|category| category.as_str())
            .collect();
        assert_eq!(MonthlyExpenditureSum::BUCKETS, expenditure_names.as_slice());
    }
}
