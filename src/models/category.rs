//! The fixed category sets for earnings and expenditures, and the budgeting
//! styles a user can choose between.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The source of an earning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EarningCategory {
    Salary,
    Rental,
    Dividend,
    Refund,
    Gift,
    Other,
}

impl EarningCategory {
    /// Every earning category, in the order the monthly sum lists them.
    pub const ALL: [EarningCategory; 6] = [
        EarningCategory::Salary,
        EarningCategory::Rental,
        EarningCategory::Dividend,
        EarningCategory::Refund,
        EarningCategory::Gift,
        EarningCategory::Other,
    ];

    /// The lowercase name used on the wire and as the monthly sum bucket.
    pub fn as_str(&self) -> &'static str {
        match self {
            EarningCategory::Salary => "salary",
            EarningCategory::Rental => "rental",
            EarningCategory::Dividend => "dividend",
            EarningCategory::Refund => "refund",
            EarningCategory::Gift => "gift",
            EarningCategory::Other => "other",
        }
    }

    /// Parse a category from its lowercase name.
    ///
    /// # Errors
    /// Returns [Error::InvalidCategory] if `text` is not a known category.
    pub fn parse(text: &str) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == text)
            .ok_or_else(|| Error::InvalidCategory(text.to_string()))
    }
}

impl Display for EarningCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What an expenditure was spent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenditureCategory {
    Rent,
    House,
    Leisure,
    Food,
    Clothes,
    Travel,
    Insurance,
    Health,
    Other,
}

impl ExpenditureCategory {
    /// Every expenditure category, in the order the monthly sum lists them.
    pub const ALL: [ExpenditureCategory; 9] = [
        ExpenditureCategory::Rent,
        ExpenditureCategory::House,
        ExpenditureCategory::Leisure,
        ExpenditureCategory::Food,
        ExpenditureCategory::Clothes,
        ExpenditureCategory::Travel,
        ExpenditureCategory::Insurance,
        ExpenditureCategory::Health,
        ExpenditureCategory::Other,
    ];

    /// The lowercase name used on the wire and as the monthly sum bucket.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenditureCategory::Rent => "rent",
            ExpenditureCategory::House => "house",
            ExpenditureCategory::Leisure => "leisure",
            ExpenditureCategory::Food => "food",
            ExpenditureCategory::Clothes => "clothes",
            ExpenditureCategory::Travel => "travel",
            ExpenditureCategory::Insurance => "insurance",
            ExpenditureCategory::Health => "health",
            ExpenditureCategory::Other => "other",
        }
    }

    /// Parse a category from its lowercase name.
    ///
    /// # Errors
    /// Returns [Error::InvalidCategory] if `text` is not a known category.
    pub fn parse(text: &str) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == text)
            .ok_or_else(|| Error::InvalidCategory(text.to_string()))
    }
}

impl Display for ExpenditureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How aggressively a user wants to save, which determines the fraction of
/// monthly earnings allocated to each expenditure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetingStyle {
    /// Saves 10% of total earnings.
    Spender,
    /// Saves 20% of total earnings.
    Balanced,
    /// Saves 30% of total earnings.
    Saver,
}

impl BudgetingStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetingStyle::Spender => "spender",
            BudgetingStyle::Balanced => "balanced",
            BudgetingStyle::Saver => "saver",
        }
    }

    /// Parse a budgeting style from its lowercase name.
    ///
    /// # Errors
    /// Returns [Error::InvalidBudgetingStyle] if `text` is not a known style.
    pub fn parse(text: &str) -> Result<Self, Error> {
        match text {
            "spender" => Ok(BudgetingStyle::Spender),
            "balanced" => Ok(BudgetingStyle::Balanced),
            "saver" => Ok(BudgetingStyle::Saver),
            _ => Err(Error::InvalidBudgetingStyle(text.to_string())),
        }
    }
}

impl Display for BudgetingStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod category_tests {
    use super::{BudgetingStyle, EarningCategory, ExpenditureCategory};
    use crate::Error;

    #[test]
    fn earning_category_round_trips_through_name() {
        for category in EarningCategory::ALL {
            assert_eq!(EarningCategory::parse(category.as_str()), Ok(category));
        }
    }

    #[test]
    fn expenditure_category_round_trips_through_name() {
        for category in ExpenditureCategory::ALL {
            assert_eq!(ExpenditureCategory::parse(category.as_str()), Ok(category));
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert_eq!(
            EarningCategory::parse("lottery"),
            Err(Error::InvalidCategory("lottery".to_string()))
        );
        assert_eq!(
            ExpenditureCategory::parse("yachts"),
            Err(Error::InvalidCategory("yachts".to_string()))
        );
    }

    #[test]
    fn budgeting_style_parses_lowercase_names() {
        assert_eq!(
            BudgetingStyle::parse("balanced"),
            Ok(BudgetingStyle::Balanced)
        );
        assert_eq!(
            BudgetingStyle::parse("Spender"),
            Err(Error::InvalidBudgetingStyle("Spender".to_string()))
        );
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ExpenditureCategory::Health).unwrap();

        assert_eq!(json, "\"health\"");

        let parsed: EarningCategory = serde_json::from_str("\"salary\"").unwrap();
        assert_eq!(parsed, EarningCategory::Salary);
    }
}
