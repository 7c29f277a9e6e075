//! Derives budget targets and remaining funds from the monthly sums.
//!
//! Each budgeting style allocates a fixed fraction of the month's total
//! earnings to every expenditure category; whatever the fractions leave over
//! is the style's savings rate (10% for spenders, 20% for balanced, 30% for
//! savers). The projection is pure: it is recomputed from the current sums
//! on every read, so the `target`/`funds` values cached on a stored budget
//! are never trusted without recomputing first.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{Amount, BudgetingStyle, ExpenditureCategory};

/// The fraction of monthly earnings allocated to `category` under `style`.
pub fn target_fraction(style: BudgetingStyle, category: ExpenditureCategory) -> Decimal {
    use BudgetingStyle::{Balanced, Saver, Spender};
    use ExpenditureCategory::{
        Clothes, Food, Health, House, Insurance, Leisure, Other, Rent, Travel,
    };

    match (style, category) {
        (Spender, Rent) => dec!(0.30),
        (Spender, House) => dec!(0.05),
        (Spender, Leisure) => dec!(0.075),
        (Spender, Food) => dec!(0.15),
        (Spender, Clothes) => dec!(0.10),
        (Spender, Travel) => dec!(0.075),
        (Spender, Insurance) => dec!(0.05),
        (Spender, Health) => dec!(0.05),
        (Spender, Other) => dec!(0.05),

        (Balanced, Rent) => dec!(0.30),
        (Balanced, House) => dec!(0.05),
        (Balanced, Leisure) => dec!(0.075),
        (Balanced, Food) => dec!(0.15),
        (Balanced, Clothes) => dec!(0.075),
        (Balanced, Travel) => dec!(0.05),
        (Balanced, Insurance) => dec!(0.05),
        (Balanced, Health) => dec!(0.05),
        (Balanced, Other) => dec!(0.00),

        (Saver, Rent) => dec!(0.25),
        (Saver, House) => dec!(0.05),
        (Saver, Leisure) => dec!(0.05),
        (Saver, Food) => dec!(0.10),
        (Saver, Clothes) => dec!(0.05),
        (Saver, Travel) => dec!(0.05),
        (Saver, Insurance) => dec!(0.05),
        (Saver, Health) => dec!(0.05),
        (Saver, Other) => dec!(0.05),
    }
}

/// A budget's derived numbers for one category and month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetProjection {
    /// The allocated fraction of monthly earnings.
    pub target: Decimal,
    /// The allocation in money: `target` × the month's total earnings.
    pub funds: Amount,
    /// What the month's sums say was spent on the category so far.
    pub expenses: Amount,
    /// `funds − expenses`, rounded to the nearest whole unit.
    pub funds_remaining: Amount,
}

impl BudgetProjection {
    /// Project a category budget from the current monthly sums.
    pub fn compute(
        style: BudgetingStyle,
        category: ExpenditureCategory,
        monthly_earnings_total: Amount,
        category_expenses: Amount,
    ) -> Self {
        let target = target_fraction(style, category);
        let funds = monthly_earnings_total.scale_by(target);
        let funds_remaining = (funds - category_expenses).rounded_whole();

        Self {
            target,
            funds,
            expenses: category_expenses,
            funds_remaining,
        }
    }
}
