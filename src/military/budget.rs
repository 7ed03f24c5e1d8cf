//! Shared rating budget consumed by the allocation passes

use serde::{Deserialize, Serialize};

use super::rating::{combine, combine_all, rating_needed};
use crate::core::config::BudgetRule;
use crate::core::types::Rating;

const COVER_TOLERANCE: f64 = 1e-9;

/// The remaining force available for this turn's plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    rule: BudgetRule,
    starting: Rating,
    remaining: Rating,
}

impl Budget {
    pub fn new(rule: BudgetRule, starting: Rating) -> Self {
        let starting = starting.max(0.0);
        Self {
            rule,
            starting,
            remaining: starting,
        }
    }

    /// Build the budget from the ratings of every available unit group
    pub fn from_ratings<I>(rule: BudgetRule, ratings: I) -> Self
    where
        I: IntoIterator<Item = Rating>,
    {
        let total = match rule {
            BudgetRule::Concentration => combine_all(ratings),
            BudgetRule::Linear => ratings.into_iter().map(|r| r.max(0.0)).sum(),
        };
        Self::new(rule, total)
    }

    pub fn rule(&self) -> BudgetRule {
        self.rule
    }

    pub fn starting(&self) -> Rating {
        self.starting
    }

    pub fn remaining(&self) -> Rating {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining <= f64::EPSILON
    }

    /// Whether `amount` fits, allowing for float drift in the running total
    pub fn can_cover(&self, amount: Rating) -> bool {
        amount <= self.remaining + COVER_TOLERANCE * self.remaining.max(1.0)
    }

    /// Take up to `amount` from the budget and return what was actually granted
    pub fn take(&mut self, amount: Rating) -> Rating {
        let granted = amount.max(0.0).min(self.remaining);
        self.remaining = match self.rule {
            BudgetRule::Concentration => rating_needed(self.remaining, granted),
            BudgetRule::Linear => (self.remaining - granted).max(0.0),
        };
        granted
    }

    /// Extra grant needed to raise an existing grant from `current` to `target`
    pub fn top_up_cost(&self, target: Rating, current: Rating) -> Rating {
        match self.rule {
            BudgetRule::Concentration => rating_needed(target, current),
            BudgetRule::Linear => (target - current).max(0.0),
        }
    }

    /// Fold an extra grant into an existing one
    pub fn merge(&self, current: Rating, extra: Rating) -> Rating {
        match self.rule {
            BudgetRule::Concentration => combine(current, extra),
            BudgetRule::Linear => current + extra.max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_take_subtracts() {
        let mut budget = Budget::new(BudgetRule::Linear, 1000.0);
        assert_eq!(budget.take(140.0), 140.0);
        assert!((budget.remaining() - 860.0).abs() < 1e-9);
    }

    #[test]
    fn test_concentration_take_uses_inverse_combine() {
        let mut budget = Budget::new(BudgetRule::Concentration, 1000.0);
        budget.take(140.0);
        let expected = (1000f64.sqrt() - 140f64.sqrt()).powi(2);
        assert!((budget.remaining() - expected).abs() < 1e-9);
        // Granting what is left recombines to the starting force
        assert!((combine(140.0, budget.remaining()) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_take_never_exceeds_remaining() {
        let mut budget = Budget::new(BudgetRule::Concentration, 50.0);
        assert_eq!(budget.take(80.0), 50.0);
        assert!(budget.is_exhausted());
        assert_eq!(budget.take(10.0), 0.0);
    }

    #[test]
    fn test_from_ratings() {
        let concentrated = Budget::from_ratings(BudgetRule::Concentration, [25.0, 25.0]);
        assert!((concentrated.starting() - 100.0).abs() < 1e-9);
        let linear = Budget::from_ratings(BudgetRule::Linear, [25.0, 25.0]);
        assert!((linear.starting() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_up_round_trip() {
        let budget = Budget::new(BudgetRule::Concentration, 500.0);
        let cost = budget.top_up_cost(200.0, 140.0);
        assert!((budget.merge(140.0, cost) - 200.0).abs() < 1e-9);

        let linear = Budget::new(BudgetRule::Linear, 500.0);
        assert_eq!(linear.top_up_cost(200.0, 140.0), 60.0);
        assert_eq!(linear.merge(140.0, 60.0), 200.0);
    }
}
