//! Per-attempt planning state threaded through every allocator call

use super::request::{AllocationRequest, RequestTable};
use super::shortfall::Shortfall;
use super::tier::Tier;
use crate::core::config::{AllocationConfig, TierConfig};
use crate::core::types::Rating;
use crate::military::Budget;

/// Fresh for every pass-1 attempt; nothing here outlives the turn
#[derive(Debug)]
pub struct AllocationContext<'a> {
    config: &'a AllocationConfig,
    budget: Budget,
    requests: RequestTable,
    shortfalls: Vec<Shortfall>,
    may_reset: bool,
}

impl<'a> AllocationContext<'a> {
    pub fn new(config: &'a AllocationConfig, budget: Budget, may_reset: bool) -> Self {
        Self {
            config,
            budget,
            requests: RequestTable::new(),
            shortfalls: Vec::new(),
            may_reset,
        }
    }

    pub fn config(&self) -> &AllocationConfig {
        self.config
    }

    pub fn tier_config(&self, tier: Tier) -> &TierConfig {
        self.config.tier(tier)
    }

    pub fn safety_factor(&self) -> f64 {
        self.config.safety_factor()
    }

    pub fn threat_bias(&self) -> f64 {
        self.config.threat_bias
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    pub fn budget_mut(&mut self) -> &mut Budget {
        &mut self.budget
    }

    /// Whether this attempt may still abort and restart pass 1
    pub fn may_reset(&self) -> bool {
        self.may_reset
    }

    /// Fraction of the starting budget above which a critical minimum resets
    pub fn reset_fraction(&self, tier: Tier) -> Option<f64> {
        match tier {
            Tier::CapitalDefense => Some(self.config.reset.capital_fraction),
            Tier::PlanetDefense => Some(self.config.reset.planet_fraction),
            _ => None,
        }
    }

    /// Largest request a single non-capital defense location may hold
    pub fn planet_cap(&self) -> Rating {
        self.config.planet_budget_cap * self.budget.starting()
    }

    pub fn register(&mut self, request: AllocationRequest) {
        self.requests.push(request);
    }

    pub fn record(&mut self, shortfall: Shortfall) {
        shortfall.log();
        self.shortfalls.push(shortfall);
    }

    pub fn requests(&self) -> &RequestTable {
        &self.requests
    }

    pub fn shortfalls(&self) -> &[Shortfall] {
        &self.shortfalls
    }

    pub(crate) fn split_mut(&mut self) -> (&mut Budget, &mut RequestTable) {
        (&mut self.budget, &mut self.requests)
    }

    pub(crate) fn into_parts(self) -> (Budget, RequestTable, Vec<Shortfall>) {
        (self.budget, self.requests, self.shortfalls)
    }
}
