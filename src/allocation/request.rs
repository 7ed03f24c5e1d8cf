//! Allocation requests and the resulting per-turn plan

use serde::{Deserialize, Serialize};

use super::shortfall::Shortfall;
use super::tier::Tier;
use crate::core::types::{LocationId, Rating};

/// A tier's registered claim on the budget for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub location: LocationId,
    pub tier: Tier,
    pub threat: Rating,
    pub min_rating: Rating,
    pub max_rating: Rating,
    pub take_any: bool,
    /// What the minimum pass granted
    pub pass1_granted: Rating,
    /// Rating granted so far; below `min_rating` only for take-any partial grants
    pub granted: Rating,
}

/// Requests grouped by tier, each list in candidate order
#[derive(Debug, Clone, Default)]
pub struct RequestTable {
    by_tier: [Vec<AllocationRequest>; 8],
}

impl RequestTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: AllocationRequest) {
        self.by_tier[request.tier as usize].push(request);
    }

    pub fn tier(&self, tier: Tier) -> &[AllocationRequest] {
        &self.by_tier[tier as usize]
    }

    pub fn tier_mut(&mut self, tier: Tier) -> &mut Vec<AllocationRequest> {
        &mut self.by_tier[tier as usize]
    }

    /// All requests in tier priority order
    pub fn iter(&self) -> impl Iterator<Item = &AllocationRequest> {
        self.by_tier.iter().flat_map(|requests| requests.iter())
    }

    pub fn len(&self) -> usize {
        self.by_tier.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_granted(&self) -> Rating {
        self.iter().map(|r| r.granted).sum()
    }
}

/// One line of the final plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub location: LocationId,
    pub tier: Tier,
    pub threat: Rating,
    pub min_rating: Rating,
    pub max_rating: Rating,
    /// What pass 1 granted
    pub pass1_granted: Rating,
    /// Final grant after the top-up pass
    pub granted: Rating,
    pub take_any: bool,
}

/// Output of the planner, valid for exactly one turn
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllocationPlan {
    /// Entries in tier priority order
    pub entries: Vec<PlanEntry>,
    pub starting_budget: Rating,
    pub remaining_after_minimums: Rating,
    pub remaining: Rating,
    pub resets: u32,
    pub shortfalls: Vec<Shortfall>,
}

impl AllocationPlan {
    pub fn entry(&self, location: LocationId) -> Option<&PlanEntry> {
        self.entries.iter().find(|e| e.location == location)
    }

    pub fn entries_for(&self, tier: Tier) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter().filter(move |e| e.tier == tier)
    }

    pub fn pass1_total(&self) -> Rating {
        self.entries.iter().map(|e| e.pass1_granted).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
