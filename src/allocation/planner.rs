//! Two-pass allocation across the fixed priority tiers
//!
//! Pass 1 walks the tiers in priority order and grants every location its
//! minimum from the shared budget. A critical tier that finds itself far
//! short may abort the pass once: existing missions are released inside the
//! snapshot and pass 1 restarts from scratch. Pass 2 then tops requests up
//! toward their maximum, tier by tier, cheapest top-up first, until the
//! budget runs out.

use ahash::AHashSet;
use ordered_float::OrderedFloat;

use super::allocator::{allocator_for, AllocationOutcome};
use super::context::AllocationContext;
use super::request::{AllocationPlan, PlanEntry, RequestTable};
use super::shortfall::{Shortfall, ShortfallKind};
use super::tier::Tier;
use crate::core::config::AllocationConfig;
use crate::core::types::{LocationId, Rating};
use crate::military::Budget;
use crate::world::snapshot::TurnSnapshot;

enum MinimumPass {
    Complete,
    Reset {
        location: LocationId,
        tier: Tier,
        required: Rating,
    },
}

/// Owns the claimed-location set for the duration of one plan
#[derive(Debug)]
pub struct AllocationPlanner<'a> {
    config: &'a AllocationConfig,
    claimed: AHashSet<LocationId>,
}

impl<'a> AllocationPlanner<'a> {
    pub fn new(config: &'a AllocationConfig) -> Self {
        Self {
            config,
            claimed: AHashSet::new(),
        }
    }

    /// Produce this turn's plan
    ///
    /// The snapshot is mutated only by a reset, which releases existing
    /// missions so their groups count toward the budget.
    pub fn plan(&mut self, snapshot: &mut TurnSnapshot) -> AllocationPlan {
        let mut resets = 0;
        let mut ctx = loop {
            let budget = Budget::from_ratings(self.config.budget_rule, snapshot.available_ratings());
            let may_reset = resets < self.config.reset.max_resets;
            let mut ctx = AllocationContext::new(self.config, budget, may_reset);

            match self.run_minimums(snapshot, &mut ctx) {
                MinimumPass::Complete => break ctx,
                MinimumPass::Reset {
                    location,
                    tier,
                    required,
                } => {
                    resets += 1;
                    let released = snapshot.release_missions();
                    tracing::info!(
                        %location,
                        %tier,
                        required,
                        starting_budget = ctx.budget().starting(),
                        released,
                        "critical minimum out of reach, restarting allocation"
                    );
                }
            }
        };

        let remaining_after_minimums = ctx.budget().remaining();
        {
            let (budget, requests) = ctx.split_mut();
            top_up(budget, requests);
        }

        let (budget, requests, shortfalls) = ctx.into_parts();
        let entries: Vec<PlanEntry> = requests
            .iter()
            .map(|r| PlanEntry {
                location: r.location,
                tier: r.tier,
                threat: r.threat,
                min_rating: r.min_rating,
                max_rating: r.max_rating,
                pass1_granted: r.pass1_granted,
                granted: r.granted,
                take_any: r.take_any,
            })
            .collect();

        tracing::info!(
            entries = entries.len(),
            starting_budget = budget.starting(),
            remaining_after_minimums,
            remaining = budget.remaining(),
            resets,
            shortfalls = shortfalls.len(),
            "allocation plan ready"
        );

        AllocationPlan {
            entries,
            starting_budget: budget.starting(),
            remaining_after_minimums,
            remaining: budget.remaining(),
            resets,
            shortfalls,
        }
    }

    /// Locations claimed by some tier in the last completed pass
    pub fn claimed(&self) -> &AHashSet<LocationId> {
        &self.claimed
    }

    fn run_minimums(&mut self, snapshot: &TurnSnapshot, ctx: &mut AllocationContext) -> MinimumPass {
        self.claimed.clear();

        for tier in Tier::ALL {
            let candidates: Vec<LocationId> = snapshot
                .candidates(tier)
                .iter()
                .copied()
                .filter(|id| !self.claimed.contains(id))
                .collect();
            self.claimed.extend(candidates.iter().copied());

            let allocator = allocator_for(tier);
            for id in candidates {
                let Some(location) = snapshot.location(id) else {
                    ctx.record(
                        Shortfall::new(ShortfallKind::MalformedSnapshot, "candidate location missing")
                            .at(id, tier),
                    );
                    continue;
                };
                if let AllocationOutcome::Reset {
                    location,
                    tier,
                    required,
                } = allocator.allocate(location, ctx)
                {
                    return MinimumPass::Reset {
                        location,
                        tier,
                        required,
                    };
                }
            }
        }
        MinimumPass::Complete
    }
}

/// Pass 2: raise requests toward their maximum while budget remains
fn top_up(budget: &mut Budget, requests: &mut RequestTable) {
    for tier in Tier::ALL {
        let tier_requests = requests.tier_mut(tier);
        let mut order: Vec<usize> = (0..tier_requests.len()).collect();
        order.sort_by_key(|&i| {
            let r = &tier_requests[i];
            OrderedFloat(budget.top_up_cost(r.max_rating, r.granted))
        });

        for i in order {
            if budget.is_exhausted() {
                return;
            }
            let request = &mut tier_requests[i];
            let cost = budget.top_up_cost(request.max_rating, request.granted);
            if cost <= 0.0 {
                continue;
            }
            let extra = budget.take(cost);
            request.granted = budget.merge(request.granted, extra);
            tracing::debug!(
                location = %request.location,
                %tier,
                extra,
                granted = request.granted,
                "topped up"
            );
        }
    }
}
