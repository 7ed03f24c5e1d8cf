//! Per-tier allocation policies
//!
//! Every tier shares one contract: estimate the threat at a location, turn it
//! into a minimum and maximum extra rating worth sending, and register a
//! request against the shared budget. Tiers differ in which threat terms they
//! read, whether a below-minimum grant is still useful, and whether they may
//! cap or reset.

use super::context::AllocationContext;
use super::request::AllocationRequest;
use super::shortfall::{Shortfall, ShortfallKind};
use super::tier::Tier;
use crate::core::config::TierConfig;
use crate::core::types::{LocationId, Rating};
use crate::military::rating::rating_needed;
use crate::threat::ThreatFields;
use crate::world::location::Location;

/// What one `allocate` call did
#[derive(Debug, Clone, PartialEq)]
pub enum AllocationOutcome {
    /// Existing commitment already covers the minimum
    Skipped,
    /// Minimum registered in full
    Granted { rating: Rating },
    /// Take-any location received less than its minimum
    Partial { rating: Rating, missing: Rating },
    /// Minimum could not be met and a partial grant is useless here
    Denied { missing: Rating },
    /// A critical minimum is out of reach; restart pass 1
    Reset {
        location: LocationId,
        tier: Tier,
        required: Rating,
    },
}

/// Weighted sum of the threat terms a tier cares about
pub fn weighted_threat(fields: &ThreatFields, settings: &TierConfig) -> Rating {
    fields.local * settings.local_weight
        + fields.neighbor * settings.neighbor_weight
        + fields.jump2 * settings.jump2_weight
        + fields.regional * settings.regional_weight
        + fields.potential * settings.potential_weight
}

pub trait Allocator {
    fn tier(&self) -> Tier;

    /// Whether a grant below the minimum is still worth making
    fn take_any(&self, location: &Location) -> bool;

    fn calculate_threat(&self, location: &Location, ctx: &AllocationContext) -> Rating {
        let settings = ctx.tier_config(self.tier());
        ctx.safety_factor() * weighted_threat(&location.threat, settings)
            + settings.bias_multiplier * ctx.threat_bias()
    }

    /// Upper bound on any single request of this tier
    fn request_cap(&self, _ctx: &AllocationContext) -> Option<Rating> {
        None
    }

    fn minimum_allocation(&self, threat: Rating, location: &Location, ctx: &AllocationContext) -> Rating {
        let factor = ctx.tier_config(self.tier()).min_factor;
        rating_needed(factor * threat, location.already_assigned)
    }

    fn maximum_allocation(&self, threat: Rating, location: &Location, ctx: &AllocationContext) -> Rating {
        let factor = ctx.tier_config(self.tier()).max_factor;
        rating_needed(factor * threat, location.already_assigned)
    }

    fn allocate(&self, location: &Location, ctx: &mut AllocationContext) -> AllocationOutcome {
        let tier = self.tier();
        let threat = self.calculate_threat(location, ctx);
        let required = self.minimum_allocation(threat, location, ctx);
        if required <= 0.0 {
            tracing::debug!(location = %location.id, %tier, threat, "already covered");
            return AllocationOutcome::Skipped;
        }
        let mut max_rating = self.maximum_allocation(threat, location, ctx).max(required);

        let remaining = ctx.budget().remaining();
        if tier.is_critical() && ctx.may_reset() && required > remaining {
            if let Some(fraction) = ctx.reset_fraction(tier) {
                if required > fraction * ctx.budget().starting() {
                    return AllocationOutcome::Reset {
                        location: location.id,
                        tier,
                        required,
                    };
                }
            }
        }

        let mut min_rating = required;
        if let Some(cap) = self.request_cap(ctx) {
            min_rating = min_rating.min(cap);
            max_rating = max_rating.min(cap);
        }

        let take_any = self.take_any(location);
        let granted = if ctx.budget().can_cover(min_rating) {
            ctx.budget_mut().take(min_rating)
        } else if take_any && !ctx.budget().is_exhausted() {
            let remaining = ctx.budget().remaining();
            ctx.budget_mut().take(remaining)
        } else {
            let missing = rating_needed(min_rating, 0.0);
            ctx.record(
                Shortfall::new(
                    ShortfallKind::InsufficientBudget,
                    format!("{tier} minimum not granted"),
                )
                .at(location.id, tier)
                .amounts(min_rating, 0.0, missing),
            );
            return AllocationOutcome::Denied { missing };
        };

        ctx.register(AllocationRequest {
            location: location.id,
            tier,
            threat,
            min_rating,
            max_rating,
            take_any,
            pass1_granted: granted,
            granted,
        });

        if granted < min_rating {
            let missing = rating_needed(min_rating, granted);
            ctx.record(
                Shortfall::new(
                    ShortfallKind::InsufficientBudget,
                    format!("{tier} granted below minimum"),
                )
                .at(location.id, tier)
                .amounts(min_rating, granted, missing),
            );
            AllocationOutcome::Partial {
                rating: granted,
                missing,
            }
        } else {
            tracing::debug!(location = %location.id, %tier, threat, granted, "minimum granted");
            AllocationOutcome::Granted { rating: granted }
        }
    }
}

/// The empire capital; always worth any force
#[derive(Debug, Clone, Copy, Default)]
pub struct CapitalDefenseAllocator;

impl Allocator for CapitalDefenseAllocator {
    fn tier(&self) -> Tier {
        Tier::CapitalDefense
    }

    fn take_any(&self, _location: &Location) -> bool {
        true
    }

    /// Unseen hostile force only counts for the part not already visible
    fn calculate_threat(&self, location: &Location, ctx: &AllocationContext) -> Rating {
        let settings = ctx.tier_config(self.tier());
        let visible = ThreatFields {
            potential: 0.0,
            ..location.threat
        };
        let unseen = (location.threat.potential - location.threat.local).max(0.0);
        ctx.safety_factor()
            * (weighted_threat(&visible, settings) + settings.potential_weight * unseen)
            + settings.bias_multiplier * ctx.threat_bias()
    }
}

/// Owned locations other than the capital
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanetDefenseAllocator;

impl Allocator for PlanetDefenseAllocator {
    fn tier(&self) -> Tier {
        Tier::PlanetDefense
    }

    fn take_any(&self, _location: &Location) -> bool {
        true
    }

    fn request_cap(&self, ctx: &AllocationContext) -> Option<Rating> {
        Some(ctx.planet_cap())
    }
}

/// Flagged high-value invasion, colonization or securing objectives
#[derive(Debug, Clone, Copy, Default)]
pub struct TopTargetAllocator;

impl Allocator for TopTargetAllocator {
    fn tier(&self) -> Tier {
        Tier::TopTarget
    }

    /// Only reinforce objectives that already have force committed
    fn take_any(&self, location: &Location) -> bool {
        location.already_assigned > 0.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OtherTargetAllocator;

impl Allocator for OtherTargetAllocator {
    fn tier(&self) -> Tier {
        Tier::OtherTarget
    }

    fn take_any(&self, location: &Location) -> bool {
        location.already_assigned > 0.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BlockadeAllocator;

impl Allocator for BlockadeAllocator {
    fn tier(&self) -> Tier {
        Tier::Blockade
    }

    fn take_any(&self, _location: &Location) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InteriorAllocator;

impl Allocator for InteriorAllocator {
    fn tier(&self) -> Tier {
        Tier::Interior
    }

    fn take_any(&self, _location: &Location) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExplorationAllocator;

impl Allocator for ExplorationAllocator {
    fn tier(&self) -> Tier {
        Tier::Exploration
    }

    fn take_any(&self, _location: &Location) -> bool {
        false
    }

    /// Escorts only answer hostiles sitting on the location itself
    fn calculate_threat(&self, location: &Location, ctx: &AllocationContext) -> Rating {
        let settings = ctx.tier_config(self.tier());
        ctx.safety_factor() * settings.local_weight * location.threat.local
            + settings.bias_multiplier * ctx.threat_bias()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BorderSecurityAllocator;

impl Allocator for BorderSecurityAllocator {
    fn tier(&self) -> Tier {
        Tier::BorderSecurity
    }

    fn take_any(&self, _location: &Location) -> bool {
        false
    }

    fn calculate_threat(&self, location: &Location, ctx: &AllocationContext) -> Rating {
        let settings = ctx.tier_config(self.tier());
        ctx.safety_factor() * settings.local_weight * location.threat.local
            + settings.bias_multiplier * ctx.threat_bias()
    }
}

/// The allocator responsible for a tier
pub fn allocator_for(tier: Tier) -> &'static dyn Allocator {
    match tier {
        Tier::CapitalDefense => &CapitalDefenseAllocator,
        Tier::PlanetDefense => &PlanetDefenseAllocator,
        Tier::TopTarget => &TopTargetAllocator,
        Tier::OtherTarget => &OtherTargetAllocator,
        Tier::Blockade => &BlockadeAllocator,
        Tier::Interior => &InteriorAllocator,
        Tier::Exploration => &ExplorationAllocator,
        Tier::BorderSecurity => &BorderSecurityAllocator,
    }
}
