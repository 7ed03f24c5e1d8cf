//! Graph propagation of visible hostile force into threat fields

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use super::ThreatFields;
use crate::core::types::{LocationId, Rating};
use crate::military::rating::combine_all;

/// Discounts used when spreading hostile force over the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatParams {
    /// Fraction of a one-hop neighbor's force counted here
    pub neighbor_discount: f64,
    /// Fraction of a two-hop location's force counted here
    pub jump2_discount: f64,
    /// Weight of the neighbor term in the regional figure
    pub regional_neighbor_weight: f64,
    /// Weight of the jump-2 term in the regional figure
    pub regional_jump2_weight: f64,
}

impl Default for ThreatParams {
    fn default() -> Self {
        Self {
            neighbor_discount: 0.5,
            jump2_discount: 0.25,
            regional_neighbor_weight: 1.0,
            regional_jump2_weight: 0.5,
        }
    }
}

/// Spreads per-location hostile ratings one and two hops out
#[derive(Debug, Clone, Default)]
pub struct ThreatEstimator {
    params: ThreatParams,
}

impl ThreatEstimator {
    pub fn new(params: ThreatParams) -> Self {
        Self { params }
    }

    /// Compute threat fields for every location in `adjacency`
    ///
    /// Hostile forces adjacent to one another are assumed able to concentrate,
    /// so ring totals use `combine` rather than a plain sum.
    pub fn estimate(
        &self,
        adjacency: &AHashMap<LocationId, Vec<LocationId>>,
        hostile: &AHashMap<LocationId, Rating>,
    ) -> AHashMap<LocationId, ThreatFields> {
        let local_of = |id: &LocationId| hostile.get(id).copied().unwrap_or(0.0).max(0.0);

        let mut fields = AHashMap::with_capacity(adjacency.len());
        for (&id, neighbors) in adjacency {
            let mut seen: AHashSet<LocationId> = AHashSet::new();
            seen.insert(id);

            let ring1: Vec<LocationId> = neighbors
                .iter()
                .copied()
                .filter(|n| seen.insert(*n))
                .collect();

            let mut ring2 = Vec::new();
            for n in &ring1 {
                if let Some(next) = adjacency.get(n) {
                    ring2.extend(next.iter().copied().filter(|m| seen.insert(*m)));
                }
            }

            let local = local_of(&id);
            let neighbor = self.params.neighbor_discount * combine_all(ring1.iter().map(local_of));
            let jump2 = self.params.jump2_discount * combine_all(ring2.iter().map(local_of));
            let regional = local
                + self.params.regional_neighbor_weight * neighbor
                + self.params.regional_jump2_weight * jump2;

            fields.insert(
                id,
                ThreatFields {
                    local,
                    neighbor,
                    jump2,
                    regional,
                    potential: 0.0,
                },
            );
        }
        fields
    }
}
