//! Priority tiers of target locations

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::world::unit_group::MissionPurpose;

/// A named priority category, processed in strict declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tier {
    CapitalDefense = 0,
    PlanetDefense = 1,
    TopTarget = 2,
    OtherTarget = 3,
    Blockade = 4,
    Interior = 5,
    Exploration = 6,
    BorderSecurity = 7,
}

impl Tier {
    /// All tiers in decreasing priority
    pub const ALL: [Tier; 8] = [
        Tier::CapitalDefense,
        Tier::PlanetDefense,
        Tier::TopTarget,
        Tier::OtherTarget,
        Tier::Blockade,
        Tier::Interior,
        Tier::Exploration,
        Tier::BorderSecurity,
    ];

    /// Tiers whose shortfall may trigger a reset of pass 1
    pub fn is_critical(&self) -> bool {
        matches!(self, Tier::CapitalDefense | Tier::PlanetDefense)
    }

    /// Mission issued to unit groups that fulfill this tier
    pub fn mission_purpose(&self) -> MissionPurpose {
        match self {
            Tier::CapitalDefense | Tier::PlanetDefense => MissionPurpose::Defend,
            Tier::TopTarget | Tier::OtherTarget => MissionPurpose::Secure,
            Tier::Blockade => MissionPurpose::Blockade,
            Tier::Interior => MissionPurpose::Patrol,
            Tier::Exploration => MissionPurpose::Escort,
            Tier::BorderSecurity => MissionPurpose::Guard,
        }
    }

    fn bit(&self) -> u16 {
        1 << (*self as u8)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::CapitalDefense => "capital_defense",
            Tier::PlanetDefense => "planet_defense",
            Tier::TopTarget => "top_target",
            Tier::OtherTarget => "other_target",
            Tier::Blockade => "blockade",
            Tier::Interior => "interior",
            Tier::Exploration => "exploration",
            Tier::BorderSecurity => "border_security",
        };
        f.write_str(name)
    }
}

/// Set of tier memberships for one location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TierSet(u16);

impl TierSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn with(mut self, tier: Tier) -> Self {
        self.insert(tier);
        self
    }

    pub fn insert(&mut self, tier: Tier) {
        self.0 |= tier.bit();
    }

    pub fn remove(&mut self, tier: Tier) {
        self.0 &= !tier.bit();
    }

    pub fn contains(&self, tier: Tier) -> bool {
        self.0 & tier.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Member tiers in priority order
    pub fn iter(&self) -> impl Iterator<Item = Tier> + '_ {
        Tier::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl FromIterator<Tier> for TierSet {
    fn from_iter<I: IntoIterator<Item = Tier>>(iter: I) -> Self {
        let mut set = TierSet::empty();
        for tier in iter {
            set.insert(tier);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_order_matches_priority() {
        for pair in Tier::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_only_defense_tiers_are_critical() {
        let critical: Vec<Tier> = Tier::ALL.into_iter().filter(|t| t.is_critical()).collect();
        assert_eq!(critical, vec![Tier::CapitalDefense, Tier::PlanetDefense]);
    }

    #[test]
    fn test_tier_set_membership() {
        let mut set = TierSet::empty().with(Tier::TopTarget).with(Tier::PlanetDefense);
        assert!(set.contains(Tier::TopTarget));
        assert!(!set.contains(Tier::Blockade));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Tier::PlanetDefense, Tier::TopTarget]
        );
        set.remove(Tier::TopTarget);
        assert!(!set.contains(Tier::TopTarget));
        assert!(!set.is_empty());
    }

    #[test]
    fn test_mission_purpose_mapping() {
        assert_eq!(Tier::CapitalDefense.mission_purpose(), MissionPurpose::Defend);
        assert_eq!(Tier::OtherTarget.mission_purpose(), MissionPurpose::Secure);
        assert_eq!(Tier::Exploration.mission_purpose(), MissionPurpose::Escort);
    }
}
