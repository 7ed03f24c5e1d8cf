//! Allocation configuration with documented balance constants
//!
//! All tuning numbers for the planner and the assignment passes live here.
//! None of them affect algorithmic correctness, only game balance, so every
//! value can be overridden from TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::allocation::tier::Tier;

/// Errors that can occur when loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Values parsed but are not usable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How the shared budget shrinks when a grant is taken from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetRule {
    /// remaining' = rating_needed(remaining, grant)
    #[default]
    Concentration,
    /// remaining' = remaining - grant
    Linear,
}

/// Per-tier allocation factors and threat weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// Multiplier on threat for the minimum useful force
    pub min_factor: f64,
    /// Multiplier on threat for the most force worth sending
    pub max_factor: f64,
    /// Weight of hostile force at the location itself
    pub local_weight: f64,
    /// Weight of discounted one-hop threat
    pub neighbor_weight: f64,
    /// Weight of discounted two-hop threat
    pub jump2_weight: f64,
    /// Weight of the regional aggregate
    pub regional_weight: f64,
    /// Weight of unseen-but-nearby hostile estimate
    pub potential_weight: f64,
    /// How many times the global threat bias is added
    pub bias_multiplier: f64,
}

impl TierConfig {
    fn new(min_factor: f64, max_factor: f64) -> Self {
        Self {
            min_factor,
            max_factor,
            local_weight: 1.0,
            neighbor_weight: 0.0,
            jump2_weight: 0.0,
            regional_weight: 0.0,
            potential_weight: 0.0,
            bias_multiplier: 1.0,
        }
    }

    fn with_weights(mut self, neighbor: f64, jump2: f64, regional: f64) -> Self {
        self.neighbor_weight = neighbor;
        self.jump2_weight = jump2;
        self.regional_weight = regional;
        self
    }

    fn validate(&self, tier: Tier) -> Result<(), ConfigError> {
        let weights = [
            self.min_factor,
            self.max_factor,
            self.local_weight,
            self.neighbor_weight,
            self.jump2_weight,
            self.regional_weight,
            self.potential_weight,
            self.bias_multiplier,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::Invalid(format!(
                "{tier}: factors and weights must be finite and non-negative"
            )));
        }
        if self.min_factor > self.max_factor {
            return Err(ConfigError::Invalid(format!(
                "{tier}: min_factor {} exceeds max_factor {}",
                self.min_factor, self.max_factor
            )));
        }
        Ok(())
    }
}

impl Default for TierConfig {
    fn default() -> Self {
        Self::new(1.0, 2.0)
    }
}

/// Per-tier configuration table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTable {
    pub capital_defense: TierConfig,
    pub planet_defense: TierConfig,
    pub top_target: TierConfig,
    pub other_target: TierConfig,
    pub blockade: TierConfig,
    pub interior: TierConfig,
    pub exploration: TierConfig,
    pub border_security: TierConfig,
}

impl TierTable {
    pub fn get(&self, tier: Tier) -> &TierConfig {
        match tier {
            Tier::CapitalDefense => &self.capital_defense,
            Tier::PlanetDefense => &self.planet_defense,
            Tier::TopTarget => &self.top_target,
            Tier::OtherTarget => &self.other_target,
            Tier::Blockade => &self.blockade,
            Tier::Interior => &self.interior,
            Tier::Exploration => &self.exploration,
            Tier::BorderSecurity => &self.border_security,
        }
    }

    pub fn get_mut(&mut self, tier: Tier) -> &mut TierConfig {
        match tier {
            Tier::CapitalDefense => &mut self.capital_defense,
            Tier::PlanetDefense => &mut self.planet_defense,
            Tier::TopTarget => &mut self.top_target,
            Tier::OtherTarget => &mut self.other_target,
            Tier::Blockade => &mut self.blockade,
            Tier::Interior => &mut self.interior,
            Tier::Exploration => &mut self.exploration,
            Tier::BorderSecurity => &mut self.border_security,
        }
    }
}

impl Default for TierTable {
    fn default() -> Self {
        let mut capital_defense = TierConfig::new(1.4, 2.0).with_weights(1.0, 1.0, 0.0);
        capital_defense.potential_weight = 1.0;
        capital_defense.bias_multiplier = 2.0;

        Self {
            capital_defense,
            planet_defense: TierConfig::new(1.3, 2.0).with_weights(1.0, 0.5, 0.0),
            top_target: TierConfig::new(1.4, 3.0).with_weights(1.0, 0.5, 0.0),
            other_target: TierConfig::new(1.2, 2.0).with_weights(0.5, 0.0, 0.0),
            blockade: TierConfig::new(1.0, 1.5).with_weights(0.25, 0.0, 0.0),
            interior: TierConfig::new(1.0, 1.5).with_weights(0.0, 0.0, 0.25),
            exploration: TierConfig::new(0.8, 1.2),
            border_security: TierConfig::new(1.0, 1.5),
        }
    }
}

/// Bounded reset of pass 1 for the critical defense tiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetConfig {
    /// How many times pass 1 may be restarted in one turn
    pub max_resets: u32,
    /// Capital minimum above this fraction of the starting budget may reset
    pub capital_fraction: f64,
    /// Planet minimum above this fraction of the starting budget may reset
    pub planet_fraction: f64,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            max_resets: 1,
            capital_fraction: 0.5,
            planet_fraction: 0.8,
        }
    }
}

/// Unit assignment settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Floor factors for the passes after the main one; 0.0 accepts any force
    pub extra_pass_floors: Vec<f64>,
    /// Maximum breadth-first depth from a target; None searches the whole graph
    pub max_search_depth: Option<u32>,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            extra_pass_floors: vec![0.5, 0.0],
            max_search_depth: None,
        }
    }
}

/// Complete allocation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Index into `safety_factors` (0 = beginner, 5 = maniacal)
    pub aggression: usize,
    /// Risk-tolerance multipliers applied to threat, indexed by aggression
    pub safety_factors: [f64; 6],
    /// Additive constant applied to every threat estimate
    pub threat_bias: f64,
    pub budget_rule: BudgetRule,
    /// PlanetDefense requests never exceed this fraction of the starting budget
    pub planet_budget_cap: f64,
    pub reset: ResetConfig,
    pub tiers: TierTable,
    pub assignment: AssignmentConfig,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            aggression: 3,
            safety_factors: [4.0, 3.0, 2.0, 1.5, 1.2, 1.0],
            threat_bias: 0.0,
            budget_rule: BudgetRule::Concentration,
            planet_budget_cap: 0.5,
            reset: ResetConfig::default(),
            tiers: TierTable::default(),
            assignment: AssignmentConfig::default(),
        }
    }
}

impl AllocationConfig {
    /// Safety factor for the configured aggression (clamped to the table)
    pub fn safety_factor(&self) -> f64 {
        let index = self.aggression.min(self.safety_factors.len() - 1);
        self.safety_factors[index]
    }

    pub fn tier(&self, tier: Tier) -> &TierConfig {
        self.tiers.get(tier)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AllocationConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .safety_factors
            .iter()
            .any(|f| !f.is_finite() || *f <= 0.0)
        {
            return Err(ConfigError::Invalid(
                "safety factors must be finite and positive".to_string(),
            ));
        }
        if !self.threat_bias.is_finite() || self.threat_bias < 0.0 {
            return Err(ConfigError::Invalid(
                "threat_bias must be finite and non-negative".to_string(),
            ));
        }
        for (name, fraction) in [
            ("planet_budget_cap", self.planet_budget_cap),
            ("reset.capital_fraction", self.reset.capital_fraction),
            ("reset.planet_fraction", self.reset.planet_fraction),
        ] {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be in (0, 1], got {fraction}"
                )));
            }
        }
        if self
            .assignment
            .extra_pass_floors
            .iter()
            .any(|f| !(0.0..=1.0).contains(f))
        {
            return Err(ConfigError::Invalid(
                "assignment.extra_pass_floors must be within [0, 1]".to_string(),
            ));
        }
        for tier in Tier::ALL {
            self.tier(tier).validate(tier)?;
        }
        Ok(())
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AllocationConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    AllocationConfig::from_toml_str(&contents)
}
