use std::collections::BTreeMap;

/// Combat configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Base stats every new entity starts with.
    pub default_stats: BTreeMap<String, f64>,

    /// Stat that damage and healing act on.
    pub hp_stat: String,

    /// How deep harm/heal/cast/apply may re-enter the engine before the
    /// evaluation is aborted.
    pub max_reentry_depth: usize,

    /// Seed for the engine's random number generator.
    pub rng_seed: u64,
}

impl CombatConfig {
    pub const CURRENT_HP: &'static str = "CHP";
    pub const MAX_HP: &'static str = "MHP";

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_STATS: [(&'static str, f64); 7] = [
        (Self::CURRENT_HP, 100.0),
        (Self::MAX_HP, 100.0),
        ("STR", 5.0),
        ("INT", 5.0),
        ("AGI", 10.0),
        ("DEF", 10.0),
        ("MDEF", 0.0),
    ];
    pub const DEFAULT_MAX_REENTRY_DEPTH: usize = 16;
    pub const DEFAULT_RNG_SEED: u64 = 0x5eed;

    pub fn new() -> Self {
        Self {
            default_stats: Self::DEFAULT_STATS
                .iter()
                .map(|(stat, value)| ((*stat).to_owned(), *value))
                .collect(),
            hp_stat: Self::CURRENT_HP.to_owned(),
            max_reentry_depth: Self::DEFAULT_MAX_REENTRY_DEPTH,
            rng_seed: Self::DEFAULT_RNG_SEED,
        }
    }

    pub fn with_default_stat(mut self, stat: impl Into<String>, value: f64) -> Self {
        self.default_stats.insert(stat.into(), value);
        self
    }

    pub fn with_hp_stat(mut self, stat: impl Into<String>) -> Self {
        self.hp_stat = stat.into();
        self
    }

    pub fn with_max_reentry_depth(mut self, depth: usize) -> Self {
        self.max_reentry_depth = depth;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
