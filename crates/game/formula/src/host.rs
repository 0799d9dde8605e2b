//! Capabilities the language needs from the game engine.
//!
//! Native functions never touch engine state directly: every entity lookup,
//! stat read, and side effect goes through [`Host`]. This keeps the language
//! crate free of engine types and lets tests substitute small fakes.

use crate::error::{EvalError, LookupError};
use crate::rng::{PcgRng, RngOracle};
use crate::value::EntityKey;

/// Engine capability handle used during evaluation.
pub trait Host {
    /// Whether `key` names a live entity. Key leaves that pass this check
    /// resolve to entity references.
    fn entity_exists(&self, key: &str) -> bool;

    /// Every registered player, in a stable order.
    fn players(&self) -> Vec<EntityKey>;

    /// Players still able to act.
    fn active_players(&self) -> Vec<EntityKey>;

    /// Current (derived) value of a stat.
    fn property(&self, entity: &EntityKey, stat: &str) -> Result<f64, EvalError>;

    /// Deals `amount` of `damage_type` damage from `source` to `target`.
    fn harm(
        &mut self,
        target: &EntityKey,
        source: &EntityKey,
        damage_type: &str,
        amount: f64,
    ) -> Result<(), EvalError>;

    /// Heals `target` by `amount`.
    fn heal(&mut self, target: &EntityKey, source: &EntityKey, amount: f64)
    -> Result<(), EvalError>;

    /// Casts the skill named `skill` from `caster` at `target`.
    fn cast(&mut self, caster: &EntityKey, target: &EntityKey, skill: &str)
    -> Result<(), EvalError>;

    /// Applies the status named `status` to `target`.
    fn apply_status(
        &mut self,
        target: &EntityKey,
        source: &EntityKey,
        status: &str,
        duration: f64,
        values: &[f64],
    ) -> Result<(), EvalError>;

    /// Uniform integer in `[0, upper)`.
    fn roll(&mut self, upper: u32) -> u32;
}

/// Read-only stat-name lookup used by the sanitizer.
pub trait StatLookup {
    /// Whether `entity` carries a stat called `stat`.
    fn has_stat(&self, entity: &EntityKey, stat: &str) -> bool;
}

/// Host with no entities, for evaluating pure arithmetic and logic.
///
/// Any function that needs an entity fails with a lookup error.
#[derive(Clone, Debug, Default)]
pub struct DetachedHost {
    rng: PcgRng,
}

impl DetachedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: PcgRng::new(seed),
        }
    }
}

impl Host for DetachedHost {
    fn entity_exists(&self, _key: &str) -> bool {
        false
    }

    fn players(&self) -> Vec<EntityKey> {
        Vec::new()
    }

    fn active_players(&self) -> Vec<EntityKey> {
        Vec::new()
    }

    fn property(&self, entity: &EntityKey, _stat: &str) -> Result<f64, EvalError> {
        Err(LookupError::UnknownEntity(entity.to_string()).into())
    }

    fn harm(
        &mut self,
        target: &EntityKey,
        _source: &EntityKey,
        _damage_type: &str,
        _amount: f64,
    ) -> Result<(), EvalError> {
        Err(LookupError::UnknownEntity(target.to_string()).into())
    }

    fn heal(
        &mut self,
        target: &EntityKey,
        _source: &EntityKey,
        _amount: f64,
    ) -> Result<(), EvalError> {
        Err(LookupError::UnknownEntity(target.to_string()).into())
    }

    fn cast(
        &mut self,
        caster: &EntityKey,
        _target: &EntityKey,
        _skill: &str,
    ) -> Result<(), EvalError> {
        Err(LookupError::UnknownEntity(caster.to_string()).into())
    }

    fn apply_status(
        &mut self,
        target: &EntityKey,
        _source: &EntityKey,
        _status: &str,
        _duration: f64,
        _values: &[f64],
    ) -> Result<(), EvalError> {
        Err(LookupError::UnknownEntity(target.to_string()).into())
    }

    fn roll(&mut self, upper: u32) -> u32 {
        self.rng.below(upper)
    }
}

impl StatLookup for DetachedHost {
    fn has_stat(&self, _entity: &EntityKey, _stat: &str) -> bool {
        false
    }
}
