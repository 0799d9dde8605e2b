//! Data-driven combat content.
//!
//! This crate houses the designer-facing definitions and loaders for RON/TOML data files:
//! - Damage types (mitigation, dodge and crit formulas)
//! - Status effects (stacking, interval and component formulas)
//! - Skills
//! - The entity roster
//! - Engine configuration (TOML)
//!
//! Formula text is compiled against the engine's registry at load time, so a
//! malformed formula fails the load rather than the first evaluation.

pub mod defs;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use defs::{DamageTypeDef, EntityDef, SkillDef, StatusDef};

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, DamageTypeLoader, EntityLoader, LoadResult, SkillLoader,
    StatusLoader,
};
