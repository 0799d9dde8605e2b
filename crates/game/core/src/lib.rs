//! Combat rules driven by designer formulas.
//!
//! `game-core` owns entities, damage types, skills and the status-effect
//! state machine. Every formula is built with `game-formula` and evaluated
//! against [`GameEngine`], which implements the language's host trait so
//! `HARM`, `HEAL`, `CAST` and `APPLY` act on live state.
pub mod config;
pub mod damage;
pub mod engine;
pub mod entity;
pub mod error;
pub mod log;
pub mod skill;
pub mod status;
pub mod timer;

pub use config::CombatConfig;
pub use damage::{DamageOutcome, DamageType};
pub use engine::GameEngine;
pub use entity::{Entity, EntityKind};
pub use error::EngineError;
pub use game_formula::EntityKey;
pub use log::{CombatEvent, CombatLog, DamageReport, DodgeReport, HealReport, MemoryLog, TracingLog};
pub use skill::SkillTemplate;
pub use status::{AppliedStatus, StackingType, StatusTemplate};
pub use timer::{SteppedTimer, SystemTimer, Timer, Timestamp};
