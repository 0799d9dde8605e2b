//! Combat engine: entity tables, content registries and formula plumbing.
//!
//! [`GameEngine`] owns every entity and every registered template. It is
//! also the [`Host`](game_formula::Host) formulas evaluate against, so a
//! formula that calls `HARM` or `CAST` re-enters the engine. Re-entry is
//! bounded by [`CombatConfig::max_reentry_depth`].
//!
//! The engine is single-threaded and driven through `&mut self`.

mod combat;
mod host;
mod status;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use game_formula::{
    EvalError, Evaluator, Node, PcgRng, Registry, RngOracle, Sanitizer, TreeBuilder, Value,
};

use crate::config::CombatConfig;
use crate::damage::DamageType;
use crate::entity::{Entity, EntityKind};
use crate::error::EngineError;
use crate::log::{CombatLog, TracingLog};
use crate::skill::SkillTemplate;
use crate::status::StatusTemplate;
use crate::timer::{SystemTimer, Timer, Timestamp};
use crate::EntityKey;

/// Authoritative combat state.
pub struct GameEngine {
    config: CombatConfig,
    registry: &'static Registry,
    entities: BTreeMap<EntityKey, Entity>,
    damage_types: HashMap<String, Arc<DamageType>>,
    statuses: HashMap<String, Arc<StatusTemplate>>,
    skills: HashMap<String, Arc<SkillTemplate>>,
    timer: Box<dyn Timer>,
    log: Box<dyn CombatLog>,
    rng: PcgRng,
    depth: usize,
    next_status_id: u64,
}

impl GameEngine {
    /// Engine on the shared registry, a wall clock and the tracing log.
    pub fn new(config: CombatConfig) -> Self {
        let rng = PcgRng::new(config.rng_seed);
        Self {
            config,
            registry: Registry::shared(),
            entities: BTreeMap::new(),
            damage_types: HashMap::new(),
            statuses: HashMap::new(),
            skills: HashMap::new(),
            timer: Box::new(SystemTimer::new()),
            log: Box::new(TracingLog),
            rng,
            depth: 0,
            next_status_id: 0,
        }
    }

    pub fn with_timer(mut self, timer: impl Timer + 'static) -> Self {
        self.timer = Box::new(timer);
        self
    }

    pub fn with_log(mut self, log: impl CombatLog + 'static) -> Self {
        self.log = Box::new(log);
        self
    }

    /// Swaps the symbol table formulas are built and sanitized with.
    pub fn with_registry(mut self, registry: &'static Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn registry(&self) -> &'static Registry {
        self.registry
    }

    /// Tree builder over the engine's registry, for parsing content.
    pub fn tree_builder(&self) -> TreeBuilder<'static> {
        TreeBuilder::new(self.registry)
    }

    pub fn now(&self) -> Timestamp {
        self.timer.now()
    }

    // ===== registration =====

    /// Registers a player with the configured default stats.
    pub fn add_player(
        &mut self,
        key: impl Into<EntityKey>,
        name: impl Into<String>,
    ) -> Result<&mut Entity, EngineError> {
        let entity = Entity::new(key, name, EntityKind::Player, self.config.default_stats.clone());
        self.insert_entity(entity)
    }

    /// Registers an enemy with the configured default stats.
    pub fn add_enemy(
        &mut self,
        key: impl Into<EntityKey>,
        name: impl Into<String>,
    ) -> Result<&mut Entity, EngineError> {
        let entity = Entity::new(key, name, EntityKind::Enemy, self.config.default_stats.clone());
        self.insert_entity(entity)
    }

    /// Registers a fully built entity. Keys are unique across both sides.
    pub fn insert_entity(&mut self, entity: Entity) -> Result<&mut Entity, EngineError> {
        use std::collections::btree_map::Entry;

        match self.entities.entry(entity.key().clone()) {
            Entry::Occupied(slot) => Err(EngineError::DuplicateEntity(slot.key().clone())),
            Entry::Vacant(slot) => {
                tracing::debug!(key = %entity.key(), kind = %entity.kind(), "adding entity");
                Ok(slot.insert(entity))
            }
        }
    }

    /// Removes an entity. Statuses it applied elsewhere keep running.
    pub fn remove_entity(&mut self, key: &EntityKey) -> Option<Entity> {
        let removed = self.entities.remove(key);
        if removed.is_some() {
            tracing::debug!(%key, "removed entity");
        }
        removed
    }

    pub fn add_damage_type(&mut self, damage_type: DamageType) {
        self.damage_types
            .insert(damage_type.key.clone(), Arc::new(damage_type));
    }

    /// Registers a status, replacing any status with the same key.
    pub fn add_status(&mut self, status: StatusTemplate) {
        if self
            .statuses
            .insert(status.key.clone(), Arc::new(status))
            .is_some()
        {
            tracing::debug!("replaced status template");
        }
    }

    pub fn add_skill(&mut self, skill: SkillTemplate) {
        self.skills.insert(skill.key.clone(), Arc::new(skill));
    }

    // ===== lookups =====

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.entities.contains_key(key)
    }

    pub fn entity(&self, key: &EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    pub fn entity_mut(&mut self, key: &EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Players in key order.
    pub fn players(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(|entity| entity.is_player())
    }

    pub fn damage_type(&self, key: &str) -> Option<&Arc<DamageType>> {
        self.damage_types.get(key)
    }

    pub fn status(&self, key: &str) -> Option<&Arc<StatusTemplate>> {
        self.statuses.get(key)
    }

    pub fn skill(&self, key: &str) -> Option<&Arc<SkillTemplate>> {
        self.skills.get(key)
    }

    /// Current (derived) value of a stat.
    pub fn property(&self, key: &EntityKey, stat: &str) -> Option<f64> {
        self.entities.get(key)?.stat(stat)
    }

    fn require(&self, key: &EntityKey) -> Result<(), EngineError> {
        if self.contains(key) {
            Ok(())
        } else {
            Err(EngineError::UnknownEntity(key.clone()))
        }
    }

    // ===== formula plumbing =====

    fn sanitizer(&self) -> Sanitizer<'static> {
        Sanitizer::new(self.registry)
    }

    /// Runs `f` one level deeper, failing once the re-entry limit is hit.
    fn reenter<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        let limit = self.config.max_reentry_depth;
        if self.depth >= limit {
            tracing::warn!(limit, "engine re-entry limit reached");
            return Err(EvalError::RecursionLimit { limit });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn evaluate(&mut self, tree: &Node) -> Result<Value, EvalError> {
        Evaluator::new(self).resolve(tree)
    }

    /// Skill, dodge and crit formulas: bare stats read the source.
    pub(crate) fn resolve_skill_formula(
        &mut self,
        tree: &Node,
        source: &EntityKey,
        target: &EntityKey,
    ) -> Result<Value, EvalError> {
        let bound = self
            .sanitizer()
            .sanitize_skill_entities(tree, source, target, self);
        self.evaluate(&bound)
    }

    /// Mitigation formulas: bare stats read the target.
    pub(crate) fn resolve_mitigation(
        &mut self,
        tree: &Node,
        target: &EntityKey,
        source: &EntityKey,
        amount: f64,
    ) -> Result<Value, EvalError> {
        let bound = self
            .sanitizer()
            .sanitize_mitigation(tree, target, source, amount, self);
        self.evaluate(&bound)
    }

    fn resolve_status_formula(
        &mut self,
        tree: &Node,
        source: &EntityKey,
        target: &EntityKey,
        values: &[f64],
    ) -> Result<Value, EvalError> {
        let bound = self.sanitizer().sanitize_status(tree, source, target, values)?;
        self.evaluate(&bound)
    }

    /// Draw in `[0, 1000)` against a percentage, as `CHANCE` does.
    pub(crate) fn roll_chance(&mut self, percent: f64) -> bool {
        f64::from(self.rng.below(1000)) < percent * 10.0
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(CombatConfig::default())
    }
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("entities", &self.entities.len())
            .field("damage_types", &self.damage_types.len())
            .field("statuses", &self.statuses.len())
            .field("skills", &self.skills.len())
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}
