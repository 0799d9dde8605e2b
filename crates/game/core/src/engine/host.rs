use game_formula::{EntityKey, EvalError, Host, LookupError, RngOracle, StatLookup};

use super::GameEngine;

impl Host for GameEngine {
    fn entity_exists(&self, key: &str) -> bool {
        self.entities.contains_key(key)
    }

    fn players(&self) -> Vec<EntityKey> {
        GameEngine::players(self)
            .map(|entity| entity.key().clone())
            .collect()
    }

    fn active_players(&self) -> Vec<EntityKey> {
        let hp = self.config.hp_stat.as_str();
        GameEngine::players(self)
            .filter(|entity| entity.stat(hp).is_some_and(|value| value > 0.0))
            .map(|entity| entity.key().clone())
            .collect()
    }

    fn property(&self, entity: &EntityKey, stat: &str) -> Result<f64, EvalError> {
        let found = self
            .entities
            .get(entity)
            .ok_or_else(|| LookupError::UnknownEntity(entity.to_string()))?;
        found.stat(stat).ok_or_else(|| {
            LookupError::UnknownStat {
                entity: entity.to_string(),
                stat: stat.to_owned(),
            }
            .into()
        })
    }

    fn harm(
        &mut self,
        target: &EntityKey,
        source: &EntityKey,
        damage_type: &str,
        amount: f64,
    ) -> Result<(), EvalError> {
        self.damage(target, amount, damage_type, source, true)
            .map(|_| ())
    }

    fn heal(&mut self, target: &EntityKey, source: &EntityKey, amount: f64) -> Result<(), EvalError> {
        self.heal_entity(target, amount, source, true);
        Ok(())
    }

    fn cast(&mut self, caster: &EntityKey, target: &EntityKey, skill: &str) -> Result<(), EvalError> {
        self.cast_skill(caster, target, skill).map(|_| ())
    }

    fn apply_status(
        &mut self,
        target: &EntityKey,
        source: &EntityKey,
        status: &str,
        duration: f64,
        values: &[f64],
    ) -> Result<(), EvalError> {
        self.apply_status_inner(target, status, source, duration, values)
            .map(|_| ())
    }

    fn roll(&mut self, upper: u32) -> u32 {
        self.rng.below(upper)
    }
}

impl StatLookup for GameEngine {
    fn has_stat(&self, entity: &EntityKey, stat: &str) -> bool {
        self.entities
            .get(entity)
            .is_some_and(|found| found.has_stat(stat))
    }
}
