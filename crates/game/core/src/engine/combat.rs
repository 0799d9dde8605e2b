//! Damage, healing, skills and compound stats.

use game_formula::{EvalError, LookupError, Value};

use super::GameEngine;
use crate::EntityKey;
use crate::damage::DamageOutcome;
use crate::error::EngineError;
use crate::log::{DamageReport, DodgeReport, HealReport};

impl GameEngine {
    /// Deals `amount` of `damage_type` damage to `target`.
    ///
    /// Returns `None` when the attack was dodged. Damage lowers the HP stat
    /// in both base and derived stats.
    pub fn take_damage(
        &mut self,
        target: &EntityKey,
        amount: f64,
        damage_type: &str,
        source: &EntityKey,
        log: bool,
    ) -> Result<Option<DamageOutcome>, EngineError> {
        self.require(target)?;
        Ok(self.damage(target, amount, damage_type, source, log)?)
    }

    /// Heals `target` by `amount`. Healing is not capped.
    pub fn get_healed(
        &mut self,
        target: &EntityKey,
        amount: f64,
        source: &EntityKey,
        log: bool,
    ) -> Result<(), EngineError> {
        self.require(target)?;
        self.heal_entity(target, amount, source, log);
        Ok(())
    }

    /// Casts `skill` from `caster` at `target` and returns the formula's value.
    pub fn cast(
        &mut self,
        caster: &EntityKey,
        target: &EntityKey,
        skill: &str,
    ) -> Result<Value, EngineError> {
        self.require(caster)?;
        self.require(target)?;
        Ok(self.cast_skill(caster, target, skill)?)
    }

    /// Evaluates `expression` with bare stat names reading `key`'s stats.
    pub fn compound_stat(&mut self, key: &EntityKey, expression: &str) -> Result<f64, EngineError> {
        self.require(key)?;
        let tree = self
            .tree_builder()
            .build_str(expression)
            .map_err(|e| EngineError::invalid_formula(expression, e))?;
        let bound = self.sanitizer().sanitize_compound_stat(&tree, key, self);
        let value = self.evaluate(&bound)?;
        Ok(value.as_number().map_err(EvalError::from)?)
    }

    pub(super) fn damage(
        &mut self,
        target: &EntityKey,
        amount: f64,
        damage_type: &str,
        source: &EntityKey,
        log: bool,
    ) -> Result<Option<DamageOutcome>, EvalError> {
        let dtype = self
            .damage_type(damage_type)
            .cloned()
            .ok_or_else(|| LookupError::UnknownDamageType(damage_type.to_owned()))?;

        if !self.contains(target) {
            tracing::warn!(%target, %source, "damage target no longer exists");
            return Ok(None);
        }

        self.reenter(|engine| {
            if dtype.dodge(engine, source, target)? {
                if log {
                    engine.log.dodge(DodgeReport {
                        target: target.clone(),
                        source: source.clone(),
                        damage_type: dtype.key.clone(),
                    });
                }
                return Ok(None);
            }

            let outcome = dtype.mitigated_amount(engine, amount, source, target)?;
            let hp = engine.config.hp_stat.clone();
            match engine.entities.get_mut(target) {
                Some(entity) => entity.adjust_persistent(&hp, -outcome.amount),
                None => {
                    tracing::warn!(%target, "damage target removed during mitigation");
                    return Ok(None);
                }
            }

            if log {
                engine.log.damage(DamageReport {
                    target: target.clone(),
                    source: source.clone(),
                    damage_type: dtype.key.clone(),
                    amount: outcome.amount,
                    resisted: outcome.resisted,
                    critical: outcome.critical,
                });
            }
            Ok(Some(outcome))
        })
    }

    pub(super) fn heal_entity(
        &mut self,
        target: &EntityKey,
        amount: f64,
        source: &EntityKey,
        log: bool,
    ) {
        let hp = self.config.hp_stat.clone();
        let Some(entity) = self.entities.get_mut(target) else {
            tracing::warn!(%target, %source, "heal target no longer exists");
            return;
        };
        entity.adjust_persistent(&hp, amount);

        if log {
            self.log.heal(HealReport {
                target: target.clone(),
                source: source.clone(),
                amount,
            });
        }
    }

    pub(super) fn cast_skill(
        &mut self,
        caster: &EntityKey,
        target: &EntityKey,
        skill: &str,
    ) -> Result<Value, EvalError> {
        let template = self
            .skill(skill)
            .cloned()
            .ok_or_else(|| LookupError::UnknownSkill(skill.to_owned()))?;
        tracing::debug!(%caster, %target, skill, "casting");
        self.reenter(|engine| engine.resolve_skill_formula(&template.formula, caster, target))
    }
}
