//! Status application and the per-tick update.

use std::collections::HashSet;
use std::sync::Arc;

use game_formula::symbols::{HARM_F, HEAL_F, MOD_VALUE_F};
use game_formula::{EvalError, LookupError};

use super::GameEngine;
use crate::EntityKey;
use crate::error::EngineError;
use crate::status::{AppliedStatus, StackingType, StatusTemplate, removal_time};

/// Snapshot of a due status, detached from the entity so formulas can
/// re-enter the engine while it runs.
struct DueStatus {
    id: u64,
    template: Arc<StatusTemplate>,
    source: EntityKey,
    values: Vec<f64>,
}

impl GameEngine {
    /// Applies the status `status` from `source` to `target`.
    ///
    /// Returns whether an instance was added or refreshed.
    pub fn apply_status(
        &mut self,
        target: &EntityKey,
        status: &str,
        source: &EntityKey,
        duration_s: f64,
        values: &[f64],
    ) -> Result<bool, EngineError> {
        self.require(target)?;
        Ok(self.apply_status_inner(target, status, source, duration_s, values)?)
    }

    pub(super) fn apply_status_inner(
        &mut self,
        target: &EntityKey,
        status: &str,
        source: &EntityKey,
        duration_s: f64,
        values: &[f64],
    ) -> Result<bool, EvalError> {
        let template = self
            .status(status)
            .cloned()
            .ok_or_else(|| LookupError::UnknownStatus(status.to_owned()))?;
        let Some(entity) = self.entities.get_mut(target) else {
            return Err(LookupError::UnknownEntity(target.to_string()).into());
        };
        let now = self.timer.now();

        match template.stacking {
            StackingType::Refresh => {
                if let Some(existing) = entity.status_mut(status) {
                    existing.removal = removal_time(now, duration_s);
                    tracing::debug!(%target, status, removal = ?existing.removal, "refreshed status");
                    return Ok(true);
                }
            }
            StackingType::None => {
                if entity.has_status(status) {
                    return Ok(false);
                }
            }
            StackingType::Independent => {
                let current = entity.status_count(status);
                if let Some(tree) = &template.max_stacks {
                    let limit = self
                        .reenter(|engine| {
                            engine.resolve_status_formula(tree, source, target, values)
                        })?
                        .as_number()?;
                    let limit = limit.max(0.0) as usize;
                    if limit != 0 && current >= limit {
                        tracing::debug!(%target, status, limit, "status at max stacks");
                        return Ok(false);
                    }
                }
            }
        }

        self.add_status_instance(template, target, source, duration_s, values)?;
        Ok(true)
    }

    fn add_status_instance(
        &mut self,
        template: Arc<StatusTemplate>,
        target: &EntityKey,
        source: &EntityKey,
        duration_s: f64,
        values: &[f64],
    ) -> Result<(), EvalError> {
        let interval_s = self
            .reenter(|engine| {
                engine.resolve_status_formula(&template.interval, source, target, values)
            })?
            .as_number()?;
        let now = self.timer.now();
        let id = self.next_status_id;
        self.next_status_id += 1;

        let applied = AppliedStatus {
            id,
            template,
            source: source.clone(),
            last_tick: None,
            removal: removal_time(now, duration_s),
            interval_ms: (interval_s * 1000.0) as i64,
            values: values.to_vec(),
        };
        tracing::debug!(
            %target,
            %source,
            status = applied.key(),
            interval_ms = applied.interval_ms,
            "applied status"
        );

        let entity = self
            .entities
            .get_mut(target)
            .ok_or_else(|| LookupError::UnknownEntity(target.to_string()))?;
        entity.statuses.push(applied);
        Ok(())
    }

    /// Clears every status and resets derived stats to base.
    pub fn cleanse(&mut self, key: &EntityKey) -> Result<(), EngineError> {
        let entity = self
            .entities
            .get_mut(key)
            .ok_or_else(|| EngineError::UnknownEntity(key.clone()))?;
        entity.statuses.clear();
        entity.reset_derived();
        Ok(())
    }

    /// Updates every entity in key order.
    ///
    /// A failing formula only abandons that one component: every entity still
    /// runs all five phases. Failures are logged as they happen and the first
    /// one is returned once the whole tick is done.
    pub fn update(&mut self) -> Result<(), EngineError> {
        let keys: Vec<EntityKey> = self.entities.keys().cloned().collect();
        let mut failures = Vec::new();
        for key in keys {
            // Earlier updates may have removed later entities.
            if self.contains(&key) {
                self.tick_entity(&key, &mut failures);
            }
        }
        first_failure(failures)
    }

    /// Runs one tick for `key`:
    ///
    /// 1. drop expired statuses
    /// 2. reset derived stats to base
    /// 3. apply `MOD_VALUE` components of due statuses
    /// 4. run `HARM`/`HEAL` components of due statuses
    /// 5. stamp the due statuses with the current time
    ///
    /// Due statuses are stamped even when one of their components failed.
    pub fn update_entity(&mut self, key: &EntityKey) -> Result<(), EngineError> {
        self.require(key)?;
        let mut failures = Vec::new();
        self.tick_entity(key, &mut failures);
        first_failure(failures)
    }

    fn tick_entity(&mut self, key: &EntityKey, failures: &mut Vec<EvalError>) {
        let now = self.timer.now();
        let Some(entity) = self.entities.get_mut(key) else {
            return;
        };

        let before = entity.statuses.len();
        entity.statuses.retain(|status| !status.is_expired(now));
        let expired = before - entity.statuses.len();
        if expired > 0 {
            tracing::debug!(%key, expired, "removed expired statuses");
        }

        entity.reset_derived();

        let due: Vec<DueStatus> = entity
            .statuses
            .iter()
            .filter(|status| status.is_due(now))
            .map(|status| DueStatus {
                id: status.id,
                template: Arc::clone(&status.template),
                source: status.source.clone(),
                values: status.values.clone(),
            })
            .collect();

        for status in &due {
            self.apply_modifiers(key, status, failures);
        }
        for status in &due {
            self.apply_tick_effects(key, status, failures);
        }

        let due_ids: HashSet<u64> = due.iter().map(|status| status.id).collect();
        if let Some(entity) = self.entities.get_mut(key) {
            for status in &mut entity.statuses {
                if due_ids.contains(&status.id) {
                    status.last_tick = Some(now);
                }
            }
        }
    }

    fn apply_modifiers(
        &mut self,
        key: &EntityKey,
        status: &DueStatus,
        failures: &mut Vec<EvalError>,
    ) {
        for component in &status.template.components {
            if !component.is_call_to(MOD_VALUE_F) {
                continue;
            }
            let modifier = self
                .reenter(|engine| {
                    engine.resolve_status_formula(component, &status.source, key, &status.values)
                })
                .and_then(|value| Ok(value.as_modifier()?.clone()));
            match modifier {
                Ok(modifier) => {
                    if let Some(entity) = self.entities.get_mut(key) {
                        entity.adjust_derived(&modifier.stat, modifier.amount);
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        %key,
                        status = %status.template.key,
                        %err,
                        "status modifier failed"
                    );
                    failures.push(err);
                }
            }
        }
    }

    fn apply_tick_effects(
        &mut self,
        key: &EntityKey,
        status: &DueStatus,
        failures: &mut Vec<EvalError>,
    ) {
        for component in &status.template.components {
            if !(component.is_call_to(HARM_F) || component.is_call_to(HEAL_F)) {
                continue;
            }
            let result = self.reenter(|engine| {
                engine.resolve_status_formula(component, &status.source, key, &status.values)
            });
            if let Err(err) = result {
                tracing::warn!(%key, status = %status.template.key, %err, "status effect failed");
                failures.push(err);
            }
        }
    }
}

fn first_failure(failures: Vec<EvalError>) -> Result<(), EngineError> {
    match failures.into_iter().next() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
