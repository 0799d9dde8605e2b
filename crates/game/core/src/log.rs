//! Combat event sink.
//!
//! The engine reports what happened as structured records and never formats
//! prose itself. [`TracingLog`] forwards records to `tracing`; [`MemoryLog`]
//! keeps them for inspection.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::EntityKey;

/// Damage that landed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageReport {
    pub target: EntityKey,
    pub source: EntityKey,
    pub damage_type: String,
    pub amount: f64,
    /// Raw amount minus what landed.
    pub resisted: f64,
    pub critical: bool,
}

/// Attack avoided entirely.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DodgeReport {
    pub target: EntityKey,
    pub source: EntityKey,
    pub damage_type: String,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealReport {
    pub target: EntityKey,
    pub source: EntityKey,
    pub amount: f64,
}

/// Receiver of combat events.
pub trait CombatLog {
    fn damage(&mut self, report: DamageReport);
    fn dodge(&mut self, report: DodgeReport);
    fn heal(&mut self, report: HealReport);
}

/// Emits every event as a structured `tracing` record.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLog;

impl CombatLog for TracingLog {
    fn damage(&mut self, report: DamageReport) {
        tracing::info!(
            target = %report.target,
            source = %report.source,
            damage_type = %report.damage_type,
            amount = report.amount,
            resisted = report.resisted,
            critical = report.critical,
            "damage"
        );
    }

    fn dodge(&mut self, report: DodgeReport) {
        tracing::info!(
            target = %report.target,
            source = %report.source,
            damage_type = %report.damage_type,
            "dodge"
        );
    }

    fn heal(&mut self, report: HealReport) {
        tracing::info!(
            target = %report.target,
            source = %report.source,
            amount = report.amount,
            "heal"
        );
    }
}

/// One recorded combat event.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEvent {
    Damage(DamageReport),
    Dodge(DodgeReport),
    Heal(HealReport),
}

/// In-memory log. Clones share the same buffer, so a handle kept by the
/// caller sees what the engine recorded.
#[derive(Clone, Debug, Default)]
pub struct MemoryLog {
    events: Arc<Mutex<Vec<CombatEvent>>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CombatEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<CombatEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, event: CombatEvent) {
        self.lock().push(event);
    }
}

impl CombatLog for MemoryLog {
    fn damage(&mut self, report: DamageReport) {
        self.push(CombatEvent::Damage(report));
    }

    fn dodge(&mut self, report: DodgeReport) {
        self.push(CombatEvent::Dodge(report));
    }

    fn heal(&mut self, report: HealReport) {
        self.push(CombatEvent::Heal(report));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_log_handles_share_events() {
        let log = MemoryLog::new();
        let mut sink = log.clone();
        sink.heal(HealReport {
            target: "hero".into(),
            source: "cleric".into(),
            amount: 5.0,
        });
        assert_eq!(log.len(), 1);
        assert!(matches!(&log.events()[0], CombatEvent::Heal(r) if r.amount == 5.0));

        log.clear();
        assert!(sink.is_empty());
    }
}
