//! Combat participants and their stat blocks.

use std::collections::BTreeMap;

use crate::EntityKey;
use crate::status::AppliedStatus;

/// Which side an entity fights on.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EntityKind {
    Player,
    Enemy,
}

/// A combatant.
///
/// `base_stats` are persistent. `derived_stats` are recomputed on every
/// update as base plus the modifiers of the statuses that ticked.
#[derive(Clone, Debug)]
pub struct Entity {
    key: EntityKey,
    pub name: String,
    kind: EntityKind,
    pub base_stats: BTreeMap<String, f64>,
    pub derived_stats: BTreeMap<String, f64>,
    pub statuses: Vec<AppliedStatus>,
}

impl Entity {
    pub fn new(
        key: impl Into<EntityKey>,
        name: impl Into<String>,
        kind: EntityKind,
        stats: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            kind,
            derived_stats: stats.clone(),
            base_stats: stats,
            statuses: Vec::new(),
        }
    }

    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn is_player(&self) -> bool {
        self.kind == EntityKind::Player
    }

    /// Current (derived) value of `stat`.
    pub fn stat(&self, stat: &str) -> Option<f64> {
        self.derived_stats.get(stat).copied()
    }

    pub fn base_stat(&self, stat: &str) -> Option<f64> {
        self.base_stats.get(stat).copied()
    }

    pub fn has_stat(&self, stat: &str) -> bool {
        self.derived_stats.contains_key(stat) || self.base_stats.contains_key(stat)
    }

    /// Sets a base stat and mirrors it into the derived block.
    pub fn set_base_stat(&mut self, stat: impl Into<String>, value: f64) {
        let stat = stat.into();
        self.derived_stats.insert(stat.clone(), value);
        self.base_stats.insert(stat, value);
    }

    /// Adds `delta` to a stat in both blocks so the change survives the next
    /// reset. Missing stats start at 0.
    pub fn adjust_persistent(&mut self, stat: &str, delta: f64) {
        *self.base_stats.entry(stat.to_owned()).or_insert(0.0) += delta;
        *self.derived_stats.entry(stat.to_owned()).or_insert(0.0) += delta;
    }

    /// Adds `delta` to a derived stat only. Missing stats start at 0.
    pub fn adjust_derived(&mut self, stat: &str, delta: f64) {
        *self.derived_stats.entry(stat.to_owned()).or_insert(0.0) += delta;
    }

    pub fn reset_derived(&mut self) {
        self.derived_stats = self.base_stats.clone();
    }

    pub fn status_count(&self, status: &str) -> usize {
        self.statuses
            .iter()
            .filter(|applied| applied.key() == status)
            .count()
    }

    pub fn status_mut(&mut self, status: &str) -> Option<&mut AppliedStatus> {
        self.statuses
            .iter_mut()
            .find(|applied| applied.key() == status)
    }

    pub fn has_status(&self, status: &str) -> bool {
        self.statuses.iter().any(|applied| applied.key() == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero() -> Entity {
        let stats = BTreeMap::from([("CHP".to_owned(), 100.0), ("STR".to_owned(), 5.0)]);
        Entity::new("hero", "Hero", EntityKind::Player, stats)
    }

    #[test]
    fn derived_resets_to_base() {
        let mut entity = hero();
        entity.adjust_derived("STR", 3.0);
        entity.adjust_derived("LUCK", 1.0);
        assert_eq!(entity.stat("STR"), Some(8.0));
        assert_eq!(entity.stat("LUCK"), Some(1.0));

        entity.reset_derived();
        assert_eq!(entity.stat("STR"), Some(5.0));
        assert_eq!(entity.stat("LUCK"), None);
    }

    #[test]
    fn persistent_changes_survive_reset() {
        let mut entity = hero();
        entity.adjust_persistent("CHP", -30.0);
        entity.reset_derived();
        assert_eq!(entity.stat("CHP"), Some(70.0));
        assert_eq!(entity.base_stat("CHP"), Some(70.0));
    }

    #[test]
    fn kind_round_trips_through_strings() {
        use std::str::FromStr;
        assert_eq!(EntityKind::from_str("enemy").unwrap(), EntityKind::Enemy);
        assert_eq!(EntityKind::Player.to_string(), "player");
    }
}
