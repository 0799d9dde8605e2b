//! Designer-facing definitions.
//!
//! Each definition holds formula text as written in the data files. The
//! `build` methods compile that text into the engine's templates.

use std::collections::BTreeMap;

use game_core::{DamageType, EntityKind, SkillTemplate, StackingType, StatusTemplate};
use game_formula::{ParseError, TreeBuilder};

/// Damage type as written in `damage_types.ron`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DamageTypeDef {
    pub key: String,
    pub mitigation: Option<String>,
    pub dodge: Option<String>,
    pub crit_chance: Option<String>,
    pub crit_modifier: Option<String>,
}

impl DamageTypeDef {
    pub fn build(&self, builder: &TreeBuilder<'_>) -> Result<DamageType, ParseError> {
        DamageType::parse(
            builder,
            self.key.as_str(),
            self.mitigation.as_deref(),
            self.dodge.as_deref(),
            self.crit_chance.as_deref(),
            self.crit_modifier.as_deref(),
        )
    }
}

/// Status as written in `statuses.ron`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatusDef {
    pub key: String,
    pub stacking: StackingType,
    /// Only consulted for independent stacking. Zero means unlimited.
    pub max_stacks: Option<String>,
    /// Seconds between ticks.
    pub interval: String,
    pub components: Vec<String>,
}

impl StatusDef {
    pub const DEFAULT_INTERVAL: &'static str = "1";

    pub fn build(&self, builder: &TreeBuilder<'_>) -> Result<StatusTemplate, ParseError> {
        StatusTemplate::parse(
            builder,
            self.key.as_str(),
            self.stacking,
            self.max_stacks.as_deref(),
            &self.interval,
            self.components.as_slice(),
        )
    }
}

impl Default for StatusDef {
    fn default() -> Self {
        Self {
            key: String::new(),
            stacking: StackingType::default(),
            max_stacks: None,
            interval: Self::DEFAULT_INTERVAL.to_owned(),
            components: Vec::new(),
        }
    }
}

/// Skill as written in `skills.ron`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillDef {
    pub key: String,
    pub formula: String,
}

impl SkillDef {
    pub fn build(&self, builder: &TreeBuilder<'_>) -> Result<SkillTemplate, ParseError> {
        SkillTemplate::parse(builder, self.key.as_str(), &self.formula)
    }
}

/// Combatant as written in `entities.ron`.
///
/// `stats` override the configured default stats; stats not listed keep
/// their default.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityDef {
    pub key: String,
    pub name: String,
    pub kind: EntityKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stats: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_formula::Registry;

    #[test]
    fn status_defaults_tick_every_second() {
        let def = StatusDef {
            key: "burn".into(),
            components: vec!["HARM($TARGET,$CASTER,FIRE,$0)".into()],
            ..StatusDef::default()
        };
        let template = def.build(&TreeBuilder::new(Registry::shared())).unwrap();
        assert_eq!(template.stacking, StackingType::Refresh);
        assert_eq!(template.components.len(), 1);
        assert!(template.max_stacks.is_none());
    }

    #[test]
    fn bad_formula_text_is_reported() {
        let def = SkillDef {
            key: "broken".into(),
            formula: "HARM($TARGET,".into(),
        };
        assert!(def.build(&TreeBuilder::new(Registry::shared())).is_err());
    }
}
