//! Damage types: dodge, crit and mitigation formulas.

use game_formula::{EvalError, Node, ParseError, TreeBuilder};

use crate::EntityKey;
use crate::engine::GameEngine;

/// Result of running raw damage through a damage type.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageOutcome {
    /// Damage that lands.
    pub amount: f64,
    /// Raw damage minus what lands. Negative when a crit amplified it.
    pub resisted: f64,
    pub critical: bool,
}

/// Damage type definition.
///
/// Every formula is optional:
/// - no dodge formula means the attack can never be dodged
/// - no crit chance means it never crits, and no crit modifier means a crit
///   multiplies by 1
/// - no mitigation formula means the post-crit amount lands unchanged
///
/// Dodge and crit formulas read the attacker's bare stats; mitigation reads
/// the defender's and receives the post-crit amount as `$VALUE`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DamageType {
    pub key: String,
    pub mitigation: Option<Node>,
    pub dodge: Option<Node>,
    pub crit_chance: Option<Node>,
    pub crit_modifier: Option<Node>,
}

impl DamageType {
    /// Damage type with no formulas: always lands in full.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Parses every provided formula.
    pub fn parse(
        builder: &TreeBuilder<'_>,
        key: impl Into<String>,
        mitigation: Option<&str>,
        dodge: Option<&str>,
        crit_chance: Option<&str>,
        crit_modifier: Option<&str>,
    ) -> Result<Self, ParseError> {
        let build = |text: Option<&str>| text.map(|t| builder.build_str(t)).transpose();
        Ok(Self {
            key: key.into(),
            mitigation: build(mitigation)?,
            dodge: build(dodge)?,
            crit_chance: build(crit_chance)?,
            crit_modifier: build(crit_modifier)?,
        })
    }

    /// Rolls the target's dodge against `source`.
    ///
    /// An attacker that no longer exists cannot be dodged.
    pub fn dodge(
        &self,
        engine: &mut GameEngine,
        source: &EntityKey,
        target: &EntityKey,
    ) -> Result<bool, EvalError> {
        let Some(tree) = &self.dodge else {
            return Ok(false);
        };
        if !engine.contains(source) {
            return Ok(false);
        }
        let chance = engine
            .resolve_skill_formula(tree, source, target)?
            .as_number()?;
        Ok(engine.roll_chance(chance))
    }

    /// Applies crit and mitigation to `raw`.
    pub fn mitigated_amount(
        &self,
        engine: &mut GameEngine,
        raw: f64,
        source: &EntityKey,
        target: &EntityKey,
    ) -> Result<DamageOutcome, EvalError> {
        let critical = match &self.crit_chance {
            Some(tree) if engine.contains(source) => {
                let chance = engine
                    .resolve_skill_formula(tree, source, target)?
                    .as_number()?;
                engine.roll_chance(chance)
            }
            _ => false,
        };

        let multiplier = match (&self.crit_modifier, critical) {
            (Some(tree), true) => engine
                .resolve_skill_formula(tree, source, target)?
                .as_number()?,
            _ => 1.0,
        };

        let amount = raw * multiplier;
        let amount = match &self.mitigation {
            Some(tree) => engine
                .resolve_mitigation(tree, target, source, amount)?
                .as_number()?,
            None => amount,
        };

        tracing::debug!(
            damage_type = %self.key,
            raw,
            amount,
            critical,
            "mitigated damage"
        );
        Ok(DamageOutcome {
            amount,
            resisted: raw - amount,
            critical,
        })
    }
}
