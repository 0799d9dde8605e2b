//! Tick loop over a stepped clock.

use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use game_core::{EntityKey, GameEngine, SteppedTimer};

use super::ContentArgs;

/// Cast skills, then advance the stepped clock and update every entity
#[derive(Parser, Debug)]
pub struct Run {
    /// Number of updates to run
    #[arg(long, default_value_t = 10)]
    pub ticks: u32,

    /// Milliseconds the clock advances between updates
    #[arg(long, default_value_t = SteppedTimer::TICK_MS)]
    pub step_ms: i64,

    /// Skill casts performed before the first update, as caster:target:skill
    #[arg(long = "cast")]
    pub casts: Vec<CastOrder>,

    #[command(flatten)]
    pub content: ContentArgs,
}

/// A `caster:target:skill` triple from the command line.
#[derive(Clone, Debug)]
pub struct CastOrder {
    pub caster: EntityKey,
    pub target: EntityKey,
    pub skill: String,
}

impl FromStr for CastOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(caster), Some(target), Some(skill))
                if !caster.is_empty() && !target.is_empty() && !skill.is_empty() =>
            {
                Ok(Self {
                    caster: EntityKey::from(caster),
                    target: EntityKey::from(target),
                    skill: skill.to_owned(),
                })
            }
            _ => Err(format!("expected caster:target:skill, got '{s}'")),
        }
    }
}

impl Run {
    pub fn execute(self) -> Result<()> {
        let timer = SteppedTimer::new();
        let mut engine = self.content.load(&timer)?;

        for order in &self.casts {
            engine
                .cast(&order.caster, &order.target, &order.skill)
                .with_context(|| {
                    format!("{} casting {} on {}", order.caster, order.skill, order.target)
                })?;
        }

        for tick in 0..self.ticks {
            if let Err(err) = engine.update() {
                tracing::warn!(tick, %err, "update finished with errors");
            }
            print_tick(tick, &engine);
            timer.advance(self.step_ms);
        }
        Ok(())
    }
}

fn print_tick(tick: u32, engine: &GameEngine) {
    let hp_stat = engine.config().hp_stat.as_str();
    println!("tick {tick} @ {}", engine.now());
    for entity in engine.entities() {
        println!(
            "  {:<12} {:>8.1} hp  {} statuses",
            entity.key().to_string(),
            entity.stat(hp_stat).unwrap_or(0.0),
            entity.statuses.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cast_orders() {
        let order: CastOrder = "knight:ogre:strike".parse().unwrap();
        assert_eq!(order.caster, EntityKey::from("knight"));
        assert_eq!(order.skill, "strike");

        assert!("knight:ogre".parse::<CastOrder>().is_err());
        assert!("knight::strike".parse::<CastOrder>().is_err());
    }
}
