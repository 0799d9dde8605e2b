//! One-shot formula evaluation.

use anyhow::Result;
use clap::Parser;
use game_core::{EntityKey, SteppedTimer};

use super::ContentArgs;

/// Evaluate one formula against the loaded content
#[derive(Parser, Debug)]
pub struct Eval {
    /// Formula text, e.g. "GET_PROP(knight,STR)*2"
    pub formula: String,

    /// Resolve bare stat names against this entity
    #[arg(long)]
    pub entity: Option<String>,

    #[command(flatten)]
    pub content: ContentArgs,
}

impl Eval {
    pub fn execute(self) -> Result<()> {
        let mut engine = self.content.load(&SteppedTimer::new())?;

        match &self.entity {
            Some(entity) => {
                let value = engine.compound_stat(&EntityKey::from(entity.as_str()), &self.formula)?;
                println!("{value}");
            }
            None => {
                let value = game_formula::resolve_str(engine.registry(), &mut engine, &self.formula)?;
                println!("{value}");
            }
        }
        Ok(())
    }
}
