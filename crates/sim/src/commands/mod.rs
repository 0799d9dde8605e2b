mod eval;
mod run;

pub use eval::Eval;
pub use run::Run;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use game_content::ContentFactory;
use game_core::{GameEngine, SteppedTimer};

/// Content location shared by every command.
#[derive(Args, Debug)]
pub struct ContentArgs {
    /// Directory holding config.toml and the RON catalogs
    #[arg(long, default_value = "crates/game/content/data")]
    pub data_dir: PathBuf,

    /// Override the configured RNG seed
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ContentArgs {
    /// Loads the content into an engine driven by a stepped clock.
    pub fn load(&self, timer: &SteppedTimer) -> Result<GameEngine> {
        let factory = ContentFactory::new(&self.data_dir);
        let mut config = factory
            .load_config()
            .with_context(|| format!("loading config from {}", self.data_dir.display()))?;
        if let Some(seed) = self.seed {
            config = config.with_rng_seed(seed);
        }

        let mut engine = GameEngine::new(config).with_timer(timer.clone());
        factory
            .populate(&mut engine)
            .with_context(|| format!("loading content from {}", self.data_dir.display()))?;
        tracing::info!(
            entities = engine.entities().count(),
            data_dir = %self.data_dir.display(),
            "content loaded"
        );
        Ok(engine)
    }
}
