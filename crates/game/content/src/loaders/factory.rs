//! Content factory for building a combat engine from data files.

use std::path::{Path, PathBuf};

use game_core::{
    CombatConfig, DamageType, EngineError, EntityKind, GameEngine, SkillTemplate, StatusTemplate,
};
use game_formula::TreeBuilder;

use crate::defs::EntityDef;
use crate::loaders::{
    ConfigLoader, DamageTypeLoader, EntityLoader, LoadResult, SkillLoader, StatusLoader,
};

/// Content factory that loads all combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── damage_types.ron
/// ├── statuses.ron
/// ├── skills.ron
/// └── entities.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "config.toml";
    pub const DAMAGE_TYPES_FILE: &'static str = "damage_types.ron";
    pub const STATUSES_FILE: &'static str = "statuses.ron";
    pub const SKILLS_FILE: &'static str = "skills.ron";
    pub const ENTITIES_FILE: &'static str = "entities.ron";

    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load combat configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        ConfigLoader::load(&self.data_dir.join(Self::CONFIG_FILE))
    }

    /// Load damage types from `damage_types.ron`.
    pub fn load_damage_types(&self, builder: &TreeBuilder<'_>) -> LoadResult<Vec<DamageType>> {
        DamageTypeLoader::load(&self.data_dir.join(Self::DAMAGE_TYPES_FILE), builder)
    }

    /// Load status templates from `statuses.ron`.
    pub fn load_statuses(&self, builder: &TreeBuilder<'_>) -> LoadResult<Vec<StatusTemplate>> {
        StatusLoader::load(&self.data_dir.join(Self::STATUSES_FILE), builder)
    }

    /// Load skill templates from `skills.ron`.
    pub fn load_skills(&self, builder: &TreeBuilder<'_>) -> LoadResult<Vec<SkillTemplate>> {
        SkillLoader::load(&self.data_dir.join(Self::SKILLS_FILE), builder)
    }

    /// Load the entity roster from `entities.ron`.
    pub fn load_entities(&self) -> LoadResult<Vec<EntityDef>> {
        EntityLoader::load(&self.data_dir.join(Self::ENTITIES_FILE))
    }

    /// Builds an engine from `config.toml` and registers every catalog
    /// into it.
    pub fn build_engine(&self) -> LoadResult<GameEngine> {
        let mut engine = GameEngine::new(self.load_config()?);
        self.populate(&mut engine)?;
        Ok(engine)
    }

    /// Registers every catalog into an existing engine.
    ///
    /// Formulas are compiled with the engine's own registry.
    pub fn populate(&self, engine: &mut GameEngine) -> LoadResult<()> {
        let builder = engine.tree_builder();

        for damage_type in self.load_damage_types(&builder)? {
            engine.add_damage_type(damage_type);
        }
        for status in self.load_statuses(&builder)? {
            engine.add_status(status);
        }
        for skill in self.load_skills(&builder)? {
            engine.add_skill(skill);
        }
        for def in self.load_entities()? {
            register_entity(engine, &def)
                .map_err(|e| anyhow::anyhow!("Failed to register entity '{}': {}", def.key, e))?;
        }

        Ok(())
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn register_entity(engine: &mut GameEngine, def: &EntityDef) -> Result<(), EngineError> {
    let entity = match def.kind {
        EntityKind::Player => engine.add_player(def.key.as_str(), def.name.as_str())?,
        EntityKind::Enemy => engine.add_enemy(def.key.as_str(), def.name.as_str())?,
    };
    for (stat, value) in &def.stats {
        entity.set_base_stat(stat, *value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }
}
