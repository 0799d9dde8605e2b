//! RON catalog loaders for damage types, statuses, skills and entities.
//!
//! RON format for every catalog is a list of definitions:
//!
//! ```ron
//! [
//!     (key: "PHYS", mitigation: Some("NON_NEG($VALUE-DEF)")),
//!     (key: "TRUE"),
//! ]
//! ```

use std::path::Path;

use game_core::{DamageType, SkillTemplate, StatusTemplate};
use game_formula::TreeBuilder;

use crate::defs::{DamageTypeDef, EntityDef, SkillDef, StatusDef};
use crate::loaders::{LoadResult, read_ron_list};

/// Loader for damage types.
pub struct DamageTypeLoader;

impl DamageTypeLoader {
    pub fn load(path: &Path, builder: &TreeBuilder<'_>) -> LoadResult<Vec<DamageType>> {
        let defs: Vec<DamageTypeDef> = read_ron_list(path)?;
        defs.iter()
            .map(|def| {
                def.build(builder).map_err(|e| {
                    anyhow::anyhow!("Invalid formula in damage type '{}': {}", def.key, e)
                })
            })
            .collect()
    }
}

/// Loader for status templates.
pub struct StatusLoader;

impl StatusLoader {
    pub fn load(path: &Path, builder: &TreeBuilder<'_>) -> LoadResult<Vec<StatusTemplate>> {
        let defs: Vec<StatusDef> = read_ron_list(path)?;
        defs.iter()
            .map(|def| {
                def.build(builder)
                    .map_err(|e| anyhow::anyhow!("Invalid formula in status '{}': {}", def.key, e))
            })
            .collect()
    }
}

/// Loader for skill templates.
pub struct SkillLoader;

impl SkillLoader {
    pub fn load(path: &Path, builder: &TreeBuilder<'_>) -> LoadResult<Vec<SkillTemplate>> {
        let defs: Vec<SkillDef> = read_ron_list(path)?;
        defs.iter()
            .map(|def| {
                def.build(builder)
                    .map_err(|e| anyhow::anyhow!("Invalid formula in skill '{}': {}", def.key, e))
            })
            .collect()
    }
}

/// Loader for the entity roster.
///
/// Entities are returned as definitions; stats are only materialized when
/// the roster is registered against an engine's default stats.
pub struct EntityLoader;

impl EntityLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<EntityDef>> {
        read_ron_list(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{EntityKind, StackingType};
    use game_formula::Registry;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn ron_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_damage_types_with_optional_formulas() {
        let file = ron_file(
            r#"[
                (key: "PHYS", mitigation: Some("NON_NEG($VALUE-DEF)")),
                (key: "TRUE"),
            ]"#,
        );
        let builder = TreeBuilder::new(Registry::shared());
        let types = DamageTypeLoader::load(file.path(), &builder).unwrap();

        assert_eq!(types.len(), 2);
        assert!(types[0].mitigation.is_some());
        assert!(types[0].dodge.is_none());
        assert_eq!(types[1], DamageType::new("TRUE"));
    }

    #[test]
    fn loads_statuses_with_stacking() {
        let file = ron_file(
            r#"[
                (
                    key: "bleed",
                    stacking: independent,
                    max_stacks: Some("3"),
                    components: ["HARM($TARGET,$CASTER,PHYS,$0)"],
                ),
            ]"#,
        );
        let builder = TreeBuilder::new(Registry::shared());
        let statuses = StatusLoader::load(file.path(), &builder).unwrap();

        assert_eq!(statuses[0].stacking, StackingType::Independent);
        assert!(statuses[0].max_stacks.is_some());
    }

    #[test]
    fn formula_errors_name_the_definition() {
        let file = ron_file(r#"[(key: "broken", formula: "STR*")]"#);
        let builder = TreeBuilder::new(Registry::shared());
        let err = SkillLoader::load(file.path(), &builder).unwrap_err();
        assert!(err.to_string().contains("skill 'broken'"));
    }

    #[test]
    fn loads_entities() {
        let file = ron_file(
            r#"[
                (key: "hero", name: "Hero", kind: player, stats: {"STR": 9.0}),
                (key: "rat", name: "Rat", kind: enemy),
            ]"#,
        );
        let entities = EntityLoader::load(file.path()).unwrap();

        assert_eq!(entities[0].kind, EntityKind::Player);
        assert_eq!(entities[0].stats["STR"], 9.0);
        assert!(entities[1].stats.is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = EntityLoader::load(Path::new("/nonexistent/entities.ron")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
