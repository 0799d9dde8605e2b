//! Content loaders for reading combat data from files.
//!
//! Catalogs are RON lists of the definitions in [`crate::defs`]; engine
//! configuration is TOML.

pub mod catalog;
pub mod config;
pub mod factory;

pub use catalog::{DamageTypeLoader, EntityLoader, SkillLoader, StatusLoader};
pub use config::ConfigLoader;
pub use factory::ContentFactory;

use std::path::Path;

use serde::de::DeserializeOwned;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Reads a RON list of definitions.
pub(crate) fn read_ron_list<T: DeserializeOwned>(path: &Path) -> LoadResult<Vec<T>> {
    let content = read_file(path)?;
    ron::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse RON at {}: {}", path.display(), e))
}
