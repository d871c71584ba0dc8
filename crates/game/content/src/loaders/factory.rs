//! Content factory for building the battle environment from data files.

use std::path::{Path, PathBuf};

use battle_core::{BattleConfig, MemoryDatabase};

use crate::loaders::{ConfigLoader, DatabaseLoader, LoadResult};

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── database.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load battle configuration from `config.toml`.
    ///
    /// A missing file yields the default configuration.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(BattleConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the database from `database.ron`.
    pub fn load_database(&self) -> LoadResult<MemoryDatabase> {
        let path = self.data_dir.join("database.ron");
        DatabaseLoader::load(&path)
    }

    /// Loads both files and checks that the configuration's ids resolve.
    pub fn load_all(&self) -> LoadResult<(BattleConfig, MemoryDatabase)> {
        let config = self.load_config()?;
        let db = self.load_database()?;
        DatabaseLoader::check_config(&db, &config)?;
        Ok((config, db))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
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
