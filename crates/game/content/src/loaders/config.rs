//! Battle configuration loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for battle configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys fall back to [`BattleConfig::default`].
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.max_battle_members == 0 {
            anyhow::bail!("max_battle_members must be at least 1");
        }
        if !(0.0..=1.0).contains(&config.escape_ratio_step) {
            anyhow::bail!(
                "escape_ratio_step must be within [0, 1], got {}",
                config.escape_ratio_step
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::BattleSystem;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse(
            r#"
battle_system = "active_time_bar"
reserve_exp = true
"#,
        )
        .unwrap();
        assert_eq!(config.battle_system, BattleSystem::ActiveTimeBar);
        assert!(config.reserve_exp);
        assert_eq!(config.max_tp, BattleConfig::DEFAULT_MAX_TP);
    }

    #[test]
    fn zero_battle_members_is_rejected() {
        assert!(ConfigLoader::parse("max_battle_members = 0").is_err());
    }
}
