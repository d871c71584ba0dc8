//! Oracle access errors.
//!
//! Errors related to data-table lookups that must succeed before a battle
//! can start. During a running battle, missing records are skipped instead.

use crate::error::{BattleError, ErrorSeverity};

/// Errors that occur when resolving database records.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("actor {0} not found")]
    ActorNotFound(u32),

    #[error("class {0} not found")]
    ClassNotFound(u32),

    #[error("skill {0} not found")]
    SkillNotFound(u32),

    #[error("item {0} not found")]
    ItemNotFound(u32),

    #[error("weapon {0} not found")]
    WeaponNotFound(u32),

    #[error("armor {0} not found")]
    ArmorNotFound(u32),

    #[error("state {0} not found")]
    StateNotFound(u32),

    #[error("enemy {0} not found")]
    EnemyNotFound(u32),

    #[error("troop {0} not found")]
    TroopNotFound(u32),
}

impl BattleError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            // The encounter cannot be assembled without these
            TroopNotFound(_) | EnemyNotFound(_) | ClassNotFound(_) | ActorNotFound(_) => {
                ErrorSeverity::Fatal
            }

            SkillNotFound(_) | ItemNotFound(_) | WeaponNotFound(_) | ArmorNotFound(_)
            | StateNotFound(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            ActorNotFound(_) => "ORACLE_ACTOR_NOT_FOUND",
            ClassNotFound(_) => "ORACLE_CLASS_NOT_FOUND",
            SkillNotFound(_) => "ORACLE_SKILL_NOT_FOUND",
            ItemNotFound(_) => "ORACLE_ITEM_NOT_FOUND",
            WeaponNotFound(_) => "ORACLE_WEAPON_NOT_FOUND",
            ArmorNotFound(_) => "ORACLE_ARMOR_NOT_FOUND",
            StateNotFound(_) => "ORACLE_STATE_NOT_FOUND",
            EnemyNotFound(_) => "ORACLE_ENEMY_NOT_FOUND",
            TroopNotFound(_) => "ORACLE_TROOP_NOT_FOUND",
        }
    }
}
