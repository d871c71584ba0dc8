//! Battle database loader.
//!
//! Every table is a list of `(id, definition)` pairs. Ids must be unique
//! within a table; cross references are checked after parsing.

use std::collections::BTreeMap;
use std::path::Path;

use battle_core::env::{
    ActorDef, ArmorDef, ClassDef, EnemyDef, StateDef, SystemDef, TroopDef, UsableItem, WeaponDef,
};
use battle_core::{BattleConfig, MemoryDatabase};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::loaders::{LoadResult, read_file};

/// Database layout for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct DatabaseRon {
    system: SystemDef,
    actors: Vec<(u32, ActorDef)>,
    classes: Vec<(u32, ClassDef)>,
    skills: Vec<(u32, UsableItem)>,
    items: Vec<(u32, UsableItem)>,
    weapons: Vec<(u32, WeaponDef)>,
    armors: Vec<(u32, ArmorDef)>,
    states: Vec<(u32, StateDef)>,
    enemies: Vec<(u32, EnemyDef)>,
    troops: Vec<(u32, TroopDef)>,
}

/// Loader for the battle database from RON files.
pub struct DatabaseLoader;

impl DatabaseLoader {
    /// Load and validate a database from a RON file.
    pub fn load(path: &Path) -> LoadResult<MemoryDatabase> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<MemoryDatabase> {
        let data: DatabaseRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse database RON: {}", e))?;

        let db = MemoryDatabase {
            actors: table("actors", data.actors)?,
            classes: table("classes", data.classes)?,
            skills: table("skills", data.skills)?,
            items: table("items", data.items)?,
            weapons: table("weapons", data.weapons)?,
            armors: table("armors", data.armors)?,
            states: table("states", data.states)?,
            enemies: table("enemies", data.enemies)?,
            troops: table("troops", data.troops)?,
            system: data.system,
        };
        validate(&db)?;
        Ok(db)
    }

    /// Checks the ids a configuration relies on.
    pub fn check_config(db: &MemoryDatabase, config: &BattleConfig) -> LoadResult<()> {
        if !db.states.contains_key(&config.death_state_id) {
            anyhow::bail!("death state {} is not defined", config.death_state_id);
        }
        for (role, id) in [
            ("attack", config.attack_skill_id),
            ("guard", config.guard_skill_id),
        ] {
            if !db.skills.contains_key(&id) {
                anyhow::bail!("{} skill {} is not defined", role, id);
            }
        }
        Ok(())
    }
}

fn table<T>(name: &str, entries: Vec<(u32, T)>) -> LoadResult<BTreeMap<u32, T>> {
    let mut map = BTreeMap::new();
    for (id, def) in entries {
        if map.insert(id, def).is_some() {
            anyhow::bail!("duplicate id {} in {}", id, name);
        }
    }
    Ok(map)
}

/// Broken links that would stop a battle from starting are errors. Links
/// that only make an action unusable are logged.
fn validate(db: &MemoryDatabase) -> LoadResult<()> {
    for (id, actor) in &db.actors {
        if !db.classes.contains_key(&actor.class_id) {
            anyhow::bail!("actor {} uses undefined class {}", id, actor.class_id);
        }
    }
    for (id, troop) in &db.troops {
        for member in &troop.members {
            if !db.enemies.contains_key(&member.enemy_id) {
                anyhow::bail!("troop {} references undefined enemy {}", id, member.enemy_id);
            }
        }
    }

    for (id, class) in &db.classes {
        for learning in &class.learnings {
            if !db.skills.contains_key(&learning.skill_id) {
                warn!(class = id, skill = learning.skill_id, "class learns an undefined skill");
            }
        }
    }
    for (id, enemy) in &db.enemies {
        for action in &enemy.actions {
            if !db.skills.contains_key(&action.skill_id) {
                warn!(enemy = id, skill = action.skill_id, "enemy action uses an undefined skill");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::env::UsableKind;

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = DatabaseLoader::parse(
            r#"(
    states: [
        (1, (name: "Dead", priority: 100)),
        (1, (name: "Also dead")),
    ],
)"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate id 1 in states"));
    }

    #[test]
    fn troop_with_unknown_enemy_is_rejected() {
        let err = DatabaseLoader::parse(
            r#"(
    troops: [
        (1, (name: "Ghosts", members: [(enemy_id: 9)])),
    ],
)"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("undefined enemy 9"));
    }

    #[test]
    fn fixed_size_fields_are_written_as_tuples() {
        let db = DatabaseLoader::parse(
            r#"(
    skills: [
        (5, (
            name: "Cleave",
            kind: Skill(skill_type: 1, mp_cost: 0, tp_cost: 10, required_weapon_types: (1, 0)),
        )),
    ],
    weapons: [(1, (name: "Axe", weapon_type: 1, params: (0, 0, 12, 0, 0, 0, 0, 0)))],
    armors: [(1, (name: "Cap", equip_type: 3, params: (0, 0, 0, 2, 0, 1, 0, 0)))],
    classes: [
        (1, (
            name: "Fighter",
            exp_params: (30.0, 20.0, 30.0, 30.0),
            params: [(400, 20, 15, 12, 8, 8, 10, 10), (440, 22, 17, 13, 9, 9, 11, 11)],
        )),
    ],
    enemies: [(1, (name: "Rat", params: (50, 0, 9, 4, 4, 4, 8, 6), exp: 3))],
)"#,
        )
        .unwrap();

        let UsableKind::Skill {
            required_weapon_types,
            ..
        } = &db.skills[&5].kind
        else {
            panic!("cleave should parse as a skill");
        };
        assert_eq!(*required_weapon_types, [1, 0]);
        assert_eq!(db.weapons[&1].params[2], 12);
        assert_eq!(db.armors[&1].params[5], 1);
        assert_eq!(db.classes[&1].exp_params, [30.0, 20.0, 30.0, 30.0]);
        assert_eq!(db.classes[&1].params[1][0], 440);
        assert_eq!(db.enemies[&1].params[6], 8);
    }

    #[test]
    fn list_syntax_for_fixed_size_fields_is_rejected() {
        let err = DatabaseLoader::parse(
            r#"(
    weapons: [(1, (name: "Axe", params: [0, 0, 12, 0, 0, 0, 0, 0]))],
)"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to parse database RON"));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let db = DatabaseLoader::parse("()").unwrap();
        assert!(db.actors.is_empty());
        assert_eq!(db.system, SystemDef::default());
    }

    #[test]
    fn config_ids_must_exist() {
        let db = DatabaseLoader::parse("()").unwrap();
        assert!(DatabaseLoader::check_config(&db, &BattleConfig::default()).is_err());
    }
}
