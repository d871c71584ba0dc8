use std::collections::BTreeMap;

use super::UnitView;
use crate::battler::{Battler, BattlerId, Side};
use crate::config::BattleConfig;
use crate::env::{BattleEnv, InventoryKey, RngOracle, TroopId};
use crate::error::SetupError;

const LETTERS: [&str; 26] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R",
    "S", "T", "U", "V", "W", "X", "Y", "Z",
];

/// The enemies of one encounter and the troop-level turn counter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Troop {
    troop_id: TroopId,
    pub(crate) members: Vec<Battler>,
    turn_count: i32,
    names_count: BTreeMap<String, usize>,
}

impl Troop {
    /// Spawns every member of a troop definition.
    ///
    /// All enemy ids are resolved up front, so a troop either spawns whole or
    /// not at all.
    pub fn setup(env: BattleEnv<'_>, troop_id: TroopId) -> Result<Self, SetupError> {
        let def = env.db().require_troop(troop_id)?;
        if def.members.is_empty() {
            return Err(SetupError::EmptyTroop { troop_id });
        }
        if def.members.len() > BattleConfig::MAX_TROOP_MEMBERS {
            tracing::warn!(
                "troop {} has {} members, keeping the first {}",
                troop_id,
                def.members.len(),
                BattleConfig::MAX_TROOP_MEMBERS
            );
        }
        let mut members = Vec::with_capacity(def.members.len());
        for member in def.members.iter().take(BattleConfig::MAX_TROOP_MEMBERS) {
            let mut enemy = Battler::new_enemy(env, member.enemy_id)?;
            if member.hidden {
                enemy.hide();
            }
            members.push(enemy);
        }
        let mut troop = Self {
            troop_id,
            members,
            turn_count: 0,
            names_count: BTreeMap::new(),
        };
        troop.make_unique_names(env);
        Ok(troop)
    }

    pub fn troop_id(&self) -> TroopId {
        self.troop_id
    }

    pub fn members(&self) -> &[Battler] {
        &self.members
    }

    pub fn member(&self, index: usize) -> Option<&Battler> {
        self.members.get(index)
    }

    pub fn member_mut(&mut self, index: usize) -> Option<&mut Battler> {
        self.members.get_mut(index)
    }

    pub fn member_ids(&self) -> Vec<BattlerId> {
        (0..self.members.len()).map(BattlerId::troop).collect()
    }

    pub fn view(&self) -> UnitView<'_> {
        UnitView::new(Side::Troop, self.members.iter().enumerate().collect())
    }

    pub fn is_all_dead(&self, env: BattleEnv<'_>) -> bool {
        self.view().is_all_dead(env)
    }

    pub fn agility(&self, env: BattleEnv<'_>) -> f64 {
        self.view().agility(env)
    }

    // ===== turns =====

    pub fn turn_count(&self) -> i32 {
        self.turn_count
    }

    pub fn increase_turn(&mut self) {
        self.turn_count += 1;
    }

    // ===== names =====

    /// Letters every alive enemy that has none, per original name, then
    /// marks names that occur more than once as plural.
    pub fn make_unique_names(&mut self, env: BattleEnv<'_>) {
        for enemy in self.members.iter_mut() {
            let empty = enemy.as_enemy().is_some_and(|data| data.letter.is_empty());
            if enemy.is_alive(env) && empty {
                let name = enemy.original_name(env);
                let count = self.names_count.entry(name).or_insert(0);
                enemy.set_letter(LETTERS[*count % LETTERS.len()].to_string());
                *count += 1;
            }
        }
        for enemy in self.members.iter_mut() {
            let name = enemy.original_name(env);
            if self.names_count.get(&name).is_some_and(|count| *count >= 2) {
                enemy.set_plural(true);
            }
        }
    }

    /// Distinct names of alive enemies, in member order.
    pub fn enemy_names(&self, env: BattleEnv<'_>) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for enemy in &self.members {
            let name = enemy.name(env);
            if enemy.is_alive(env) && !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    // ===== rewards =====

    fn dead_members<'s>(&'s self, env: BattleEnv<'s>) -> impl Iterator<Item = &'s Battler> + 's {
        self.members.iter().filter(move |enemy| enemy.is_dead(env))
    }

    pub fn exp_total(&self, env: BattleEnv<'_>) -> i64 {
        self.dead_members(env).map(|enemy| enemy.reward_exp(env)).sum()
    }

    pub fn gold_total(&self, env: BattleEnv<'_>, gold_rate: i64) -> i64 {
        self.dead_members(env)
            .map(|enemy| enemy.reward_gold(env))
            .sum::<i64>()
            * gold_rate
    }

    pub fn make_drop_items(
        &self,
        env: BattleEnv<'_>,
        rng: &mut dyn RngOracle,
        drop_double: bool,
    ) -> Vec<InventoryKey> {
        let mut drops = Vec::new();
        for enemy in self.dead_members(env) {
            drops.extend(enemy.make_drop_items(env, rng, drop_double));
        }
        drops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battler::test_support;
    use crate::env::{OracleError, TroopDef, TroopMember};

    #[test]
    fn duplicate_names_get_letters() {
        let db = test_support::database().with_troop(
            2,
            TroopDef {
                name: "Mixed".into(),
                members: vec![
                    TroopMember {
                        enemy_id: 1,
                        hidden: false,
                    },
                    TroopMember {
                        enemy_id: 2,
                        hidden: false,
                    },
                    TroopMember {
                        enemy_id: 1,
                        hidden: false,
                    },
                ],
            },
        );
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let troop = Troop::setup(env, 2).unwrap();
        let names: Vec<String> = troop.members().iter().map(|e| e.name(env)).collect();
        assert_eq!(names, vec!["SlimeA", "Bat", "SlimeB"]);
        assert_eq!(troop.enemy_names(env), vec!["SlimeA", "Bat", "SlimeB"]);
    }

    #[test]
    fn setup_rejects_missing_data() {
        let db = test_support::database()
            .with_troop(3, TroopDef::default())
            .with_troop(
                4,
                TroopDef {
                    name: "Ghost".into(),
                    members: vec![TroopMember {
                        enemy_id: 99,
                        hidden: false,
                    }],
                },
            );
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        assert_eq!(
            Troop::setup(env, 77).unwrap_err(),
            SetupError::Data(OracleError::TroopNotFound(77))
        );
        assert_eq!(
            Troop::setup(env, 3).unwrap_err(),
            SetupError::EmptyTroop { troop_id: 3 }
        );
        assert_eq!(
            Troop::setup(env, 4).unwrap_err(),
            SetupError::Data(OracleError::EnemyNotFound(99))
        );
    }

    #[test]
    fn rewards_count_only_dead_enemies() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut troop = Troop::setup(env, 1).unwrap();
        assert_eq!(troop.exp_total(env), 0);

        troop.members[0].set_hp(env, 0);
        assert_eq!(troop.exp_total(env), 10);
        assert_eq!(troop.gold_total(env, 2), 10);
        assert!(!troop.is_all_dead(env));

        troop.members[1].set_hp(env, 0);
        assert!(troop.is_all_dead(env));
        assert_eq!(troop.exp_total(env), 20);
    }
}
