//! Buff and debuff application on top of [`BuffTable`].

use super::Battler;
use crate::env::BattleEnv;
use crate::stats::{BuffTable, Param};

impl Battler {
    pub fn buffs(&self) -> &BuffTable {
        &self.buffs
    }

    pub fn add_buff(&mut self, env: BattleEnv<'_>, param: Param, turns: i32) {
        if !self.is_alive(env) {
            return;
        }
        self.buffs.increase(param);
        if self.buffs.is_buffed(param) {
            self.buffs.overwrite_turns(param, turns);
        }
        self.result.push_added_buff(param);
        self.refresh(env);
    }

    pub fn add_debuff(&mut self, env: BattleEnv<'_>, param: Param, turns: i32) {
        if !self.is_alive(env) {
            return;
        }
        self.buffs.decrease(param);
        if self.buffs.is_debuffed(param) {
            self.buffs.overwrite_turns(param, turns);
        }
        self.result.push_added_debuff(param);
        self.refresh(env);
    }

    pub fn remove_buff(&mut self, env: BattleEnv<'_>, param: Param) {
        if self.is_alive(env) && self.buffs.is_affected(param) {
            self.buffs.erase(param);
            self.result.push_removed_buff(param);
            self.refresh(env);
        }
    }

    pub fn remove_all_buffs(&mut self, env: BattleEnv<'_>) {
        for param in Param::ALL {
            self.remove_buff(env, param);
        }
    }

    /// Drops buffs whose counter ran out.
    pub fn remove_buffs_auto(&mut self, env: BattleEnv<'_>) {
        for param in Param::ALL {
            if self.buffs.is_expired(param) {
                self.remove_buff(env, param);
            }
        }
    }

    pub fn update_buff_turns(&mut self) {
        self.buffs.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battler::test_support;
    use crate::config::BattleConfig;

    #[test]
    fn buff_then_debuff_cancels_level_but_keeps_turns() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);

        reid.add_buff(env, Param::Attack, 5);
        assert_eq!(reid.buffs().level(Param::Attack), 1);
        assert_eq!(reid.buffs().turns(Param::Attack), 5);

        reid.add_debuff(env, Param::Attack, 2);
        assert_eq!(reid.buffs().level(Param::Attack), 0);
        assert_eq!(reid.buffs().turns(Param::Attack), 5);
        assert!(reid.result().added_debuffs.contains(&Param::Attack));
    }

    #[test]
    fn expired_buffs_are_removed() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);

        reid.add_buff(env, Param::Agility, 1);
        reid.remove_buffs_auto(env);
        assert!(reid.buffs().is_buffed(Param::Agility));

        reid.update_buff_turns();
        reid.remove_buffs_auto(env);
        assert!(!reid.buffs().is_affected(Param::Agility));
        assert_eq!(reid.result().removed_buffs, vec![Param::Agility]);
    }

    #[test]
    fn dead_battlers_take_no_buffs() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);
        reid.set_hp(env, 0);
        reid.add_buff(env, Param::Defense, 3);
        assert!(!reid.buffs().is_affected(Param::Defense));
    }
}
