//! Per-parameter buff levels and their countdowns.

use super::{Param, buff_rate};
use crate::config::BattleConfig;

/// Buff level (-2..=2) and remaining turns for each base parameter.
///
/// Levels and turns are independent: a level can be raised without touching
/// the counter, and a counter is only ever overwritten upwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffTable {
    levels: [i8; Param::COUNT],
    turns: [i32; Param::COUNT],
}

impl BuffTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, param: Param) -> i8 {
        self.levels[param.index()]
    }

    pub fn turns(&self, param: Param) -> i32 {
        self.turns[param.index()]
    }

    pub fn rate(&self, param: Param) -> f64 {
        buff_rate(self.level(param))
    }

    pub fn is_buffed(&self, param: Param) -> bool {
        self.level(param) > 0
    }

    pub fn is_debuffed(&self, param: Param) -> bool {
        self.level(param) < 0
    }

    pub fn is_affected(&self, param: Param) -> bool {
        self.level(param) != 0
    }

    pub fn is_max_buffed(&self, param: Param) -> bool {
        self.level(param) >= BattleConfig::MAX_BUFF_LEVEL
    }

    pub fn is_max_debuffed(&self, param: Param) -> bool {
        self.level(param) <= -BattleConfig::MAX_BUFF_LEVEL
    }

    /// Raises the level by one step unless it is already at the cap.
    pub fn increase(&mut self, param: Param) {
        if !self.is_max_buffed(param) {
            self.levels[param.index()] += 1;
        }
    }

    /// Lowers the level by one step unless it is already at the floor.
    pub fn decrease(&mut self, param: Param) {
        if !self.is_max_debuffed(param) {
            self.levels[param.index()] -= 1;
        }
    }

    /// Sets the counter to `turns` only if that is longer than what remains.
    pub fn overwrite_turns(&mut self, param: Param, turns: i32) {
        let slot = &mut self.turns[param.index()];
        if *slot < turns {
            *slot = turns;
        }
    }

    pub fn erase(&mut self, param: Param) {
        self.levels[param.index()] = 0;
        self.turns[param.index()] = 0;
    }

    /// Counts every running counter down by one.
    pub fn tick(&mut self) {
        for turns in self.turns.iter_mut() {
            if *turns > 0 {
                *turns -= 1;
            }
        }
    }

    /// A buff expires once its counter reaches zero while the level is non-zero.
    pub fn is_expired(&self, param: Param) -> bool {
        self.is_affected(param) && self.turns(param) == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_never_shortens() {
        let mut table = BuffTable::new();
        table.overwrite_turns(Param::Attack, 3);
        table.overwrite_turns(Param::Attack, 1);
        assert_eq!(table.turns(Param::Attack), 3);
        table.overwrite_turns(Param::Attack, 5);
        assert_eq!(table.turns(Param::Attack), 5);
    }

    #[test]
    fn level_is_capped_both_ways() {
        let mut table = BuffTable::new();
        for _ in 0..5 {
            table.increase(Param::Defense);
        }
        assert_eq!(table.level(Param::Defense), 2);
        assert_eq!(table.rate(Param::Defense), 1.5);
        for _ in 0..6 {
            table.decrease(Param::Defense);
        }
        assert_eq!(table.level(Param::Defense), -2);
        assert_eq!(table.rate(Param::Defense), 0.5);
    }

    #[test]
    fn tick_stops_at_zero_and_marks_expiry() {
        let mut table = BuffTable::new();
        table.increase(Param::Agility);
        table.overwrite_turns(Param::Agility, 1);
        table.tick();
        table.tick();
        assert_eq!(table.turns(Param::Agility), 0);
        assert!(table.is_expired(Param::Agility));
        assert!(!table.is_expired(Param::Luck));
    }
}
