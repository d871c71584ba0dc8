//! Actor, class, enemy and troop definitions.

use super::items::{InventoryKey, SkillId};
use crate::stats::{BattlerTrait, Param};

pub type ActorId = u32;
pub type ClassId = u32;
pub type EnemyId = u32;
pub type TroopId = u32;

/// Initial equipment entry. Slot position follows the actor's equip slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EquipRef {
    Weapon(u32),
    Armor(u32),
}

impl EquipRef {
    pub const fn inventory_key(self) -> InventoryKey {
        match self {
            Self::Weapon(id) => InventoryKey::Weapon(id),
            Self::Armor(id) => InventoryKey::Armor(id),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActorDef {
    pub name: String,
    pub class_id: ClassId,
    pub initial_level: u32,
    pub max_level: u32,
    pub equips: Vec<Option<EquipRef>>,
    pub traits: Vec<BattlerTrait>,
}

/// A skill taught when the class reaches `level`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Learning {
    pub level: u32,
    pub skill_id: SkillId,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClassDef {
    pub name: String,
    /// `[basis, extra, acceleration_a, acceleration_b]`
    pub exp_params: [f64; 4],
    /// Base parameters per level, first row is level 1. Levels past the
    /// table reuse the last row.
    pub params: Vec<[i32; Param::COUNT]>,
    pub learnings: Vec<Learning>,
    pub traits: Vec<BattlerTrait>,
}

impl ClassDef {
    pub fn base_param(&self, level: u32, param: Param) -> i32 {
        let row = (level.max(1) - 1) as usize;
        self.params
            .get(row)
            .or_else(|| self.params.last())
            .map(|values| values[param.index()])
            .unwrap_or(0)
    }

    /// Experience total required to reach `level`.
    pub fn exp_for_level(&self, level: u32) -> i64 {
        let [basis, extra, acc_a, acc_b] = self.exp_params;
        let lv = f64::from(level);
        let value = basis * lv.powf(0.9 + acc_a / 250.0) * lv * (lv + 1.0)
            / (6.0 + lv.powi(2) / 50.0 / acc_b)
            + (lv - 1.0) * extra;
        value.round() as i64
    }
}

/// Condition gating one entry of an enemy's action list.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionCondition {
    #[default]
    Always,
    /// Turn `a + b * x` (or exactly `a` when `b` is zero).
    Turn { a: i32, b: i32 },
    HpRate { min: f64, max: f64 },
    MpRate { min: f64, max: f64 },
    State(u32),
    PartyLevel(u32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyAction {
    pub skill_id: SkillId,
    pub rating: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: ActionCondition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DropItem {
    pub item: InventoryKey,
    /// Drops with probability `rate / denominator`.
    pub denominator: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnemyDef {
    pub name: String,
    pub params: [i32; Param::COUNT],
    pub exp: i64,
    pub gold: i64,
    pub drops: Vec<DropItem>,
    pub actions: Vec<EnemyAction>,
    pub traits: Vec<BattlerTrait>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TroopMember {
    pub enemy_id: EnemyId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hidden: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TroopDef {
    pub name: String,
    pub members: Vec<TroopMember>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class() -> ClassDef {
        ClassDef {
            exp_params: [30.0, 20.0, 30.0, 30.0],
            params: vec![[450, 90, 20, 20, 20, 20, 20, 20], [500, 95, 22, 22, 22, 22, 22, 22]],
            ..Default::default()
        }
    }

    #[test]
    fn exp_curve_is_monotonic() {
        let class = class();
        let mut last = class.exp_for_level(1);
        for level in 2..=99 {
            let next = class.exp_for_level(level);
            assert!(next > last, "level {level}: {next} <= {last}");
            last = next;
        }
    }

    #[test]
    fn exp_curve_matches_closed_form() {
        // 30 · 2^1.02 · 2 · 3 / (6 + 4/50/30) + 20
        let expected = (30.0 * 2f64.powf(1.02) * 6.0 / (6.0 + 4.0 / 1500.0) + 20.0).round() as i64;
        assert_eq!(class().exp_for_level(2), expected);
    }

    #[test]
    fn base_param_reuses_last_row() {
        let class = class();
        assert_eq!(class.base_param(1, Param::MaxHp), 450);
        assert_eq!(class.base_param(2, Param::MaxHp), 500);
        assert_eq!(class.base_param(50, Param::MaxHp), 500);
    }
}
