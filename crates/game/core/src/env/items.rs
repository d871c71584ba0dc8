//! Skill and item definitions.
//!
//! Skills and items share one shape ([`UsableItem`]); the [`UsableKind`]
//! carries what differs (costs and skill type versus consumption).

use crate::action::Formula;
use crate::stats::{BattlerTrait, Param};

pub type SkillId = u32;
pub type ItemId = u32;
pub type WeaponId = u32;
pub type ArmorId = u32;

/// Reference to something a battler can use as an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemRef {
    Skill(SkillId),
    Item(ItemId),
}

impl ItemRef {
    pub const fn is_skill(self) -> bool {
        matches!(self, Self::Skill(_))
    }

    pub const fn is_item(self) -> bool {
        matches!(self, Self::Item(_))
    }
}

/// Key into the party inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InventoryKey {
    Item(ItemId),
    Weapon(WeaponId),
    Armor(ArmorId),
}

/// Who an action can be aimed at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scope {
    #[default]
    None,
    OneEnemy,
    AllEnemies,
    /// Hits this many randomly picked enemies.
    RandomEnemies(u8),
    OneAlly,
    AllAllies,
    OneDeadAlly,
    AllDeadAllies,
    User,
    /// One ally regardless of whether it is alive.
    OneAllyAny,
    AllAlliesAny,
    Everyone,
}

impl Scope {
    pub const fn is_for_opponent(self) -> bool {
        matches!(
            self,
            Self::OneEnemy | Self::AllEnemies | Self::RandomEnemies(_) | Self::Everyone
        )
    }

    pub const fn is_for_friend(self) -> bool {
        matches!(
            self,
            Self::OneAlly
                | Self::AllAllies
                | Self::OneDeadAlly
                | Self::AllDeadAllies
                | Self::User
                | Self::OneAllyAny
                | Self::AllAlliesAny
                | Self::Everyone
        )
    }

    pub const fn is_for_everyone(self) -> bool {
        matches!(self, Self::Everyone)
    }

    pub const fn is_for_alive_friend(self) -> bool {
        matches!(self, Self::OneAlly | Self::AllAllies | Self::User | Self::Everyone)
    }

    pub const fn is_for_dead_friend(self) -> bool {
        matches!(self, Self::OneDeadAlly | Self::AllDeadAllies)
    }

    pub const fn is_for_user(self) -> bool {
        matches!(self, Self::User)
    }

    pub const fn is_for_one(self) -> bool {
        matches!(
            self,
            Self::OneEnemy | Self::OneAlly | Self::OneDeadAlly | Self::OneAllyAny | Self::User
        ) || matches!(self, Self::RandomEnemies(1))
    }

    pub const fn is_for_random(self) -> bool {
        matches!(self, Self::RandomEnemies(_))
    }

    pub const fn is_for_all(self) -> bool {
        matches!(
            self,
            Self::AllEnemies
                | Self::AllAllies
                | Self::AllDeadAllies
                | Self::AllAlliesAny
                | Self::Everyone
        )
    }

    pub const fn needs_selection(self) -> bool {
        matches!(
            self,
            Self::OneEnemy | Self::OneAlly | Self::OneDeadAlly | Self::OneAllyAny
        )
    }

    pub const fn num_targets(self) -> usize {
        match self {
            Self::RandomEnemies(n) => n as usize,
            _ => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Occasion {
    #[default]
    Always,
    Battle,
    Menu,
    Never,
}

impl Occasion {
    pub const fn usable_in_battle(self) -> bool {
        matches!(self, Self::Always | Self::Battle)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitType {
    #[default]
    Certain,
    Physical,
    Magical,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageKind {
    #[default]
    None,
    HpDamage,
    MpDamage,
    HpRecover,
    MpRecover,
    HpDrain,
    MpDrain,
}

impl DamageKind {
    pub const fn is_hp_effect(self) -> bool {
        matches!(self, Self::HpDamage | Self::HpRecover | Self::HpDrain)
    }

    pub const fn is_mp_effect(self) -> bool {
        matches!(self, Self::MpDamage | Self::MpRecover | Self::MpDrain)
    }

    pub const fn is_recover(self) -> bool {
        matches!(self, Self::HpRecover | Self::MpRecover)
    }

    pub const fn is_drain(self) -> bool {
        matches!(self, Self::HpDrain | Self::MpDrain)
    }

    pub const fn sign(self) -> f64 {
        if self.is_recover() { -1.0 } else { 1.0 }
    }
}

/// Element used by a damage definition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageElement {
    #[default]
    None,
    /// Use the subject's attack elements (strongest rate wins).
    NormalAttack,
    Element(u32),
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DamageDef {
    pub kind: DamageKind,
    pub element: DamageElement,
    pub formula: Formula,
    /// Percent of variance applied to the computed value.
    pub variance: i32,
    pub critical: bool,
}

/// Effects applied to each target after damage.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemEffect {
    RecoverHp { rate: f64, flat: f64 },
    RecoverMp { rate: f64, flat: f64 },
    GainTp(f64),
    /// State id 0 applies the subject's attack states.
    AddState { state: u32, chance: f64 },
    RemoveState { state: u32, chance: f64 },
    AddBuff { param: Param, turns: i32 },
    AddDebuff { param: Param, turns: i32 },
    RemoveBuff(Param),
    RemoveDebuff(Param),
    Escape,
    Grow { param: Param, amount: f64 },
    LearnSkill(SkillId),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UsableKind {
    Skill {
        skill_type: u32,
        mp_cost: i32,
        tp_cost: i32,
        #[cfg_attr(feature = "serde", serde(default))]
        required_weapon_types: [u32; 2],
    },
    Item {
        consumable: bool,
    },
}

impl Default for UsableKind {
    fn default() -> Self {
        Self::Skill {
            skill_type: 0,
            mp_cost: 0,
            tp_cost: 0,
            required_weapon_types: [0, 0],
        }
    }
}

/// Shared definition of a skill or an item.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UsableItem {
    pub name: String,
    pub kind: UsableKind,
    pub scope: Scope,
    pub occasion: Occasion,
    pub speed: i32,
    /// Percent chance to succeed before hit/evasion rolls.
    pub success_rate: i32,
    pub repeats: u32,
    pub tp_gain: i32,
    pub hit_type: HitType,
    pub damage: DamageDef,
    pub effects: Vec<ItemEffect>,
}

impl Default for UsableItem {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: UsableKind::default(),
            scope: Scope::None,
            occasion: Occasion::Always,
            speed: 0,
            success_rate: 100,
            repeats: 1,
            tp_gain: 0,
            hit_type: HitType::Certain,
            damage: DamageDef::default(),
            effects: Vec::new(),
        }
    }
}

impl UsableItem {
    pub fn is_skill(&self) -> bool {
        matches!(self.kind, UsableKind::Skill { .. })
    }

    pub fn is_physical(&self) -> bool {
        self.hit_type == HitType::Physical
    }

    pub fn is_magical(&self) -> bool {
        self.hit_type == HitType::Magical
    }

    pub fn is_certain_hit(&self) -> bool {
        self.hit_type == HitType::Certain
    }

    /// Whether any effect makes the target leave battle.
    pub fn has_escape_effect(&self) -> bool {
        self.effects.iter().any(|e| matches!(e, ItemEffect::Escape))
    }

    pub fn skill_type(&self) -> Option<u32> {
        match self.kind {
            UsableKind::Skill { skill_type, .. } => Some(skill_type),
            UsableKind::Item { .. } => None,
        }
    }
}

/// Weapon definition. Weapons always occupy equip type 1.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WeaponDef {
    pub name: String,
    pub weapon_type: u32,
    pub params: [i32; Param::COUNT],
    pub traits: Vec<BattlerTrait>,
}

impl WeaponDef {
    pub const EQUIP_TYPE: u32 = 1;
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArmorDef {
    pub name: String,
    pub armor_type: u32,
    pub equip_type: u32,
    pub params: [i32; Param::COUNT],
    pub traits: Vec<BattlerTrait>,
}
