//! Traits attached to actors, classes, equipment, enemies and states.
//!
//! A battler's effective trait list is the concatenation of every source it
//! currently carries. [`TraitSet`] borrows that list from the data tables and
//! answers the aggregate queries (product, sum, set) the formulas need.

use super::{ExParam, Param, PartyAbilities, SpParam, SpecialFlags};

/// How a battler's body leaves the field when it dies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CollapseKind {
    #[default]
    Normal,
    Boss,
    Instant,
    NoDisappear,
}

/// A single trait entry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattlerTrait {
    ElementRate { element: u32, rate: f64 },
    DebuffRate { param: Param, rate: f64 },
    StateRate { state: u32, rate: f64 },
    StateResist(u32),
    ParamRate { param: Param, rate: f64 },
    ExParam { param: ExParam, value: f64 },
    SpParam { param: SpParam, rate: f64 },
    AttackElement(u32),
    AttackState { state: u32, rate: f64 },
    AttackSpeed(i32),
    AttackTimes(f64),
    AttackSkill(u32),
    AddSkillType(u32),
    SealSkillType(u32),
    AddSkill(u32),
    SealSkill(u32),
    EquipWeaponType(u32),
    EquipArmorType(u32),
    LockEquip(u32),
    SealEquip(u32),
    /// Slot type 1 turns the second equipment slot into a weapon slot.
    SlotType(u32),
    ActionPlus(f64),
    SpecialFlag(SpecialFlags),
    Collapse(CollapseKind),
    PartyAbility(PartyAbilities),
}

/// Borrowed view over every trait currently affecting one battler.
#[derive(Clone, Debug, Default)]
pub struct TraitSet<'a> {
    traits: Vec<&'a BattlerTrait>,
}

impl<'a> TraitSet<'a> {
    pub fn new() -> Self {
        Self { traits: Vec::new() }
    }

    pub fn extend(&mut self, traits: impl IntoIterator<Item = &'a BattlerTrait>) {
        self.traits.extend(traits);
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a BattlerTrait> + '_ {
        self.traits.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    // ===== multiplicative =====

    pub fn param_rate(&self, param: Param) -> f64 {
        self.product(|t| match t {
            BattlerTrait::ParamRate { param: p, rate } if *p == param => Some(*rate),
            _ => None,
        })
    }

    pub fn element_rate(&self, element: u32) -> f64 {
        self.product(|t| match t {
            BattlerTrait::ElementRate { element: e, rate } if *e == element => Some(*rate),
            _ => None,
        })
    }

    pub fn debuff_rate(&self, param: Param) -> f64 {
        self.product(|t| match t {
            BattlerTrait::DebuffRate { param: p, rate } if *p == param => Some(*rate),
            _ => None,
        })
    }

    pub fn state_rate(&self, state: u32) -> f64 {
        self.product(|t| match t {
            BattlerTrait::StateRate { state: s, rate } if *s == state => Some(*rate),
            _ => None,
        })
    }

    pub fn sp_param(&self, param: SpParam) -> f64 {
        self.product(|t| match t {
            BattlerTrait::SpParam { param: p, rate } if *p == param => Some(*rate),
            _ => None,
        })
    }

    // ===== additive =====

    pub fn ex_param(&self, param: ExParam) -> f64 {
        self.sum(|t| match t {
            BattlerTrait::ExParam { param: p, value } if *p == param => Some(*value),
            _ => None,
        })
    }

    pub fn attack_speed(&self) -> i32 {
        self.iter()
            .filter_map(|t| match t {
                BattlerTrait::AttackSpeed(speed) => Some(*speed),
                _ => None,
            })
            .sum()
    }

    pub fn attack_times_add(&self) -> f64 {
        self.sum(|t| match t {
            BattlerTrait::AttackTimes(times) => Some(*times),
            _ => None,
        })
        .max(0.0)
    }

    pub fn attack_state_rate(&self, state: u32) -> f64 {
        self.sum(|t| match t {
            BattlerTrait::AttackState { state: s, rate } if *s == state => Some(*rate),
            _ => None,
        })
    }

    // ===== sets =====

    pub fn state_resist_set(&self) -> Vec<u32> {
        self.set(|t| match t {
            BattlerTrait::StateResist(state) => Some(*state),
            _ => None,
        })
    }

    pub fn attack_elements(&self) -> Vec<u32> {
        self.set(|t| match t {
            BattlerTrait::AttackElement(element) => Some(*element),
            _ => None,
        })
    }

    pub fn attack_states(&self) -> Vec<u32> {
        self.set(|t| match t {
            BattlerTrait::AttackState { state, .. } => Some(*state),
            _ => None,
        })
    }

    pub fn attack_skill(&self) -> Option<u32> {
        self.set(|t| match t {
            BattlerTrait::AttackSkill(skill) => Some(*skill),
            _ => None,
        })
        .into_iter()
        .max()
    }

    pub fn added_skill_types(&self) -> Vec<u32> {
        self.set(|t| match t {
            BattlerTrait::AddSkillType(stype) => Some(*stype),
            _ => None,
        })
    }

    pub fn is_skill_type_sealed(&self, stype: u32) -> bool {
        self.iter()
            .any(|t| matches!(t, BattlerTrait::SealSkillType(s) if *s == stype))
    }

    pub fn added_skills(&self) -> Vec<u32> {
        self.set(|t| match t {
            BattlerTrait::AddSkill(skill) => Some(*skill),
            _ => None,
        })
    }

    pub fn is_skill_sealed(&self, skill: u32) -> bool {
        self.iter()
            .any(|t| matches!(t, BattlerTrait::SealSkill(s) if *s == skill))
    }

    pub fn is_equip_weapon_type_ok(&self, wtype: u32) -> bool {
        self.iter()
            .any(|t| matches!(t, BattlerTrait::EquipWeaponType(w) if *w == wtype))
    }

    pub fn is_equip_armor_type_ok(&self, atype: u32) -> bool {
        self.iter()
            .any(|t| matches!(t, BattlerTrait::EquipArmorType(a) if *a == atype))
    }

    pub fn is_equip_type_locked(&self, etype: u32) -> bool {
        self.iter()
            .any(|t| matches!(t, BattlerTrait::LockEquip(e) if *e == etype))
    }

    pub fn is_equip_type_sealed(&self, etype: u32) -> bool {
        self.iter()
            .any(|t| matches!(t, BattlerTrait::SealEquip(e) if *e == etype))
    }

    pub fn slot_type(&self) -> u32 {
        self.iter()
            .filter_map(|t| match t {
                BattlerTrait::SlotType(slot) => Some(*slot),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Probabilities of each extra action roll, in trait order.
    pub fn action_plus_set(&self) -> Vec<f64> {
        self.iter()
            .filter_map(|t| match t {
                BattlerTrait::ActionPlus(chance) => Some(*chance),
                _ => None,
            })
            .collect()
    }

    pub fn special_flags(&self) -> SpecialFlags {
        self.iter().fold(SpecialFlags::empty(), |acc, t| match t {
            BattlerTrait::SpecialFlag(flags) => acc | *flags,
            _ => acc,
        })
    }

    pub fn party_abilities(&self) -> PartyAbilities {
        self.iter().fold(PartyAbilities::empty(), |acc, t| match t {
            BattlerTrait::PartyAbility(abilities) => acc | *abilities,
            _ => acc,
        })
    }

    pub fn collapse_kind(&self) -> CollapseKind {
        self.iter()
            .filter_map(|t| match t {
                BattlerTrait::Collapse(kind) => Some(*kind),
                _ => None,
            })
            .last()
            .unwrap_or_default()
    }

    // ===== helpers =====

    fn product(&self, pick: impl Fn(&BattlerTrait) -> Option<f64>) -> f64 {
        self.iter().filter_map(|t| pick(t)).product()
    }

    fn sum(&self, pick: impl Fn(&BattlerTrait) -> Option<f64>) -> f64 {
        self.iter().filter_map(|t| pick(t)).sum()
    }

    fn set(&self, pick: impl Fn(&BattlerTrait) -> Option<u32>) -> Vec<u32> {
        let mut out = Vec::new();
        for value in self.iter().filter_map(|t| pick(t)) {
            if !out.contains(&value) {
                out.push(value);
            }
        }
        out
    }
}

impl<'a> FromIterator<&'a BattlerTrait> for TraitSet<'a> {
    fn from_iter<I: IntoIterator<Item = &'a BattlerTrait>>(iter: I) -> Self {
        Self {
            traits: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_multiply_and_ex_params_add() {
        let traits = [
            BattlerTrait::ParamRate {
                param: Param::Attack,
                rate: 1.2,
            },
            BattlerTrait::ParamRate {
                param: Param::Attack,
                rate: 0.5,
            },
            BattlerTrait::ExParam {
                param: ExParam::Hit,
                value: 0.95,
            },
            BattlerTrait::ExParam {
                param: ExParam::Hit,
                value: 0.05,
            },
        ];
        let set: TraitSet<'_> = traits.iter().collect();
        assert!((set.param_rate(Param::Attack) - 0.6).abs() < 1e-9);
        assert_eq!(set.param_rate(Param::Defense), 1.0);
        assert!((set.ex_param(ExParam::Hit) - 1.0).abs() < 1e-9);
        assert_eq!(set.sp_param(SpParam::GuardEffect), 1.0);
    }

    #[test]
    fn sets_are_deduplicated_in_first_seen_order() {
        let traits = [
            BattlerTrait::StateResist(4),
            BattlerTrait::StateResist(2),
            BattlerTrait::StateResist(4),
        ];
        let set: TraitSet<'_> = traits.iter().collect();
        assert_eq!(set.state_resist_set(), vec![4, 2]);
    }

    #[test]
    fn flags_combine() {
        let traits = [
            BattlerTrait::SpecialFlag(SpecialFlags::GUARD),
            BattlerTrait::SpecialFlag(SpecialFlags::SUBSTITUTE),
            BattlerTrait::PartyAbility(PartyAbilities::GOLD_DOUBLE),
        ];
        let set: TraitSet<'_> = traits.iter().collect();
        assert!(set.special_flags().contains(SpecialFlags::GUARD | SpecialFlags::SUBSTITUTE));
        assert!(set.party_abilities().contains(PartyAbilities::GOLD_DOUBLE));
        assert!(!set.party_abilities().contains(PartyAbilities::CANCEL_SURPRISE));
    }
}
