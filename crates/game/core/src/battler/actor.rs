//! Actor variant: level, experience, skills and equipment.

use std::collections::BTreeMap;

use super::{Battler, BattlerKind};
use crate::env::{
    ActorId, BattleEnv, ClassId, EquipRef, OracleError, SkillId, WeaponDef,
};
use crate::unit::Inventory;

/// Actor-only data carried by [`BattlerKind::Actor`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorData {
    pub actor_id: ActorId,
    pub class_id: ClassId,
    pub name: String,
    pub level: u32,
    pub max_level: u32,
    /// Experience per class; switching classes keeps each total.
    pub exp: BTreeMap<ClassId, i64>,
    /// Learned skills, ascending.
    pub skills: Vec<SkillId>,
    /// One entry per equipment slot.
    pub equips: Vec<Option<EquipRef>>,
    pub last_battle_skill: Option<SkillId>,
}

impl ActorData {
    pub fn has_weapon(&self) -> bool {
        self.equips
            .iter()
            .any(|equip| matches!(equip, Some(EquipRef::Weapon(_))))
    }

    pub fn weapons<'a>(&self, env: BattleEnv<'a>) -> Vec<&'a WeaponDef> {
        self.equips
            .iter()
            .filter_map(|equip| match equip {
                Some(EquipRef::Weapon(id)) => env.db().weapon(*id),
                _ => None,
            })
            .collect()
    }

    pub fn weapon_types(&self, env: BattleEnv<'_>) -> Vec<u32> {
        self.weapons(env).iter().map(|w| w.weapon_type).collect()
    }

    pub fn current_exp(&self) -> i64 {
        self.exp.get(&self.class_id).copied().unwrap_or(0)
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= self.max_level
    }

    pub fn is_learned_skill(&self, skill_id: SkillId) -> bool {
        self.skills.binary_search(&skill_id).is_ok()
    }
}

/// Level movement produced by an experience change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelChange {
    pub old_level: u32,
    pub new_level: u32,
    /// Skills learned on the way up, in learning order.
    pub learned: Vec<SkillId>,
}

impl LevelChange {
    pub fn is_level_up(&self) -> bool {
        self.new_level > self.old_level
    }
}

/// Equip type of a piece of equipment; weapons always use type 1.
pub fn equip_type(env: BattleEnv<'_>, equip: EquipRef) -> Option<u32> {
    match equip {
        EquipRef::Weapon(id) => env.db().weapon(id).map(|_| WeaponDef::EQUIP_TYPE),
        EquipRef::Armor(id) => env.db().armor(id).map(|armor| armor.equip_type),
    }
}

impl Battler {
    /// Creates an actor at its initial level with initial equipment, fully healed.
    pub fn new_actor(env: BattleEnv<'_>, actor_id: ActorId) -> Result<Self, OracleError> {
        let db = env.db();
        let def = db.require_actor(actor_id)?;
        let class = db.require_class(def.class_id)?;
        let level = def.initial_level.max(1);
        let max_level = def.max_level.max(level);

        let skills = {
            let mut skills: Vec<SkillId> = class
                .learnings
                .iter()
                .filter(|learning| learning.level <= level)
                .map(|learning| learning.skill_id)
                .collect();
            skills.sort_unstable();
            skills.dedup();
            skills
        };

        let data = ActorData {
            actor_id,
            class_id: def.class_id,
            name: def.name.clone(),
            level,
            max_level,
            exp: BTreeMap::from([(def.class_id, class.exp_for_level(level))]),
            skills,
            equips: Vec::new(),
            last_battle_skill: None,
        };
        let mut actor = Battler::with_kind(BattlerKind::Actor(data));

        let slots = actor.equip_slots(env);
        let mut equips = vec![None; slots.len()];
        for (slot, equip) in def.equips.iter().enumerate().take(slots.len()) {
            equips[slot] = *equip;
        }
        if let Some(data) = actor.as_actor_mut() {
            data.equips = equips;
        }
        actor.release_unequippable_items(env, None);
        actor.recover_all(env);
        Ok(actor)
    }

    // ===== experience =====

    pub fn exp_for_level(&self, env: BattleEnv<'_>, level: u32) -> i64 {
        self.as_actor()
            .and_then(|data| env.db().class(data.class_id))
            .map(|class| class.exp_for_level(level))
            .unwrap_or(0)
    }

    pub fn current_exp(&self) -> i64 {
        self.as_actor().map_or(0, ActorData::current_exp)
    }

    /// Experience still needed for the next level, 0 at max level.
    pub fn next_required_exp(&self, env: BattleEnv<'_>) -> i64 {
        match self.as_actor() {
            Some(data) if !data.is_max_level() => {
                self.exp_for_level(env, data.level + 1) - data.current_exp()
            }
            _ => 0,
        }
    }

    /// Sets the current class's experience and walks the level to match.
    pub fn change_exp(&mut self, env: BattleEnv<'_>, exp: i64) -> LevelChange {
        let Some(class_id) = self.as_actor().map(|data| data.class_id) else {
            return LevelChange::default();
        };
        let class = env.db().class(class_id);
        let exp_for = |level: u32| class.map_or(0, |class| class.exp_for_level(level));

        let mut change = LevelChange::default();
        if let Some(data) = self.as_actor_mut() {
            data.exp.insert(class_id, exp.max(0));
            change.old_level = data.level;
            while !data.is_max_level() && data.current_exp() >= exp_for(data.level + 1) {
                data.level += 1;
                let learned: Vec<SkillId> = class
                    .map(|class| {
                        class
                            .learnings
                            .iter()
                            .filter(|learning| learning.level == data.level)
                            .map(|learning| learning.skill_id)
                            .collect()
                    })
                    .unwrap_or_default();
                for skill in learned {
                    if !data.is_learned_skill(skill) {
                        change.learned.push(skill);
                    }
                    learn(data, skill);
                }
            }
            while data.level > 1 && data.current_exp() < exp_for(data.level) {
                data.level -= 1;
            }
            change.new_level = data.level;
        }
        self.refresh(env);
        change
    }

    /// Adds battle experience scaled by the experience rate.
    pub fn gain_exp(&mut self, env: BattleEnv<'_>, exp: i64) -> LevelChange {
        let rate = self.sparam(env, crate::stats::SpParam::ExpRate);
        let gained = (exp as f64 * rate).round() as i64;
        self.change_exp(env, self.current_exp() + gained)
    }

    pub fn change_level(&mut self, env: BattleEnv<'_>, level: u32) -> LevelChange {
        let Some(max_level) = self.as_actor().map(|data| data.max_level) else {
            return LevelChange::default();
        };
        let level = level.clamp(1, max_level);
        self.change_exp(env, self.exp_for_level(env, level))
    }

    /// Switches class. With `keep_exp` the new class starts from the current total.
    pub fn change_class(&mut self, env: BattleEnv<'_>, class_id: ClassId, keep_exp: bool) -> LevelChange {
        let Some(class) = env.db().class(class_id) else {
            tracing::warn!("class {} not found, class change skipped", class_id);
            return LevelChange::default();
        };
        let current = self.current_exp();
        let exp = match self.as_actor_mut() {
            Some(data) => {
                if keep_exp {
                    data.exp.insert(class_id, current);
                }
                data.class_id = class_id;
                data.level = 1;
                for learning in class.learnings.iter().filter(|l| l.level <= 1) {
                    learn(data, learning.skill_id);
                }
                data.exp.get(&class_id).copied().unwrap_or(0)
            }
            None => return LevelChange::default(),
        };
        self.change_exp(env, exp)
    }

    // ===== skills =====

    pub fn learn_skill(&mut self, skill_id: SkillId) {
        if let Some(data) = self.as_actor_mut() {
            learn(data, skill_id);
        }
    }

    pub fn forget_skill(&mut self, skill_id: SkillId) {
        if let Some(data) = self.as_actor_mut() {
            data.skills.retain(|id| *id != skill_id);
        }
    }

    /// Learned skills plus skills granted by traits, without duplicates.
    pub fn skills(&self, env: BattleEnv<'_>) -> Vec<SkillId> {
        let mut skills = self.as_actor().map(|data| data.skills.clone()).unwrap_or_default();
        for skill in self.all_traits(env).added_skills() {
            if !skills.contains(&skill) {
                skills.push(skill);
            }
        }
        skills.retain(|id| env.skill(*id).is_some());
        skills
    }

    pub fn has_skill(&self, env: BattleEnv<'_>, skill_id: SkillId) -> bool {
        self.skills(env).contains(&skill_id)
    }

    pub fn usable_skills(&self, env: BattleEnv<'_>, usage: super::UsageContext<'_>) -> Vec<SkillId> {
        self.skills(env)
            .into_iter()
            .filter(|id| self.can_use(env, crate::env::ItemRef::Skill(*id), usage))
            .collect()
    }

    pub fn skill_types(&self, env: BattleEnv<'_>) -> Vec<u32> {
        let mut types = self.all_traits(env).added_skill_types();
        types.sort_unstable();
        types
    }

    // ===== equipment =====

    /// Equip type per slot: one slot per system equip type, the second slot
    /// turns into a weapon slot when dual wielding.
    pub fn equip_slots(&self, env: BattleEnv<'_>) -> Vec<u32> {
        let count = env.db().system().equip_slot_count();
        let mut slots: Vec<u32> = (1..=count as u32).collect();
        if slots.len() >= 2 && self.is_dual_wield(env) {
            slots[1] = WeaponDef::EQUIP_TYPE;
        }
        slots
    }

    pub fn is_dual_wield(&self, env: BattleEnv<'_>) -> bool {
        self.all_traits(env).slot_type() == 1
    }

    pub fn equips(&self) -> &[Option<EquipRef>] {
        self.as_actor().map_or(&[], |data| data.equips.as_slice())
    }

    pub fn can_equip(&self, env: BattleEnv<'_>, equip: EquipRef) -> bool {
        let traits = self.all_traits(env);
        match equip {
            EquipRef::Weapon(id) => env.db().weapon(id).is_some_and(|weapon| {
                traits.is_equip_weapon_type_ok(weapon.weapon_type)
                    && !traits.is_equip_type_sealed(WeaponDef::EQUIP_TYPE)
            }),
            EquipRef::Armor(id) => env.db().armor(id).is_some_and(|armor| {
                traits.is_equip_armor_type_ok(armor.armor_type)
                    && !traits.is_equip_type_sealed(armor.equip_type)
            }),
        }
    }

    pub fn is_equip_change_ok(&self, env: BattleEnv<'_>, slot: usize) -> bool {
        let traits = self.all_traits(env);
        self.equip_slots(env).get(slot).is_some_and(|etype| {
            !traits.is_equip_type_locked(*etype) && !traits.is_equip_type_sealed(*etype)
        })
    }

    /// Swaps the item in `slot` with one from the party inventory.
    ///
    /// Fails when the new item is not in the inventory or does not fit the slot.
    pub fn change_equip(
        &mut self,
        env: BattleEnv<'_>,
        slot: usize,
        equip: Option<EquipRef>,
        inventory: &mut Inventory,
    ) -> bool {
        let Some(slot_type) = self.equip_slots(env).get(slot).copied() else {
            return false;
        };
        if let Some(new) = equip {
            if equip_type(env, new) != Some(slot_type) || !inventory.has_item(new.inventory_key()) {
                return false;
            }
        }
        let max_items = env.config().max_items;
        let old = self.equips().get(slot).copied().flatten();
        if let Some(old) = old {
            inventory.gain_item(old.inventory_key(), 1, max_items);
        }
        if let Some(new) = equip {
            inventory.lose_item(new.inventory_key(), 1);
        }
        self.force_change_equip(env, slot, equip);
        true
    }

    /// Sets the slot without touching any inventory.
    pub fn force_change_equip(&mut self, env: BattleEnv<'_>, slot: usize, equip: Option<EquipRef>) {
        if let Some(entry) = self.as_actor_mut().and_then(|data| data.equips.get_mut(slot)) {
            *entry = equip;
        }
        self.release_unequippable_items(env, None);
        self.refresh(env);
    }

    /// Removes equipment that no longer fits, repeating until stable since
    /// each removal can change the trait set. Removed items go back to
    /// `inventory` when one is given.
    pub fn release_unequippable_items(&mut self, env: BattleEnv<'_>, mut inventory: Option<&mut Inventory>) {
        loop {
            let slots = self.equip_slots(env);
            let released: Vec<(usize, EquipRef)> = self
                .equips()
                .iter()
                .enumerate()
                .filter_map(|(slot, equip)| equip.map(|equip| (slot, equip)))
                .filter(|(slot, equip)| {
                    !self.can_equip(env, *equip) || equip_type(env, *equip) != slots.get(*slot).copied()
                })
                .collect();
            if released.is_empty() {
                break;
            }
            for (slot, equip) in released {
                if let Some(inventory) = inventory.as_deref_mut() {
                    inventory.gain_item(equip.inventory_key(), 1, env.config().max_items);
                }
                if let Some(entry) = self.as_actor_mut().and_then(|data| data.equips.get_mut(slot)) {
                    *entry = None;
                }
            }
        }
    }

    /// Failed party escape: time-bar penalty and the queue is dropped.
    pub fn on_escape_failure(&mut self, env: BattleEnv<'_>) {
        if env.is_time_bar() {
            self.apply_time_bar_penalty();
        }
        self.clear_actions();
    }
}

fn learn(data: &mut ActorData, skill_id: SkillId) {
    if let Err(pos) = data.skills.binary_search(&skill_id) {
        data.skills.insert(pos, skill_id);
    }
}
