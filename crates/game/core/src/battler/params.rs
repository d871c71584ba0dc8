//! Parameter pipeline and trait queries.
//!
//! Everything derived from traits is computed on demand; nothing is cached on
//! the battler so equipment, states and buffs are always reflected at once.

use super::{Battler, BattlerKind};
use crate::env::{BattleEnv, StateId};
use crate::stats::{
    BattlerTrait, ExParam, Param, PartyAbilities, SpParam, SpecialFlags, TraitSet,
    compute_param, traits::CollapseKind,
};

impl Battler {
    /// Every trait currently affecting this battler.
    ///
    /// Actors: actor, class, equipment, states. Enemies: enemy, states.
    pub fn all_traits<'a>(&self, env: BattleEnv<'a>) -> TraitSet<'a> {
        let db = env.db();
        let mut set = TraitSet::new();
        match &self.kind {
            BattlerKind::Actor(data) => {
                if let Some(def) = db.actor(data.actor_id) {
                    set.extend(def.traits.iter());
                }
                if let Some(class) = db.class(data.class_id) {
                    set.extend(class.traits.iter());
                }
                for equip in data.equips.iter().flatten() {
                    set.extend(equip_traits(env, *equip));
                }
            }
            BattlerKind::Enemy(data) => {
                if let Some(def) = db.enemy(data.enemy_id) {
                    set.extend(def.traits.iter());
                }
            }
        }
        for state in self.state_defs(env) {
            set.extend(state.traits.iter());
        }
        set
    }

    // ===== base parameters =====

    pub fn param_base(&self, env: BattleEnv<'_>, param: Param) -> i32 {
        let db = env.db();
        match &self.kind {
            BattlerKind::Actor(data) => db
                .class(data.class_id)
                .map(|class| class.base_param(data.level, param))
                .unwrap_or(0),
            BattlerKind::Enemy(data) => db
                .enemy(data.enemy_id)
                .map(|def| def.params[param.index()])
                .unwrap_or(0),
        }
    }

    /// Growth bonus plus, for actors, the equipment bonus.
    pub fn param_plus(&self, env: BattleEnv<'_>, param: Param) -> i32 {
        let own = self.param_plus[param.index()];
        match &self.kind {
            BattlerKind::Actor(data) => {
                own + data
                    .equips
                    .iter()
                    .flatten()
                    .map(|equip| equip_param(env, *equip, param))
                    .sum::<i32>()
            }
            BattlerKind::Enemy(_) => own,
        }
    }

    pub fn param_base_plus(&self, env: BattleEnv<'_>, param: Param) -> i32 {
        (self.param_base(env, param) + self.param_plus(env, param)).max(0)
    }

    pub fn add_param(&mut self, env: BattleEnv<'_>, param: Param, value: i32) {
        self.param_plus[param.index()] += value;
        self.refresh(env);
    }

    /// Final parameter value: additive, multiplicative, buff, clamp, round.
    pub fn param(&self, env: BattleEnv<'_>, param: Param) -> i32 {
        let traits = self.all_traits(env);
        compute_param(
            self.param_base(env, param),
            self.param_plus(env, param),
            traits.param_rate(param),
            self.buffs.rate(param),
            param.min_value(),
            env.config().param_max(param),
        )
    }

    pub fn mhp(&self, env: BattleEnv<'_>) -> i32 {
        self.param(env, Param::MaxHp)
    }

    pub fn mmp(&self, env: BattleEnv<'_>) -> i32 {
        self.param(env, Param::MaxMp)
    }

    pub fn agi(&self, env: BattleEnv<'_>) -> i32 {
        self.param(env, Param::Agility)
    }

    pub fn luk(&self, env: BattleEnv<'_>) -> i32 {
        self.param(env, Param::Luck)
    }

    pub fn xparam(&self, env: BattleEnv<'_>, param: ExParam) -> f64 {
        self.all_traits(env).ex_param(param)
    }

    pub fn sparam(&self, env: BattleEnv<'_>, param: SpParam) -> f64 {
        self.all_traits(env).sp_param(param)
    }

    // ===== rates =====

    pub fn element_rate(&self, env: BattleEnv<'_>, element: u32) -> f64 {
        self.all_traits(env).element_rate(element)
    }

    pub fn debuff_rate(&self, env: BattleEnv<'_>, param: Param) -> f64 {
        self.all_traits(env).debuff_rate(param)
    }

    pub fn state_rate(&self, env: BattleEnv<'_>, state: StateId) -> f64 {
        self.all_traits(env).state_rate(state)
    }

    pub fn is_state_resist(&self, env: BattleEnv<'_>, state: StateId) -> bool {
        self.all_traits(env).state_resist_set().contains(&state)
    }

    // ===== attack =====

    /// Attack elements; actors fighting bare-handed add the bare-hands element.
    pub fn attack_elements(&self, env: BattleEnv<'_>) -> Vec<u32> {
        let mut elements = self.all_traits(env).attack_elements();
        if let BattlerKind::Actor(data) = &self.kind {
            let bare = env.db().system().bare_hands_element;
            if !data.has_weapon() && !elements.contains(&bare) {
                elements.push(bare);
            }
        }
        elements
    }

    pub fn attack_speed(&self, env: BattleEnv<'_>) -> i32 {
        self.all_traits(env).attack_speed()
    }

    pub fn attack_times_add(&self, env: BattleEnv<'_>) -> f64 {
        self.all_traits(env).attack_times_add()
    }

    pub fn attack_skill_id(&self, env: BattleEnv<'_>) -> u32 {
        self.all_traits(env)
            .attack_skill()
            .unwrap_or(env.config().attack_skill_id)
    }

    // ===== flags =====

    pub fn special_flags(&self, env: BattleEnv<'_>) -> SpecialFlags {
        self.all_traits(env).special_flags()
    }

    pub fn party_abilities(&self, env: BattleEnv<'_>) -> PartyAbilities {
        self.all_traits(env).party_abilities()
    }

    pub fn collapse_kind(&self, env: BattleEnv<'_>) -> CollapseKind {
        self.all_traits(env).collapse_kind()
    }

    pub fn action_plus_set(&self, env: BattleEnv<'_>) -> Vec<f64> {
        self.all_traits(env).action_plus_set()
    }

    pub fn is_auto_battle(&self, env: BattleEnv<'_>) -> bool {
        self.special_flags(env).contains(SpecialFlags::AUTO_BATTLE)
    }

    pub fn is_guard(&self, env: BattleEnv<'_>) -> bool {
        self.special_flags(env).contains(SpecialFlags::GUARD) && self.can_move(env)
    }

    pub fn is_substitute(&self, env: BattleEnv<'_>) -> bool {
        self.special_flags(env).contains(SpecialFlags::SUBSTITUTE) && self.can_move(env)
    }

    pub fn is_preserve_tp(&self, env: BattleEnv<'_>) -> bool {
        self.special_flags(env).contains(SpecialFlags::PRESERVE_TP)
    }
}

fn equip_traits<'a>(
    env: BattleEnv<'a>,
    equip: crate::env::EquipRef,
) -> impl Iterator<Item = &'a BattlerTrait> + 'a {
    use crate::env::EquipRef;
    let db = env.db();
    let traits: &'a [BattlerTrait] = match equip {
        EquipRef::Weapon(id) => db.weapon(id).map(|w| w.traits.as_slice()).unwrap_or(&[]),
        EquipRef::Armor(id) => db.armor(id).map(|a| a.traits.as_slice()).unwrap_or(&[]),
    };
    traits.iter()
}

fn equip_param(env: BattleEnv<'_>, equip: crate::env::EquipRef, param: Param) -> i32 {
    use crate::env::EquipRef;
    let db = env.db();
    match equip {
        EquipRef::Weapon(id) => db.weapon(id).map(|w| w.params[param.index()]),
        EquipRef::Armor(id) => db.armor(id).map(|a| a.params[param.index()]),
    }
    .unwrap_or(0)
}
