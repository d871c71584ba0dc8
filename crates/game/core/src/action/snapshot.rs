//! CombatSnapshot - the subject's numbers at the moment it acts.
//!
//! Resolution reads the subject's parameters from a snapshot so that the
//! target side can be mutated freely, including when subject and target are
//! the same battler.

use crate::battler::{Battler, BattlerId};
use crate::env::BattleEnv;
use crate::stats::{ExParam, Param, SpParam};

/// Parameters and vitals of one battler, locked at capture time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CombatSnapshot {
    pub id: Option<BattlerId>,
    pub params: [i32; Param::COUNT],
    pub hp: i32,
    pub mp: i32,
    pub tp: i32,
    pub level: u32,
    pub hit: f64,
    pub critical: f64,
    pub pharmacology: f64,
    pub tp_charge_rate: f64,
    pub attack_elements: Vec<u32>,
    /// Attack states with their summed chance.
    pub attack_states: Vec<(u32, f64)>,
    pub is_actor: bool,
}

impl CombatSnapshot {
    pub fn capture(env: BattleEnv<'_>, battler: &Battler, id: BattlerId) -> Self {
        Self {
            id: Some(id),
            ..Self::of(env, battler)
        }
    }

    /// Snapshot without an id, for the target side of a formula.
    pub fn of(env: BattleEnv<'_>, battler: &Battler) -> Self {
        let traits = battler.all_traits(env);
        let attack_states = traits
            .attack_states()
            .into_iter()
            .map(|state| (state, traits.attack_state_rate(state)))
            .collect();
        Self {
            id: None,
            params: Param::ALL.map(|param| battler.param(env, param)),
            hp: battler.hp(),
            mp: battler.mp(),
            tp: battler.tp(),
            level: battler.level(),
            hit: battler.xparam(env, ExParam::Hit),
            critical: battler.xparam(env, ExParam::Critical),
            pharmacology: battler.sparam(env, SpParam::Pharmacology),
            tp_charge_rate: battler.sparam(env, SpParam::TpChargeRate),
            attack_elements: battler.attack_elements(env),
            attack_states,
            is_actor: battler.is_actor(),
        }
    }

    pub fn param(&self, param: Param) -> i32 {
        self.params[param.index()]
    }

    pub fn luck(&self) -> i32 {
        self.param(Param::Luck)
    }
}
