//! Vitals: hp, mp and tp.
//!
//! Every mutation goes through a setter that ends in [`Battler::refresh`], so
//! vitals stay within `[0, max]` and the death state mirrors `hp == 0`.

use super::Battler;
use crate::env::{BattleEnv, RngOracle};
use crate::stats::{ExParam, SpParam};

impl Battler {
    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn mp(&self) -> i32 {
        self.mp
    }

    pub fn tp(&self) -> i32 {
        self.tp
    }

    pub fn max_tp(&self, env: BattleEnv<'_>) -> i32 {
        env.config().max_tp
    }

    pub fn hp_rate(&self, env: BattleEnv<'_>) -> f64 {
        ratio(self.hp, self.mhp(env))
    }

    pub fn mp_rate(&self, env: BattleEnv<'_>) -> f64 {
        ratio(self.mp, self.mmp(env))
    }

    pub fn tp_rate(&self, env: BattleEnv<'_>) -> f64 {
        ratio(self.tp, self.max_tp(env))
    }

    // ===== existence =====

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_appeared(&self) -> bool {
        !self.hidden
    }

    pub fn hide(&mut self) {
        self.hidden = true;
    }

    pub fn appear(&mut self) {
        self.hidden = false;
    }

    pub fn is_alive(&self, env: BattleEnv<'_>) -> bool {
        self.is_appeared() && !self.is_death_state_affected(env)
    }

    pub fn is_dead(&self, env: BattleEnv<'_>) -> bool {
        self.is_appeared() && self.is_death_state_affected(env)
    }

    /// Below a quarter of max hp. Substitutes step in for dying targets.
    pub fn is_dying(&self, env: BattleEnv<'_>) -> bool {
        self.is_alive(env) && self.hp < self.mhp(env) / 4
    }

    // ===== setters =====

    pub fn set_hp(&mut self, env: BattleEnv<'_>, hp: i32) {
        self.hp = hp;
        self.refresh(env);
    }

    pub fn set_mp(&mut self, env: BattleEnv<'_>, mp: i32) {
        self.mp = mp;
        self.refresh(env);
    }

    pub fn set_tp(&mut self, env: BattleEnv<'_>, tp: i32) {
        self.tp = tp;
        self.refresh(env);
    }

    /// Clamps vitals, drops resisted states and syncs the death state.
    pub fn refresh(&mut self, env: BattleEnv<'_>) {
        for state in self.all_traits(env).state_resist_set() {
            self.erase_state(state);
        }
        self.hp = self.hp.clamp(0, self.mhp(env));
        self.mp = self.mp.clamp(0, self.mmp(env));
        self.tp = self.tp.clamp(0, self.max_tp(env));
        let death = env.death_state_id();
        if self.hp == 0 {
            self.add_state_with(env, None, death);
        } else {
            self.remove_state(env, death);
        }
    }

    // ===== recorded changes =====

    pub fn gain_hp(&mut self, env: BattleEnv<'_>, value: i32) {
        self.result.hp_damage = -value;
        self.result.hp_affected = true;
        self.set_hp(env, self.hp + value);
    }

    pub fn gain_mp(&mut self, env: BattleEnv<'_>, value: i32) {
        self.result.mp_damage = -value;
        self.set_mp(env, self.mp + value);
    }

    pub fn gain_tp(&mut self, env: BattleEnv<'_>, value: i32) {
        self.result.tp_damage = -value;
        self.set_tp(env, self.tp + value);
    }

    pub fn gain_silent_tp(&mut self, env: BattleEnv<'_>, value: i32) {
        self.set_tp(env, self.tp + value);
    }

    pub fn init_tp(&mut self, env: BattleEnv<'_>, rng: &mut dyn RngOracle) {
        let tp = rng.random_int(25);
        self.set_tp(env, tp);
    }

    pub fn clear_tp(&mut self, env: BattleEnv<'_>) {
        self.set_tp(env, 0);
    }

    /// `floor(50 × damage_rate × tcr)` of silent tp.
    pub fn charge_tp_by_damage(&mut self, env: BattleEnv<'_>, damage_rate: f64) {
        let value = (50.0 * damage_rate * self.sparam(env, SpParam::TpChargeRate)).floor() as i32;
        self.gain_silent_tp(env, value);
    }

    /// Hit by a damaging action: maybe shake off states, then charge tp.
    pub fn on_damage(&mut self, env: BattleEnv<'_>, rng: &mut dyn RngOracle, value: i32) {
        self.remove_states_by_damage(env, rng);
        let mhp = self.mhp(env);
        if mhp > 0 {
            self.charge_tp_by_damage(env, f64::from(value) / f64::from(mhp));
        }
    }

    // ===== regeneration =====

    pub fn max_slip_damage(&self, env: BattleEnv<'_>) -> i32 {
        if env.config().slip_death {
            self.hp
        } else {
            (self.hp - 1).max(0)
        }
    }

    pub fn regenerate_hp(&mut self, env: BattleEnv<'_>) {
        let regen = (f64::from(self.mhp(env)) * self.xparam(env, ExParam::HpRegen)).floor() as i32;
        let value = regen.max(-self.max_slip_damage(env));
        if value != 0 {
            self.gain_hp(env, value);
        }
    }

    pub fn regenerate_mp(&mut self, env: BattleEnv<'_>) {
        let value = (f64::from(self.mmp(env)) * self.xparam(env, ExParam::MpRegen)).floor() as i32;
        if value != 0 {
            self.gain_mp(env, value);
        }
    }

    pub fn regenerate_tp(&mut self, env: BattleEnv<'_>) {
        let value = (100.0 * self.xparam(env, ExParam::TpRegen)).floor() as i32;
        self.gain_silent_tp(env, value);
    }

    pub fn regenerate_all(&mut self, env: BattleEnv<'_>) {
        if self.is_alive(env) {
            self.regenerate_hp(env);
            self.regenerate_mp(env);
            self.regenerate_tp(env);
        }
    }

    // ===== lifecycle =====

    pub(crate) fn die(&mut self) {
        self.hp = 0;
        self.clear_states();
        self.buffs.clear();
    }

    pub(crate) fn revive(&mut self) {
        if self.hp == 0 {
            self.hp = 1;
        }
    }

    /// Full heal: states cleared, hp and mp to max.
    pub fn recover_all(&mut self, env: BattleEnv<'_>) {
        self.clear_states();
        self.hp = self.mhp(env);
        self.mp = self.mmp(env);
        self.refresh(env);
    }

    /// Leaves the battle: hidden with no actions or states.
    pub fn escape(&mut self) {
        self.hide();
        self.clear_actions();
        self.clear_states();
    }
}

fn ratio(value: i32, max: i32) -> f64 {
    if max > 0 {
        f64::from(value) / f64::from(max)
    } else {
        0.0
    }
}
