//! Resolution of one action against one target.
//!
//! ```text
//! used?  ──▶ hit roll ──▶ evasion roll ──▶ critical roll ──▶ damage ──▶ effects
//! ```
//!
//! The subject is read from a [`CombatSnapshot`] and never mutated here.
//! Whatever the subject gains (drained hp/mp, tp for landing the action) is
//! returned in an [`ApplyOutcome`] for the caller to settle.

use super::snapshot::CombatSnapshot;
use crate::battler::Battler;
use crate::env::{BattleEnv, DamageElement, ItemEffect, ItemRef, RngOracle, UsableItem};
use crate::stats::{ExParam, SpParam};

/// Gains owed to the subject side after one resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Hp taken from the target by a drain. Goes to the reflector on reflection.
    pub drained_hp: i32,
    pub drained_mp: i32,
    /// Silent tp the user gains for landing the action.
    pub user_tp: i32,
}

impl ApplyOutcome {
    pub fn settle_drain(&self, env: BattleEnv<'_>, receiver: &mut Battler) {
        if self.drained_hp != 0 {
            receiver.gain_hp(env, self.drained_hp);
        }
        if self.drained_mp != 0 {
            receiver.gain_mp(env, self.drained_mp);
        }
    }

    pub fn settle_user(&self, env: BattleEnv<'_>, subject: &mut Battler) {
        if self.user_tp != 0 {
            subject.gain_silent_tp(env, self.user_tp);
        }
    }
}

/// Resolves `item` used by `subject` against `target`, filling the target's
/// [`ActionResult`](super::ActionResult).
pub fn apply(
    env: BattleEnv<'_>,
    rng: &mut dyn RngOracle,
    subject: &CombatSnapshot,
    item: ItemRef,
    target: &mut Battler,
) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();
    target.clear_result();
    let Some(def) = env.usable(item) else {
        tracing::warn!("apply: {:?} is not defined", item);
        return outcome;
    };

    let used = test_apply(env, def, target);
    let missed = used && rng.next_f64() >= item_hit(def, subject);
    let evaded = !missed && rng.next_f64() < item_eva(env, def, target);
    {
        let result = target.result_mut();
        result.used = used;
        result.missed = missed;
        result.evaded = evaded;
        result.physical = def.is_physical();
        result.drain = def.damage.kind.is_drain();
    }
    if !target.result().is_hit() {
        return outcome;
    }

    if def.damage.kind != crate::env::DamageKind::None {
        let critical = rng.next_f64() < item_cri(env, def, subject, target);
        target.result_mut().critical = critical;
        let value = make_damage_value(env, rng, subject, def, target, critical);
        execute_damage(env, rng, def, target, value, &mut outcome);
    }
    for effect in &def.effects {
        apply_effect(env, rng, subject, item, def, target, effect);
    }
    outcome.user_tp = (f64::from(def.tp_gain) * subject.tp_charge_rate).floor() as i32;
    outcome
}

/// Life/death test: alive-only scopes skip the dead and vice versa.
pub fn test_apply(env: BattleEnv<'_>, def: &UsableItem, target: &Battler) -> bool {
    if def.scope.is_for_opponent() || def.scope.is_for_alive_friend() {
        target.is_alive(env)
    } else if def.scope.is_for_dead_friend() {
        target.is_dead(env)
    } else {
        true
    }
}

fn item_hit(def: &UsableItem, subject: &CombatSnapshot) -> f64 {
    let rate = f64::from(def.success_rate) * 0.01;
    if def.is_physical() {
        rate * subject.hit
    } else {
        rate
    }
}

fn item_eva(env: BattleEnv<'_>, def: &UsableItem, target: &Battler) -> f64 {
    if def.is_physical() {
        target.xparam(env, ExParam::Evasion)
    } else if def.is_magical() {
        target.xparam(env, ExParam::MagicEvasion)
    } else {
        0.0
    }
}

fn item_cri(env: BattleEnv<'_>, def: &UsableItem, subject: &CombatSnapshot, target: &Battler) -> f64 {
    if def.damage.critical {
        subject.critical * (1.0 - target.xparam(env, ExParam::CriticalEvasion))
    } else {
        0.0
    }
}

/// Counter chance of `target` against this item.
pub fn item_counter_rate(env: BattleEnv<'_>, def: &UsableItem, target: &Battler) -> f64 {
    if def.is_physical() && target.can_move(env) {
        target.xparam(env, ExParam::Counter)
    } else {
        0.0
    }
}

pub fn item_reflection_rate(env: BattleEnv<'_>, def: &UsableItem, target: &Battler) -> f64 {
    if def.is_magical() {
        target.xparam(env, ExParam::MagicReflection)
    } else {
        0.0
    }
}

// ===== damage =====

/// Final signed damage: positive hurts, negative heals.
pub fn make_damage_value(
    env: BattleEnv<'_>,
    rng: &mut dyn RngOracle,
    subject: &CombatSnapshot,
    def: &UsableItem,
    target: &Battler,
    critical: bool,
) -> i32 {
    let b = CombatSnapshot::of(env, target);
    let raw = def.damage.formula.evaluate(subject, &b);
    let base = if raw.is_finite() { raw.max(0.0) } else { 0.0 } * def.damage.kind.sign();

    let mut value = base * element_rate(env, subject, def, target);
    if def.is_physical() {
        value *= target.sparam(env, SpParam::PhysicalDamage);
    }
    if def.is_magical() {
        value *= target.sparam(env, SpParam::MagicalDamage);
    }
    if base < 0.0 {
        value *= target.sparam(env, SpParam::RecoveryEffect);
    }
    if critical {
        value *= 3.0;
    }
    value = apply_variance(rng, value, def.damage.variance);
    value = apply_guard(env, value, target);
    // half rounds up, negative values included
    (value + 0.5).floor() as i32
}

fn element_rate(env: BattleEnv<'_>, subject: &CombatSnapshot, def: &UsableItem, target: &Battler) -> f64 {
    match def.damage.element {
        DamageElement::None => 1.0,
        DamageElement::Element(element) => target.element_rate(env, element),
        DamageElement::NormalAttack => subject
            .attack_elements
            .iter()
            .map(|element| target.element_rate(env, *element))
            .reduce(f64::max)
            .unwrap_or(1.0),
    }
}

/// Two draws of `random_int(amp + 1)` minus `amp`, pushed away from zero.
fn apply_variance(rng: &mut dyn RngOracle, damage: f64, variance: i32) -> f64 {
    let amp = (damage.abs() * f64::from(variance) / 100.0).max(0.0).floor() as i32;
    let v = rng.random_int(amp + 1) + rng.random_int(amp + 1) - amp;
    if damage >= 0.0 {
        damage + f64::from(v)
    } else {
        damage - f64::from(v)
    }
}

fn apply_guard(env: BattleEnv<'_>, damage: f64, target: &Battler) -> f64 {
    if damage > 0.0 && target.is_guard(env) {
        damage / (2.0 * target.sparam(env, SpParam::GuardEffect))
    } else {
        damage
    }
}

fn execute_damage(
    env: BattleEnv<'_>,
    rng: &mut dyn RngOracle,
    def: &UsableItem,
    target: &mut Battler,
    value: i32,
    outcome: &mut ApplyOutcome,
) {
    let kind = def.damage.kind;
    if value == 0 {
        target.result_mut().critical = false;
    }
    if kind.is_hp_effect() {
        let value = if kind.is_drain() { value.min(target.hp()) } else { value };
        target.result_mut().success = true;
        target.gain_hp(env, -value);
        if value > 0 {
            target.on_damage(env, rng, value);
        }
        if kind.is_drain() {
            outcome.drained_hp = value;
        }
    }
    if kind.is_mp_effect() {
        let value = if kind.is_recover() { value } else { value.min(target.mp()) };
        if value != 0 {
            target.result_mut().success = true;
        }
        target.gain_mp(env, -value);
        if kind.is_drain() {
            outcome.drained_mp = value;
        }
    }
}

// ===== effects =====

fn luck_effect_rate(env: BattleEnv<'_>, subject: &CombatSnapshot, target: &Battler) -> f64 {
    (1.0 + f64::from(subject.luck() - target.luk(env)) * 0.001).max(0.0)
}

fn apply_effect(
    env: BattleEnv<'_>,
    rng: &mut dyn RngOracle,
    subject: &CombatSnapshot,
    item: ItemRef,
    def: &UsableItem,
    target: &mut Battler,
    effect: &ItemEffect,
) {
    let success = match *effect {
        ItemEffect::RecoverHp { rate, flat } => {
            let mut value = (f64::from(target.mhp(env)) * rate + flat)
                * target.sparam(env, SpParam::RecoveryEffect);
            if item.is_item() {
                value *= subject.pharmacology;
            }
            let value = value.floor() as i32;
            if value != 0 {
                target.gain_hp(env, value);
            }
            value != 0
        }
        ItemEffect::RecoverMp { rate, flat } => {
            let mut value = (f64::from(target.mmp(env)) * rate + flat)
                * target.sparam(env, SpParam::RecoveryEffect);
            if item.is_item() {
                value *= subject.pharmacology;
            }
            let value = value.floor() as i32;
            if value != 0 {
                target.gain_mp(env, value);
            }
            value != 0
        }
        ItemEffect::GainTp(amount) => {
            let value = amount.floor() as i32;
            if value != 0 {
                target.gain_tp(env, value);
            }
            value != 0
        }
        ItemEffect::AddState { state: 0, chance } => {
            let mut any = false;
            for (state, rate) in &subject.attack_states {
                let roll = chance
                    * target.state_rate(env, *state)
                    * rate
                    * luck_effect_rate(env, subject, target);
                if rng.next_f64() < roll {
                    target.add_state(env, rng, *state);
                    any = true;
                }
            }
            any
        }
        ItemEffect::AddState { state, chance } => {
            let mut roll = chance;
            if !def.is_certain_hit() {
                roll *= target.state_rate(env, state) * luck_effect_rate(env, subject, target);
            }
            let hit = rng.next_f64() < roll;
            if hit {
                target.add_state(env, rng, state);
            }
            hit
        }
        ItemEffect::RemoveState { state, chance } => {
            let hit = rng.next_f64() < chance;
            if hit {
                target.remove_state(env, state);
            }
            hit
        }
        ItemEffect::AddBuff { param, turns } => {
            target.add_buff(env, param, turns);
            true
        }
        ItemEffect::AddDebuff { param, turns } => {
            let roll = target.debuff_rate(env, param) * luck_effect_rate(env, subject, target);
            let hit = rng.next_f64() < roll;
            if hit {
                target.add_debuff(env, param, turns);
            }
            hit
        }
        ItemEffect::RemoveBuff(param) => {
            let affected = target.buffs().is_buffed(param);
            if affected {
                target.remove_buff(env, param);
            }
            affected
        }
        ItemEffect::RemoveDebuff(param) => {
            let affected = target.buffs().is_debuffed(param);
            if affected {
                target.remove_buff(env, param);
            }
            affected
        }
        ItemEffect::Escape => {
            target.escape();
            true
        }
        ItemEffect::Grow { param, amount } => {
            target.add_param(env, param, amount.floor() as i32);
            true
        }
        ItemEffect::LearnSkill(skill_id) => {
            if target.is_actor() {
                target.learn_skill(skill_id);
            }
            true
        }
    };
    if success {
        target.result_mut().success = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::HitOutcome;
    use crate::action::formula::Formula;
    use crate::battler::BattlerId;
    use crate::battler::test_support::{self, GUARD_STATE, STUN};
    use crate::config::BattleConfig;
    use crate::env::{DamageDef, DamageKind, HitType, MemoryDatabase, Scope, ScriptedRng};

    fn db() -> MemoryDatabase {
        test_support::database()
            .with_skill(
                20,
                UsableItem {
                    name: "Drain".into(),
                    scope: Scope::OneEnemy,
                    damage: DamageDef {
                        kind: DamageKind::HpDrain,
                        formula: Formula::Constant(500.0),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .with_skill(
                21,
                UsableItem {
                    name: "Stun Bolt".into(),
                    scope: Scope::OneEnemy,
                    tp_gain: 10,
                    effects: vec![ItemEffect::AddState {
                        state: STUN,
                        chance: 0.5,
                    }],
                    ..Default::default()
                },
            )
            .with_skill(
                22,
                UsableItem {
                    name: "Wild Swing".into(),
                    scope: Scope::OneEnemy,
                    hit_type: HitType::Physical,
                    damage: DamageDef {
                        kind: DamageKind::HpDamage,
                        formula: Formula::Constant(100.0),
                        variance: 20,
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
    }

    #[test]
    fn attack_deals_formula_damage() {
        let db = db();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let reid = test_support::actor(env, 1);
        let mut slime = test_support::enemy(env, 1);
        let subject = CombatSnapshot::capture(env, &reid, BattlerId::party(0));
        let mut rng = ScriptedRng::constant(0.0);

        // 20 × 4 - 5 × 2
        apply(env, &mut rng, &subject, ItemRef::Skill(1), &mut slime);
        assert_eq!(slime.result().outcome(), HitOutcome::Hit);
        assert_eq!(slime.result().hp_damage, 70);
        assert_eq!(slime.hp(), 30);
    }

    #[test]
    fn high_roll_misses() {
        let db = db();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let reid = test_support::actor(env, 1);
        let mut slime = test_support::enemy(env, 1);
        let subject = CombatSnapshot::capture(env, &reid, BattlerId::party(0));
        let mut rng = ScriptedRng::constant(0.99);

        apply(env, &mut rng, &subject, ItemRef::Skill(1), &mut slime);
        assert_eq!(slime.result().outcome(), HitOutcome::Missed);
        assert_eq!(slime.hp(), 100);
    }

    #[test]
    fn dead_target_is_unused() {
        let db = db();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let reid = test_support::actor(env, 1);
        let mut slime = test_support::enemy(env, 1);
        slime.set_hp(env, 0);
        let subject = CombatSnapshot::capture(env, &reid, BattlerId::party(0));
        let mut rng = ScriptedRng::constant(0.0);

        apply(env, &mut rng, &subject, ItemRef::Skill(1), &mut slime);
        assert_eq!(slime.result().outcome(), HitOutcome::Unused);
    }

    #[test]
    fn guard_halves_damage() {
        let db = db();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let reid = test_support::actor(env, 1);
        let mut slime = test_support::enemy(env, 1);
        let mut rng = ScriptedRng::constant(0.0);
        slime.add_state(env, &mut rng, GUARD_STATE);
        let subject = CombatSnapshot::capture(env, &reid, BattlerId::party(0));

        apply(env, &mut rng, &subject, ItemRef::Skill(1), &mut slime);
        assert_eq!(slime.result().hp_damage, 35);
    }

    #[test]
    fn recovery_is_negative_damage() {
        let db = db();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let priscilla = test_support::actor(env, 2);
        let mut reid = test_support::actor(env, 1);
        reid.set_hp(env, 100);
        let subject = CombatSnapshot::capture(env, &priscilla, BattlerId::party(1));
        let mut rng = ScriptedRng::constant(0.0);

        apply(env, &mut rng, &subject, ItemRef::Skill(11), &mut reid);
        assert_eq!(reid.result().hp_damage, -200);
        assert_eq!(reid.hp(), 300);
        assert!(reid.result().success);
    }

    #[test]
    fn drain_is_capped_by_target_hp() {
        let db = db();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);
        reid.set_hp(env, 50);
        let mut slime = test_support::enemy(env, 1);
        let subject = CombatSnapshot::capture(env, &reid, BattlerId::party(0));
        let mut rng = ScriptedRng::constant(0.0);

        let outcome = apply(env, &mut rng, &subject, ItemRef::Skill(20), &mut slime);
        assert_eq!(outcome.drained_hp, 100);
        assert!(slime.is_dead(env));
        outcome.settle_drain(env, &mut reid);
        assert_eq!(reid.hp(), 150);
    }

    #[test]
    fn state_effect_rolls_chance_and_grants_tp() {
        let db = db();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let reid = test_support::actor(env, 1);
        let mut slime = test_support::enemy(env, 1);
        let subject = CombatSnapshot::capture(env, &reid, BattlerId::party(0));

        let mut rng = ScriptedRng::constant(0.4);
        let outcome = apply(env, &mut rng, &subject, ItemRef::Skill(21), &mut slime);
        assert!(slime.is_state_affected(STUN));
        assert!(slime.result().is_state_added(STUN));
        assert_eq!(outcome.user_tp, 10);

        let mut slime = test_support::enemy(env, 1);
        let mut rng = ScriptedRng::constant(0.6);
        apply(env, &mut rng, &subject, ItemRef::Skill(21), &mut slime);
        assert!(!slime.is_state_affected(STUN));
        assert!(!slime.result().success);
    }

    #[test]
    fn variance_spreads_around_base() {
        let db = db();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let reid = test_support::actor(env, 1);
        let slime = test_support::enemy(env, 1);
        let subject = CombatSnapshot::capture(env, &reid, BattlerId::party(0));
        let def = db.skills[&22].clone();

        // amp 20: two draws of random_int(21)
        let mut low = ScriptedRng::constant(0.0);
        let value = make_damage_value(env, &mut low, &subject, &def, &slime, false);
        assert_eq!(value, 80);
        let mut high = ScriptedRng::constant(0.999);
        let value = make_damage_value(env, &mut high, &subject, &def, &slime, true);
        // critical 300, amp 60
        assert_eq!(value, 360);
    }
}
