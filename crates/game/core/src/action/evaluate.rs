//! Auto-battle scoring.
//!
//! Every candidate (the attack plus each usable skill) is scored against the
//! targets it could reach; the best score wins each action slot.

use super::Action;
use super::apply::make_damage_value;
use super::snapshot::CombatSnapshot;
use crate::battler::{Battler, BattlerId, UsageContext};
use crate::env::{BattleEnv, ItemRef, RngOracle};
use crate::unit::UnitView;

/// Scores `action` and points it at its best single target.
///
/// Opponent damage scores `damage / max(hp, 1)`; friendly healing scores the
/// fraction of max hp actually restored. Area scopes add per-target scores.
/// A positive score gets a random tiebreak in `[0, 1)`.
pub fn evaluate_action(
    env: BattleEnv<'_>,
    rng: &mut dyn RngOracle,
    subject: (BattlerId, &Battler),
    action: &mut Action,
    friends: &UnitView<'_>,
    opponents: &UnitView<'_>,
    usage: UsageContext<'_>,
) -> f64 {
    let (subject_id, battler) = subject;
    if !action.is_valid(env, battler, usage) {
        return 0.0;
    }
    let Some(def) = action.definition(env) else {
        return 0.0;
    };
    let scope = def.scope;
    let (unit, candidates) = if scope.is_for_opponent() {
        (opponents, opponents.alive(env))
    } else if scope.is_for_user() {
        (friends, vec![subject_id])
    } else if scope.is_for_dead_friend() {
        (friends, friends.dead(env))
    } else {
        (friends, friends.alive(env))
    };

    let snapshot = CombatSnapshot::capture(env, battler, subject_id);
    let mut value = 0.0;
    for id in candidates {
        let Some(target) = unit.battler(id) else {
            continue;
        };
        let target_value = if def.damage.kind.is_hp_effect() {
            let damage = f64::from(make_damage_value(env, rng, &snapshot, def, target, false));
            if scope.is_for_opponent() {
                damage / f64::from(target.hp().max(1))
            } else {
                let mhp = f64::from(target.mhp(env));
                let recovery = (-damage).min(mhp - f64::from(target.hp()));
                recovery / mhp
            }
        } else {
            0.0
        };
        if scope.is_for_all() {
            value += target_value;
        } else if target_value > value {
            value = target_value;
            action.target_index = unit.position(id);
        }
    }
    value *= action.num_repeats(env, battler) as f64;
    if value > 0.0 {
        value += rng.next_f64();
    }
    value
}

/// Picks the best candidate for every queued slot of an auto-battle actor.
///
/// Slots where nothing scores above zero stay blank.
pub fn make_auto_battle_actions(
    env: BattleEnv<'_>,
    rng: &mut dyn RngOracle,
    subject: (BattlerId, &Battler),
    friends: &UnitView<'_>,
    opponents: &UnitView<'_>,
    usage: UsageContext<'_>,
) -> Vec<Action> {
    let (_, battler) = subject;
    let mut candidates = vec![ItemRef::Skill(battler.attack_skill_id(env))];
    candidates.extend(
        battler
            .usable_skills(env, usage)
            .into_iter()
            .map(ItemRef::Skill),
    );

    let mut chosen = Vec::with_capacity(battler.num_actions());
    for slot in 0..battler.num_actions() {
        let mut best = battler.action(slot).copied().unwrap_or_default();
        let mut max_value = f64::MIN_POSITIVE;
        for item in &candidates {
            let mut action = Action {
                item: Some(*item),
                ..Action::new()
            };
            let value = evaluate_action(env, rng, subject, &mut action, friends, opponents, usage);
            if value > max_value {
                max_value = value;
                best = action;
            }
        }
        chosen.push(best);
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battler::Side;
    use crate::battler::test_support;
    use crate::config::BattleConfig;
    use crate::env::ScriptedRng;

    #[test]
    fn weakest_enemy_scores_highest() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let reid = test_support::actor(env, 1);
        let a = test_support::enemy(env, 1);
        let mut b = test_support::enemy(env, 1);
        b.set_hp(env, 35);
        let friends = UnitView::new(Side::Party, vec![(0, &reid)]);
        let opponents = UnitView::new(Side::Troop, vec![(0, &a), (1, &b)]);
        let mut rng = ScriptedRng::constant(0.0);

        let mut attack = Action::skill(1);
        let value = evaluate_action(
            env,
            &mut rng,
            (BattlerId::party(0), &reid),
            &mut attack,
            &friends,
            &opponents,
            UsageContext::default(),
        );
        // 70 damage against 35 hp
        assert_eq!(value, 2.0);
        assert_eq!(attack.target_index, Some(1));
    }

    #[test]
    fn healing_scores_missing_hp_only() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);
        reid.change_level(env, 3);
        reid.set_hp(env, 400);
        let friends = UnitView::new(Side::Party, vec![(0, &reid)]);
        let opponents = UnitView::new(Side::Troop, vec![]);
        let mut rng = ScriptedRng::constant(0.0);

        let mut heal = Action::skill(11);
        let value = evaluate_action(
            env,
            &mut rng,
            (BattlerId::party(0), &reid),
            &mut heal,
            &friends,
            &opponents,
            UsageContext::default(),
        );
        // min(200, 100) / 500
        assert_eq!(value, 0.2);
        assert_eq!(heal.target_index, Some(0));
    }

    #[test]
    fn auto_battle_prefers_the_stronger_skill() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);
        reid.push_action(Action::new());
        let slime = test_support::enemy(env, 1);
        let friends = UnitView::new(Side::Party, vec![(0, &reid)]);
        let opponents = UnitView::new(Side::Troop, vec![(0, &slime)]);
        let mut rng = ScriptedRng::constant(0.0);

        // attack 70/100, fire 100/100
        let actions = make_auto_battle_actions(
            env,
            &mut rng,
            (BattlerId::party(0), &reid),
            &friends,
            &opponents,
            UsageContext::default(),
        );
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].item, Some(ItemRef::Skill(10)));
        assert_eq!(actions[0].target_index, Some(0));
    }
}
