//! Scope expansion: which battlers an action hits, in hit order.

use super::Action;
use crate::battler::{Battler, BattlerId};
use crate::env::{BattleEnv, RngOracle, Scope};
use crate::unit::UnitView;

/// Expands `action` into concrete targets, repeated per hit.
///
/// `friends` is the subject's own side and `opponents` the other one.
/// Slots that resolve to nobody are dropped.
pub fn make_targets(
    env: BattleEnv<'_>,
    rng: &mut dyn RngOracle,
    subject: (BattlerId, &Battler),
    action: &Action,
    friends: &UnitView<'_>,
    opponents: &UnitView<'_>,
) -> Vec<BattlerId> {
    let (subject_id, battler) = subject;
    let Some(def) = action.definition(env) else {
        return Vec::new();
    };
    let scope = def.scope;

    let targets: Vec<Option<BattlerId>> = if !action.forcing && battler.is_confused(env) {
        vec![confusion_target(env, rng, battler, friends, opponents)]
    } else if scope.is_for_everyone() {
        opponents
            .alive(env)
            .into_iter()
            .chain(friends.alive(env))
            .map(Some)
            .collect()
    } else if scope.is_for_opponent() {
        if scope.is_for_random() {
            (0..scope.num_targets())
                .map(|_| opponents.random_target(env, rng))
                .collect()
        } else {
            targets_for_alive(env, rng, scope, action, opponents)
        }
    } else if scope.is_for_friend() {
        if scope.is_for_user() {
            vec![Some(subject_id)]
        } else if scope.is_for_dead_friend() {
            if scope.is_for_one() {
                vec![friends.smooth_dead_target(env, action.target_index.unwrap_or(0))]
            } else {
                friends.dead(env).into_iter().map(Some).collect()
            }
        } else if scope.is_for_alive_friend() {
            targets_for_alive(env, rng, scope, action, friends)
        } else if scope.is_for_one() {
            vec![friends.get(action.target_index.unwrap_or(0)).map(|(id, _)| id)]
        } else {
            friends.ids().into_iter().map(Some).collect()
        }
    } else {
        Vec::new()
    };

    let repeats = action.num_repeats(env, battler);
    targets
        .into_iter()
        .flatten()
        .flat_map(|id| std::iter::repeat_n(id, repeats))
        .collect()
}

fn targets_for_alive(
    env: BattleEnv<'_>,
    rng: &mut dyn RngOracle,
    scope: Scope,
    action: &Action,
    unit: &UnitView<'_>,
) -> Vec<Option<BattlerId>> {
    if !scope.is_for_one() {
        return unit.alive(env).into_iter().map(Some).collect();
    }
    match action.target_index {
        None => vec![unit.random_target(env, rng)],
        Some(index) => vec![unit.smooth_target(env, index)],
    }
}

fn confusion_target(
    env: BattleEnv<'_>,
    rng: &mut dyn RngOracle,
    battler: &Battler,
    friends: &UnitView<'_>,
    opponents: &UnitView<'_>,
) -> Option<BattlerId> {
    match battler.confusion_level(env) {
        1 => opponents.random_target(env, rng),
        2 => {
            if rng.random_int(2) == 0 {
                opponents.random_target(env, rng)
            } else {
                friends.random_target(env, rng)
            }
        }
        3 => friends.random_target(env, rng),
        _ => None,
    }
}
