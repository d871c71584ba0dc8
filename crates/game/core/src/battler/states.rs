//! Status effects: the active set, turn counters and restrictions.

use super::Battler;
use crate::env::{AutoRemoval, BattleEnv, Restriction, RngOracle, StateDef, StateId};

impl Battler {
    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    pub fn state_turns(&self, state: StateId) -> Option<i32> {
        self.state_turns.get(&state).copied()
    }

    pub fn state_defs<'a>(&self, env: BattleEnv<'a>) -> impl Iterator<Item = &'a StateDef> {
        self.states.iter().filter_map(move |id| env.state(*id))
    }

    pub fn is_state_affected(&self, state: StateId) -> bool {
        self.states.contains(&state)
    }

    pub fn is_death_state_affected(&self, env: BattleEnv<'_>) -> bool {
        self.is_state_affected(env.death_state_id())
    }

    /// The first state in priority order. Drives motion and overlay.
    pub fn most_important_state(&self) -> Option<StateId> {
        self.states.first().copied()
    }

    /// The highest priority state with a persistent message, if any.
    pub fn most_important_state_message<'a>(&self, env: BattleEnv<'a>) -> Option<(StateId, &'a str)> {
        self.states.iter().find_map(|id| {
            env.state(*id)
                .filter(|def| !def.message.is_empty())
                .map(|def| (*id, def.message.as_str()))
        })
    }

    // ===== restriction =====

    pub fn restriction(&self, env: BattleEnv<'_>) -> Restriction {
        self.state_defs(env)
            .map(|def| def.restriction)
            .max()
            .unwrap_or_default()
    }

    pub fn is_restricted(&self, env: BattleEnv<'_>) -> bool {
        self.is_appeared() && self.restriction(env) > Restriction::None
    }

    pub fn can_move(&self, env: BattleEnv<'_>) -> bool {
        self.is_appeared() && self.restriction(env) < Restriction::CannotMove
    }

    pub fn is_confused(&self, env: BattleEnv<'_>) -> bool {
        self.is_appeared() && self.restriction(env).confusion_level() > 0
    }

    pub fn confusion_level(&self, env: BattleEnv<'_>) -> u8 {
        if self.is_confused(env) {
            self.restriction(env).confusion_level()
        } else {
            0
        }
    }

    // ===== add / remove =====

    fn is_state_addable(&self, env: BattleEnv<'_>, state: StateId) -> bool {
        let Some(def) = env.state(state) else {
            return false;
        };
        self.is_alive(env)
            && !self.is_state_resist(env, state)
            && !self.result.is_state_removed(state)
            && !(def.remove_by_restriction && self.is_restricted(env))
    }

    pub fn add_state(&mut self, env: BattleEnv<'_>, rng: &mut dyn RngOracle, state: StateId) {
        self.add_state_with(env, Some(rng), state);
    }

    /// Without an rng the counter is set to the state's minimum turns.
    pub(crate) fn add_state_with(
        &mut self,
        env: BattleEnv<'_>,
        rng: Option<&mut dyn RngOracle>,
        state: StateId,
    ) {
        if !self.is_state_addable(env, state) {
            return;
        }
        if !self.is_state_affected(state) {
            self.add_new_state(env, state);
            self.refresh(env);
        }
        self.reset_state_counts(env, rng, state);
        self.result.push_added_state(state);
    }

    fn add_new_state(&mut self, env: BattleEnv<'_>, state: StateId) {
        if state == env.death_state_id() {
            self.die();
        }
        let restricted = self.is_restricted(env);
        self.states.push(state);
        self.sort_states(env);
        if !restricted && self.is_restricted(env) {
            self.on_restrict(env);
        }
    }

    fn sort_states(&mut self, env: BattleEnv<'_>) {
        self.states.sort_by(|a, b| {
            let pa = env.state(*a).map_or(0, |def| def.priority);
            let pb = env.state(*b).map_or(0, |def| def.priority);
            pb.cmp(&pa).then(a.cmp(b))
        });
    }

    fn reset_state_counts(&mut self, env: BattleEnv<'_>, rng: Option<&mut dyn RngOracle>, state: StateId) {
        let Some(def) = env.state(state) else {
            return;
        };
        let variance = 1 + (def.max_turns - def.min_turns).max(0);
        let extra = rng.map_or(0, |rng| rng.random_int(variance));
        self.state_turns.insert(state, def.min_turns + extra);
    }

    /// Newly restricted: lose the charge, the queue and fragile states.
    fn on_restrict(&mut self, env: BattleEnv<'_>) {
        self.clear_time_bar_charge();
        self.clear_actions();
        let fragile: Vec<StateId> = self
            .states
            .iter()
            .copied()
            .filter(|id| env.state(*id).is_some_and(|def| def.remove_by_restriction))
            .collect();
        for state in fragile {
            self.remove_state(env, state);
        }
    }

    pub fn remove_state(&mut self, env: BattleEnv<'_>, state: StateId) {
        if !self.is_state_affected(state) {
            return;
        }
        if state == env.death_state_id() {
            self.revive();
        }
        self.erase_state(state);
        self.refresh(env);
        self.result.push_removed_state(state);
    }

    pub(crate) fn erase_state(&mut self, state: StateId) {
        self.states.retain(|id| *id != state);
        self.state_turns.remove(&state);
    }

    pub(crate) fn clear_states(&mut self) {
        self.states.clear();
        self.state_turns.clear();
    }

    // ===== timed removal =====

    pub fn is_state_expired(&self, state: StateId) -> bool {
        self.state_turns(state) == Some(0)
    }

    pub fn update_state_turns(&mut self) {
        for turns in self.state_turns.values_mut() {
            if *turns > 0 {
                *turns -= 1;
            }
        }
    }

    pub fn remove_states_auto(&mut self, env: BattleEnv<'_>, timing: AutoRemoval) {
        let expired: Vec<StateId> = self
            .states
            .iter()
            .copied()
            .filter(|id| {
                self.is_state_expired(*id)
                    && env.state(*id).is_some_and(|def| def.auto_removal == timing)
            })
            .collect();
        for state in expired {
            self.remove_state(env, state);
        }
    }

    pub fn remove_states_by_damage(&mut self, env: BattleEnv<'_>, rng: &mut dyn RngOracle) {
        let candidates: Vec<(StateId, i32)> = self
            .states
            .iter()
            .filter_map(|id| env.state(*id).map(|def| (*id, def)))
            .filter(|(_, def)| def.remove_by_damage)
            .map(|(id, def)| (id, def.chance_by_damage))
            .collect();
        for (state, chance) in candidates {
            if rng.random_int(100) < chance {
                self.remove_state(env, state);
            }
        }
    }

    pub fn remove_battle_states(&mut self, env: BattleEnv<'_>) {
        let battle_only: Vec<StateId> = self
            .states
            .iter()
            .copied()
            .filter(|id| env.state(*id).is_some_and(|def| def.remove_at_battle_end))
            .collect();
        for state in battle_only {
            self.remove_state(env, state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battler::test_support::{self, CONFUSE, DEATH, GUARD_STATE, POISON, STUN};
    use crate::config::BattleConfig;
    use crate::env::ScriptedRng;
    use crate::stats::BattlerTrait;

    #[test]
    fn states_sort_by_priority_then_id() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);
        let mut rng = ScriptedRng::constant(0.0);

        reid.add_state(env, &mut rng, CONFUSE);
        reid.add_state(env, &mut rng, POISON);
        reid.add_state(env, &mut rng, STUN);
        assert_eq!(reid.states(), &[STUN, POISON, CONFUSE]);
        assert_eq!(reid.most_important_state(), Some(STUN));
        assert_eq!(
            reid.most_important_state_message(env),
            Some((STUN, "is stunned"))
        );
    }

    #[test]
    fn removing_absent_state_is_noop() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);
        let before = reid.clone();
        reid.remove_state(env, POISON);
        assert_eq!(reid, before);
    }

    #[test]
    fn state_removed_in_this_result_is_not_readded() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);
        let mut rng = ScriptedRng::constant(0.0);

        reid.add_state(env, &mut rng, POISON);
        reid.clear_result();
        reid.remove_state(env, POISON);
        reid.add_state(env, &mut rng, POISON);
        assert!(!reid.is_state_affected(POISON));
        assert!(!reid.result().is_state_added(POISON));

        reid.clear_result();
        reid.add_state(env, &mut rng, POISON);
        assert!(reid.is_state_affected(POISON));
    }

    #[test]
    fn resisted_state_is_never_added() {
        let db = test_support::database().with_actor(
            3,
            crate::env::ActorDef {
                name: "Warded".into(),
                class_id: 1,
                initial_level: 1,
                max_level: 99,
                traits: vec![BattlerTrait::StateResist(POISON)],
                ..Default::default()
            },
        );
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut warded = test_support::actor(env, 3);
        let mut rng = ScriptedRng::constant(0.0);
        warded.add_state(env, &mut rng, POISON);
        assert!(warded.states().is_empty());
        assert!(warded.result().added_states.is_empty());
    }

    #[test]
    fn turn_counter_rolls_between_min_and_max() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);
        // min 1, max 3: random_int(3) with 0.99 → 2
        let mut rng = ScriptedRng::constant(0.99);
        reid.add_state(env, &mut rng, STUN);
        assert_eq!(reid.state_turns(STUN), Some(3));
    }

    #[test]
    fn restriction_clears_actions_and_fragile_states() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);
        let mut rng = ScriptedRng::constant(0.0);

        reid.add_state(env, &mut rng, GUARD_STATE);
        reid.make_actions(env, &mut rng);
        assert!(reid.num_actions() > 0);

        reid.add_state(env, &mut rng, STUN);
        assert!(!reid.can_move(env));
        assert!(!reid.is_state_affected(GUARD_STATE));
        assert_eq!(reid.num_actions(), 0);

        // remove_by_restriction states cannot be added while restricted
        reid.add_state(env, &mut rng, GUARD_STATE);
        assert!(!reid.is_state_affected(GUARD_STATE));
    }

    #[test]
    fn death_clears_states_and_buffs() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);
        let mut rng = ScriptedRng::constant(0.0);
        reid.add_state(env, &mut rng, POISON);
        reid.add_buff(env, crate::stats::Param::Attack, 3);

        reid.add_state(env, &mut rng, DEATH);
        assert_eq!(reid.states(), &[DEATH]);
        assert_eq!(reid.hp(), 0);
        assert!(!reid.buffs().is_affected(crate::stats::Param::Attack));
    }

    #[test]
    fn auto_removal_waits_for_counter_and_timing() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);
        let mut rng = ScriptedRng::constant(0.0);
        reid.add_state(env, &mut rng, STUN);
        assert_eq!(reid.state_turns(STUN), Some(1));

        reid.remove_states_auto(env, AutoRemoval::ActionEnd);
        assert!(reid.is_state_affected(STUN));
        reid.update_state_turns();
        reid.remove_states_auto(env, AutoRemoval::TurnEnd);
        assert!(reid.is_state_affected(STUN));
        reid.remove_states_auto(env, AutoRemoval::ActionEnd);
        assert!(!reid.is_state_affected(STUN));
    }
}
