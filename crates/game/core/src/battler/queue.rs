//! Pending actions, the command input cursor and the action-state label.

use super::{ActionState, Battler, BattlerKind};
use crate::action::Action;
use crate::config::BattleConfig;
use crate::env::{BattleEnv, RngOracle, SkillId};

/// Target for a forced action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ForceTarget {
    /// Whatever the battler hit last.
    Last,
    #[default]
    Random,
    Index(usize),
}

impl ForceTarget {
    /// Maps the classic integer encoding: `-2` last target, `-1` random.
    pub fn from_index(index: i32) -> Self {
        match index {
            -2 => Self::Last,
            i if i < 0 => Self::Random,
            i => Self::Index(i as usize),
        }
    }
}

impl Battler {
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    pub fn action(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }

    pub fn action_mut(&mut self, index: usize) -> Option<&mut Action> {
        self.actions.get_mut(index)
    }

    pub fn current_action(&self) -> Option<&Action> {
        self.actions.first()
    }

    pub fn remove_current_action(&mut self) -> Option<Action> {
        if self.actions.is_empty() {
            None
        } else {
            Some(self.actions.remove(0))
        }
    }

    pub fn set_action(&mut self, index: usize, action: Action) {
        if let Some(slot) = self.actions.get_mut(index) {
            *slot = action;
        }
    }

    /// Queues an action; silently dropped once the queue is full.
    pub fn push_action(&mut self, action: Action) {
        if self.actions.try_push(action).is_err() {
            tracing::warn!(
                "action queue full ({} entries), dropping action",
                BattleConfig::MAX_ACTIONS
            );
        }
    }

    pub fn clear_actions(&mut self) {
        self.actions.clear();
        self.action_input_index = 0;
    }

    // ===== action state =====

    pub fn action_state(&self) -> ActionState {
        self.action_state
    }

    pub fn set_action_state(&mut self, state: ActionState) {
        self.action_state = state;
    }

    pub fn is_undecided(&self) -> bool {
        self.action_state == ActionState::Undecided
    }

    pub fn is_inputting(&self) -> bool {
        self.action_state == ActionState::Inputting
    }

    pub fn is_waiting(&self) -> bool {
        self.action_state == ActionState::Waiting
    }

    pub fn is_acting(&self) -> bool {
        self.action_state == ActionState::Acting
    }

    // ===== making actions =====

    /// `1 + Σ (random() < p)` over action-plus traits, capped at
    /// [`BattleConfig::MAX_ACTIONS`]. Every trait is rolled even past the cap.
    pub fn make_action_times(&self, env: BattleEnv<'_>, rng: &mut dyn RngOracle) -> usize {
        let extra = self
            .action_plus_set(env)
            .into_iter()
            .filter(|p| rng.chance(*p))
            .count();
        (1 + extra).min(BattleConfig::MAX_ACTIONS)
    }

    /// Refills the queue with blank actions.
    ///
    /// Actors become `Undecided` (or `Waiting` with nothing to decide);
    /// confused actors get plain attacks. Enemies wait for their AI to fill
    /// the slots.
    pub fn make_actions(&mut self, env: BattleEnv<'_>, rng: &mut dyn RngOracle) {
        self.clear_actions();
        if self.can_move(env) {
            for _ in 0..self.make_action_times(env, rng) {
                self.push_action(Action::new());
            }
        }
        match self.kind {
            BattlerKind::Actor(_) => {
                self.action_state = if self.actions.is_empty() {
                    ActionState::Waiting
                } else {
                    ActionState::Undecided
                };
                if !self.is_auto_battle(env) && self.is_confused(env) {
                    self.make_confusion_actions(env);
                }
            }
            BattlerKind::Enemy(_) => self.action_state = ActionState::Waiting,
        }
    }

    fn make_confusion_actions(&mut self, env: BattleEnv<'_>) {
        let attack = self.attack_skill_id(env);
        for action in self.actions.iter_mut() {
            action.set_skill(attack);
        }
        self.action_state = ActionState::Waiting;
    }

    /// Slowest queued action decides the battler's place in the turn order.
    pub fn make_speed(&mut self, env: BattleEnv<'_>, rng: &mut dyn RngOracle) {
        let actions = self.actions.clone();
        self.speed = actions
            .iter()
            .map(|action| action.speed(env, rng, self))
            .min()
            .unwrap_or(0);
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    /// Replaces the queue with a single forced skill.
    pub fn force_action(&mut self, skill_id: SkillId, target: ForceTarget) {
        self.clear_actions();
        let mut action = Action::skill(skill_id).forced();
        action.target_index = match target {
            ForceTarget::Last => self.last_target_index,
            ForceTarget::Random => None,
            ForceTarget::Index(index) => Some(index),
        };
        self.push_action(action);
    }

    // ===== command input =====

    pub fn action_input_index(&self) -> usize {
        self.action_input_index
    }

    pub fn input_action(&self) -> Option<&Action> {
        self.actions.get(self.action_input_index)
    }

    pub fn input_action_mut(&mut self) -> Option<&mut Action> {
        self.actions.get_mut(self.action_input_index)
    }

    /// Moves the cursor to the next slot, `false` past the last one.
    pub fn select_next_command(&mut self) -> bool {
        if self.action_input_index + 1 < self.actions.len() {
            self.action_input_index += 1;
            true
        } else {
            false
        }
    }

    pub fn select_previous_command(&mut self) -> bool {
        if self.action_input_index > 0 {
            self.action_input_index -= 1;
            true
        } else {
            false
        }
    }

    /// Whether the player may choose commands right now.
    pub fn can_input(&self, env: BattleEnv<'_>) -> bool {
        if env.is_time_bar() && !self.is_time_bar_charged() {
            return false;
        }
        self.is_appeared()
            && self.is_actor()
            && !self.is_restricted(env)
            && !self.is_auto_battle(env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battler::test_support::{self, CONFUSE};
    use crate::config::BattleSystem;
    use crate::env::{ItemRef, ScriptedRng};
    use crate::stats::BattlerTrait;

    #[test]
    fn action_plus_adds_slots() {
        let db = test_support::database().with_actor(
            5,
            crate::env::ActorDef {
                name: "Twin".into(),
                class_id: 1,
                initial_level: 1,
                max_level: 99,
                traits: vec![BattlerTrait::ActionPlus(0.5), BattlerTrait::ActionPlus(0.5)],
                ..Default::default()
            },
        );
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut twin = test_support::actor(env, 5);
        let mut rng = ScriptedRng::new([0.4, 0.6], 0.0);
        twin.make_actions(env, &mut rng);
        assert_eq!(twin.num_actions(), 2);
        assert!(twin.is_undecided());
    }

    #[test]
    fn action_count_stops_at_the_queue_capacity() {
        let db = test_support::database().with_actor(
            5,
            crate::env::ActorDef {
                name: "Hydra".into(),
                class_id: 1,
                initial_level: 1,
                max_level: 99,
                traits: vec![BattlerTrait::ActionPlus(1.0); 10],
                ..Default::default()
            },
        );
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut hydra = test_support::actor(env, 5);
        let mut rng = ScriptedRng::new([0.0; 10], 0.9);
        hydra.make_actions(env, &mut rng);
        assert_eq!(hydra.num_actions(), BattleConfig::MAX_ACTIONS);
        assert_eq!(rng.consumed(), 10);
    }

    #[test]
    fn confused_actor_attacks() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);
        let mut rng = ScriptedRng::constant(0.0);
        reid.add_state(env, &mut rng, CONFUSE);
        reid.make_actions(env, &mut rng);
        assert_eq!(reid.current_action().and_then(|a| a.item), Some(ItemRef::Skill(1)));
        assert!(reid.is_waiting());
    }

    #[test]
    fn speed_uses_slowest_action() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);
        reid.push_action(Action::skill(1));
        reid.push_action(Action::skill(2));
        // agi 25, random_int(11) with 0.0 → 0; guard has +2000 speed
        let mut rng = ScriptedRng::constant(0.0);
        reid.make_speed(env, &mut rng);
        assert_eq!(reid.speed(), 25);

        reid.clear_actions();
        reid.make_speed(env, &mut rng);
        assert_eq!(reid.speed(), 0);
    }

    #[test]
    fn input_cursor_walks_slots() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);
        reid.push_action(Action::new());
        reid.push_action(Action::new());
        assert!(!reid.select_previous_command());
        assert!(reid.select_next_command());
        assert_eq!(reid.action_input_index(), 1);
        assert!(!reid.select_next_command());
        assert!(reid.select_previous_command());
    }

    #[test]
    fn forced_action_resolves_last_target() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);
        reid.set_last_target_index(Some(1));
        reid.force_action(10, ForceTarget::from_index(-2));
        let action = reid.current_action().copied().unwrap();
        assert!(action.forcing);
        assert_eq!(action.target_index, Some(1));
        assert_eq!(ForceTarget::from_index(-1), ForceTarget::Random);
        assert_eq!(ForceTarget::from_index(3), ForceTarget::Index(3));
    }

    #[test]
    fn time_bar_input_requires_charge() {
        let db = test_support::database();
        let config = BattleConfig::with_battle_system(BattleSystem::ActiveTimeBar);
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);
        assert!(!reid.can_input(env));
        reid.time_bar.state = crate::battler::TimeBarState::Charged;
        assert!(reid.can_input(env));
    }
}
