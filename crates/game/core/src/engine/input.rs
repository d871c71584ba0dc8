use tracing::debug;

use super::{BattleContext, BattleManager, Phase, member_mut, unit_views};
use crate::action::make_auto_battle_actions;
use crate::battler::{ActionState, BattlerId, EnemyTurnContext, Side, UsageContext};

impl BattleManager {
    // ===== strict turns =====

    /// Opens the command phase: both sides queue their actions.
    ///
    /// Input is skipped entirely on a surprise attack or when no actor can
    /// take commands.
    pub(super) fn start_input(&mut self, ctx: &mut BattleContext<'_>) {
        let env = ctx.env;
        self.phase = Phase::Input;
        self.inputting = true;
        for id in ctx.party.battle_member_ids(env) {
            self.make_battler_actions(ctx, id);
        }
        for id in ctx.troop.member_ids() {
            self.make_battler_actions(ctx, id);
        }
        self.current_actor = None;
        if self.surprise || !ctx.party.can_input(env) {
            self.start_turn(ctx);
        }
    }

    /// Refills a battler's queue and lets its AI fill the slots.
    pub(super) fn make_battler_actions(&mut self, ctx: &mut BattleContext<'_>, id: BattlerId) {
        let env = ctx.env;
        let turn = EnemyTurnContext {
            turn_count: ctx.troop.turn_count() + 1,
            party_highest_level: ctx.party.highest_level(),
        };
        let Some(battler) = member_mut(ctx.party, ctx.troop, id) else {
            return;
        };
        battler.make_actions(env, ctx.rng);
        match id.side {
            Side::Troop => {
                let turn = if env.is_time_bar() {
                    EnemyTurnContext {
                        turn_count: battler.time_bar().turn_count(),
                        ..turn
                    }
                } else {
                    turn
                };
                battler.select_enemy_actions(env, ctx.rng, turn);
            }
            Side::Party => {
                if battler.is_auto_battle(env) {
                    self.fill_auto_battle_actions(ctx, id);
                }
            }
        }
    }

    fn fill_auto_battle_actions(&mut self, ctx: &mut BattleContext<'_>, id: BattlerId) {
        let env = ctx.env;
        let actions = {
            let party = &*ctx.party;
            let Some(battler) = party.member(id.index) else {
                return;
            };
            let (friends, opponents) = unit_views(env, party, &*ctx.troop, Side::Party);
            let usage = UsageContext::new(Some(party.inventory()), self.can_escape);
            make_auto_battle_actions(env, ctx.rng, (id, battler), &friends, &opponents, usage)
        };
        if let Some(battler) = ctx.party.member_mut(id.index) {
            for (slot, action) in actions.into_iter().enumerate() {
                battler.set_action(slot, action);
            }
            battler.set_action_state(ActionState::Waiting);
        }
    }

    // ===== command selection =====

    /// Moves input to the current actor's next slot, or on to the next
    /// actor once the last slot is filled.
    ///
    /// With the party command window open (no current actor) this picks the
    /// first actor able to input. In strict turns running out of actors
    /// starts the turn.
    pub fn select_next_command(&mut self, ctx: &mut BattleContext<'_>) {
        if let Some(index) = self.current_actor {
            if ctx
                .party
                .member_mut(index)
                .is_some_and(|actor| actor.select_next_command())
            {
                return;
            }
            self.finish_actor_input(ctx);
        }
        self.select_next_actor(ctx);
    }

    /// Steps input back one slot, or back to the previous actor.
    pub fn select_previous_command(&mut self, ctx: &mut BattleContext<'_>) {
        if let Some(index) = self.current_actor {
            if ctx
                .party
                .member_mut(index)
                .is_some_and(|actor| actor.select_previous_command())
            {
                return;
            }
            self.cancel_actor_input(ctx);
        }
        self.select_previous_actor(ctx);
    }

    fn select_next_actor(&mut self, ctx: &mut BattleContext<'_>) {
        self.change_current_actor(ctx, true);
        if self.current_actor.is_none() {
            if ctx.env.is_time_bar() {
                self.change_current_actor(ctx, true);
            } else {
                self.start_turn(ctx);
            }
        }
    }

    fn select_previous_actor(&mut self, ctx: &mut BattleContext<'_>) {
        if ctx.env.is_time_bar() {
            self.change_current_actor(ctx, true);
            if self.current_actor.is_none() {
                self.inputting = ctx.party.can_input(ctx.env);
            }
        } else {
            self.change_current_actor(ctx, false);
        }
    }

    /// Walks the battle members from the current actor and stops at the
    /// first one able to input, or at the end of the line.
    fn change_current_actor(&mut self, ctx: &mut BattleContext<'_>, forward: bool) {
        let env = ctx.env;
        let members = ctx.party.battle_member_indices(env);
        let mut position = self
            .current_actor
            .and_then(|current| members.iter().position(|index| *index == current))
            .map_or(-1, |position| position as isize);
        self.current_actor = loop {
            position += if forward { 1 } else { -1 };
            let Some(index) = usize::try_from(position)
                .ok()
                .and_then(|position| members.get(position).copied())
            else {
                break None;
            };
            if ctx
                .party
                .member(index)
                .is_some_and(|actor| actor.can_input(env))
            {
                break Some(index);
            }
        };
        self.start_actor_input(ctx);
    }

    fn start_actor_input(&mut self, ctx: &mut BattleContext<'_>) {
        let Some(index) = self.current_actor else {
            return;
        };
        if let Some(actor) = ctx.party.member_mut(index) {
            actor.set_action_state(ActionState::Inputting);
            self.inputting = true;
            debug!(actor = index, "actor input started");
        }
    }

    fn finish_actor_input(&mut self, ctx: &mut BattleContext<'_>) {
        let Some(index) = self.current_actor else {
            return;
        };
        let time_bar = ctx.env.is_time_bar();
        if let Some(actor) = ctx.party.member_mut(index) {
            if time_bar {
                actor.start_time_bar_casting();
            }
            actor.set_action_state(ActionState::Waiting);
        }
    }

    pub(super) fn cancel_actor_input(&mut self, ctx: &mut BattleContext<'_>) {
        let Some(index) = self.current_actor else {
            return;
        };
        if let Some(actor) = ctx.party.member_mut(index) {
            actor.set_action_state(ActionState::Undecided);
        }
    }

    // ===== time-bar input =====

    /// Opens and closes command input as actors charge up and lose the
    /// ability to act.
    pub(super) fn update_time_bar_input(&mut self, ctx: &mut BattleContext<'_>) {
        if self.inputting {
            self.check_time_bar_input_close(ctx);
        } else {
            self.check_time_bar_input_open(ctx);
        }
    }

    fn check_time_bar_input_close(&mut self, ctx: &mut BattleContext<'_>) {
        let env = ctx.env;
        let actor_lost_input = self
            .current_actor
            .and_then(|index| ctx.party.member(index))
            .is_some_and(|actor| !actor.can_input(env));
        if !self.is_party_time_bar_inputtable(ctx) || actor_lost_input {
            self.cancel_actor_input(ctx);
            self.current_actor = None;
            self.inputting = false;
        }
    }

    fn check_time_bar_input_open(&mut self, ctx: &mut BattleContext<'_>) {
        if !self.is_party_time_bar_inputtable(ctx) {
            return;
        }
        if self.needs_party_command {
            self.inputting = true;
            self.needs_party_command = false;
        } else {
            self.select_next_command(ctx);
        }
    }

    fn is_party_time_bar_inputtable(&self, ctx: &BattleContext<'_>) -> bool {
        ctx.party.can_input(ctx.env)
            && matches!(self.phase, Phase::Turn | Phase::TurnEnd | Phase::Action)
    }
}
