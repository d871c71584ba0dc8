use tracing::debug;

use super::{BattleContext, BattleManager, Phase, member_mut, member_with_usage};
use crate::battler::{BattlerId, ForceTarget, Side};
use crate::env::{LogCommand, SkillId};

impl BattleManager {
    /// Advances the troop turn counter and, in strict turns, fixes the
    /// action order for the turn.
    pub(super) fn start_turn(&mut self, ctx: &mut BattleContext<'_>) {
        self.phase = Phase::Turn;
        ctx.troop.increase_turn();
        if !ctx.env.is_time_bar() {
            self.make_action_orders(ctx);
            ctx.log.push(LogCommand::TurnStart {
                turn: ctx.troop.turn_count(),
            });
            self.inputting = false;
        }
        debug!(turn = ctx.troop.turn_count(), "turn started");
    }

    /// Party (unless surprised) then troop (unless preemptive), stably
    /// sorted by descending speed.
    fn make_action_orders(&mut self, ctx: &mut BattleContext<'_>) {
        let env = ctx.env;
        let mut battlers = Vec::new();
        if !self.surprise {
            battlers.extend(ctx.party.battle_member_ids(env));
        }
        if !self.preemptive {
            battlers.extend(ctx.troop.member_ids());
        }

        let mut ordered: Vec<(BattlerId, i32)> = Vec::with_capacity(battlers.len());
        for id in battlers {
            if let Some(battler) = member_mut(ctx.party, ctx.troop, id) {
                battler.make_speed(env, ctx.rng);
                ordered.push((id, battler.speed()));
            }
        }
        ordered.sort_by(|a, b| b.1.cmp(&a.1));
        self.action_battlers = ordered.into_iter().map(|(id, _)| id).collect();
    }

    pub(super) fn update_turn(&mut self, ctx: &mut BattleContext<'_>, time_active: bool) {
        let time_bar = ctx.env.is_time_bar();
        if time_bar && time_active {
            self.update_time_bar(ctx);
        }
        if self.subject.is_none() {
            self.subject = self.next_subject(ctx);
        }
        if self.subject.is_some() {
            self.process_turn(ctx);
        } else if !time_bar {
            self.end_turn();
        }
    }

    /// Pops the order list until an alive battle member turns up.
    fn next_subject(&mut self, ctx: &BattleContext<'_>) -> Option<BattlerId> {
        let env = ctx.env;
        while let Some(id) = self.action_battlers.pop_front() {
            let in_battle = match id.side {
                Side::Party => ctx.party.battle_member_indices(env).contains(&id.index),
                Side::Troop => true,
            };
            if in_battle && ctx.battler(id).is_some_and(|battler| battler.is_alive(env)) {
                debug!(subject = ?id, "next subject");
                return Some(id);
            }
        }
        None
    }

    /// Runs the subject's current action if it is still valid, or wraps up
    /// its actions once the queue is empty.
    fn process_turn(&mut self, ctx: &mut BattleContext<'_>) {
        let Some(id) = self.subject else {
            return;
        };
        let env = ctx.env;
        let Some((battler, usage)) = member_with_usage(ctx.party, ctx.troop, id, self.can_escape)
        else {
            self.subject = None;
            return;
        };

        match battler.current_action().copied() {
            Some(mut action) => {
                action.prepare(env, battler);
                if action.is_valid(env, battler, usage) {
                    if let Some(current) = battler.action_mut(0) {
                        *current = action;
                    }
                    self.start_action(ctx, id, action);
                }
                if let Some(battler) = ctx.battler_mut(id) {
                    battler.remove_current_action();
                }
            }
            None => {
                self.end_battler_actions(ctx, id);
                self.subject = None;
            }
        }
    }

    pub(super) fn end_turn(&mut self) {
        self.phase = Phase::TurnEnd;
        self.preemptive = false;
        self.surprise = false;
    }

    pub(super) fn update_turn_end(&mut self, ctx: &mut BattleContext<'_>) {
        if ctx.env.is_time_bar() {
            self.start_turn(ctx);
        } else {
            self.end_all_battlers_turn(ctx);
            self.phase = Phase::Start;
        }
    }

    fn end_all_battlers_turn(&mut self, ctx: &mut BattleContext<'_>) {
        let env = ctx.env;
        for id in ctx.battle_member_ids() {
            if let Some(battler) = ctx.battler_mut(id) {
                battler.on_turn_end(env);
            }
            self.display_battler_status(ctx, id, false);
        }
    }

    // ===== forced actions =====

    /// Makes `id` use `skill_id` right away, ahead of the action order.
    ///
    /// The forced action ignores usability and confusion. It runs on the
    /// next tick spent in `Start`, `Turn` or `TurnEnd`. Dead battlers are
    /// left alone.
    pub fn force_action(
        &mut self,
        ctx: &mut BattleContext<'_>,
        id: BattlerId,
        skill_id: SkillId,
        target: ForceTarget,
    ) {
        let env = ctx.env;
        let Some(battler) = ctx.battler_mut(id) else {
            return;
        };
        if battler.is_death_state_affected(env) {
            return;
        }
        battler.force_action(skill_id, target);
        if battler.num_actions() > 0 {
            self.forced_battler = Some(id);
            self.action_battlers.retain(|other| *other != id);
            debug!(battler = ?id, skill_id, "action forced");
        }
    }

    pub(super) fn process_forced_action(&mut self, ctx: &mut BattleContext<'_>) {
        let Some(id) = self.forced_battler.take() else {
            return;
        };
        if let Some(subject) = self.subject {
            self.end_battler_actions(ctx, subject);
        }
        self.subject = Some(id);

        let time_bar = ctx.env.is_time_bar();
        let Some(battler) = ctx.battler_mut(id) else {
            self.subject = None;
            return;
        };
        if time_bar {
            battler.start_time_bar_action();
        }
        let Some(action) = battler.current_action().copied() else {
            return;
        };
        self.start_action(ctx, id, action);
        if let Some(battler) = ctx.battler_mut(id) {
            battler.remove_current_action();
        }
    }
}
