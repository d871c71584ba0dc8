//! Time-bar clock updates, run once per active tick in the `Turn` phase.

use super::{BattleContext, BattleManager, member_with_usage};
use crate::battler::{ActionState, BattlerId, TimeBarScale};

impl BattleManager {
    /// Party-wide scale: the fastest battle member's base speed.
    pub(super) fn time_bar_scale(&self, ctx: &BattleContext<'_>) -> TimeBarScale {
        let env = ctx.env;
        let base_speed = ctx
            .party
            .battle_member_indices(env)
            .into_iter()
            .filter_map(|index| ctx.party.member(index))
            .map(|actor| actor.time_bar_base_speed(env))
            .fold(0.0, f64::max);
        TimeBarScale::new(base_speed, env.battle_system().reference_time())
    }

    pub(super) fn update_time_bar(&mut self, ctx: &mut BattleContext<'_>) {
        let env = ctx.env;
        let scale = self.time_bar_scale(ctx);
        let active = env.battle_system().is_active_time_bar();

        let mut clocks = ctx.party.battle_member_ids(env);
        clocks.extend(ctx.troop.member_ids());
        for id in clocks {
            // wait mode holds full bars while the party has a command open
            let delay = !active && ctx.party.can_input(env);
            self.update_battler_clock(ctx, id, scale, delay);
        }
        for id in ctx.battle_member_ids() {
            self.update_time_bar_battler(ctx, id);
        }
        self.check_time_bar_turn_end(ctx);
    }

    fn update_battler_clock(
        &mut self,
        ctx: &mut BattleContext<'_>,
        id: BattlerId,
        scale: TimeBarScale,
        delay: bool,
    ) {
        let env = ctx.env;
        let Some((battler, usage)) = member_with_usage(ctx.party, ctx.troop, id, self.can_escape)
        else {
            return;
        };
        let mut needs_actions = false;
        if battler.can_move(env) {
            battler.update_time_bar_charge(env, scale, delay);
            battler.update_time_bar_cast(env, scale, usage);
            needs_actions = battler.is_time_bar_charged()
                && !battler.time_bar().is_turn_end()
                && battler.is_auto_battle(env);
        }
        if needs_actions {
            self.make_time_bar_actions(ctx, id);
        }
        if let Some(battler) = ctx.battler_mut(id)
            && battler.is_alive(env)
        {
            battler.update_time_bar_idle(env, scale);
        }
    }

    /// Turn end, ready and timeout checks for one battler, in that order.
    fn update_time_bar_battler(&mut self, ctx: &mut BattleContext<'_>, id: BattlerId) {
        let env = ctx.env;
        let Some(battler) = ctx.battler_mut(id) else {
            return;
        };
        if battler.time_bar().is_turn_end() {
            battler.on_turn_end(env);
            if battler.start_time_bar_turn() {
                self.make_time_bar_actions(ctx, id);
            }
            self.display_battler_status(ctx, id, false);
        } else if battler.is_time_bar_ready() {
            battler.start_time_bar_action();
            self.action_battlers.push_back(id);
        } else if battler.is_time_bar_timeout() {
            battler.on_time_bar_timeout(env);
            self.display_battler_status(ctx, id, true);
        }
    }

    /// The troop turn ends once any enemy has started more turns than the
    /// troop has counted.
    fn check_time_bar_turn_end(&mut self, ctx: &BattleContext<'_>) {
        let turn_max = ctx
            .troop
            .members()
            .iter()
            .map(|enemy| enemy.time_bar().turn_count())
            .max()
            .unwrap_or(0);
        if turn_max > ctx.troop.turn_count() {
            self.end_turn();
        }
    }

    /// Fresh actions for a new time-bar turn. Battlers that cannot input
    /// start casting right away.
    pub(super) fn make_time_bar_actions(&mut self, ctx: &mut BattleContext<'_>, id: BattlerId) {
        let env = ctx.env;
        self.make_battler_actions(ctx, id);
        if let Some(battler) = ctx.battler_mut(id) {
            if battler.can_input(env) {
                battler.set_action_state(ActionState::Undecided);
            } else {
                battler.start_time_bar_casting();
                battler.set_action_state(ActionState::Waiting);
            }
        }
    }
}
