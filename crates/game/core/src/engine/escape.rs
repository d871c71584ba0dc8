use tracing::debug;

use super::{BattleContext, BattleManager, EscapeOutcome};
use crate::env::{LogCommand, SoundCue};

impl BattleManager {
    /// Party command "escape".
    ///
    /// Always succeeds on a preemptive strike. A failed attempt raises the
    /// odds for the next one, costs every battle member its queued actions
    /// and, in strict turns, hands the turn to the enemy.
    pub fn process_escape(&mut self, ctx: &mut BattleContext<'_>) -> EscapeOutcome {
        if !self.can_escape {
            return EscapeOutcome::Forbidden;
        }
        let env = ctx.env;
        ctx.log.push(LogCommand::EscapeStart);
        ctx.audio.play(SoundCue::Escape);

        let success = self.preemptive || ctx.rng.chance(self.escape_ratio);
        debug!(success, ratio = self.escape_ratio, "escape attempted");
        if success {
            ctx.log.push(LogCommand::EscapeSuccess);
            self.escaped = true;
            self.process_abort(ctx);
            return EscapeOutcome::Escaped;
        }

        for index in ctx.party.battle_member_indices(env) {
            if let Some(actor) = ctx.party.member_mut(index) {
                actor.on_escape_failure(env);
            }
        }
        ctx.log.push(LogCommand::EscapeFailure);
        self.escape_ratio += env.config().escape_ratio_step;
        if !env.is_time_bar() {
            self.start_turn(ctx);
        }
        EscapeOutcome::Failed
    }
}
