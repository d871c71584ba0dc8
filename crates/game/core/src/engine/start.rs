use tracing::debug;

use super::{BattleContext, BattleManager, Phase};
use crate::env::{BattleEnv, LogCommand, TroopId};
use crate::error::SetupError;
use crate::stats::PartyAbilities;
use crate::unit::{Party, Troop};

impl BattleManager {
    /// Spawns the troop and resets the scheduler for a new encounter.
    ///
    /// All data is resolved here; a battle that passes setup never fails on
    /// missing troop or enemy definitions.
    pub fn setup(
        &mut self,
        env: BattleEnv<'_>,
        party: &Party,
        troop_id: TroopId,
        can_escape: bool,
        can_lose: bool,
    ) -> Result<Troop, SetupError> {
        if !matches!(self.phase, Phase::Init | Phase::BattleEnd) {
            return Err(SetupError::AlreadyRunning);
        }
        if party.battle_member_indices(env).is_empty() {
            return Err(SetupError::EmptyParty);
        }
        let troop = Troop::setup(env, troop_id)?;

        *self = Self {
            can_escape,
            can_lose,
            needs_party_command: true,
            ..Self::default()
        };
        self.escape_ratio = 0.5 * party.agility(env) / troop.agility(env);
        debug!(
            troop_id,
            can_escape,
            can_lose,
            escape_ratio = self.escape_ratio,
            "battle set up"
        );
        Ok(troop)
    }

    /// Rolls for a preemptive strike, then for a surprise attack.
    ///
    /// Both draws are always taken; a preemptive encounter is never a
    /// surprise.
    pub fn on_encounter(&mut self, ctx: &mut BattleContext<'_>) {
        let env = ctx.env;
        let party_agility = ctx.party.agility(env);
        let troop_agility = ctx.troop.agility(env);
        let abilities = ctx.party.abilities(env);
        let ahead = party_agility >= troop_agility;

        let mut rate_preemptive = if ahead { 0.05 } else { 0.03 };
        if abilities.contains(PartyAbilities::RAISE_PREEMPTIVE) {
            rate_preemptive *= 4.0;
        }
        let rate_surprise = if abilities.contains(PartyAbilities::CANCEL_SURPRISE) {
            0.0
        } else if ahead {
            0.03
        } else {
            0.05
        };

        self.preemptive = ctx.rng.chance(rate_preemptive);
        self.surprise = ctx.rng.chance(rate_surprise) && !self.preemptive;
        debug!(
            preemptive = self.preemptive,
            surprise = self.surprise,
            "encounter rolled"
        );
    }

    /// Starts every battler's battle and announces the enemies.
    pub fn start_battle(&mut self, ctx: &mut BattleContext<'_>) {
        let env = ctx.env;
        self.phase = Phase::Start;
        let scale = self.time_bar_scale(ctx);

        for index in ctx.party.battle_member_indices(env) {
            if let Some(actor) = ctx.party.member_mut(index) {
                actor.on_battle_start(env, ctx.rng, scale, self.preemptive);
            }
        }
        for enemy in ctx.troop.members.iter_mut() {
            enemy.on_battle_start(env, ctx.rng, scale, self.surprise);
        }

        for name in ctx.troop.enemy_names(env) {
            ctx.log.push(LogCommand::Emerge { name });
        }
        if self.preemptive {
            ctx.log.push(LogCommand::Preemptive);
        } else if self.surprise {
            ctx.log.push(LogCommand::Surprise);
        }
        debug!(system = %env.battle_system(), "battle started");
    }

    pub(super) fn update_start(&mut self, ctx: &mut BattleContext<'_>) {
        if ctx.env.is_time_bar() {
            self.phase = Phase::Turn;
        } else {
            self.start_input(ctx);
        }
    }
}
