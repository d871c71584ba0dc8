//! Victory, defeat, abort and the cleanup that follows each of them.

use tracing::debug;

use super::{BattleContext, BattleManager, BattleOutcome, Phase, Rewards};
use crate::env::{LogCommand, SoundCue};
use crate::stats::PartyAbilities;

impl BattleManager {
    /// Requests an abort; it takes effect on the next tick.
    pub fn abort(&mut self) {
        self.phase = Phase::Aborting;
    }

    pub(super) fn check_abort(&mut self, ctx: &mut BattleContext<'_>) -> bool {
        if self.phase == Phase::Aborting {
            self.process_abort(ctx);
            return true;
        }
        false
    }

    /// Escape, wipe and victory checks, in that order.
    pub(super) fn check_battle_end(&mut self, ctx: &mut BattleContext<'_>) -> bool {
        if matches!(self.phase, Phase::Init | Phase::BattleEnd) {
            return false;
        }
        let env = ctx.env;
        if ctx.party.is_escaped(env) {
            self.escaped = true;
            self.process_abort(ctx);
            true
        } else if ctx.party.is_all_dead(env) {
            self.process_defeat(ctx);
            true
        } else if ctx.troop.is_all_dead(env) {
            self.process_victory(ctx);
            true
        } else {
            false
        }
    }

    fn process_victory(&mut self, ctx: &mut BattleContext<'_>) {
        let env = ctx.env;
        for index in ctx.party.battle_member_indices(env) {
            if let Some(actor) = ctx.party.member_mut(index) {
                actor.remove_battle_states(env);
            }
        }
        ctx.audio.play(SoundCue::Victory);
        self.make_rewards(ctx);
        ctx.log.push(LogCommand::Victory);
        ctx.log.push(LogCommand::Rewards {
            exp: self.rewards.exp,
            gold: self.rewards.gold,
            items: self.rewards.items.clone(),
        });
        self.gain_rewards(ctx);
        self.end_battle(BattleOutcome::Win);
    }

    fn make_rewards(&mut self, ctx: &mut BattleContext<'_>) {
        let env = ctx.env;
        let abilities = ctx.party.abilities(env);
        let gold_rate = if abilities.contains(PartyAbilities::GOLD_DOUBLE) {
            2
        } else {
            1
        };
        let drop_double = abilities.contains(PartyAbilities::DROP_ITEM_DOUBLE);
        self.rewards = Rewards {
            exp: ctx.troop.exp_total(env),
            gold: ctx.troop.gold_total(env, gold_rate),
            items: ctx.troop.make_drop_items(env, ctx.rng, drop_double),
        };
        debug!(
            exp = self.rewards.exp,
            gold = self.rewards.gold,
            items = self.rewards.items.len(),
            "rewards made"
        );
    }

    fn gain_rewards(&mut self, ctx: &mut BattleContext<'_>) {
        let env = ctx.env;
        let mut receivers = ctx.party.battle_member_indices(env);
        if env.config().reserve_exp {
            receivers.extend(ctx.party.reserve_member_indices(env));
        }
        for index in receivers {
            let Some(actor) = ctx.party.member_mut(index) else {
                continue;
            };
            let change = actor.gain_exp(env, self.rewards.exp);
            if change.is_level_up()
                && let Some(data) = actor.as_actor()
            {
                ctx.log.push(LogCommand::LevelUp {
                    actor: data.actor_id,
                    level: change.new_level,
                    learned: change.learned,
                });
            }
        }

        ctx.party.gain_gold(env, self.rewards.gold);
        let max_items = env.config().max_items;
        for &key in &self.rewards.items {
            ctx.party.inventory_mut().gain_item(key, 1, max_items);
        }
    }

    fn process_defeat(&mut self, ctx: &mut BattleContext<'_>) {
        ctx.log.push(LogCommand::Defeat);
        ctx.audio.play(SoundCue::Defeat);
        self.end_battle(BattleOutcome::Defeat);
    }

    pub(super) fn process_abort(&mut self, ctx: &mut BattleContext<'_>) {
        let env = ctx.env;
        for index in ctx.party.battle_member_indices(env) {
            if let Some(actor) = ctx.party.member_mut(index) {
                actor.remove_battle_states(env);
            }
        }
        self.end_battle(if self.escaped {
            BattleOutcome::Escape
        } else {
            BattleOutcome::Abort
        });
    }

    fn end_battle(&mut self, outcome: BattleOutcome) {
        self.phase = Phase::BattleEnd;
        self.inputting = false;
        self.current_actor = None;
        self.subject = None;
        self.action = None;
        self.targets.clear();
        self.action_battlers.clear();
        self.forced_battler = None;
        self.outcome = Some(outcome);
        debug!(%outcome, "battle ended");
    }

    /// Runs once after the outcome is known: revives a defeated party when
    /// losing is allowed and clears battle-only state from everyone.
    pub(super) fn update_battle_end(&mut self, ctx: &mut BattleContext<'_>) {
        if self.finished {
            return;
        }
        let env = ctx.env;
        if !self.escaped && self.can_lose && ctx.party.is_all_dead(env) {
            ctx.party.revive_battle_members(env);
        }
        for actor in ctx.party.members.iter_mut() {
            actor.on_battle_end(env);
        }
        for enemy in ctx.troop.members.iter_mut() {
            enemy.on_battle_end(env);
        }
        self.finished = true;
    }
}
