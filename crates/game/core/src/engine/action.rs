//! Action execution: one target per tick, then narration of the result.
//!
//! ```text
//! start_action ──▶ invoke_action (per target) ──▶ end_action
//!                    ├─ counter attack
//!                    ├─ magic reflection
//!                    └─ normal (substitute redirection)
//! ```

use tracing::debug;

use super::{BattleContext, BattleManager, Phase, member, member_mut, unit_views};
use crate::action::apply::{item_counter_rate, item_reflection_rate};
use crate::action::{Action, ActionResult, CombatSnapshot, HitOutcome, apply, make_targets};
use crate::battler::{ActionState, BattlerId, Side};
use crate::env::{ItemRef, LogCommand, SoundCue, UsableItem};
use crate::stats::CollapseKind;

impl BattleManager {
    /// Resolves targets, pays the cost and announces the action.
    pub(super) fn start_action(&mut self, ctx: &mut BattleContext<'_>, subject: BattlerId, action: Action) {
        let env = ctx.env;
        let targets = {
            let Some(battler) = member(&*ctx.party, &*ctx.troop, subject) else {
                return;
            };
            let (friends, opponents) = unit_views(env, &*ctx.party, &*ctx.troop, subject.side);
            make_targets(env, ctx.rng, (subject, battler), &action, &friends, &opponents)
        };
        self.phase = Phase::Action;
        self.action = Some(action);
        self.targets = targets.into();

        let Some(item) = action.item else {
            return;
        };
        let is_guard = action.is_guard(env);
        let battler = match subject.side {
            Side::Party => ctx
                .party
                .member_and_inventory(subject.index)
                .map(|(actor, inventory)| {
                    actor.use_item(env, item, Some(inventory));
                    actor
                }),
            Side::Troop => ctx.troop.member_mut(subject.index).map(|enemy| {
                enemy.use_item(env, item, None);
                enemy
            }),
        };
        if let Some(battler) = battler
            && !is_guard
        {
            battler.set_action_state(ActionState::Acting);
        }
        ctx.log.push(LogCommand::ActionStart { subject, item });
        debug!(
            subject = ?subject,
            item = ?item,
            targets = self.targets.len(),
            "action started"
        );
    }

    pub(super) fn update_action(&mut self, ctx: &mut BattleContext<'_>) {
        match self.targets.pop_front() {
            Some(target) => self.invoke_action(ctx, target),
            None => self.end_action(ctx),
        }
    }

    /// Counter, reflection or normal resolution against one target.
    ///
    /// The counter roll is always drawn; the reflection roll only when no
    /// counter happened.
    fn invoke_action(&mut self, ctx: &mut BattleContext<'_>, target: BattlerId) {
        let env = ctx.env;
        let (Some(subject), Some(item)) = (self.subject, self.action.and_then(|a| a.item)) else {
            return;
        };
        let Some(def) = env.usable(item) else {
            return;
        };
        let Some(target_battler) = ctx.battler(target) else {
            return;
        };
        let counter_rate = item_counter_rate(env, def, target_battler);
        let reflection_rate = item_reflection_rate(env, def, target_battler);

        if ctx.rng.chance(counter_rate) {
            self.invoke_counter_attack(ctx, subject, target);
        } else if ctx.rng.chance(reflection_rate) {
            self.invoke_magic_reflection(ctx, subject, target, item);
        } else {
            self.invoke_normal_action(ctx, subject, target, item, def);
        }

        let position = ctx.view_position(target);
        if let Some(battler) = ctx.battler_mut(subject) {
            battler.set_last_target_index(position);
        }
    }

    fn invoke_normal_action(
        &mut self,
        ctx: &mut BattleContext<'_>,
        subject: BattlerId,
        target: BattlerId,
        item: ItemRef,
        def: &UsableItem,
    ) {
        let real_target = self.apply_substitute(ctx, target, def);
        resolve(ctx, subject, item, real_target, subject);
        self.display_action_results(ctx, real_target);
    }

    /// The target answers with its own attack skill.
    fn invoke_counter_attack(&mut self, ctx: &mut BattleContext<'_>, subject: BattlerId, target: BattlerId) {
        let env = ctx.env;
        let Some(counter) = ctx.battler(target) else {
            return;
        };
        let attack = ItemRef::Skill(counter.attack_skill_id(env));
        resolve(ctx, target, attack, subject, target);
        ctx.log.push(LogCommand::Counter { battler: target });
        self.display_action_results(ctx, subject);
    }

    /// The action bounces back to its user. Drained hp and mp go to the
    /// reflecting battler.
    fn invoke_magic_reflection(
        &mut self,
        ctx: &mut BattleContext<'_>,
        subject: BattlerId,
        target: BattlerId,
        item: ItemRef,
    ) {
        ctx.log.push(LogCommand::Reflection { battler: target });
        ctx.audio.play(SoundCue::Reflection);
        resolve(ctx, subject, item, subject, target);
        self.display_action_results(ctx, subject);
    }

    /// A dying target is covered by the first substitute of its unit.
    fn apply_substitute(&self, ctx: &mut BattleContext<'_>, target: BattlerId, def: &UsableItem) -> BattlerId {
        let env = ctx.env;
        let Some(battler) = ctx.battler(target) else {
            return target;
        };
        if !battler.is_dying(env) || def.is_certain_hit() {
            return target;
        }
        let substitute = match target.side {
            Side::Party => ctx.party.view(env).substitute_for(env, target),
            Side::Troop => ctx.troop.view().substitute_for(env, target),
        };
        match substitute {
            Some(substitute) => {
                ctx.log.push(LogCommand::Substitute { substitute, target });
                substitute
            }
            None => target,
        }
    }

    /// Closes the current action. A subject with nothing left to do ends its
    /// actions for the turn.
    pub(super) fn end_action(&mut self, ctx: &mut BattleContext<'_>) {
        self.phase = Phase::Turn;
        self.action = None;
        self.targets.clear();
        let Some(subject) = self.subject else {
            return;
        };
        ctx.log.push(LogCommand::ActionEnd { subject });
        let done = ctx
            .battler(subject)
            .is_none_or(|battler| battler.num_actions() == 0);
        if done {
            self.end_battler_actions(ctx, subject);
            self.subject = None;
        }
    }

    pub(super) fn end_battler_actions(&mut self, ctx: &mut BattleContext<'_>, id: BattlerId) {
        let env = ctx.env;
        let Some(battler) = ctx.battler_mut(id) else {
            return;
        };
        battler.set_action_state(if env.is_time_bar() {
            ActionState::Undecided
        } else {
            ActionState::Done
        });
        battler.on_all_actions_end(env);
        battler.clear_time_bar_charge();
        self.display_battler_status(ctx, id, true);
    }

    // ===== narration =====

    fn display_action_results(&self, ctx: &mut BattleContext<'_>, target: BattlerId) {
        let Some(battler) = ctx.battler(target) else {
            return;
        };
        let result = battler.result().clone();
        if !result.used {
            return;
        }
        if result.critical {
            ctx.log.push(LogCommand::Critical { target });
        }
        match result.outcome() {
            HitOutcome::Missed => {
                if result.physical {
                    ctx.log.push(LogCommand::Miss { target });
                    ctx.audio.play(SoundCue::Miss);
                } else {
                    ctx.log.push(LogCommand::Failure { target });
                }
            }
            HitOutcome::Evaded => {
                ctx.log.push(LogCommand::Evasion {
                    target,
                    magical: !result.physical,
                });
                ctx.audio.play(if result.physical {
                    SoundCue::Evasion
                } else {
                    SoundCue::MagicEvasion
                });
            }
            HitOutcome::Hit | HitOutcome::Critical => self.display_damage(ctx, target, &result),
            HitOutcome::Unused => {}
        }
        self.display_affected_status(ctx, target, &result);
        if result.is_hit() && !result.success {
            ctx.log.push(LogCommand::Failure { target });
        }
    }

    fn display_damage(&self, ctx: &mut BattleContext<'_>, target: BattlerId, result: &ActionResult) {
        let env = ctx.env;
        let alive = ctx.battler(target).is_some_and(|b| b.is_alive(env));
        if result.hp_affected {
            if result.hp_damage > 0 && !result.drain {
                ctx.audio.play(match target.side {
                    Side::Party => SoundCue::ActorDamage,
                    Side::Troop => SoundCue::EnemyDamage,
                });
            }
            if result.hp_damage < 0 {
                ctx.audio.play(SoundCue::Recovery);
            }
            ctx.log.push(LogCommand::HpDamage {
                target,
                value: result.hp_damage,
                drain: result.drain,
            });
        }
        if alive && result.mp_damage != 0 {
            if result.mp_damage < 0 {
                ctx.audio.play(SoundCue::Recovery);
            }
            ctx.log.push(LogCommand::MpDamage {
                target,
                value: result.mp_damage,
                drain: result.drain,
            });
        }
        if alive && result.tp_damage != 0 {
            if result.tp_damage < 0 {
                ctx.audio.play(SoundCue::Recovery);
            }
            ctx.log.push(LogCommand::TpDamage {
                target,
                value: result.tp_damage,
            });
        }
    }

    fn display_affected_status(&self, ctx: &mut BattleContext<'_>, target: BattlerId, result: &ActionResult) {
        if !result.is_status_affected() {
            return;
        }
        let env = ctx.env;
        for &state in &result.added_states {
            if state == env.death_state_id() {
                self.display_collapse(ctx, target);
            }
            ctx.log.push(LogCommand::StateAdded { target, state });
        }
        for &state in &result.removed_states {
            ctx.log.push(LogCommand::StateRemoved { target, state });
        }
        for &param in &result.added_buffs {
            ctx.log.push(LogCommand::BuffAdded { target, param });
        }
        for &param in &result.added_debuffs {
            ctx.log.push(LogCommand::DebuffAdded { target, param });
        }
        for &param in &result.removed_buffs {
            ctx.log.push(LogCommand::BuffRemoved { target, param });
        }
    }

    fn display_collapse(&self, ctx: &mut BattleContext<'_>, battler: BattlerId) {
        let env = ctx.env;
        let cue = match battler.side {
            Side::Party => Some(SoundCue::ActorCollapse),
            Side::Troop => match ctx.battler(battler).map(|b| b.collapse_kind(env)) {
                Some(CollapseKind::Normal) => Some(SoundCue::EnemyCollapse),
                Some(CollapseKind::Boss) => Some(SoundCue::BossCollapse),
                _ => None,
            },
        };
        ctx.log.push(LogCommand::Collapse { battler });
        if let Some(cue) = cue {
            ctx.audio.play(cue);
        }
    }

    /// Status changes a battler picked up outside an action (turn end,
    /// timeouts), its persistent state message, and regeneration.
    pub(super) fn display_battler_status(&self, ctx: &mut BattleContext<'_>, id: BattlerId, current: bool) {
        let env = ctx.env;
        let Some(battler) = ctx.battler(id) else {
            return;
        };
        let result = battler.result().clone();
        let state_message = battler.most_important_state_message(env).map(|(state, _)| state);

        self.display_affected_status(ctx, id, &result);
        if current && let Some(state) = state_message {
            ctx.log.push(LogCommand::StatusCheck {
                battler: id,
                state: Some(state),
            });
        }
        if result.hp_affected && result.hp_damage != 0 {
            ctx.log.push(LogCommand::HpDamage {
                target: id,
                value: result.hp_damage,
                drain: false,
            });
        }
    }
}

/// Resolves `item` from `user` against `target`; `drain_to` receives any
/// drained hp or mp.
fn resolve(ctx: &mut BattleContext<'_>, user: BattlerId, item: ItemRef, target: BattlerId, drain_to: BattlerId) {
    let env = ctx.env;
    let Some(user_battler) = ctx.battler_mut(user) else {
        return;
    };
    user_battler.clear_result();
    let snapshot = CombatSnapshot::capture(env, user_battler, user);
    let Some(target_battler) = member_mut(ctx.party, ctx.troop, target) else {
        return;
    };
    let outcome = apply(env, ctx.rng, &snapshot, item, target_battler);
    if let Some(receiver) = ctx.battler_mut(drain_to) {
        outcome.settle_drain(env, receiver);
    }
    if let Some(user_battler) = ctx.battler_mut(user) {
        outcome.settle_user(env, user_battler);
    }
}
