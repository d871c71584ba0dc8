//! Battle scheduling.
//!
//! [`BattleManager`] is the phase machine that drives one battle. It owns the
//! execution cursor (current subject, action, remaining targets, action
//! order) and nothing else. Battle data is borrowed for the duration of one
//! call through [`BattleContext`].
//!
//! ```text
//! Init ─▶ Start ─▶ Input ─▶ Turn ⇄ Action ─▶ TurnEnd ─▶ Start …
//!                            └──────────────────────▶ BattleEnd
//! ```
//!
//! In time-bar mode `Start` goes straight to `Turn` and `TurnEnd` starts the
//! next turn at once; command input runs alongside the clocks.
//!
//! Behaviour is split across `impl BattleManager` blocks:
//! - `start`: setup, encounter rolls, battle start
//! - `input`: action making and command selection
//! - `turn`: turn order, subjects, forced actions
//! - `time_bar`: clock updates
//! - `action`: per-target resolution and narration
//! - `escape`
//! - `end`: victory, defeat, abort and rewards

mod action;
mod end;
mod escape;
mod input;
mod start;
mod time_bar;
mod turn;

#[cfg(test)]
mod tests;

use std::collections::VecDeque;

use crate::action::Action;
use crate::battler::{Battler, BattlerId, Side, UsageContext};
use crate::env::{AudioSink, BattleEnv, InventoryKey, PresentationSink, RngOracle};
use crate::unit::{Party, Troop, UnitView};

/// Everything one scheduler call may read or mutate.
pub struct BattleContext<'a> {
    pub env: BattleEnv<'a>,
    pub party: &'a mut Party,
    pub troop: &'a mut Troop,
    pub rng: &'a mut dyn RngOracle,
    pub log: &'a mut dyn PresentationSink,
    pub audio: &'a mut dyn AudioSink,
}

impl<'a> BattleContext<'a> {
    pub fn new(
        env: BattleEnv<'a>,
        party: &'a mut Party,
        troop: &'a mut Troop,
        rng: &'a mut dyn RngOracle,
        log: &'a mut dyn PresentationSink,
        audio: &'a mut dyn AudioSink,
    ) -> Self {
        Self {
            env,
            party,
            troop,
            rng,
            log,
            audio,
        }
    }

    pub fn battler(&self, id: BattlerId) -> Option<&Battler> {
        member(&*self.party, &*self.troop, id)
    }

    pub fn battler_mut(&mut self, id: BattlerId) -> Option<&mut Battler> {
        member_mut(self.party, self.troop, id)
    }

    /// Party battle members followed by every troop member.
    pub fn battle_member_ids(&self) -> Vec<BattlerId> {
        let mut ids = self.party.battle_member_ids(self.env);
        ids.extend(self.troop.member_ids());
        ids
    }

    /// Position of `id` within its own unit view, as used by target indices.
    pub fn view_position(&self, id: BattlerId) -> Option<usize> {
        match id.side {
            Side::Party => self.party.view(self.env).position(id),
            Side::Troop => self.troop.view().position(id),
        }
    }
}

pub(crate) fn member<'u>(party: &'u Party, troop: &'u Troop, id: BattlerId) -> Option<&'u Battler> {
    match id.side {
        Side::Party => party.member(id.index),
        Side::Troop => troop.member(id.index),
    }
}

pub(crate) fn member_mut<'u>(
    party: &'u mut Party,
    troop: &'u mut Troop,
    id: BattlerId,
) -> Option<&'u mut Battler> {
    match id.side {
        Side::Party => party.member_mut(id.index),
        Side::Troop => troop.member_mut(id.index),
    }
}

/// A battler together with what it may spend: actors see the party
/// inventory, enemies see none.
pub(crate) fn member_with_usage<'u>(
    party: &'u mut Party,
    troop: &'u mut Troop,
    id: BattlerId,
    can_escape: bool,
) -> Option<(&'u mut Battler, UsageContext<'u>)> {
    match id.side {
        Side::Party => {
            let (battler, inventory) = party.member_and_inventory(id.index)?;
            Some((battler, UsageContext::new(Some(&*inventory), can_escape)))
        }
        Side::Troop => Some((
            troop.member_mut(id.index)?,
            UsageContext::new(None, can_escape),
        )),
    }
}

/// `(friends, opponents)` as seen from `side`.
pub(crate) fn unit_views<'u>(
    env: BattleEnv<'_>,
    party: &'u Party,
    troop: &'u Troop,
    side: Side,
) -> (UnitView<'u>, UnitView<'u>) {
    match side {
        Side::Party => (party.view(env), troop.view()),
        Side::Troop => (troop.view(), party.view(env)),
    }
}

/// Scheduler phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    #[default]
    Init,
    Start,
    Input,
    Turn,
    Action,
    TurnEnd,
    Aborting,
    BattleEnd,
}

/// How a battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BattleOutcome {
    Win,
    Escape,
    Abort,
    Defeat,
}

/// Result of a party escape attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum EscapeOutcome {
    Escaped,
    Failed,
    /// The encounter does not allow escaping; nothing was rolled.
    Forbidden,
}

/// What a victory paid out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rewards {
    pub exp: i64,
    pub gold: i64,
    pub items: Vec<InventoryKey>,
}

/// Phase machine for one battle.
///
/// Drive it by calling [`update`](Self::update) once per tick. Command input
/// is fed back through [`select_next_command`](Self::select_next_command)
/// and friends whenever [`is_inputting`](Self::is_inputting) reports true.
#[derive(Clone, Debug, Default)]
pub struct BattleManager {
    phase: Phase,
    can_escape: bool,
    can_lose: bool,
    preemptive: bool,
    surprise: bool,
    escaped: bool,
    escape_ratio: f64,
    inputting: bool,
    needs_party_command: bool,
    /// Party storage index of the actor choosing commands.
    current_actor: Option<usize>,
    action_battlers: VecDeque<BattlerId>,
    forced_battler: Option<BattlerId>,
    subject: Option<BattlerId>,
    action: Option<Action>,
    targets: VecDeque<BattlerId>,
    outcome: Option<BattleOutcome>,
    rewards: Rewards,
    finished: bool,
}

impl BattleManager {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== queries =====

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn result(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    pub fn rewards(&self) -> &Rewards {
        &self.rewards
    }

    pub fn can_escape(&self) -> bool {
        self.can_escape
    }

    pub fn can_lose(&self) -> bool {
        self.can_lose
    }

    pub fn is_preemptive(&self) -> bool {
        self.preemptive
    }

    pub fn is_surprise(&self) -> bool {
        self.surprise
    }

    pub fn is_escaped(&self) -> bool {
        self.escaped
    }

    pub fn escape_ratio(&self) -> f64 {
        self.escape_ratio
    }

    pub fn subject(&self) -> Option<BattlerId> {
        self.subject
    }

    /// Battlers still waiting to act this turn, in order.
    pub fn action_battlers(&self) -> impl Iterator<Item = BattlerId> + '_ {
        self.action_battlers.iter().copied()
    }

    /// Battle-end cleanup has run; nothing further will happen.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_busy(&self, ctx: &BattleContext<'_>) -> bool {
        ctx.log.is_busy()
    }

    pub fn is_inputting(&self) -> bool {
        self.inputting
    }

    /// The actor currently choosing commands.
    pub fn actor(&self) -> Option<BattlerId> {
        self.current_actor.map(BattlerId::party)
    }

    pub fn inputting_action<'c>(&self, ctx: &'c BattleContext<'_>) -> Option<&'c Action> {
        ctx.party.member(self.current_actor?)?.input_action()
    }

    pub fn inputting_action_mut<'c>(&self, ctx: &'c mut BattleContext<'_>) -> Option<&'c mut Action> {
        ctx.party.member_mut(self.current_actor?)?.input_action_mut()
    }

    // ===== tick =====

    /// Advances the battle by one tick.
    ///
    /// Nothing moves while the presentation sink is busy. `time_active`
    /// gates the time-bar clocks; it is ignored in strict turns.
    pub fn update(&mut self, ctx: &mut BattleContext<'_>, time_active: bool) {
        if !self.is_busy(ctx) && !self.update_event(ctx) {
            self.update_phase(ctx, time_active);
        }
        if ctx.env.is_time_bar() {
            self.update_time_bar_input(ctx);
        }
    }

    fn update_phase(&mut self, ctx: &mut BattleContext<'_>, time_active: bool) {
        match self.phase {
            Phase::Start => self.update_start(ctx),
            Phase::Turn => self.update_turn(ctx, time_active),
            Phase::Action => self.update_action(ctx),
            Phase::TurnEnd => self.update_turn_end(ctx),
            Phase::BattleEnd => self.update_battle_end(ctx),
            Phase::Init | Phase::Input | Phase::Aborting => {}
        }
    }

    /// Forced actions and battle-end conditions preempt the phase update.
    fn update_event(&mut self, ctx: &mut BattleContext<'_>) -> bool {
        match self.phase {
            Phase::Start | Phase::Turn | Phase::TurnEnd => {
                if self.forced_battler.is_some() {
                    self.process_forced_action(ctx);
                    true
                } else {
                    self.check_battle_end(ctx)
                }
            }
            _ => self.check_abort(ctx),
        }
    }
}
