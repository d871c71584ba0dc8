//! Combatants.
//!
//! [`Battler`] is one concrete struct shared by actors and enemies. It owns
//! the resource model (vitals, states, buffs), the action queue and the time
//! bar. Variant-specific data lives in [`BattlerKind`].
//!
//! Behaviour is split by concern:
//! - [`resources`]: hp/mp/tp, refresh, regeneration
//! - [`states`]: status effects and restrictions
//! - [`buffs`]: buff/debuff application
//! - [`params`]: the parameter pipeline and trait queries
//! - [`queue`]: pending actions and command input cursor
//! - [`time_bar`]: the charge/cast/idle clock
//! - [`usable`]: skill and item usability
//! - [`actor`] / [`enemy`]: variant-specific rules
pub mod actor;
pub mod buffs;
pub mod enemy;
pub mod params;
pub mod queue;
pub mod resources;
pub mod states;
pub mod time_bar;
pub mod usable;

use std::collections::BTreeMap;

use arrayvec::ArrayVec;

pub use actor::{ActorData, LevelChange, equip_type};
pub use enemy::{EnemyData, EnemyTurnContext};
pub use queue::ForceTarget;
pub use time_bar::{TimeBar, TimeBarScale, TimeBarState};
pub use usable::UsageContext;

use crate::action::{Action, ActionResult};
use crate::config::BattleConfig;
use crate::env::{BattleEnv, StateId};
use crate::stats::{BuffTable, Param};

/// Which unit a battler belongs to.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    Party,
    Troop,
}

impl Side {
    pub const fn opposite(self) -> Self {
        match self {
            Self::Party => Self::Troop,
            Self::Troop => Self::Party,
        }
    }
}

/// Stable handle to a battler: its side plus its index in that unit's storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattlerId {
    pub side: Side,
    pub index: usize,
}

impl BattlerId {
    pub const fn party(index: usize) -> Self {
        Self {
            side: Side::Party,
            index,
        }
    }

    pub const fn troop(index: usize) -> Self {
        Self {
            side: Side::Troop,
            index,
        }
    }
}

/// Discrete command state shown to the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ActionState {
    #[default]
    Undecided,
    Inputting,
    Waiting,
    Acting,
    Done,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BattlerKind {
    Actor(ActorData),
    Enemy(EnemyData),
}

pub type ActionQueue = ArrayVec<Action, { BattleConfig::MAX_ACTIONS }>;

/// A combatant: resource model, action queue and time bar.
#[derive(Clone, Debug, PartialEq)]
pub struct Battler {
    pub(crate) hp: i32,
    pub(crate) mp: i32,
    pub(crate) tp: i32,
    pub(crate) hidden: bool,
    pub(crate) param_plus: [i32; Param::COUNT],
    /// Sorted by descending priority, ties by ascending id.
    pub(crate) states: Vec<StateId>,
    pub(crate) state_turns: BTreeMap<StateId, i32>,
    pub(crate) buffs: BuffTable,
    pub(crate) actions: ActionQueue,
    pub(crate) action_input_index: usize,
    pub(crate) speed: i32,
    pub(crate) action_state: ActionState,
    pub(crate) last_target_index: Option<usize>,
    pub(crate) result: ActionResult,
    pub(crate) time_bar: TimeBar,
    pub(crate) kind: BattlerKind,
}

impl Battler {
    pub(crate) fn with_kind(kind: BattlerKind) -> Self {
        Self {
            hp: 0,
            mp: 0,
            tp: 0,
            hidden: false,
            param_plus: [0; Param::COUNT],
            states: Vec::new(),
            state_turns: BTreeMap::new(),
            buffs: BuffTable::new(),
            actions: ActionQueue::new(),
            action_input_index: 0,
            speed: 0,
            action_state: ActionState::Undecided,
            last_target_index: None,
            result: ActionResult::default(),
            time_bar: TimeBar::default(),
            kind,
        }
    }

    pub fn kind(&self) -> &BattlerKind {
        &self.kind
    }

    pub fn is_actor(&self) -> bool {
        matches!(self.kind, BattlerKind::Actor(_))
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, BattlerKind::Enemy(_))
    }

    pub fn as_actor(&self) -> Option<&ActorData> {
        match &self.kind {
            BattlerKind::Actor(data) => Some(data),
            BattlerKind::Enemy(_) => None,
        }
    }

    pub(crate) fn as_actor_mut(&mut self) -> Option<&mut ActorData> {
        match &mut self.kind {
            BattlerKind::Actor(data) => Some(data),
            BattlerKind::Enemy(_) => None,
        }
    }

    pub fn as_enemy(&self) -> Option<&EnemyData> {
        match &self.kind {
            BattlerKind::Enemy(data) => Some(data),
            BattlerKind::Actor(_) => None,
        }
    }

    /// Display name. Enemies sharing a name get their letter appended.
    pub fn name(&self, env: BattleEnv<'_>) -> String {
        match &self.kind {
            BattlerKind::Actor(data) => data.name.clone(),
            BattlerKind::Enemy(data) => data.name(env),
        }
    }

    /// Level used by formulas. Enemies count as level 1.
    pub fn level(&self) -> u32 {
        match &self.kind {
            BattlerKind::Actor(data) => data.level,
            BattlerKind::Enemy(_) => 1,
        }
    }

    pub fn result(&self) -> &ActionResult {
        &self.result
    }

    pub fn result_mut(&mut self) -> &mut ActionResult {
        &mut self.result
    }

    pub fn clear_result(&mut self) {
        self.result.clear();
    }

    pub fn time_bar(&self) -> &TimeBar {
        &self.time_bar
    }

    pub fn last_target_index(&self) -> Option<usize> {
        self.last_target_index
    }

    pub fn set_last_target_index(&mut self, index: Option<usize>) {
        self.last_target_index = index;
    }

    /// Clears per-battle leftovers when a battle begins.
    pub fn on_battle_start(
        &mut self,
        env: BattleEnv<'_>,
        rng: &mut dyn crate::env::RngOracle,
        scale: TimeBarScale,
        advantageous: bool,
    ) {
        self.action_state = ActionState::Undecided;
        self.init_time_bar_charge(env, rng, scale, advantageous);
        self.init_time_bar_turn();
        if !self.is_preserve_tp(env) {
            self.init_tp(env, rng);
        }
    }

    pub fn on_battle_end(&mut self, env: BattleEnv<'_>) {
        self.clear_result();
        self.remove_battle_states(env);
        self.remove_all_buffs(env);
        self.clear_actions();
        if !self.is_preserve_tp(env) {
            self.clear_tp(env);
        }
        self.appear();
    }

    /// End-of-turn upkeep: regeneration, counters, timed removals.
    pub fn on_turn_end(&mut self, env: BattleEnv<'_>) {
        self.clear_result();
        self.regenerate_all(env);
        self.update_state_turns();
        self.buffs.tick();
        self.remove_states_auto(env, crate::env::AutoRemoval::TurnEnd);
    }

    pub fn on_all_actions_end(&mut self, env: BattleEnv<'_>) {
        self.clear_result();
        self.remove_states_auto(env, crate::env::AutoRemoval::ActionEnd);
        self.remove_buffs_auto(env);
    }
}
