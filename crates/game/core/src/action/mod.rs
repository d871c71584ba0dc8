//! Actions queued by battlers and their resolution against targets.
//!
//! - [`Action`] is what sits in a battler's queue: the skill or item to use,
//!   the chosen target and whether it was forced.
//! - [`targets`] expands an action's scope into concrete battlers.
//! - [`apply`] resolves hit, damage and effects against one target.
//! - [`evaluate`] scores candidate actions for auto battle.
pub mod apply;
pub mod evaluate;
pub mod formula;
pub mod result;
pub mod snapshot;
pub mod targets;

pub use apply::{ApplyOutcome, apply};
pub use evaluate::{evaluate_action, make_auto_battle_actions};
pub use formula::{Formula, Operand};
pub use result::{ActionResult, HitOutcome};
pub use snapshot::CombatSnapshot;
pub use targets::make_targets;

use crate::battler::{Battler, UsageContext};
use crate::env::{BattleEnv, ItemRef, RngOracle, UsableItem};

/// One queued action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub item: Option<ItemRef>,
    /// Position within the target unit. `None` picks a random target.
    pub target_index: Option<usize>,
    /// Forced actions skip usability checks and confusion.
    pub forcing: bool,
}

impl Action {
    pub const fn new() -> Self {
        Self {
            item: None,
            target_index: None,
            forcing: false,
        }
    }

    pub const fn skill(skill_id: u32) -> Self {
        Self {
            item: Some(ItemRef::Skill(skill_id)),
            target_index: None,
            forcing: false,
        }
    }

    pub const fn item(item_id: u32) -> Self {
        Self {
            item: Some(ItemRef::Item(item_id)),
            target_index: None,
            forcing: false,
        }
    }

    pub const fn with_target(mut self, index: usize) -> Self {
        self.target_index = Some(index);
        self
    }

    pub const fn forced(mut self) -> Self {
        self.forcing = true;
        self
    }

    pub fn clear(&mut self) {
        self.item = None;
        self.target_index = None;
    }

    pub fn set_skill(&mut self, skill_id: u32) {
        self.item = Some(ItemRef::Skill(skill_id));
    }

    pub fn set_item(&mut self, item_id: u32) {
        self.item = Some(ItemRef::Item(item_id));
    }

    pub fn set_attack(&mut self, env: BattleEnv<'_>, subject: &Battler) {
        self.set_skill(subject.attack_skill_id(env));
    }

    pub fn set_guard(&mut self, env: BattleEnv<'_>) {
        self.set_skill(env.config().guard_skill_id);
    }

    pub fn set_target(&mut self, index: usize) {
        self.target_index = Some(index);
    }

    pub fn definition<'a>(&self, env: BattleEnv<'a>) -> Option<&'a UsableItem> {
        self.item.and_then(|item| env.usable(item))
    }

    pub fn is_attack(&self, env: BattleEnv<'_>, subject: &Battler) -> bool {
        self.item == Some(ItemRef::Skill(subject.attack_skill_id(env)))
    }

    pub fn is_guard(&self, env: BattleEnv<'_>) -> bool {
        self.item == Some(ItemRef::Skill(env.config().guard_skill_id))
    }

    /// Replaces the action with a plain attack when the subject is confused.
    pub fn prepare(&mut self, env: BattleEnv<'_>, subject: &Battler) {
        if subject.is_confused(env) && !self.forcing {
            self.set_attack(env, subject);
        }
    }

    /// Re-checked at execution time; inventory may have changed since queuing.
    pub fn is_valid(&self, env: BattleEnv<'_>, subject: &Battler, usage: UsageContext<'_>) -> bool {
        match self.item {
            Some(item) if self.forcing => env.usable(item).is_some(),
            Some(item) => subject.can_use(env, item, usage),
            None => false,
        }
    }

    /// `agi + random_int(floor(5 + agi / 4)) + item.speed (+ attack speed)`
    pub fn speed(&self, env: BattleEnv<'_>, rng: &mut dyn RngOracle, subject: &Battler) -> i32 {
        let agi = subject.agi(env);
        let mut speed = agi + rng.random_int((5.0 + f64::from(agi) / 4.0).floor() as i32);
        if let Some(def) = self.definition(env) {
            speed += def.speed;
        }
        if self.is_attack(env, subject) {
            speed += subject.attack_speed(env);
        }
        speed
    }

    pub fn num_repeats(&self, env: BattleEnv<'_>, subject: &Battler) -> usize {
        let Some(def) = self.definition(env) else {
            return 0;
        };
        let mut repeats = f64::from(def.repeats);
        if self.is_attack(env, subject) {
            repeats += subject.attack_times_add(env);
        }
        repeats.floor().max(0.0) as usize
    }
}
