//! Asynchronous abstraction for sourcing party commands.
//!
//! Runtime users plug in [`CommandProvider`] implementations so a battle can
//! run with human input, scripted fixtures, or automatic play. Enemies and
//! auto-battle actors never reach a provider; the scheduler fills their
//! queues itself.
use async_trait::async_trait;
use battle_core::env::{ActorId, ItemId, SkillId};
use battle_core::{Action, BattlerId};

use super::errors::Result;

/// State of the party command window ("fight" or "escape").
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartyCommandRequest {
    pub can_escape: bool,
    pub escape_ratio: f64,
    pub turn: i32,
}

/// Choice made in the party command window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartyCommand {
    Fight,
    Escape,
}

/// Everything needed to fill one action slot of one actor.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorCommandRequest {
    pub actor: BattlerId,
    pub actor_id: ActorId,
    pub name: String,
    /// Set when the actor can use its attack skill right now.
    pub attack_skill: Option<SkillId>,
    pub guard_skill: SkillId,
    pub usable_skills: Vec<SkillId>,
    pub usable_items: Vec<ItemId>,
    /// Positions of living enemies, as used by [`Action::target_index`].
    pub enemy_targets: Vec<usize>,
}

/// Trait for providing party commands.
///
/// Different implementations can handle:
/// - Player input (from UI/CLI)
/// - Scripted/replayed commands
/// - Testing fixtures
#[async_trait]
pub trait CommandProvider: Send + Sync {
    /// Called while the party command window is open.
    async fn party_command(&self, _request: &PartyCommandRequest) -> Result<PartyCommand> {
        Ok(PartyCommand::Fight)
    }

    /// Provide the action for the actor's current input slot.
    async fn actor_command(&self, request: &ActorCommandRequest) -> Result<Action>;
}

/// Always fights: attacks when possible, otherwise uses the first usable
/// skill, otherwise guards. Targets are left to chance.
pub struct AutoCommandProvider;

#[async_trait]
impl CommandProvider for AutoCommandProvider {
    async fn actor_command(&self, request: &ActorCommandRequest) -> Result<Action> {
        let skill = request
            .attack_skill
            .or_else(|| request.usable_skills.first().copied())
            .unwrap_or(request.guard_skill);
        Ok(Action::skill(skill))
    }
}
