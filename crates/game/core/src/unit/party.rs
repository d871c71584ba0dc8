use super::{Inventory, UnitView};
use crate::battler::{Battler, BattlerId, Side};
use crate::env::{ActorId, BattleEnv, OracleError};
use crate::stats::PartyAbilities;

/// The player's actors, gold and inventory.
///
/// Actors persist across encounters; the first `max_battle_members`
/// appeared actors fight.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Party {
    pub(crate) members: Vec<Battler>,
    pub(crate) inventory: Inventory,
    pub(crate) gold: i64,
}

impl Party {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the party from actor ids, in order.
    pub fn from_actors(
        env: BattleEnv<'_>,
        actor_ids: impl IntoIterator<Item = ActorId>,
    ) -> Result<Self, OracleError> {
        let mut party = Self::new();
        for actor_id in actor_ids {
            party.add_actor(env, actor_id)?;
        }
        Ok(party)
    }

    /// Adds an actor unless it is already a member.
    pub fn add_actor(&mut self, env: BattleEnv<'_>, actor_id: ActorId) -> Result<(), OracleError> {
        if self.find_actor(actor_id).is_none() {
            self.members.push(Battler::new_actor(env, actor_id)?);
        }
        Ok(())
    }

    pub fn remove_actor(&mut self, actor_id: ActorId) -> Option<Battler> {
        let index = self.find_actor(actor_id)?;
        Some(self.members.remove(index))
    }

    pub fn find_actor(&self, actor_id: ActorId) -> Option<usize> {
        self.members
            .iter()
            .position(|m| m.as_actor().is_some_and(|data| data.actor_id == actor_id))
    }

    pub fn members(&self) -> &[Battler] {
        &self.members
    }

    pub fn member(&self, index: usize) -> Option<&Battler> {
        self.members.get(index)
    }

    pub fn member_mut(&mut self, index: usize) -> Option<&mut Battler> {
        self.members.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    // ===== battle members =====

    /// Storage indices of the fighting actors.
    pub fn battle_member_indices(&self, env: BattleEnv<'_>) -> Vec<usize> {
        self.members
            .iter()
            .enumerate()
            .take(env.config().max_battle_members)
            .filter(|(_, m)| m.is_appeared())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn battle_member_ids(&self, env: BattleEnv<'_>) -> Vec<BattlerId> {
        self.battle_member_indices(env)
            .into_iter()
            .map(BattlerId::party)
            .collect()
    }

    /// Reserve members: everyone outside the battle window.
    pub fn reserve_member_indices(&self, env: BattleEnv<'_>) -> Vec<usize> {
        let battle = self.battle_member_indices(env);
        (0..self.members.len())
            .filter(|index| !battle.contains(index))
            .collect()
    }

    pub fn view(&self, env: BattleEnv<'_>) -> UnitView<'_> {
        UnitView::new(
            Side::Party,
            self.battle_member_indices(env)
                .into_iter()
                .map(|index| (index, &self.members[index]))
                .collect(),
        )
    }

    /// Nobody left in the battle window: the party ran away.
    pub fn is_escaped(&self, env: BattleEnv<'_>) -> bool {
        !self.members.is_empty() && self.battle_member_indices(env).is_empty()
    }

    pub fn is_all_dead(&self, env: BattleEnv<'_>) -> bool {
        self.view(env).is_all_dead(env)
    }

    pub fn can_input(&self, env: BattleEnv<'_>) -> bool {
        self.battle_member_indices(env)
            .into_iter()
            .any(|index| self.members[index].can_input(env))
    }

    pub fn highest_level(&self) -> u32 {
        self.members.iter().map(Battler::level).max().unwrap_or(0)
    }

    pub fn agility(&self, env: BattleEnv<'_>) -> f64 {
        self.view(env).agility(env)
    }

    /// Abilities granted by any battle member.
    pub fn abilities(&self, env: BattleEnv<'_>) -> PartyAbilities {
        self.battle_member_indices(env)
            .into_iter()
            .fold(PartyAbilities::empty(), |acc, index| {
                acc | self.members[index].party_abilities(env)
            })
    }

    pub fn has_ability(&self, env: BattleEnv<'_>, ability: PartyAbilities) -> bool {
        self.abilities(env).contains(ability)
    }

    /// Dead battle members get back up with 1 hp.
    pub fn revive_battle_members(&mut self, env: BattleEnv<'_>) {
        for index in self.battle_member_indices(env) {
            let member = &mut self.members[index];
            if member.is_dead(env) {
                member.set_hp(env, 1);
            }
        }
    }

    // ===== gold and items =====

    pub fn gold(&self) -> i64 {
        self.gold
    }

    pub fn gain_gold(&mut self, env: BattleEnv<'_>, amount: i64) {
        self.gold = (self.gold + amount).clamp(0, env.config().max_gold);
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Split borrow of one member and the inventory.
    pub(crate) fn member_and_inventory(&mut self, index: usize) -> Option<(&mut Battler, &mut Inventory)> {
        let member = self.members.get_mut(index)?;
        Some((member, &mut self.inventory))
    }
}
