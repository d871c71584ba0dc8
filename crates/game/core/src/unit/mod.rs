//! Party and troop containers and the read-only unit view used for targeting.
mod inventory;
mod party;
mod troop;

pub use inventory::Inventory;
pub use party::Party;
pub use troop::Troop;

use crate::battler::{Battler, BattlerId, Side};
use crate::env::{BattleEnv, RngOracle};
use crate::stats::SpParam;

/// Ordered members of one side as seen by targeting.
///
/// Positions in the view are what actions store as target indices; ids map
/// back to unit storage.
#[derive(Clone, Debug)]
pub struct UnitView<'u> {
    side: Side,
    members: Vec<(usize, &'u Battler)>,
}

impl<'u> UnitView<'u> {
    pub fn new(side: Side, members: Vec<(usize, &'u Battler)>) -> Self {
        Self { side, members }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn id(&self, index: usize) -> BattlerId {
        BattlerId {
            side: self.side,
            index,
        }
    }

    pub fn ids(&self) -> Vec<BattlerId> {
        self.members.iter().map(|(index, _)| self.id(*index)).collect()
    }

    pub fn get(&self, position: usize) -> Option<(BattlerId, &'u Battler)> {
        self.members
            .get(position)
            .map(|(index, battler)| (self.id(*index), *battler))
    }

    pub fn battler(&self, id: BattlerId) -> Option<&'u Battler> {
        self.members
            .iter()
            .find(|(index, _)| self.id(*index) == id)
            .map(|(_, battler)| *battler)
    }

    /// Position of `id` within the view.
    pub fn position(&self, id: BattlerId) -> Option<usize> {
        if id.side != self.side {
            return None;
        }
        self.members.iter().position(|(index, _)| *index == id.index)
    }

    pub fn alive(&self, env: BattleEnv<'_>) -> Vec<BattlerId> {
        self.members
            .iter()
            .filter(|(_, battler)| battler.is_alive(env))
            .map(|(index, _)| self.id(*index))
            .collect()
    }

    pub fn dead(&self, env: BattleEnv<'_>) -> Vec<BattlerId> {
        self.members
            .iter()
            .filter(|(_, battler)| battler.is_dead(env))
            .map(|(index, _)| self.id(*index))
            .collect()
    }

    pub fn is_all_dead(&self, env: BattleEnv<'_>) -> bool {
        self.alive(env).is_empty()
    }

    /// `max(1, average agility)`
    pub fn agility(&self, env: BattleEnv<'_>) -> f64 {
        let sum: i32 = self.members.iter().map(|(_, b)| b.agi(env)).sum();
        (f64::from(sum) / self.members.len().max(1) as f64).max(1.0)
    }

    pub fn tgr_sum(&self, env: BattleEnv<'_>) -> f64 {
        self.members
            .iter()
            .filter(|(_, b)| b.is_alive(env))
            .map(|(_, b)| b.sparam(env, SpParam::TargetRate))
            .sum()
    }

    /// Alive member weighted by target rate.
    pub fn random_target(&self, env: BattleEnv<'_>, rng: &mut dyn RngOracle) -> Option<BattlerId> {
        let mut roll = rng.next_f64() * self.tgr_sum(env);
        let mut target = None;
        for (index, battler) in &self.members {
            if !battler.is_alive(env) {
                continue;
            }
            roll -= battler.sparam(env, SpParam::TargetRate);
            if roll <= 0.0 && target.is_none() {
                target = Some(self.id(*index));
            }
        }
        target
    }

    pub fn random_dead_target(&self, env: BattleEnv<'_>, rng: &mut dyn RngOracle) -> Option<BattlerId> {
        let dead = self.dead(env);
        if dead.is_empty() {
            return None;
        }
        let pick = rng.random_int(dead.len() as i32) as usize;
        dead.get(pick).copied()
    }

    /// Member at `position` if alive, otherwise the first alive member.
    pub fn smooth_target(&self, env: BattleEnv<'_>, position: usize) -> Option<BattlerId> {
        match self.get(position) {
            Some((id, battler)) if battler.is_alive(env) => Some(id),
            _ => self.alive(env).first().copied(),
        }
    }

    /// Member at `position` if dead, otherwise the first dead member.
    pub fn smooth_dead_target(&self, env: BattleEnv<'_>, position: usize) -> Option<BattlerId> {
        match self.get(position) {
            Some((id, battler)) if battler.is_dead(env) => Some(id),
            _ => self.dead(env).first().copied(),
        }
    }

    /// The first substitute of the unit, unless that is `target` itself.
    pub fn substitute_for(&self, env: BattleEnv<'_>, target: BattlerId) -> Option<BattlerId> {
        self.members
            .iter()
            .find(|(_, battler)| battler.is_substitute(env))
            .map(|(index, _)| self.id(*index))
            .filter(|id| *id != target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battler::test_support;
    use crate::config::BattleConfig;
    use crate::env::ScriptedRng;
    use crate::stats::BattlerTrait;

    #[test]
    fn random_target_walks_target_rates() {
        let db = test_support::database().with_actor(
            9,
            crate::env::ActorDef {
                name: "Taunt".into(),
                class_id: 1,
                initial_level: 1,
                max_level: 99,
                traits: vec![BattlerTrait::SpParam {
                    param: SpParam::TargetRate,
                    rate: 3.0,
                }],
                ..Default::default()
            },
        );
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let a = test_support::actor(env, 1);
        let b = test_support::actor(env, 9);
        let view = UnitView::new(Side::Party, vec![(0, &a), (1, &b)]);
        assert_eq!(view.tgr_sum(env), 4.0);

        // 0.2 × 4 = 0.8 → first member
        let mut rng = ScriptedRng::constant(0.2);
        assert_eq!(view.random_target(env, &mut rng), Some(BattlerId::party(0)));
        // 0.5 × 4 = 2.0 → second member
        let mut rng = ScriptedRng::constant(0.5);
        assert_eq!(view.random_target(env, &mut rng), Some(BattlerId::party(1)));
    }

    #[test]
    fn smooth_target_skips_the_dead() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut a = test_support::actor(env, 1);
        let b = test_support::actor(env, 2);
        a.set_hp(env, 0);
        let view = UnitView::new(Side::Party, vec![(0, &a), (1, &b)]);
        assert_eq!(view.smooth_target(env, 0), Some(BattlerId::party(1)));
        assert_eq!(view.smooth_target(env, 7), Some(BattlerId::party(1)));
        assert_eq!(view.smooth_dead_target(env, 1), Some(BattlerId::party(0)));
        assert!(!view.is_all_dead(env));
    }

    #[test]
    fn agility_is_average_floored_at_one() {
        let db = test_support::database();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let a = test_support::actor(env, 1);
        let slime = test_support::enemy(env, 1);
        let view = UnitView::new(Side::Party, vec![(0, &a), (1, &slime)]);
        assert_eq!(view.agility(env), (25.0 + 16.0) / 2.0);
        let empty = UnitView::new(Side::Troop, vec![]);
        assert_eq!(empty.agility(env), 1.0);
    }
}
