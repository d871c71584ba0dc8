//! Enemy variant: naming, rewards and the weighted action pattern.

use super::{ActionState, Battler, BattlerKind, UsageContext};
use crate::env::{
    ActionCondition, BattleEnv, EnemyAction, EnemyDef, EnemyId, InventoryKey, ItemRef, OracleError,
    RngOracle,
};

/// Enemy-only data carried by [`BattlerKind::Enemy`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyData {
    pub enemy_id: EnemyId,
    /// Disambiguating letter, empty until the troop assigns one.
    pub letter: String,
    pub plural: bool,
}

impl EnemyData {
    pub fn def<'a>(&self, env: BattleEnv<'a>) -> Option<&'a EnemyDef> {
        env.db().enemy(self.enemy_id)
    }

    pub fn original_name(&self, env: BattleEnv<'_>) -> String {
        self.def(env).map(|def| def.name.clone()).unwrap_or_default()
    }

    pub fn name(&self, env: BattleEnv<'_>) -> String {
        let original = self.original_name(env);
        if self.plural {
            format!("{original}{}", self.letter)
        } else {
            original
        }
    }
}

/// Facts the action pattern conditions are tested against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnemyTurnContext {
    /// Turn number as seen by this enemy: its own time-bar turn count, or
    /// the troop turn plus one in strict turns.
    pub turn_count: i32,
    pub party_highest_level: u32,
}

impl Battler {
    pub fn new_enemy(env: BattleEnv<'_>, enemy_id: EnemyId) -> Result<Self, OracleError> {
        env.db().require_enemy(enemy_id)?;
        let mut enemy = Battler::with_kind(BattlerKind::Enemy(EnemyData {
            enemy_id,
            ..Default::default()
        }));
        enemy.recover_all(env);
        Ok(enemy)
    }

    pub fn enemy_def<'a>(&self, env: BattleEnv<'a>) -> Option<&'a EnemyDef> {
        self.as_enemy().and_then(|data| data.def(env))
    }

    pub fn original_name(&self, env: BattleEnv<'_>) -> String {
        match &self.kind {
            BattlerKind::Enemy(data) => data.original_name(env),
            BattlerKind::Actor(data) => data.name.clone(),
        }
    }

    pub(crate) fn set_letter(&mut self, letter: String) {
        if let BattlerKind::Enemy(data) = &mut self.kind {
            data.letter = letter;
        }
    }

    pub(crate) fn set_plural(&mut self, plural: bool) {
        if let BattlerKind::Enemy(data) = &mut self.kind {
            data.plural = plural;
        }
    }

    // ===== rewards =====

    pub fn reward_exp(&self, env: BattleEnv<'_>) -> i64 {
        self.enemy_def(env).map_or(0, |def| def.exp)
    }

    pub fn reward_gold(&self, env: BattleEnv<'_>) -> i64 {
        self.enemy_def(env).map_or(0, |def| def.gold)
    }

    /// Rolls each drop: `random() × denominator < rate`, rate 2 when doubled.
    pub fn make_drop_items(
        &self,
        env: BattleEnv<'_>,
        rng: &mut dyn RngOracle,
        drop_double: bool,
    ) -> Vec<InventoryKey> {
        let Some(def) = self.enemy_def(env) else {
            return Vec::new();
        };
        let rate = if drop_double { 2.0 } else { 1.0 };
        def.drops
            .iter()
            .filter(|drop| rng.next_f64() * f64::from(drop.denominator) < rate)
            .map(|drop| drop.item)
            .collect()
    }

    /// Turns into another enemy. Returns `true` when the caller should remake
    /// the queued actions.
    pub fn transform(&mut self, env: BattleEnv<'_>, enemy_id: EnemyId) -> bool {
        let old_name = self.original_name(env);
        let BattlerKind::Enemy(data) = &mut self.kind else {
            return false;
        };
        data.enemy_id = enemy_id;
        if data.original_name(env) != old_name {
            data.letter.clear();
            data.plural = false;
        }
        self.refresh(env);
        !self.actions.is_empty()
    }

    // ===== action pattern =====

    fn meets_condition(
        &self,
        env: BattleEnv<'_>,
        action: &EnemyAction,
        turn: EnemyTurnContext,
    ) -> bool {
        match action.condition {
            ActionCondition::Always => true,
            ActionCondition::Turn { a, b } => {
                let n = turn.turn_count;
                if b == 0 {
                    n == a
                } else {
                    n > 0 && n >= a && n % b == a % b
                }
            }
            ActionCondition::HpRate { min, max } => {
                let rate = self.hp_rate(env);
                rate >= min && rate <= max
            }
            ActionCondition::MpRate { min, max } => {
                let rate = self.mp_rate(env);
                rate >= min && rate <= max
            }
            ActionCondition::State(state) => self.is_state_affected(state),
            ActionCondition::PartyLevel(level) => turn.party_highest_level >= level,
        }
    }

    /// Candidate actions: conditions met and the skill usable right now.
    pub fn valid_enemy_actions(&self, env: BattleEnv<'_>, turn: EnemyTurnContext) -> Vec<EnemyAction> {
        let Some(def) = self.enemy_def(env) else {
            return Vec::new();
        };
        def.actions
            .iter()
            .filter(|action| {
                self.meets_condition(env, action, turn)
                    && self.can_use(env, ItemRef::Skill(action.skill_id), UsageContext::default())
            })
            .copied()
            .collect()
    }

    /// Fills every blank slot by weighted draw, then waits.
    pub fn select_enemy_actions(
        &mut self,
        env: BattleEnv<'_>,
        rng: &mut dyn RngOracle,
        turn: EnemyTurnContext,
    ) {
        if !self.actions.is_empty() {
            let list = self.valid_enemy_actions(env, turn);
            if !list.is_empty() {
                let rating_max = list.iter().map(|a| a.rating).max().unwrap_or(0);
                let rating_zero = rating_max - 3;
                let candidates: Vec<EnemyAction> = list
                    .into_iter()
                    .filter(|a| a.rating > rating_zero)
                    .collect();
                for slot in self.actions.iter_mut() {
                    match select_weighted(&candidates, rating_zero, rng) {
                        Some(action) => slot.set_skill(action.skill_id),
                        None => slot.clear(),
                    }
                }
            }
        }
        self.action_state = ActionState::Waiting;
    }
}

fn select_weighted(
    candidates: &[EnemyAction],
    rating_zero: i32,
    rng: &mut dyn RngOracle,
) -> Option<EnemyAction> {
    let sum: i32 = candidates.iter().map(|a| a.rating - rating_zero).sum();
    if sum <= 0 {
        return None;
    }
    let mut value = rng.random_int(sum);
    for action in candidates {
        value -= action.rating - rating_zero;
        if value < 0 {
            return Some(*action);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battler::test_support;
    use crate::config::BattleConfig;
    use crate::env::{DropItem, MemoryDatabase, ScriptedRng};

    fn db() -> MemoryDatabase {
        let mut db = test_support::database();
        let slime = db.enemies.get_mut(&1).unwrap();
        slime.params[1] = 50;
        slime.actions = vec![
            EnemyAction {
                skill_id: 1,
                rating: 5,
                condition: ActionCondition::Always,
            },
            EnemyAction {
                skill_id: 2,
                rating: 4,
                condition: ActionCondition::Always,
            },
            EnemyAction {
                skill_id: 10,
                rating: 9,
                condition: ActionCondition::Turn { a: 2, b: 3 },
            },
        ];
        slime.drops = vec![
            DropItem {
                item: InventoryKey::Item(1),
                denominator: 2,
            },
            DropItem {
                item: InventoryKey::Item(2),
                denominator: 4,
            },
        ];
        db
    }

    #[test]
    fn turn_condition_follows_a_plus_bx() {
        let db = db();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let slime = test_support::enemy(env, 1);
        let fire = db.enemies[&1].actions[2];
        let at = |n| EnemyTurnContext {
            turn_count: n,
            party_highest_level: 1,
        };
        assert!(!slime.meets_condition(env, &fire, at(1)));
        assert!(slime.meets_condition(env, &fire, at(2)));
        assert!(!slime.meets_condition(env, &fire, at(3)));
        assert!(slime.meets_condition(env, &fire, at(5)));
    }

    #[test]
    fn weighted_draw_drops_low_ratings() {
        let db = db();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut slime = test_support::enemy(env, 1);
        let turn = EnemyTurnContext {
            turn_count: 2,
            party_highest_level: 1,
        };
        // max rating 9 → zero 6: only fire (weight 3) survives
        let mut rng = ScriptedRng::constant(0.0);
        slime.make_actions(env, &mut rng);
        slime.select_enemy_actions(env, &mut rng, turn);
        assert_eq!(slime.current_action().and_then(|a| a.item), Some(ItemRef::Skill(10)));
        assert!(slime.is_waiting());
    }

    #[test]
    fn weighted_draw_walks_the_list() {
        let db = db();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut slime = test_support::enemy(env, 1);
        let turn = EnemyTurnContext {
            turn_count: 1,
            party_highest_level: 1,
        };
        // zero 2: weights attack 3, guard 2; random_int(5) = 3 → guard
        let mut rng = ScriptedRng::new([0.7], 0.0);
        slime.make_actions(env, &mut rng);
        slime.select_enemy_actions(env, &mut rng, turn);
        assert_eq!(slime.current_action().and_then(|a| a.item), Some(ItemRef::Skill(2)));
    }

    #[test]
    fn drops_roll_against_denominator() {
        let db = db();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let slime = test_support::enemy(env, 1);
        // 0.4 × 2 = 0.8 < 1, 0.4 × 4 = 1.6 ≥ 1
        let mut rng = ScriptedRng::constant(0.4);
        assert_eq!(slime.make_drop_items(env, &mut rng, false), vec![InventoryKey::Item(1)]);
        let mut rng = ScriptedRng::constant(0.4);
        assert_eq!(
            slime.make_drop_items(env, &mut rng, true),
            vec![InventoryKey::Item(1), InventoryKey::Item(2)]
        );
    }

    #[test]
    fn transform_resets_letter_when_name_changes() {
        let db = db();
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut slime = test_support::enemy(env, 1);
        slime.set_letter("A".into());
        slime.set_plural(true);
        assert_eq!(slime.name(env), "SlimeA");
        slime.transform(env, 2);
        assert_eq!(slime.name(env), "Bat");
        assert_eq!(slime.as_enemy().unwrap().letter, "");
    }
}
