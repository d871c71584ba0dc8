//! Skill and item usability, costs and consumption.

use super::{Battler, BattlerKind};
use crate::env::{BattleEnv, InventoryKey, ItemRef, UsableItem, UsableKind};
use crate::unit::Inventory;

/// Battle-wide facts usability depends on besides the battler itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct UsageContext<'i> {
    /// The user's side inventory. Enemies have none.
    pub inventory: Option<&'i Inventory>,
    pub can_escape: bool,
}

impl<'i> UsageContext<'i> {
    pub fn new(inventory: Option<&'i Inventory>, can_escape: bool) -> Self {
        Self {
            inventory,
            can_escape,
        }
    }
}

impl Battler {
    pub fn can_use(&self, env: BattleEnv<'_>, item: ItemRef, usage: UsageContext<'_>) -> bool {
        let Some(def) = env.usable(item) else {
            return false;
        };
        match item {
            ItemRef::Skill(id) => self.meets_skill_conditions(env, id, def, usage),
            ItemRef::Item(id) => {
                self.meets_usable_item_conditions(env, def, usage)
                    && usage
                        .inventory
                        .is_some_and(|inventory| inventory.has_item(InventoryKey::Item(id)))
            }
        }
    }

    fn meets_usable_item_conditions(
        &self,
        env: BattleEnv<'_>,
        def: &UsableItem,
        usage: UsageContext<'_>,
    ) -> bool {
        if !self.can_move(env) || !def.occasion.usable_in_battle() {
            return false;
        }
        // Actors cannot run away through an item while escape is disallowed.
        !(self.is_actor() && !usage.can_escape && def.has_escape_effect())
    }

    fn meets_skill_conditions(
        &self,
        env: BattleEnv<'_>,
        skill_id: u32,
        def: &UsableItem,
        usage: UsageContext<'_>,
    ) -> bool {
        let traits = self.all_traits(env);
        self.meets_usable_item_conditions(env, def, usage)
            && self.is_skill_wtype_ok(env, def)
            && self.can_pay_skill_cost(env, def)
            && !traits.is_skill_sealed(skill_id)
            && !def
                .skill_type()
                .is_some_and(|stype| traits.is_skill_type_sealed(stype))
    }

    /// Actors need one of the required weapon types equipped. Enemies always pass.
    pub fn is_skill_wtype_ok(&self, env: BattleEnv<'_>, def: &UsableItem) -> bool {
        let UsableKind::Skill {
            required_weapon_types,
            ..
        } = def.kind
        else {
            return true;
        };
        let BattlerKind::Actor(data) = &self.kind else {
            return true;
        };
        let [first, second] = required_weapon_types;
        if first == 0 && second == 0 {
            return true;
        }
        data.weapon_types(env)
            .into_iter()
            .any(|wtype| (first > 0 && wtype == first) || (second > 0 && wtype == second))
    }

    // ===== costs =====

    /// `floor(mp_cost × mcr)`
    pub fn skill_mp_cost(&self, env: BattleEnv<'_>, def: &UsableItem) -> i32 {
        match def.kind {
            UsableKind::Skill { mp_cost, .. } => {
                let mcr = self.sparam(env, crate::stats::SpParam::MpCostRate);
                (f64::from(mp_cost) * mcr).floor() as i32
            }
            UsableKind::Item { .. } => 0,
        }
    }

    pub fn skill_tp_cost(&self, def: &UsableItem) -> i32 {
        match def.kind {
            UsableKind::Skill { tp_cost, .. } => tp_cost,
            UsableKind::Item { .. } => 0,
        }
    }

    pub fn can_pay_skill_cost(&self, env: BattleEnv<'_>, def: &UsableItem) -> bool {
        self.tp >= self.skill_tp_cost(def) && self.mp >= self.skill_mp_cost(env, def)
    }

    pub fn pay_skill_cost(&mut self, env: BattleEnv<'_>, def: &UsableItem) {
        self.mp -= self.skill_mp_cost(env, def);
        self.tp -= self.skill_tp_cost(def);
    }

    /// Pays the skill cost, or consumes a consumable item from `inventory`.
    pub fn use_item(&mut self, env: BattleEnv<'_>, item: ItemRef, inventory: Option<&mut Inventory>) {
        let Some(def) = env.usable(item) else {
            return;
        };
        match (item, &def.kind) {
            (ItemRef::Skill(id), _) => {
                self.pay_skill_cost(env, def);
                if let Some(actor) = self.as_actor_mut() {
                    actor.last_battle_skill = Some(id);
                }
            }
            (ItemRef::Item(id), UsableKind::Item { consumable: true }) => {
                if let Some(inventory) = inventory {
                    inventory.lose_item(InventoryKey::Item(id), 1);
                }
            }
            (ItemRef::Item(_), _) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battler::test_support;
    use crate::config::BattleConfig;
    use crate::env::{ItemEffect, Scope};
    use crate::stats::{BattlerTrait, SpParam};

    #[test]
    fn mp_cost_scales_with_rate_and_gates_use() {
        let db = test_support::database().with_actor(
            4,
            crate::env::ActorDef {
                name: "Frugal".into(),
                class_id: 1,
                initial_level: 1,
                max_level: 99,
                traits: vec![BattlerTrait::SpParam {
                    param: SpParam::MpCostRate,
                    rate: 0.5,
                }],
                ..Default::default()
            },
        );
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut frugal = test_support::actor(env, 4);
        let fire = env.skill(10).unwrap();
        assert_eq!(frugal.skill_mp_cost(env, fire), 2);

        frugal.set_mp(env, 1);
        assert!(!frugal.can_use(env, ItemRef::Skill(10), UsageContext::default()));
        frugal.set_mp(env, 2);
        assert!(frugal.can_use(env, ItemRef::Skill(10), UsageContext::default()));

        frugal.use_item(env, ItemRef::Skill(10), None);
        assert_eq!(frugal.mp(), 0);
        assert_eq!(frugal.as_actor().unwrap().last_battle_skill, Some(10));
    }

    #[test]
    fn sealed_skill_type_blocks_use() {
        let db = test_support::database().with_actor(
            6,
            crate::env::ActorDef {
                name: "Silenced".into(),
                class_id: 1,
                initial_level: 1,
                max_level: 99,
                traits: vec![BattlerTrait::SealSkillType(1)],
                ..Default::default()
            },
        );
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let silenced = test_support::actor(env, 6);
        assert!(!silenced.can_use(env, ItemRef::Skill(10), UsageContext::default()));
        assert!(silenced.can_use(env, ItemRef::Skill(1), UsageContext::default()));
    }

    #[test]
    fn items_need_inventory_and_escape_permission() {
        let db = test_support::database()
            .with_item(
                1,
                UsableItem {
                    name: "Potion".into(),
                    kind: UsableKind::Item { consumable: true },
                    scope: Scope::OneAlly,
                    effects: vec![ItemEffect::RecoverHp {
                        rate: 0.0,
                        flat: 500.0,
                    }],
                    ..Default::default()
                },
            )
            .with_item(
                2,
                UsableItem {
                    name: "Smoke".into(),
                    kind: UsableKind::Item { consumable: true },
                    scope: Scope::User,
                    effects: vec![ItemEffect::Escape],
                    ..Default::default()
                },
            );
        let config = BattleConfig::default();
        let env = BattleEnv::new(&db, &config);
        let mut reid = test_support::actor(env, 1);
        let mut inventory = Inventory::new();
        assert!(!reid.can_use(env, ItemRef::Item(1), UsageContext::new(Some(&inventory), true)));

        inventory.gain_item(InventoryKey::Item(1), 1, 99);
        inventory.gain_item(InventoryKey::Item(2), 1, 99);
        assert!(reid.can_use(env, ItemRef::Item(1), UsageContext::new(Some(&inventory), true)));
        assert!(reid.can_use(env, ItemRef::Item(2), UsageContext::new(Some(&inventory), true)));
        assert!(!reid.can_use(env, ItemRef::Item(2), UsageContext::new(Some(&inventory), false)));

        reid.use_item(env, ItemRef::Item(1), Some(&mut inventory));
        assert_eq!(inventory.num_items(InventoryKey::Item(1)), 0);
    }
}
