use std::collections::BTreeMap;

use super::battlers::{ActorDef, ActorId, ClassDef, ClassId, EnemyDef, EnemyId, TroopDef, TroopId};
use super::error::OracleError;
use super::items::{ArmorDef, ArmorId, ItemId, ItemRef, SkillId, UsableItem, WeaponDef, WeaponId};
use super::states::{StateDef, StateId};
use super::system::SystemDef;

/// Read-only lookup of every data table the battle rules consult.
pub trait DatabaseOracle {
    fn actor(&self, id: ActorId) -> Option<&ActorDef>;
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn skill(&self, id: SkillId) -> Option<&UsableItem>;
    fn item(&self, id: ItemId) -> Option<&UsableItem>;
    fn weapon(&self, id: WeaponId) -> Option<&WeaponDef>;
    fn armor(&self, id: ArmorId) -> Option<&ArmorDef>;
    fn state(&self, id: StateId) -> Option<&StateDef>;
    fn enemy(&self, id: EnemyId) -> Option<&EnemyDef>;
    fn troop(&self, id: TroopId) -> Option<&TroopDef>;
    fn system(&self) -> &SystemDef;

    fn usable(&self, item: ItemRef) -> Option<&UsableItem> {
        match item {
            ItemRef::Skill(id) => self.skill(id),
            ItemRef::Item(id) => self.item(id),
        }
    }

    // ===== required lookups, used before a battle starts =====

    fn require_actor(&self, id: ActorId) -> Result<&ActorDef, OracleError> {
        self.actor(id).ok_or(OracleError::ActorNotFound(id))
    }

    fn require_class(&self, id: ClassId) -> Result<&ClassDef, OracleError> {
        self.class(id).ok_or(OracleError::ClassNotFound(id))
    }

    fn require_enemy(&self, id: EnemyId) -> Result<&EnemyDef, OracleError> {
        self.enemy(id).ok_or(OracleError::EnemyNotFound(id))
    }

    fn require_troop(&self, id: TroopId) -> Result<&TroopDef, OracleError> {
        self.troop(id).ok_or(OracleError::TroopNotFound(id))
    }

    fn require_skill(&self, id: SkillId) -> Result<&UsableItem, OracleError> {
        self.skill(id).ok_or(OracleError::SkillNotFound(id))
    }
}

/// In-memory database backed by ordered maps.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MemoryDatabase {
    pub actors: BTreeMap<ActorId, ActorDef>,
    pub classes: BTreeMap<ClassId, ClassDef>,
    pub skills: BTreeMap<SkillId, UsableItem>,
    pub items: BTreeMap<ItemId, UsableItem>,
    pub weapons: BTreeMap<WeaponId, WeaponDef>,
    pub armors: BTreeMap<ArmorId, ArmorDef>,
    pub states: BTreeMap<StateId, StateDef>,
    pub enemies: BTreeMap<EnemyId, EnemyDef>,
    pub troops: BTreeMap<TroopId, TroopDef>,
    pub system: SystemDef,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actor(mut self, id: ActorId, def: ActorDef) -> Self {
        self.actors.insert(id, def);
        self
    }

    pub fn with_class(mut self, id: ClassId, def: ClassDef) -> Self {
        self.classes.insert(id, def);
        self
    }

    pub fn with_skill(mut self, id: SkillId, def: UsableItem) -> Self {
        self.skills.insert(id, def);
        self
    }

    pub fn with_item(mut self, id: ItemId, def: UsableItem) -> Self {
        self.items.insert(id, def);
        self
    }

    pub fn with_weapon(mut self, id: WeaponId, def: WeaponDef) -> Self {
        self.weapons.insert(id, def);
        self
    }

    pub fn with_armor(mut self, id: ArmorId, def: ArmorDef) -> Self {
        self.armors.insert(id, def);
        self
    }

    pub fn with_state(mut self, id: StateId, def: StateDef) -> Self {
        self.states.insert(id, def);
        self
    }

    pub fn with_enemy(mut self, id: EnemyId, def: EnemyDef) -> Self {
        self.enemies.insert(id, def);
        self
    }

    pub fn with_troop(mut self, id: TroopId, def: TroopDef) -> Self {
        self.troops.insert(id, def);
        self
    }

    pub fn with_system(mut self, system: SystemDef) -> Self {
        self.system = system;
        self
    }
}

impl DatabaseOracle for MemoryDatabase {
    fn actor(&self, id: ActorId) -> Option<&ActorDef> {
        self.actors.get(&id)
    }

    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(&id)
    }

    fn skill(&self, id: SkillId) -> Option<&UsableItem> {
        self.skills.get(&id)
    }

    fn item(&self, id: ItemId) -> Option<&UsableItem> {
        self.items.get(&id)
    }

    fn weapon(&self, id: WeaponId) -> Option<&WeaponDef> {
        self.weapons.get(&id)
    }

    fn armor(&self, id: ArmorId) -> Option<&ArmorDef> {
        self.armors.get(&id)
    }

    fn state(&self, id: StateId) -> Option<&StateDef> {
        self.states.get(&id)
    }

    fn enemy(&self, id: EnemyId) -> Option<&EnemyDef> {
        self.enemies.get(&id)
    }

    fn troop(&self, id: TroopId) -> Option<&TroopDef> {
        self.troops.get(&id)
    }

    fn system(&self) -> &SystemDef {
        &self.system
    }
}
