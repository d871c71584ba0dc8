//! Traits and definitions describing read-only battle data.
//!
//! The database oracle exposes actors, classes, skills, items, equipment,
//! states, enemies and troops. [`BattleEnv`] bundles it with the
//! [`BattleConfig`] so battlers and the scheduler can reach everything they
//! need without depending on a concrete storage backend.
mod battlers;
mod database;
mod error;
mod items;
mod presentation;
mod rng;
mod states;
mod system;

use core::fmt;

pub use battlers::{
    ActionCondition, ActorDef, ActorId, ClassDef, ClassId, DropItem, EnemyAction, EnemyDef,
    EnemyId, EquipRef, Learning, TroopDef, TroopId, TroopMember,
};
pub use database::{DatabaseOracle, MemoryDatabase};
pub use error::OracleError;
pub use items::{
    ArmorDef, ArmorId, DamageDef, DamageElement, DamageKind, HitType, InventoryKey, ItemEffect,
    ItemId, ItemRef, Occasion, Scope, SkillId, UsableItem, UsableKind, WeaponDef, WeaponId,
};
pub use presentation::{AudioSink, LogCommand, NullAudio, PresentationSink, SoundCue};
pub use rng::{PcgRng, RngOracle, ScriptedRng, compute_seed};
pub use states::{AutoRemoval, Restriction, StateDef, StateId};
pub use system::SystemDef;

use crate::config::{BattleConfig, BattleSystem};

/// Aggregates the database oracle and the battle configuration.
#[derive(Clone, Copy)]
pub struct BattleEnv<'a> {
    db: &'a dyn DatabaseOracle,
    config: &'a BattleConfig,
}

impl<'a> BattleEnv<'a> {
    pub fn new(db: &'a dyn DatabaseOracle, config: &'a BattleConfig) -> Self {
        Self { db, config }
    }

    pub fn db(&self) -> &'a dyn DatabaseOracle {
        self.db
    }

    pub fn config(&self) -> &'a BattleConfig {
        self.config
    }

    pub fn battle_system(&self) -> BattleSystem {
        self.config.battle_system
    }

    pub fn is_time_bar(&self) -> bool {
        self.config.is_time_bar()
    }

    pub fn death_state_id(&self) -> StateId {
        self.config.death_state_id
    }

    pub fn state(&self, id: StateId) -> Option<&'a StateDef> {
        self.db.state(id)
    }

    pub fn usable(&self, item: ItemRef) -> Option<&'a UsableItem> {
        self.db.usable(item)
    }

    pub fn skill(&self, id: SkillId) -> Option<&'a UsableItem> {
        self.db.skill(id)
    }
}

impl fmt::Debug for BattleEnv<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BattleEnv")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}
