//! Data-driven battle content.
//!
//! This crate provides loaders for the RON/TOML files a battle is built from:
//! - The database (actors, classes, skills, items, equipment, states, enemies, troops)
//! - The battle configuration
//!
//! Loaders fill [`battle_core::MemoryDatabase`] and [`battle_core::BattleConfig`]
//! directly with serde; nothing here appears in battle state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, DatabaseLoader, LoadResult};
