//! Status effect ("state") definitions.

use crate::stats::BattlerTrait;

pub type StateId = u32;

/// Action restriction imposed by a state. Ordered from mildest to strongest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Restriction {
    #[default]
    None,
    AttackEnemy,
    AttackAnyone,
    AttackAlly,
    CannotMove,
}

impl Restriction {
    /// Confusion level used for target selection (0 when not confused).
    pub const fn confusion_level(self) -> u8 {
        match self {
            Self::AttackEnemy => 1,
            Self::AttackAnyone => 2,
            Self::AttackAlly => 3,
            _ => 0,
        }
    }
}

/// When a state's counter is checked for expiry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AutoRemoval {
    #[default]
    None,
    ActionEnd,
    TurnEnd,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StateDef {
    pub name: String,
    pub priority: i32,
    pub restriction: Restriction,
    pub auto_removal: AutoRemoval,
    pub min_turns: i32,
    pub max_turns: i32,
    pub remove_at_battle_end: bool,
    pub remove_by_restriction: bool,
    pub remove_by_damage: bool,
    /// Percent chance to be removed each time damage is taken.
    pub chance_by_damage: i32,
    /// Shown while the state persists.
    pub message: String,
    pub added_message: String,
    pub removed_message: String,
    pub motion: u32,
    pub overlay: u32,
    pub traits: Vec<BattlerTrait>,
}

impl Default for StateDef {
    fn default() -> Self {
        Self {
            name: String::new(),
            priority: 50,
            restriction: Restriction::None,
            auto_removal: AutoRemoval::None,
            min_turns: 1,
            max_turns: 1,
            remove_at_battle_end: false,
            remove_by_restriction: false,
            remove_by_damage: false,
            chance_by_damage: 100,
            message: String::new(),
            added_message: String::new(),
            removed_message: String::new(),
            motion: 0,
            overlay: 0,
            traits: Vec::new(),
        }
    }
}
