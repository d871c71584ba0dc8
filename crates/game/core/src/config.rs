use crate::stats::Param;

/// Scheduling discipline used for an encounter.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BattleSystem {
    /// Strict turns: every combatant commits actions, then the turn plays out by speed.
    #[default]
    #[strum(serialize = "turn", serialize = "turn_based")]
    TurnBased,
    /// Time bars keep charging while commands are being chosen.
    #[strum(serialize = "active", serialize = "active_time_bar")]
    ActiveTimeBar,
    /// Time bars freeze while the party chooses commands.
    #[strum(serialize = "wait", serialize = "wait_time_bar")]
    WaitTimeBar,
}

impl BattleSystem {
    pub const fn is_time_bar(self) -> bool {
        matches!(self, Self::ActiveTimeBar | Self::WaitTimeBar)
    }

    pub const fn is_active_time_bar(self) -> bool {
        matches!(self, Self::ActiveTimeBar)
    }

    /// Ticks a battler with relative speed 1.0 needs to fill its bar.
    pub const fn reference_time(self) -> f64 {
        match self {
            Self::ActiveTimeBar => 240.0,
            _ => 60.0,
        }
    }
}

/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    pub battle_system: BattleSystem,
    /// When set, regeneration damage may reduce hp to zero.
    pub slip_death: bool,
    /// Reserve (non battle) members receive experience too.
    pub reserve_exp: bool,
    pub max_battle_members: usize,
    pub max_tp: i32,
    pub param_max: [i32; Param::COUNT],
    pub death_state_id: u32,
    pub attack_skill_id: u32,
    pub guard_skill_id: u32,
    pub escape_ratio_step: f64,
    pub max_gold: i64,
    pub max_items: u32,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_ACTIONS: usize = 8;
    pub const MAX_TROOP_MEMBERS: usize = 8;
    pub const MAX_BUFF_LEVEL: i8 = 2;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_BATTLE_MEMBERS: usize = 4;
    pub const DEFAULT_MAX_TP: i32 = 100;
    pub const DEFAULT_PARAM_MAX: [i32; Param::COUNT] =
        [999_999, 9_999, 999, 999, 999, 999, 999, 999];
    pub const DEFAULT_DEATH_STATE_ID: u32 = 1;
    pub const DEFAULT_ATTACK_SKILL_ID: u32 = 1;
    pub const DEFAULT_GUARD_SKILL_ID: u32 = 2;
    pub const DEFAULT_ESCAPE_RATIO_STEP: f64 = 0.1;
    pub const DEFAULT_MAX_GOLD: i64 = 99_999_999;
    pub const DEFAULT_MAX_ITEMS: u32 = 99;

    pub fn new() -> Self {
        Self {
            battle_system: BattleSystem::default(),
            slip_death: false,
            reserve_exp: false,
            max_battle_members: Self::DEFAULT_MAX_BATTLE_MEMBERS,
            max_tp: Self::DEFAULT_MAX_TP,
            param_max: Self::DEFAULT_PARAM_MAX,
            death_state_id: Self::DEFAULT_DEATH_STATE_ID,
            attack_skill_id: Self::DEFAULT_ATTACK_SKILL_ID,
            guard_skill_id: Self::DEFAULT_GUARD_SKILL_ID,
            escape_ratio_step: Self::DEFAULT_ESCAPE_RATIO_STEP,
            max_gold: Self::DEFAULT_MAX_GOLD,
            max_items: Self::DEFAULT_MAX_ITEMS,
        }
    }

    pub fn with_battle_system(battle_system: BattleSystem) -> Self {
        Self {
            battle_system,
            ..Self::new()
        }
    }

    pub fn is_time_bar(&self) -> bool {
        self.battle_system.is_time_bar()
    }

    pub fn param_max(&self, param: Param) -> i32 {
        self.param_max[param.index()]
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
