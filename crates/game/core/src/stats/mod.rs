//! Stat System
//!
//! Identifiers for the three parameter families and the helpers every other
//! layer uses to read them.
//!
//! ```text
//! [ Base params (class table or enemy data) ]
//!      ↓  + param_plus (growth items, equipment)
//! [ Flat sum, floored at 0 ]
//!      ↓  × Π ParamRate traits
//!      ↓  × buff rate (1 + 0.25 × level)
//! [ Clamp → Round ]
//! ```
//!
//! Ex-parameters (hit, evasion, ...) are sums of traits, sp-parameters
//! (target rate, guard effect, ...) are products of traits.

pub mod buffs;
pub mod flags;
pub mod traits;

pub use buffs::BuffTable;
pub use flags::{PartyAbilities, SpecialFlags};
pub use traits::{BattlerTrait, CollapseKind, TraitSet};

/// The eight base parameters.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Param {
    MaxHp,
    MaxMp,
    Attack,
    Defense,
    MagicAttack,
    MagicDefense,
    Agility,
    Luck,
}

impl Param {
    pub const COUNT: usize = 8;

    pub const ALL: [Param; Self::COUNT] = [
        Param::MaxHp,
        Param::MaxMp,
        Param::Attack,
        Param::Defense,
        Param::MagicAttack,
        Param::MagicDefense,
        Param::Agility,
        Param::Luck,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Lower bound of the final value. Only max MP may reach zero.
    pub const fn min_value(self) -> i32 {
        match self {
            Param::MaxMp => 0,
            _ => 1,
        }
    }
}

/// Additive rate parameters (sum of traits).
#[derive(
    Clone,
    Copy,
    Debug,
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
pub enum ExParam {
    Hit,
    Evasion,
    Critical,
    CriticalEvasion,
    MagicEvasion,
    MagicReflection,
    Counter,
    HpRegen,
    MpRegen,
    TpRegen,
}

/// Multiplicative rate parameters (product of traits, 1.0 when untouched).
#[derive(
    Clone,
    Copy,
    Debug,
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
pub enum SpParam {
    TargetRate,
    GuardEffect,
    RecoveryEffect,
    Pharmacology,
    MpCostRate,
    TpChargeRate,
    PhysicalDamage,
    MagicalDamage,
    FloorDamage,
    ExpRate,
}

/// Computes a final parameter value from its pieces.
///
/// `round(clamp(max(0, base + plus) × rate × buff_rate, min, max))`
pub fn compute_param(base: i32, plus: i32, rate: f64, buff_rate: f64, min: i32, max: i32) -> i32 {
    let flat = (base + plus).max(0) as f64;
    let value = flat * rate * buff_rate;
    value.clamp(min as f64, max as f64).round() as i32
}

/// Rate contributed by a buff level.
pub fn buff_rate(level: i8) -> f64 {
    f64::from(level) * 0.25 + 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_applies_plus_rate_buff_then_clamps() {
        // (100 + 20) × 1.1 × 1.25 = 165
        assert_eq!(compute_param(100, 20, 1.1, buff_rate(1), 1, 999), 165);
        // (10 + 0) × 0.5 × 0.5 = 2.5 rounds away from zero
        assert_eq!(compute_param(10, 0, 0.5, buff_rate(-2), 1, 999), 3);
    }

    #[test]
    fn negative_plus_floors_at_zero_then_clamps_to_min() {
        assert_eq!(compute_param(10, -50, 1.0, 1.0, 1, 999), 1);
        assert_eq!(
            compute_param(10, -50, 1.0, 1.0, Param::MaxMp.min_value(), 9_999),
            0
        );
    }

    #[test]
    fn result_never_exceeds_max() {
        for plus in [0, 500, 5_000, 50_000] {
            let value = compute_param(900, plus, 2.0, buff_rate(2), 1, 999);
            assert!((1..=999).contains(&value));
        }
    }

    #[test]
    fn param_round_trips_through_index() {
        for param in Param::ALL {
            assert_eq!(Param::from_index(param.index()), Some(param));
        }
        assert_eq!(Param::from_index(8), None);
    }
}
