//! Continuous time-bar clock.
//!
//! ```text
//! Charging ──(charge ≥ 1)──▶ Charged ──(input done)──▶ Casting
//!    ▲                                                    │ (cast ≥ required)
//!    └────────── action end ◀── Acting ◀── Ready ◀────────┘
//! ```
//!
//! Every rate is scaled by the battler's speed relative to the party's
//! fastest base speed, so the fastest member fills its bar in
//! `reference_time` ticks.

use super::{Battler, UsageContext};
use crate::env::{BattleEnv, RngOracle};
use crate::stats::Param;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TimeBarState {
    #[default]
    Charging,
    Charged,
    Casting,
    Ready,
    Acting,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeBar {
    pub(crate) state: TimeBarState,
    pub(crate) charge: f64,
    pub(crate) cast: f64,
    pub(crate) idle: f64,
    pub(crate) turn_count: i32,
    pub(crate) turn_end: bool,
}

impl TimeBar {
    pub fn state(&self) -> TimeBarState {
        self.state
    }

    pub fn charge(&self) -> f64 {
        self.charge
    }

    pub fn cast(&self) -> f64 {
        self.cast
    }

    pub fn idle(&self) -> f64 {
        self.idle
    }

    pub fn turn_count(&self) -> i32 {
        self.turn_count
    }

    pub fn is_turn_end(&self) -> bool {
        self.turn_end
    }
}

/// Party-wide scale shared by every clock in one battle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeBarScale {
    pub base_speed: f64,
    pub reference_time: f64,
}

impl TimeBarScale {
    pub fn new(base_speed: f64, reference_time: f64) -> Self {
        Self {
            base_speed: base_speed.max(1.0),
            reference_time,
        }
    }
}

impl Default for TimeBarScale {
    fn default() -> Self {
        Self::new(1.0, 60.0)
    }
}

impl Battler {
    // ===== speed =====

    pub fn time_bar_speed(&self, env: BattleEnv<'_>) -> f64 {
        f64::from(self.agi(env)).sqrt() + 1.0
    }

    /// Speed from base plus bonus agility, ignoring buffs and rates.
    pub fn time_bar_base_speed(&self, env: BattleEnv<'_>) -> f64 {
        f64::from(self.param_base_plus(env, Param::Agility)).sqrt() + 1.0
    }

    pub fn time_bar_relative_speed(&self, env: BattleEnv<'_>, scale: TimeBarScale) -> f64 {
        self.time_bar_speed(env) / scale.base_speed
    }

    pub fn time_bar_acceleration(&self, env: BattleEnv<'_>, scale: TimeBarScale) -> f64 {
        self.time_bar_relative_speed(env, scale) / scale.reference_time
    }

    /// `sqrt(Σ max(0, -item.speed)) / speed` over the valid queued actions.
    pub fn time_bar_required_cast(&self, env: BattleEnv<'_>, usage: UsageContext<'_>) -> f64 {
        let delay: i32 = self
            .actions
            .iter()
            .filter(|action| action.is_valid(env, self, usage))
            .filter_map(|action| action.definition(env))
            .map(|def| (-def.speed).max(0))
            .sum();
        f64::from(delay).sqrt() / self.time_bar_speed(env)
    }

    // ===== queries =====

    pub fn is_time_bar_charged(&self) -> bool {
        self.time_bar.state == TimeBarState::Charged
    }

    pub fn is_time_bar_ready(&self) -> bool {
        self.time_bar.state == TimeBarState::Ready
    }

    pub fn is_time_bar_timeout(&self) -> bool {
        self.time_bar.idle >= 1.0
    }

    // ===== lifecycle =====

    pub fn init_time_bar_charge(
        &mut self,
        env: BattleEnv<'_>,
        rng: &mut dyn RngOracle,
        scale: TimeBarScale,
        advantageous: bool,
    ) {
        let speed = self.time_bar_relative_speed(env, scale);
        self.time_bar.state = TimeBarState::Charging;
        self.time_bar.charge = if advantageous {
            1.0
        } else {
            speed * rng.next_f64() * 0.5
        };
        if self.is_restricted(env) {
            self.time_bar.charge = 0.0;
        }
    }

    pub fn init_time_bar_turn(&mut self) {
        self.time_bar.turn_end = false;
        self.time_bar.turn_count = 0;
        self.time_bar.idle = 0.0;
    }

    pub fn clear_time_bar_charge(&mut self) {
        self.time_bar.state = TimeBarState::Charging;
        self.time_bar.charge = 0.0;
    }

    /// Failed escape: the bar restarts one full charge behind.
    pub fn apply_time_bar_penalty(&mut self) {
        self.time_bar.state = TimeBarState::Charging;
        self.time_bar.charge = -1.0;
    }

    /// Advances the charge. With `delay` set a full bar is held in
    /// `Charging` until it is released.
    pub fn update_time_bar_charge(&mut self, env: BattleEnv<'_>, scale: TimeBarScale, delay: bool) {
        if self.time_bar.state != TimeBarState::Charging {
            return;
        }
        self.time_bar.charge += self.time_bar_acceleration(env, scale);
        if self.time_bar.charge >= 1.0 {
            self.time_bar.charge = 1.0;
            if !delay {
                self.finish_time_bar_charge();
            }
        }
    }

    fn finish_time_bar_charge(&mut self) {
        self.time_bar.state = TimeBarState::Charged;
        self.time_bar.turn_end = true;
        self.time_bar.idle = 0.0;
    }

    pub fn update_time_bar_cast(
        &mut self,
        env: BattleEnv<'_>,
        scale: TimeBarScale,
        usage: UsageContext<'_>,
    ) {
        if self.time_bar.state != TimeBarState::Casting {
            return;
        }
        self.time_bar.cast += self.time_bar_acceleration(env, scale);
        let required = self.time_bar_required_cast(env, usage);
        if self.time_bar.cast >= required {
            self.time_bar.cast = required;
            self.time_bar.state = TimeBarState::Ready;
        }
    }

    /// Idle time runs while the battler cannot act on its full bar.
    pub fn update_time_bar_idle(&mut self, env: BattleEnv<'_>, scale: TimeBarScale) {
        if !self.can_move(env) || self.is_time_bar_charged() {
            self.time_bar.idle += self.time_bar_acceleration(env, scale);
        }
    }

    pub fn start_time_bar_casting(&mut self) {
        self.time_bar.state = TimeBarState::Casting;
        self.time_bar.cast = 0.0;
    }

    pub fn start_time_bar_action(&mut self) {
        self.time_bar.state = TimeBarState::Acting;
    }

    /// Begins the battler's own turn. Returns `true` when the queue is empty
    /// and new actions must be made.
    pub fn start_time_bar_turn(&mut self) -> bool {
        self.time_bar.turn_end = false;
        self.time_bar.turn_count += 1;
        self.time_bar.idle = 0.0;
        self.actions.is_empty()
    }

    /// Idle for a full bar: the turn ends without acting.
    pub fn on_time_bar_timeout(&mut self, env: BattleEnv<'_>) {
        self.on_all_actions_end(env);
        self.time_bar.turn_end = true;
        self.time_bar.idle = 0.0;
    }
}
