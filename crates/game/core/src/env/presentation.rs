//! Narration and audio collaborators.
//!
//! The scheduler pushes an ordered stream of [`LogCommand`]s and polls
//! [`PresentationSink::is_busy`] before advancing its own phase. Audio cues
//! are fire-and-forget.

use super::items::{InventoryKey, ItemRef, SkillId};
use super::states::StateId;
use super::battlers::ActorId;
use crate::battler::BattlerId;
use crate::stats::Param;

/// Narration commands, in the order they should be shown.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogCommand {
    Emerge { name: String },
    Preemptive,
    Surprise,
    TurnStart { turn: i32 },
    ActionStart { subject: BattlerId, item: ItemRef },
    ActionEnd { subject: BattlerId },
    Counter { battler: BattlerId },
    Reflection { battler: BattlerId },
    Substitute { substitute: BattlerId, target: BattlerId },
    Failure { target: BattlerId },
    Miss { target: BattlerId },
    Evasion { target: BattlerId, magical: bool },
    Critical { target: BattlerId },
    /// Positive values are damage, negative values recovery.
    HpDamage { target: BattlerId, value: i32, drain: bool },
    MpDamage { target: BattlerId, value: i32, drain: bool },
    TpDamage { target: BattlerId, value: i32 },
    StateAdded { target: BattlerId, state: StateId },
    StateRemoved { target: BattlerId, state: StateId },
    /// Most important persistent state message of a battler, if any.
    StatusCheck { battler: BattlerId, state: Option<StateId> },
    BuffAdded { target: BattlerId, param: Param },
    DebuffAdded { target: BattlerId, param: Param },
    BuffRemoved { target: BattlerId, param: Param },
    Collapse { battler: BattlerId },
    EscapeStart,
    EscapeFailure,
    EscapeSuccess,
    Victory,
    Defeat,
    Rewards { exp: i64, gold: i64, items: Vec<InventoryKey> },
    LevelUp { actor: ActorId, level: u32, learned: Vec<SkillId> },
    Wait,
}

/// Receives narration and reports whether it is still playing.
pub trait PresentationSink {
    fn push(&mut self, command: LogCommand);

    /// The scheduler does not advance while this returns true.
    fn is_busy(&self) -> bool {
        false
    }

    fn clear(&mut self) {}
}

impl PresentationSink for Vec<LogCommand> {
    fn push(&mut self, command: LogCommand) {
        Vec::push(self, command);
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }
}

/// Sound effects and jingles triggered by resolution events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SoundCue {
    ActorDamage,
    EnemyDamage,
    Recovery,
    Miss,
    Evasion,
    MagicEvasion,
    Reflection,
    ActorCollapse,
    EnemyCollapse,
    BossCollapse,
    Escape,
    Victory,
    Defeat,
}

pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

impl AudioSink for Vec<SoundCue> {
    fn play(&mut self, cue: SoundCue) {
        self.push(cue);
    }
}

/// Audio sink that discards every cue.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: SoundCue) {}
}
