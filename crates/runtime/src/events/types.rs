use serde::{Deserialize, Serialize};

use battle_core::Phase;

use crate::runtime::BattleSummary;

/// Battle lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// The scheduler moved to a new phase during `tick`.
    PhaseChanged { tick: u64, from: Phase, to: Phase },
    /// Battle-end cleanup ran; nothing further will happen.
    Finished(Box<BattleSummary>),
}
