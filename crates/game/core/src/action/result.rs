//! Transient outcome of one action against one battler.

use crate::env::StateId;
use crate::stats::Param;

/// Coarse classification of an [`ActionResult`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitOutcome {
    /// The action did not pass its life/death test against this target.
    Unused,
    Missed,
    Evaded,
    Hit,
    Critical,
}

/// Flags, deltas and state/buff changes recorded while resolving an action.
///
/// Cleared before every resolution and read once by narration.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionResult {
    pub used: bool,
    pub missed: bool,
    pub evaded: bool,
    pub physical: bool,
    pub drain: bool,
    pub critical: bool,
    pub success: bool,
    pub hp_affected: bool,
    pub hp_damage: i32,
    pub mp_damage: i32,
    pub tp_damage: i32,
    pub added_states: Vec<StateId>,
    pub removed_states: Vec<StateId>,
    pub added_buffs: Vec<Param>,
    pub added_debuffs: Vec<Param>,
    pub removed_buffs: Vec<Param>,
}

impl ActionResult {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn outcome(&self) -> HitOutcome {
        if !self.used {
            HitOutcome::Unused
        } else if self.missed {
            HitOutcome::Missed
        } else if self.evaded {
            HitOutcome::Evaded
        } else if self.critical {
            HitOutcome::Critical
        } else {
            HitOutcome::Hit
        }
    }

    pub fn is_hit(&self) -> bool {
        self.used && !self.missed && !self.evaded
    }

    pub fn is_status_affected(&self) -> bool {
        !self.added_states.is_empty()
            || !self.removed_states.is_empty()
            || !self.added_buffs.is_empty()
            || !self.added_debuffs.is_empty()
            || !self.removed_buffs.is_empty()
    }

    pub fn is_state_added(&self, state: StateId) -> bool {
        self.added_states.contains(&state)
    }

    pub fn push_added_state(&mut self, state: StateId) {
        if !self.is_state_added(state) {
            self.added_states.push(state);
        }
    }

    pub fn is_state_removed(&self, state: StateId) -> bool {
        self.removed_states.contains(&state)
    }

    pub fn push_removed_state(&mut self, state: StateId) {
        if !self.is_state_removed(state) {
            self.removed_states.push(state);
        }
    }

    pub fn push_added_buff(&mut self, param: Param) {
        if !self.added_buffs.contains(&param) {
            self.added_buffs.push(param);
        }
    }

    pub fn push_added_debuff(&mut self, param: Param) {
        if !self.added_debuffs.contains(&param) {
            self.added_debuffs.push(param);
        }
    }

    pub fn push_removed_buff(&mut self, param: Param) {
        if !self.removed_buffs.contains(&param) {
            self.removed_buffs.push(param);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_priority() {
        let mut result = ActionResult::default();
        assert_eq!(result.outcome(), HitOutcome::Unused);
        result.used = true;
        assert_eq!(result.outcome(), HitOutcome::Hit);
        result.critical = true;
        assert_eq!(result.outcome(), HitOutcome::Critical);
        result.evaded = true;
        assert_eq!(result.outcome(), HitOutcome::Evaded);
        result.missed = true;
        assert_eq!(result.outcome(), HitOutcome::Missed);
    }

    #[test]
    fn pushes_are_deduplicated() {
        let mut result = ActionResult::default();
        result.push_added_state(3);
        result.push_added_state(3);
        result.push_added_buff(Param::Attack);
        result.push_added_buff(Param::Attack);
        assert_eq!(result.added_states, vec![3]);
        assert_eq!(result.added_buffs, vec![Param::Attack]);
        assert!(result.is_status_affected());
    }
}
