use bitflags::bitflags;

bitflags! {
    /// Special behaviour flags granted by traits.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct SpecialFlags: u8 {
        /// Commands are chosen by evaluation instead of input.
        const AUTO_BATTLE = 1 << 0;
        /// Damage is divided while able to move.
        const GUARD = 1 << 1;
        /// Takes hits for dying allies.
        const SUBSTITUTE = 1 << 2;
        /// TP carries over between battles.
        const PRESERVE_TP = 1 << 3;
    }
}

bitflags! {
    /// Abilities any battle member can grant to the whole party.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct PartyAbilities: u8 {
        const ENCOUNTER_HALF = 1 << 0;
        const ENCOUNTER_NONE = 1 << 1;
        const CANCEL_SURPRISE = 1 << 2;
        const RAISE_PREEMPTIVE = 1 << 3;
        const GOLD_DOUBLE = 1 << 4;
        const DROP_ITEM_DOUBLE = 1 << 5;
    }
}
