/// Database-wide tables that are not tied to a single record.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SystemDef {
    /// Equipment type names. Slot `i` of an actor holds equip type `i + 1`.
    pub equip_types: Vec<String>,
    pub skill_types: Vec<String>,
    pub elements: Vec<String>,
    /// Element applied to attacks of actors without weapons.
    pub bare_hands_element: u32,
}

impl SystemDef {
    pub fn equip_slot_count(&self) -> usize {
        self.equip_types.len()
    }
}

impl Default for SystemDef {
    fn default() -> Self {
        Self {
            equip_types: ["Weapon", "Shield", "Head", "Body", "Accessory"]
                .into_iter()
                .map(String::from)
                .collect(),
            skill_types: vec!["Magic".into(), "Special".into()],
            elements: vec!["Physical".into()],
            bare_hands_element: 1,
        }
    }
}
