//! Patch document model
//!
//! A [`PatchDocument`] collects everything a patch script sets: the target
//! format, replacement strings, miscellany values and one [`EntryTable`] per
//! numbered object kind. Each table tracks slot occupancy in an
//! [`IntervalMap`], so symbolic names can claim the first free slot.

use crate::config::compile_time::patch::{EXTENDED_STATE_SLOTS, EXTENDED_THING_SLOTS};
use crate::interval::IntervalMap;
use crate::logging::{codes, Code};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchFormat {
    Doom19,
    UDoom19,
    Boom,
    Mbf,
    Extended,
}

impl PatchFormat {
    pub const ALL: [PatchFormat; 5] = [
        PatchFormat::Doom19,
        PatchFormat::UDoom19,
        PatchFormat::Boom,
        PatchFormat::Mbf,
        PatchFormat::Extended,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            PatchFormat::Doom19 => "doom19",
            PatchFormat::UDoom19 => "udoom19",
            PatchFormat::Boom => "boom",
            PatchFormat::Mbf => "mbf",
            PatchFormat::Extended => "extended",
        }
    }

    pub fn from_keyword(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.keyword().eq_ignore_ascii_case(text))
    }

    /// Slot layout of `kind` under this format
    pub fn slots(&self, kind: SlotKind) -> SlotRange {
        let (things, states) = match self {
            PatchFormat::Doom19 | PatchFormat::UDoom19 => (137, 967),
            PatchFormat::Boom => (139, 968),
            PatchFormat::Mbf | PatchFormat::Extended => (150, 1089),
        };
        match kind {
            SlotKind::Thing => SlotRange {
                first: 1,
                vanilla_last: things,
                last: if *self == PatchFormat::Extended {
                    EXTENDED_THING_SLOTS.max(things)
                } else {
                    things
                },
            },
            SlotKind::State => SlotRange {
                first: 0,
                vanilla_last: states - 1,
                last: if *self == PatchFormat::Extended {
                    EXTENDED_STATE_SLOTS.max(states) - 1
                } else {
                    states - 1
                },
            },
            SlotKind::Weapon => SlotRange::fixed(0, 8),
            SlotKind::Ammo => SlotRange::fixed(0, 3),
        }
    }
}

impl fmt::Display for PatchFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Thing,
    Weapon,
    Ammo,
    State,
}

impl SlotKind {
    pub fn name(&self) -> &'static str {
        match self {
            SlotKind::Thing => "thing",
            SlotKind::Weapon => "weapon",
            SlotKind::Ammo => "ammo",
            SlotKind::State => "state",
        }
    }

    /// Fields an entry of this kind accepts
    pub fn fields(&self) -> &'static [(&'static str, FieldType)] {
        match self {
            SlotKind::Thing => THING_FIELDS,
            SlotKind::Weapon => WEAPON_FIELDS,
            SlotKind::Ammo => AMMO_FIELDS,
            SlotKind::State => STATE_FIELDS,
        }
    }

    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        lookup(self.fields(), field)
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Inclusive slot indices: `[first, vanilla_last]` exist in the base game,
/// `(vanilla_last, last]` are free for new definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotRange {
    pub first: i64,
    pub vanilla_last: i64,
    pub last: i64,
}

impl SlotRange {
    fn fixed(first: i64, last: i64) -> Self {
        Self {
            first,
            vanilla_last: last,
            last,
        }
    }

    pub fn contains(&self, index: i64) -> bool {
        (self.first..=self.last).contains(&index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    /// Scaled by 2^16
    Fixed,
    String,
    Boolean,
    /// State index or state name
    Frame,
}

impl FieldType {
    pub fn describe(&self) -> &'static str {
        match self {
            FieldType::Integer => "an integer",
            FieldType::Fixed => "a fixed-point number",
            FieldType::String => "a string",
            FieldType::Boolean => "a boolean",
            FieldType::Frame => "a state index or name",
        }
    }
}

const THING_FIELDS: &[(&str, FieldType)] = &[
    ("ednum", FieldType::Integer),
    ("health", FieldType::Integer),
    ("speed", FieldType::Integer),
    ("radius", FieldType::Fixed),
    ("height", FieldType::Fixed),
    ("mass", FieldType::Integer),
    ("damage", FieldType::Integer),
    ("reactiontime", FieldType::Integer),
    ("painchance", FieldType::Integer),
    ("seesound", FieldType::String),
    ("attacksound", FieldType::String),
    ("painsound", FieldType::String),
    ("deathsound", FieldType::String),
    ("activesound", FieldType::String),
    ("spawnstate", FieldType::Frame),
    ("seestate", FieldType::Frame),
    ("painstate", FieldType::Frame),
    ("meleestate", FieldType::Frame),
    ("missilestate", FieldType::Frame),
    ("deathstate", FieldType::Frame),
    ("xdeathstate", FieldType::Frame),
    ("raisestate", FieldType::Frame),
];

const WEAPON_FIELDS: &[(&str, FieldType)] = &[
    ("ammotype", FieldType::Integer),
    ("ammopershot", FieldType::Integer),
    ("upstate", FieldType::Frame),
    ("downstate", FieldType::Frame),
    ("readystate", FieldType::Frame),
    ("firestate", FieldType::Frame),
    ("flashstate", FieldType::Frame),
];

const AMMO_FIELDS: &[(&str, FieldType)] = &[
    ("max", FieldType::Integer),
    ("pickup", FieldType::Integer),
];

const STATE_FIELDS: &[(&str, FieldType)] = &[
    ("sprite", FieldType::Integer),
    ("frame", FieldType::Integer),
    ("duration", FieldType::Integer),
    ("nextstate", FieldType::Frame),
    ("bright", FieldType::Boolean),
    ("pointer", FieldType::String),
    ("misc1", FieldType::Integer),
    ("misc2", FieldType::Integer),
];

pub const MISC_FIELDS: &[(&str, FieldType)] = &[
    ("initialhealth", FieldType::Integer),
    ("initialbullets", FieldType::Integer),
    ("maxhealth", FieldType::Integer),
    ("maxarmor", FieldType::Integer),
    ("greenarmorclass", FieldType::Integer),
    ("bluearmorclass", FieldType::Integer),
    ("maxsoulsphere", FieldType::Integer),
    ("soulspherehealth", FieldType::Integer),
    ("megaspherehealth", FieldType::Integer),
    ("godmodehealth", FieldType::Integer),
    ("idfaarmor", FieldType::Integer),
    ("idfaarmorclass", FieldType::Integer),
    ("idkfaarmor", FieldType::Integer),
    ("idkfaarmorclass", FieldType::Integer),
    ("bfgcellspershot", FieldType::Integer),
    ("monstersinfight", FieldType::Boolean),
];

fn lookup(table: &[(&str, FieldType)], field: &str) -> Option<FieldType> {
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(field))
        .map(|(_, field_type)| *field_type)
}

pub fn misc_field_type(field: &str) -> Option<FieldType> {
    lookup(MISC_FIELDS, field)
}

/// A typed statement value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Fixed(i32),
    Text(String),
    Boolean(bool),
    Frame(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    /// Provided by the target format
    Vanilla,
    /// Written by the script
    Patched,
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotState::Vanilla => write!(f, "vanilla"),
            SlotState::Patched => write!(f, "patched"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatchError {
    #[error("{kind} index {index} is outside {first}..={last}")]
    IndexOutOfRange {
        kind: SlotKind,
        index: i64,
        first: i64,
        last: i64,
    },

    #[error("No free {kind} slot left for \"{name}\"")]
    NoFreeSlot { kind: SlotKind, name: String },

    #[error("Unknown {section} field \"{field}\"")]
    UnknownField { section: String, field: String },

    #[error("Field \"{field}\" expects {expected}")]
    FieldTypeMismatch {
        field: String,
        expected: &'static str,
    },
}

impl PatchError {
    pub fn error_code(&self) -> Code {
        match self {
            PatchError::IndexOutOfRange { .. } => codes::patch::INDEX_OUT_OF_RANGE,
            PatchError::NoFreeSlot { .. } => codes::patch::NO_FREE_SLOT,
            PatchError::UnknownField { .. } => codes::patch::UNKNOWN_FIELD,
            PatchError::FieldTypeMismatch { .. } => codes::patch::FIELD_TYPE_MISMATCH,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatchEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub fields: BTreeMap<String, FieldValue>,
}

/// Entries of one kind with their slot occupancy
#[derive(Debug, Clone, Serialize)]
pub struct EntryTable {
    kind: SlotKind,
    range: SlotRange,
    entries: BTreeMap<i64, PatchEntry>,
    slots: IntervalMap<SlotState>,
    names: BTreeMap<String, i64>,
}

impl EntryTable {
    fn new(kind: SlotKind, range: SlotRange) -> Self {
        let mut slots = IntervalMap::default();
        let vanilla = slots.set(range.first, range.vanilla_last, Some(SlotState::Vanilla));
        debug_assert!(vanilla.is_ok(), "{} slot range {:?} is inverted", kind, range);
        Self {
            kind,
            range,
            entries: BTreeMap::new(),
            slots,
            names: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    pub fn range(&self) -> SlotRange {
        self.range
    }

    pub fn get(&self, index: i64) -> Option<&PatchEntry> {
        self.entries.get(&index)
    }

    pub fn entries(&self) -> impl Iterator<Item = (i64, &PatchEntry)> {
        self.entries.iter().map(|(index, entry)| (*index, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn slots(&self) -> &IntervalMap<SlotState> {
        &self.slots
    }

    pub fn slot_state(&self, index: i64) -> Option<SlotState> {
        self.slots.get(index).copied()
    }

    /// Slot bound to a symbolic name, if any
    pub fn named(&self, name: &str) -> Option<i64> {
        self.names.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn check_index(&self, index: i64) -> Result<(), PatchError> {
        if self.range.contains(index) {
            return Ok(());
        }
        Err(PatchError::IndexOutOfRange {
            kind: self.kind,
            index,
            first: self.range.first,
            last: self.range.last,
        })
    }

    /// Slot for a symbolic name; an unseen name claims the first free slot
    pub fn resolve_name(&mut self, name: &str) -> Result<i64, PatchError> {
        let key = name.to_ascii_lowercase();
        if let Some(index) = self.names.get(&key) {
            return Ok(*index);
        }
        let index = self
            .slots
            .first_unset(self.range.first, self.range.last)
            .ok_or_else(|| PatchError::NoFreeSlot {
                kind: self.kind,
                name: name.to_string(),
            })?;
        self.slots.set_index(index, Some(SlotState::Patched));
        self.names.insert(key, index);
        Ok(index)
    }

    /// Entry at `index`, created on first touch; marks the slot patched
    pub fn touch(&mut self, index: i64) -> Result<&mut PatchEntry, PatchError> {
        self.check_index(index)?;
        self.slots.set_index(index, Some(SlotState::Patched));
        Ok(self.entries.entry(index).or_default())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PatchDocument {
    pub format: PatchFormat,
    pub strings: BTreeMap<String, String>,
    pub misc: BTreeMap<String, FieldValue>,
    pub things: EntryTable,
    pub weapons: EntryTable,
    pub ammo: EntryTable,
    pub states: EntryTable,
}

impl PatchDocument {
    pub fn new(format: PatchFormat) -> Self {
        Self {
            format,
            strings: BTreeMap::new(),
            misc: BTreeMap::new(),
            things: EntryTable::new(SlotKind::Thing, format.slots(SlotKind::Thing)),
            weapons: EntryTable::new(SlotKind::Weapon, format.slots(SlotKind::Weapon)),
            ammo: EntryTable::new(SlotKind::Ammo, format.slots(SlotKind::Ammo)),
            states: EntryTable::new(SlotKind::State, format.slots(SlotKind::State)),
        }
    }

    pub fn table(&self, kind: SlotKind) -> &EntryTable {
        match kind {
            SlotKind::Thing => &self.things,
            SlotKind::Weapon => &self.weapons,
            SlotKind::Ammo => &self.ammo,
            SlotKind::State => &self.states,
        }
    }

    pub fn table_mut(&mut self, kind: SlotKind) -> &mut EntryTable {
        match kind {
            SlotKind::Thing => &mut self.things,
            SlotKind::Weapon => &mut self.weapons,
            SlotKind::Ammo => &mut self.ammo,
            SlotKind::State => &mut self.states,
        }
    }

    /// Total number of numbered entries
    pub fn entry_count(&self) -> usize {
        [SlotKind::Thing, SlotKind::Weapon, SlotKind::Ammo, SlotKind::State]
            .iter()
            .map(|kind| self.table(*kind).len())
            .sum()
    }
}

impl Default for PatchDocument {
    fn default() -> Self {
        Self::new(PatchFormat::Doom19)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_format_keywords() {
        assert_eq!(PatchFormat::from_keyword("MBF"), Some(PatchFormat::Mbf));
        assert_eq!(PatchFormat::from_keyword("udoom19"), Some(PatchFormat::UDoom19));
        assert_eq!(PatchFormat::from_keyword("mbf21"), None);
    }

    #[test]
    fn test_vanilla_slots_are_marked() {
        let document = PatchDocument::new(PatchFormat::Doom19);
        assert_eq!(document.things.slot_state(1), Some(SlotState::Vanilla));
        assert_eq!(document.things.slot_state(137), Some(SlotState::Vanilla));
        assert_eq!(document.things.slot_state(138), None);
        assert_eq!(document.states.slots().max_index(), Some(966));

        for format in PatchFormat::ALL {
            let document = PatchDocument::new(format);
            for kind in [SlotKind::Thing, SlotKind::Weapon, SlotKind::Ammo, SlotKind::State] {
                let table = document.table(kind);
                let range = table.range();
                assert_eq!(table.slot_state(range.first), Some(SlotState::Vanilla));
                assert_eq!(table.slot_state(range.vanilla_last), Some(SlotState::Vanilla));
                assert_eq!(table.slots().len(), 1);
            }
        }
    }

    #[test]
    fn test_touch_marks_patched() {
        let mut document = PatchDocument::default();
        document.weapons.touch(3).unwrap().name = Some("Shotgun".into());
        assert_eq!(document.weapons.slot_state(3), Some(SlotState::Patched));
        assert_eq!(document.weapons.slot_state(2), Some(SlotState::Vanilla));
        assert_eq!(document.weapons.slots().len(), 3);

        let error = document.weapons.touch(9).unwrap_err();
        assert_matches!(error, PatchError::IndexOutOfRange { index: 9, last: 8, .. });
        assert_eq!(error.error_code(), codes::patch::INDEX_OUT_OF_RANGE);
    }

    #[test]
    fn test_symbolic_names_claim_free_slots() {
        let mut document = PatchDocument::new(PatchFormat::Extended);
        let imp_ball = document.things.resolve_name("ImpBall2").unwrap();
        let lost = document.things.resolve_name("LostSoul2").unwrap();
        assert_eq!(imp_ball, 151);
        assert_eq!(lost, 152);
        assert_eq!(document.things.resolve_name("impball2").unwrap(), 151);

        // A numbered write beyond the vanilla range blocks that slot
        document.things.touch(153).unwrap();
        assert_eq!(document.things.resolve_name("Third").unwrap(), 154);
    }

    #[test]
    fn test_no_free_slot_without_extension() {
        let mut document = PatchDocument::new(PatchFormat::Boom);
        let error = document.states.resolve_name("S_NEW").unwrap_err();
        assert_matches!(error, PatchError::NoFreeSlot { kind: SlotKind::State, .. });
        assert_eq!(error.error_code(), codes::patch::NO_FREE_SLOT);
    }

    #[test]
    fn test_field_tables() {
        assert_eq!(SlotKind::Thing.field_type("Height"), Some(FieldType::Fixed));
        assert_eq!(SlotKind::State.field_type("nextstate"), Some(FieldType::Frame));
        assert_eq!(SlotKind::Ammo.field_type("speed"), None);
        assert_eq!(misc_field_type("monstersinfight"), Some(FieldType::Boolean));
    }

    #[test]
    fn test_serializes_to_json() {
        let mut document = PatchDocument::default();
        document
            .ammo
            .touch(0)
            .unwrap()
            .fields
            .insert("max".into(), FieldValue::Integer(400));
        document.strings.insert("GOTARMOR".into(), "Armor!".into());

        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["format"], "doom19");
        assert_eq!(json["ammo"]["entries"]["0"]["fields"]["max"], 400);
        assert_eq!(json["strings"]["GOTARMOR"], "Armor!");
        assert_eq!(json["ammo"]["slots"][0]["value"], "patched");
    }
}
