//! Patch scripting language built on the lexical, preprocessing and parsing
//! layers
//!
//! A script names a target format, then patches numbered things, weapons,
//! ammo and states, the string table and miscellany values.

pub mod document;
pub mod grammar;
pub mod kernel;

pub use document::{
    EntryTable, FieldType, FieldValue, PatchDocument, PatchEntry, PatchError, PatchFormat,
    SlotKind, SlotRange, SlotState,
};
pub use grammar::{parse_patch, parse_patch_text, parse_patch_text_with, PatchGrammar};
pub use kernel::{patch_kernel, PatchTag};
