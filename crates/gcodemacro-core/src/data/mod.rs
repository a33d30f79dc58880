//! Data models for macros and controller state
//!
//! This module provides:
//! - The `Macro` record as stored by the backend macro store
//! - The `MacroRecords` envelope returned by a macro list request
//! - String-valued enumerations for connection, workflow and machine state

mod state;

pub use state::{ConnectionState, MachineState, WorkflowState};

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier of a stored macro.
///
/// Backends hand out either UUID strings or integers; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MacroId(String);

impl MacroId {
    /// Create an id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacroId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MacroId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MacroId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for MacroId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for MacroId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => MacroId(text),
            RawId::Number(number) => MacroId(number.to_string()),
        })
    }
}

/// A named, stored sequence of machine instructions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macro {
    /// Identity of the macro
    pub id: MacroId,
    /// Display name
    pub name: String,
    /// G-code body executed when the macro runs
    #[serde(default)]
    pub content: String,
}

impl Macro {
    /// Create a macro record
    pub fn new(id: impl Into<MacroId>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Response body of a macro list request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroRecords {
    /// Macros in backend order; `null` or absent reads as empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub records: Vec<Macro>,
}

impl MacroRecords {
    /// Wrap a list of macros
    pub fn new(records: Vec<Macro>) -> Self {
        Self { records }
    }

    /// Number of macros
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the list holds no macros
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a macro by id
    pub fn find(&self, id: &MacroId) -> Option<&Macro> {
        self.records.iter().find(|m| &m.id == id)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Macro>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Macro>>::deserialize(deserializer)?.unwrap_or_default())
}
