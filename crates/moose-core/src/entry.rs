//! Generic parameter entries
//!
//! An [`Entry`] is the editable form of a [`crate::Parameter`]: a value plus
//! the contract describing which values are acceptable. Nodes hold their
//! entries in a [`ParameterSet`].

use serde::Serialize;

/// Tag value marking an entry as live (written uncommented).
pub const ENABLED_TAG: &str = "true";
/// Tag value marking an entry as commented out.
pub const DISABLED_TAG: &str = "false";

/// Reserved id of a node's parameter set. Children are numbered from 2.
pub const PARAMETER_SET_ID: u32 = 1;

/// What values an entry accepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "values")]
pub enum AllowedValues {
    /// Any text.
    FreeText,
    /// Exactly one of the listed values. May be empty until constrained.
    Discrete(Vec<String>),
    /// A file reference, optionally restricted to known file names.
    File(Vec<String>),
}

impl AllowedValues {
    /// The closed list of values, if this contract has one.
    pub fn options(&self) -> Option<&[String]> {
        match self {
            Self::Discrete(values) => Some(values),
            Self::File(values) if !values.is_empty() => Some(values),
            _ => None,
        }
    }

    pub fn is_discrete(&self) -> bool {
        matches!(self, Self::Discrete(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: String,
    pub description: String,
    pub comment: String,
    pub required: bool,
    /// `"true"` when enabled, `"false"` when commented out.
    pub tag: String,
    value: String,
    allowed: AllowedValues,
}

impl Entry {
    pub fn new(name: impl Into<String>, value: impl Into<String>, allowed: AllowedValues) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            comment: String::new(),
            required: false,
            tag: ENABLED_TAG.to_string(),
            value: value.into(),
            allowed,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn allowed(&self) -> &AllowedValues {
        &self.allowed
    }

    pub fn is_enabled(&self) -> bool {
        self.tag != DISABLED_TAG
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.tag = if enabled { ENABLED_TAG } else { DISABLED_TAG }.to_string();
    }

    /// Set the value, honoring a discrete contract.
    ///
    /// Returns `false` (leaving the value untouched) when the entry is
    /// discrete with a non-empty option list that does not contain `value`.
    pub fn set_value(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if let AllowedValues::Discrete(options) = &self.allowed {
            if !options.is_empty() && !options.contains(&value) {
                return false;
            }
        }
        self.value = value;
        true
    }

    /// Replace the allowed-value contract without touching the value.
    pub fn set_allowed(&mut self, allowed: AllowedValues) {
        self.allowed = allowed;
    }
}

/// The ordered entries that make up one node's parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParameterSet {
    pub id: u32,
    pub name: String,
    entries: Vec<Entry>,
}

impl ParameterSet {
    pub fn new(owner: &str) -> Self {
        Self {
            id: PARAMETER_SET_ID,
            name: format!("{} Parameters", owner),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [Entry] {
        &mut self.entries
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discrete_rejects_unknown_value() {
        let mut entry = Entry::new(
            "order",
            "FIRST",
            AllowedValues::Discrete(vec!["FIRST".into(), "SECOND".into()]),
        );
        assert!(!entry.set_value("THIRD"));
        assert_eq!(entry.value(), "FIRST");
        assert!(entry.set_value("SECOND"));
        assert_eq!(entry.value(), "SECOND");
    }

    #[test]
    fn test_empty_discrete_accepts_anything() {
        let mut entry = Entry::new("variable", "", AllowedValues::Discrete(vec![]));
        assert!(entry.set_value("u"));
        assert_eq!(entry.value(), "u");
    }

    #[test]
    fn test_enabled_tag_round_trip() {
        let mut entry = Entry::new("x", "1", AllowedValues::FreeText);
        assert!(entry.is_enabled());
        entry.set_enabled(false);
        assert_eq!(entry.tag, "false");
        assert!(!entry.is_enabled());
    }

    #[test]
    fn test_parameter_set_lookup() {
        let mut set = ParameterSet::new("Mesh");
        assert_eq!(set.name, "Mesh Parameters");
        assert_eq!(set.id, PARAMETER_SET_ID);
        set.push(Entry::new("dim", "2", AllowedValues::FreeText));
        assert!(set.contains("dim"));
        assert!(!set.contains("nx"));
        set.get_mut("dim").unwrap().set_value("3");
        assert_eq!(set.get("dim").unwrap().value(), "3");
    }
}
