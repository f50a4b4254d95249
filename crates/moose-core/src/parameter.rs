//! MOOSE parameters and their mapping onto generic entries.

use std::fmt;

use serde::Serialize;
use serde_yaml::Value;

use crate::entry::{AllowedValues, Entry, DISABLED_TAG, ENABLED_TAG};
use crate::error::{MooseError, Result};

/// Values offered for `bool` parameters.
const BOOL_OPTIONS: [&str; 2] = ["true", "false"];

/// A single named configuration value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub required: bool,
    /// `false` means the parameter is commented out in GetPot form.
    pub enabled: bool,
    pub default: String,
    /// The YAML `cpp_type`, e.g. `bool`, `FileName`, `MooseEnum`.
    pub type_tag: String,
    /// Never `Some` with an empty list.
    pub options: Option<Vec<String>>,
    pub group_name: String,
    pub description: String,
    pub comment: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
            enabled: true,
            ..Default::default()
        }
    }

    /// Set the option list, dropping it entirely when empty.
    pub fn set_options(&mut self, options: Vec<String>) {
        self.options = if options.is_empty() {
            None
        } else {
            Some(options)
        };
    }

    /// Load a parameter from one map of a YAML block's `parameters` list.
    pub fn from_schema_value(value: &Value) -> Result<Self> {
        let map = value
            .as_mapping()
            .ok_or_else(|| MooseError::schema("parameter entry is not a map"))?;

        let mut param = Parameter::default();
        for (key, field) in map {
            let Some(key) = key.as_str() else {
                continue;
            };
            match key {
                "name" => param.name = scalar_text(field, "name")?,
                "description" => param.description = scalar_text(field, "description")?,
                "cpp_type" => param.type_tag = scalar_text(field, "cpp_type")?,
                "group_name" => param.group_name = scalar_text(field, "group_name")?,
                "default" => param.default = scalar_text(field, "default")?,
                "required" => {
                    let required = flag(field)
                        .ok_or_else(|| MooseError::schema("'required' must be a boolean"))?;
                    param.required = required;
                    param.enabled = required;
                }
                "options" => param.set_options(option_list(field)?),
                _ => {}
            }
        }

        if param.name.is_empty() {
            return Err(MooseError::schema("parameter without a name"));
        }
        Ok(param)
    }

    /// Convert to a generic entry whose contract depends on the type tag.
    pub fn to_entry(&self) -> Entry {
        let (allowed, value) = match self.type_tag.as_str() {
            "MooseEnum" | "MultiMooseEnum" if self.options.is_some() => {
                let options = self.options.clone().unwrap_or_default();
                let value = pick_default(&self.default, &options);
                (AllowedValues::Discrete(options), value)
            }
            "bool" => {
                let value = if self.default == "false" { "false" } else { "true" };
                let options = BOOL_OPTIONS.iter().map(|s| s.to_string()).collect();
                (AllowedValues::Discrete(options), value.to_string())
            }
            "FileName" | "MeshFileName" => match &self.options {
                Some(options) => (
                    AllowedValues::File(options.clone()),
                    pick_default(&self.default, options),
                ),
                None => (AllowedValues::File(Vec::new()), self.default.clone()),
            },
            "VariableName" | "AuxVariableName" => {
                (AllowedValues::Discrete(Vec::new()), self.default.clone())
            }
            _ if self.name == "variable" => {
                (AllowedValues::Discrete(Vec::new()), self.default.clone())
            }
            _ => (AllowedValues::FreeText, self.default.clone()),
        };

        let mut entry = Entry::new(self.name.clone(), value, allowed);
        entry.description = self.description.clone();
        entry.comment = self.comment.clone();
        entry.required = self.required;
        entry.tag = if self.enabled { ENABLED_TAG } else { DISABLED_TAG }.to_string();

        // A type discriminator is always mandatory and always live.
        if self.name == "type" {
            entry.required = true;
            entry.tag = ENABLED_TAG.to_string();
        }

        entry
    }

    /// Rebuild a parameter from an (possibly edited) entry.
    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            name: entry.name.clone(),
            required: entry.required,
            enabled: entry.is_enabled(),
            default: entry.value().to_string(),
            type_tag: String::new(),
            options: entry.allowed().options().map(<[String]>::to_vec),
            group_name: String::new(),
            description: entry.description.clone(),
            comment: entry.comment.clone(),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.default)
    }
}

fn pick_default(default: &str, options: &[String]) -> String {
    if options.iter().any(|o| o == default) {
        default.to_string()
    } else {
        options.first().cloned().unwrap_or_default()
    }
}

/// Render a YAML scalar as text. `null` becomes the empty string.
pub(crate) fn scalar_text(value: &Value, field: &str) -> Result<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(MooseError::schema(format!("'{}' must be a scalar", field))),
    }
}

fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s == "true" => Some(true),
        Value::String(s) if s == "false" => Some(false),
        _ => None,
    }
}

/// Options arrive either as a YAML list or as one whitespace-separated string.
fn option_list(value: &Value) -> Result<Vec<String>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items.iter().map(|v| scalar_text(v, "options")).collect(),
        other => Ok(scalar_text(other, "options")?
            .split_whitespace()
            .map(String::from)
            .collect()),
    }
}
