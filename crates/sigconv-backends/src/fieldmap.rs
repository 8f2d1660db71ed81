//! Field-name mapping collaborator.
//!
//! Backends never inspect mapping internals; they only resolve a logical
//! field name to one or more target names, and flatten the full target
//! set into an allow-list or column list.

use std::collections::HashMap;

use crate::error::{BackendError, Result};

/// Resolution of one logical field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTarget {
    One(String),
    Many(Vec<String>),
}

impl FieldTarget {
    /// Flatten into a list of target names.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            FieldTarget::One(name) => vec![name],
            FieldTarget::Many(names) => names,
        }
    }
}

/// Interface to the field-mapping configuration subsystem.
pub trait FieldMapping {
    /// Resolve a logical field name to its target name(s). Unmapped
    /// fields resolve to themselves.
    fn resolve(&self, logical: &str) -> FieldTarget;

    /// All target field names reachable through this mapping, with
    /// one-to-many mappings flattened. Used to build allow-lists.
    fn all_targets(&self) -> Vec<String>;
}

/// Table-backed field mapping.
#[derive(Debug, Clone, Default)]
pub struct TableFieldMapping {
    map: HashMap<String, FieldTarget>,
}

impl TableFieldMapping {
    pub fn new() -> Self {
        TableFieldMapping::default()
    }

    pub fn insert(&mut self, logical: impl Into<String>, target: FieldTarget) {
        self.map.insert(logical.into(), target);
    }

    pub fn insert_one(&mut self, logical: impl Into<String>, target: impl Into<String>) {
        self.insert(logical, FieldTarget::One(target.into()));
    }

    pub fn insert_many<I, S>(&mut self, logical: impl Into<String>, targets: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(
            logical,
            FieldTarget::Many(targets.into_iter().map(Into::into).collect()),
        );
    }

    /// Load a mapping table from a YAML mapping. Values may be a single
    /// string or a list of strings:
    ///
    /// ```yaml
    /// CommandLine: process.command_line
    /// Hashes:
    ///   - file.hash.md5
    ///   - file.hash.sha256
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)
            .map_err(|e| BackendError::InvalidMapping(format!("YAML parse error: {e}")))?;
        let obj = value
            .as_mapping()
            .ok_or_else(|| BackendError::InvalidMapping("mapping must be a YAML mapping".into()))?;

        let mut table = TableFieldMapping::new();
        for (k, v) in obj {
            let key = k.as_str().ok_or_else(|| {
                BackendError::InvalidMapping("mapping keys must be strings".into())
            })?;
            match v {
                serde_yaml::Value::String(s) => table.insert_one(key, s.clone()),
                serde_yaml::Value::Sequence(seq) => {
                    let targets: Vec<String> = seq
                        .iter()
                        .filter_map(|item| item.as_str().map(String::from))
                        .collect();
                    if targets.is_empty() {
                        return Err(BackendError::InvalidMapping(format!(
                            "mapping for '{key}' has no string targets"
                        )));
                    }
                    table.insert_many(key, targets);
                }
                _ => {
                    return Err(BackendError::InvalidMapping(format!(
                        "mapping for '{key}' must be a string or list of strings"
                    )))
                }
            }
        }
        Ok(table)
    }
}

impl FieldMapping for TableFieldMapping {
    fn resolve(&self, logical: &str) -> FieldTarget {
        match self.map.get(logical) {
            Some(target) => target.clone(),
            None => FieldTarget::One(logical.to_string()),
        }
    }

    fn all_targets(&self) -> Vec<String> {
        let mut targets = Vec::new();
        for value in self.map.values() {
            match value {
                FieldTarget::One(name) => targets.push(name.clone()),
                FieldTarget::Many(names) => targets.extend(names.iter().cloned()),
            }
        }
        targets
    }
}
