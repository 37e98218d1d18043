//! Host-supplied text variables.
//!
//! Text layers do not carry free text: each one references a variable
//! from a catalog the host page supplies (vehicle price, address, ...),
//! optionally with one of the variable's formatting variants selected.
//! The catalog is read-only from the designer's perspective.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// One formatting variant a variable offers, e.g. `"currency"` → `"$ 24,900"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formatting {
    pub format: String,
    pub result: String,
}

/// A host-supplied text variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextVariable {
    /// Picker label, e.g. "Price".
    pub label: String,
    /// Unformatted display value.
    pub value: String,
    /// Optional formatting variants.
    #[serde(default)]
    pub formatting: SmallVec<[Formatting; 2]>,
}

/// Mapping from variable name to its definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableCatalog {
    vars: HashMap<String, TextVariable>,
}

impl VariableCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, var: TextVariable) {
        self.vars.insert(name.into(), var);
    }

    pub fn get(&self, name: &str) -> Option<&TextVariable> {
        self.vars.get(name)
    }

    /// Variable names in sorted order (for stable pickers).
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.vars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve the display string for a variable/format selection.
    ///
    /// No selection resolves to the empty string. An unknown variable
    /// also resolves to empty (logged); an unknown format falls back to
    /// the variable's raw value.
    pub fn display(&self, variable: Option<&str>, format: Option<&str>) -> String {
        let Some(name) = variable else {
            return String::new();
        };
        let Some(var) = self.vars.get(name) else {
            log::warn!("unknown text variable `{name}`");
            return String::new();
        };
        if let Some(wanted) = format
            && let Some(found) = var.formatting.iter().find(|f| f.format == wanted)
        {
            return found.result.clone();
        }
        var.value.clone()
    }
}
