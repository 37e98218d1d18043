//! Font inventory and the style-availability gate.
//!
//! The host page discovers available font families (and which style
//! variants each family ships) at startup and hands the result to the
//! designer. Text layers must never select bold/italic styling that the
//! chosen family does not provide; when the family changes, flags the new
//! family lacks are cleared and are not re-enabled automatically if the
//! user switches back.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// A style variant a font family may ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontVariant {
    Regular,
    Bold,
    Italic,
    #[serde(rename = "bolditalic")]
    BoldItalic,
}

/// Available font families and their variant sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontInventory {
    families: HashMap<String, SmallVec<[FontVariant; 4]>>,
}

impl FontInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, family: impl Into<String>, variants: &[FontVariant]) {
        self.families.insert(family.into(), variants.into());
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    pub fn contains(&self, family: &str) -> bool {
        self.families.contains_key(family)
    }

    /// Family names in sorted order (for stable pickers).
    pub fn families(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.families.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn supports(&self, family: &str, variant: FontVariant) -> bool {
        self.families
            .get(family)
            .is_some_and(|vs| vs.contains(&variant))
    }

    /// Clear style flags the given family does not provide. Returns true
    /// if anything changed. An unknown family clears both flags.
    pub fn clear_unsupported(&self, family: &str, bold: &mut bool, italic: &mut bool) -> bool {
        let mut changed = false;
        if *bold && !self.supports(family, FontVariant::Bold) {
            *bold = false;
            changed = true;
        }
        if *italic && !self.supports(family, FontVariant::Italic) {
            *italic = false;
            changed = true;
        }
        if changed {
            log::debug!("cleared unsupported style flags for family `{family}`");
        }
        changed
    }
}
