use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode};

pub const CHARACTER_PREFIX: &str = "Characters.";
pub const LOGBOOK_CATEGORIES: [&str; 4] = ["Items", "Equipment", "Artifacts", "Drones"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterEntry {
    #[serde(default)]
    pub unlocks: Vec<String>,
}

/// Static reference data for everything a profile can unlock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "Characters", default)]
    pub characters: BTreeMap<String, CharacterEntry>,
    #[serde(rename = "Items", default)]
    pub items: Vec<String>,
    #[serde(rename = "Achievements", default)]
    pub achievements: Vec<String>,
    #[serde(rename = "Logbook", default)]
    pub logbook: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CoreError> {
        serde_json::from_str(raw).map_err(|e| {
            CoreError::new(CoreErrorCode::Parse, format!("invalid catalog data: {e}"))
        })
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            CoreError::io(format!("failed to read catalog {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// Missing or broken catalog data degrades to an empty catalog so bulk
    /// operations report zero additions instead of failing.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(catalog) => {
                log::debug!(
                    "loaded catalog from {}: {} characters, {} items, {} achievements",
                    path.display(),
                    catalog.characters.len(),
                    catalog.items.len(),
                    catalog.achievements.len()
                );
                catalog
            }
            Err(e) => {
                log::warn!("using empty catalog: {e}");
                Self::empty()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
            && self.items.is_empty()
            && self.achievements.is_empty()
            && self.logbook.values().all(Vec::is_empty)
    }

    /// Character base keys followed by their dependent skill/skin keys, then
    /// every item key, in catalog order.
    pub fn unlock_keys(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (name, entry) in &self.characters {
            out.push(character_key(name));
            out.extend(entry.unlocks.iter().cloned());
        }
        out.extend(self.items.iter().cloned());
        out
    }

    /// Logbook entries of the four known categories, in category order.
    pub fn logbook_entries(&self) -> impl Iterator<Item = &str> {
        LOGBOOK_CATEGORIES
            .iter()
            .filter_map(|category| self.logbook.get(*category))
            .flatten()
            .map(String::as_str)
    }

    /// Logbook entries of every category present in the data, known or not.
    pub fn all_logbook_entries(&self) -> impl Iterator<Item = &str> {
        self.logbook.values().flatten().map(String::as_str)
    }
}

pub fn character_key(name: &str) -> String {
    format!("{CHARACTER_PREFIX}{name}")
}
