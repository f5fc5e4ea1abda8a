use std::collections::{BTreeSet, HashSet};

use crate::catalog::{CHARACTER_PREFIX, Catalog};
use crate::config::Config;
use crate::document::{
    BASE_CHARACTER, CoinField, ProfileDocument, TokenField, join_sorted, same_key,
};
use crate::persist::Persistence;
use crate::store::Profile;

use super::error::{CoreError, CoreErrorCode};
use super::types::{LogbookSummary, Outcome, ProfileSummary, RejectReason};

pub const MAX_COINS: i64 = i32::MAX as i64;

const SKILL_PREFIXES: [&str; 2] = ["Skills.", "Skins."];
const ITEM_PREFIXES: [&str; 2] = ["Items.", "Artifacts."];
const LOGBOOK_ITEM_PREFIX: &str = "ItemIndex.";
const LOGBOOK_EQUIPMENT_PREFIX: &str = "EquipmentIndex.";
const LOGBOOK_ARTIFACT_PREFIX: &str = "ArtifactIndex.";
const LOGBOOK_DRONE_PREFIX: &str = "DroneIndex.";

/// Applies unlock/lock edits to loaded profiles and writes every accepted
/// edit straight back to disk.
#[derive(Debug, Clone)]
pub struct Engine {
    catalog: Catalog,
    persistence: Persistence,
}

impl Engine {
    pub fn new(config: &Config, catalog: Catalog) -> Self {
        Self {
            catalog,
            persistence: Persistence::new(config),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn summary(&self, profile: &mut Profile) -> Result<ProfileSummary, CoreError> {
        let name = profile.name().to_string();
        let document = profile.document_mut()?;
        Ok(summarize(name, document))
    }

    /// Stores `value` clamped to `0..=i32::MAX` in both coin fields and
    /// returns what was stored.
    pub fn set_coins(&self, profile: &mut Profile, value: i64) -> Result<i64, CoreError> {
        let coins = value.clamp(0, MAX_COINS);
        let document = profile.document_mut()?;
        document.set_coins(CoinField::Coins, coins);
        document.set_coins(CoinField::TotalCollected, coins);
        self.commit(profile)?;
        Ok(coins)
    }

    pub fn unlock(&self, profile: &mut Profile, key: &str) -> Result<Outcome, CoreError> {
        let document = profile.document_mut()?;
        if key.is_empty() || same_key(key, BASE_CHARACTER) {
            return Ok(Outcome::rejected(
                RejectReason::InvalidArgument,
                format!("invalid unlock key '{key}'"),
            ));
        }
        if document.has_unlock(key) {
            return Ok(Outcome::rejected(
                RejectReason::Conflict,
                format!("{key} is already unlocked"),
            ));
        }
        if !document.push_unlock(key) {
            return Ok(Outcome::rejected(
                RejectReason::NotFound,
                format!("cannot unlock {key}: profile has no stats section"),
            ));
        }

        self.commit(profile)?;
        Ok(Outcome::applied(1))
    }

    pub fn lock(&self, profile: &mut Profile, key: &str) -> Result<Outcome, CoreError> {
        let document = profile.document_mut()?;
        if same_key(key, BASE_CHARACTER) {
            return Ok(Outcome::rejected(
                RejectReason::InvalidArgument,
                format!("cannot lock base character {BASE_CHARACTER}"),
            ));
        }
        if !document.has_stats() {
            return Ok(Outcome::rejected(
                RejectReason::NotFound,
                format!("cannot lock {key}: profile has no stats section"),
            ));
        }
        if !document.remove_unlock(key) {
            return Ok(Outcome::rejected(
                RejectReason::Conflict,
                format!("{key} is not unlocked"),
            ));
        }

        self.commit(profile)?;
        Ok(Outcome::applied(1))
    }

    /// Appends to the achievement list without re-sorting it.
    pub fn unlock_achievement(
        &self,
        profile: &mut Profile,
        key: &str,
    ) -> Result<Outcome, CoreError> {
        let document = profile.document_mut()?;
        let Some(mut current) = document.tokens(TokenField::Achievements) else {
            return Ok(missing_field(TokenField::Achievements));
        };
        if current.iter().any(|token| same_key(token, key)) {
            return Ok(Outcome::rejected(
                RejectReason::Conflict,
                format!("achievement {key} is already unlocked"),
            ));
        }

        current.push(key.to_string());
        document.set_tokens(TokenField::Achievements, &current.join(" "));
        self.commit(profile)?;
        Ok(Outcome::applied(1))
    }

    pub fn lock_achievement(&self, profile: &mut Profile, key: &str) -> Result<Outcome, CoreError> {
        let document = profile.document_mut()?;
        let current = match document.tokens(TokenField::Achievements) {
            Some(tokens) if !tokens.is_empty() => tokens,
            _ => {
                return Ok(Outcome::rejected(
                    RejectReason::NotFound,
                    "profile has no unlocked achievements",
                ));
            }
        };

        let remaining: Vec<String> = current
            .iter()
            .filter(|token| !same_key(token, key))
            .cloned()
            .collect();
        let removed = current.len() - remaining.len();
        if removed == 0 {
            return Ok(Outcome::rejected(
                RejectReason::Conflict,
                format!("achievement {key} is not unlocked"),
            ));
        }

        document.set_tokens(TokenField::Achievements, &remaining.join(" "));
        self.commit(profile)?;
        Ok(Outcome::applied(removed))
    }

    /// Discovers one logbook entry, or every catalog entry when `item` is
    /// `None` or empty. Logbook entries match case-sensitively.
    pub fn unlock_logbook(
        &self,
        profile: &mut Profile,
        item: Option<&str>,
    ) -> Result<Outcome, CoreError> {
        let document = profile.document_mut()?;
        let mut current: BTreeSet<String> = document
            .tokens(TokenField::DiscoveredPickups)
            .unwrap_or_default()
            .into_iter()
            .collect();

        let count = match item.filter(|item| !item.is_empty()) {
            Some(item) => {
                if current.contains(item) {
                    return Ok(Outcome::rejected(
                        RejectReason::Conflict,
                        format!("logbook entry {item} is already unlocked"),
                    ));
                }
                current.insert(item.to_string());
                1
            }
            None => self
                .catalog
                .logbook_entries()
                .filter(|entry| !entry.is_empty())
                .filter(|entry| current.insert((*entry).to_string()))
                .count(),
        };

        document.ensure_field(TokenField::DiscoveredPickups);
        document.set_tokens(TokenField::DiscoveredPickups, &join_sorted(current));
        self.commit(profile)?;
        Ok(Outcome::applied(count))
    }

    pub fn lock_logbook(&self, profile: &mut Profile, item: &str) -> Result<Outcome, CoreError> {
        let document = profile.document_mut()?;
        let mut current: BTreeSet<String> = match document.tokens(TokenField::DiscoveredPickups) {
            Some(tokens) if !tokens.is_empty() => tokens.into_iter().collect(),
            _ => {
                return Ok(Outcome::rejected(
                    RejectReason::NotFound,
                    "logbook is empty",
                ));
            }
        };
        if !current.remove(item) {
            return Ok(Outcome::rejected(
                RejectReason::Conflict,
                format!("logbook entry {item} is not unlocked"),
            ));
        }

        document.set_tokens(TokenField::DiscoveredPickups, &join_sorted(current));
        self.commit(profile)?;
        Ok(Outcome::applied(1))
    }

    pub fn clear_logbook(&self, profile: &mut Profile) -> Result<Outcome, CoreError> {
        let document = profile.document_mut()?;
        let cleared = document
            .tokens(TokenField::DiscoveredPickups)
            .map_or(0, |tokens| tokens.len());
        document.set_tokens(TokenField::DiscoveredPickups, "");
        self.commit(profile)?;
        Ok(Outcome::applied(cleared))
    }

    /// Adds every catalog unlock, achievement and logbook entry the profile
    /// lacks. The count covers all three; coins are left alone.
    pub fn unlock_all(&self, profile: &mut Profile) -> Result<Outcome, CoreError> {
        let document = profile.document_mut()?;
        if !document.has_stats() {
            return Ok(Outcome::rejected(
                RejectReason::NotFound,
                "cannot unlock: profile has no stats section",
            ));
        }

        let mut total = 0usize;

        let mut existing: HashSet<String> = document
            .unlocks()
            .iter()
            .map(|token| token.to_lowercase())
            .collect();
        existing.insert(BASE_CHARACTER.to_lowercase());
        for key in self.catalog.unlock_keys() {
            if key.is_empty() || !existing.insert(key.to_lowercase()) {
                continue;
            }
            document.push_unlock(&key);
            total += 1;
        }

        if let Some(mut achievements) = document.tokens(TokenField::Achievements) {
            let mut seen: HashSet<String> =
                achievements.iter().map(|token| token.to_lowercase()).collect();
            for achievement in &self.catalog.achievements {
                if achievement.is_empty() || !seen.insert(achievement.to_lowercase()) {
                    continue;
                }
                achievements.push(achievement.clone());
                total += 1;
            }
            document.set_tokens(TokenField::Achievements, &join_sorted(achievements));
        }

        document.ensure_field(TokenField::DiscoveredPickups);
        let mut discovered: BTreeSet<String> = document
            .tokens(TokenField::DiscoveredPickups)
            .unwrap_or_default()
            .into_iter()
            .collect();
        total += self
            .catalog
            .all_logbook_entries()
            .filter(|entry| !entry.is_empty())
            .filter(|entry| discovered.insert((*entry).to_string()))
            .count();
        document.set_tokens(TokenField::DiscoveredPickups, &join_sorted(discovered));

        self.commit(profile)?;
        log::info!("unlocked {total} entries in {}", profile.key());
        Ok(Outcome::applied(total))
    }

    /// Removes every unlock except the base character and empties the
    /// achievement and logbook lists.
    pub fn lock_all(&self, profile: &mut Profile) -> Result<Outcome, CoreError> {
        let document = profile.document_mut()?;
        let removed = document.retain_unlocks(|token| same_key(token, BASE_CHARACTER));
        document.set_tokens(TokenField::Achievements, "");
        document.set_tokens(TokenField::DiscoveredPickups, "");

        self.commit(profile)?;
        log::info!("locked {removed} unlock entries in {}", profile.key());
        Ok(Outcome::applied(removed))
    }

    fn commit(&self, profile: &Profile) -> Result<(), CoreError> {
        let document = profile.document().ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::ProfileNotFound,
                format!("profile {} is not loaded", profile.key()),
            )
        })?;
        self.persistence.save(profile.path(), document)
    }
}

fn missing_field(field: TokenField) -> Outcome {
    Outcome::rejected(
        RejectReason::NotFound,
        format!("profile has no {} field", field.tag()),
    )
}

fn summarize(name: String, document: &ProfileDocument) -> ProfileSummary {
    let mut characters = BTreeSet::from([BASE_CHARACTER.to_string()]);
    let mut skills_skins = Vec::new();
    let mut items = Vec::new();
    for token in document.unlocks() {
        if token.starts_with(CHARACTER_PREFIX) {
            characters.insert(token);
        } else if has_any_prefix(&token, &SKILL_PREFIXES) {
            skills_skins.push(token);
        } else if has_any_prefix(&token, &ITEM_PREFIXES) {
            items.push(token);
        }
    }
    skills_skins.sort();
    items.sort();

    let mut achievements = document
        .tokens(TokenField::Achievements)
        .unwrap_or_default();
    achievements.sort();

    let discovered = document
        .tokens(TokenField::DiscoveredPickups)
        .unwrap_or_default();
    let logbook = LogbookSummary {
        items: sorted_with_prefix(&discovered, LOGBOOK_ITEM_PREFIX),
        equipment: sorted_with_prefix(&discovered, LOGBOOK_EQUIPMENT_PREFIX),
        artifacts: sorted_with_prefix(&discovered, LOGBOOK_ARTIFACT_PREFIX),
        drones: sorted_with_prefix(&discovered, LOGBOOK_DRONE_PREFIX),
    };

    ProfileSummary {
        name,
        coins: document.coins(CoinField::Coins).unwrap_or(0),
        characters: characters.into_iter().collect(),
        skills_skins,
        items,
        achievements,
        logbook,
        logbook_total: discovered.len(),
    }
}

fn has_any_prefix(token: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| token.starts_with(prefix))
}

fn sorted_with_prefix(tokens: &[String], prefix: &str) -> Vec<String> {
    let mut out: Vec<String> = tokens
        .iter()
        .filter(|token| token.starts_with(prefix))
        .cloned()
        .collect();
    out.sort();
    out
}
