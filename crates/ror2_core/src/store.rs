use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::core_api::{CoreError, CoreErrorCode, ProfileListing};
use crate::document::ProfileDocument;

const USERDATA_DIR: &str = "userdata";

/// A discovered profile file and, while loaded, its parsed tree.
#[derive(Debug, Clone)]
pub struct Profile {
    account_id: String,
    file_name: String,
    name: String,
    path: PathBuf,
    document: Option<ProfileDocument>,
}

impl Profile {
    pub fn new(
        account_id: impl Into<String>,
        file_name: impl Into<String>,
        path: impl Into<PathBuf>,
        document: ProfileDocument,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            file_name: file_name.into(),
            name: document.display_name().unwrap_or_default(),
            path: path.into(),
            document: Some(document),
        }
    }

    /// Loads a single profile file outside of any scan.
    pub fn open(account_id: impl Into<String>, path: &Path) -> Result<Self, CoreError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| {
                CoreError::io(format!("{} does not name a file", path.display()))
            })?;
        let document = ProfileDocument::load(path)?;
        Ok(Self::new(account_id, file_name, path, document))
    }

    pub fn key(&self) -> String {
        profile_key(&self.account_id, &self.file_name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    pub fn document(&self) -> Option<&ProfileDocument> {
        self.document.as_ref()
    }

    /// The loaded tree, parsing the backing file first if it was evicted.
    pub fn document_mut(&mut self) -> Result<&mut ProfileDocument, CoreError> {
        let document = match self.document.take() {
            Some(document) => document,
            None => {
                log::debug!("reloading evicted profile {}", self.path.display());
                ProfileDocument::load(&self.path)?
            }
        };
        Ok(self.document.insert(document))
    }

    pub fn evict(&mut self) {
        self.document = None;
    }

    pub fn listing(&self) -> ProfileListing {
        ProfileListing {
            id: self.key(),
            account_id: self.account_id.clone(),
            name: self.name.clone(),
            file: self.file_name.clone(),
        }
    }
}

pub fn profile_key(account_id: &str, file_name: &str) -> String {
    format!("{account_id}_{file_name}")
}

/// Profiles from the most recent scan, keyed by [`profile_key`].
#[derive(Debug, Clone)]
pub struct ProfileStore {
    profile_subpath: PathBuf,
    profiles: BTreeMap<String, Profile>,
}

impl ProfileStore {
    pub fn new(config: &Config) -> Self {
        Self {
            profile_subpath: config.profile_subpath.clone(),
            profiles: BTreeMap::new(),
        }
    }

    /// Rescans `roots` and replaces everything previously cached.
    pub fn discover<I, P>(&mut self, roots: I) -> &BTreeMap<String, Profile>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let roots: BTreeSet<PathBuf> = roots
            .into_iter()
            .map(|root| root.as_ref().to_path_buf())
            .collect();

        let mut found = BTreeMap::new();
        for root in &roots {
            scan_root(root, &self.profile_subpath, &mut found);
        }
        log::info!(
            "discovered {} profile(s) across {} root(s)",
            found.len(),
            roots.len()
        );

        self.profiles = found;
        &self.profiles
    }

    pub fn get(&mut self, key: &str) -> Result<&mut Profile, CoreError> {
        let profile = self.profiles.get_mut(key).ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::ProfileNotFound,
                format!("no profile with id {key}"),
            )
        })?;
        profile.document_mut()?;
        Ok(profile)
    }

    /// Forgets a profile's parsed tree; the next `get` reads the file again.
    pub fn evict(&mut self, key: &str) -> bool {
        match self.profiles.get_mut(key) {
            Some(profile) => {
                profile.evict();
                true
            }
            None => false,
        }
    }

    pub fn profiles(&self) -> &BTreeMap<String, Profile> {
        &self.profiles
    }

    pub fn listing(&self) -> Vec<ProfileListing> {
        self.profiles.values().map(Profile::listing).collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn scan_root(root: &Path, subpath: &Path, found: &mut BTreeMap<String, Profile>) {
    let userdata = root.join(USERDATA_DIR);
    let Ok(accounts) = fs::read_dir(&userdata) else {
        log::debug!("no userdata directory under {}", root.display());
        return;
    };

    let mut account_ids: Vec<String> = accounts
        .flatten()
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    account_ids.sort();

    for account_id in account_ids {
        let profile_dir = userdata.join(&account_id).join(subpath);
        if !profile_dir.is_dir() {
            continue;
        }
        scan_profile_dir(&account_id, &profile_dir, found);
    }
}

fn scan_profile_dir(account_id: &str, dir: &Path, found: &mut BTreeMap<String, Profile>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("failed to list {}: {e}", dir.display());
            return;
        }
    };

    let mut file_names: Vec<String> = entries
        .flatten()
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| is_profile_file_name(name))
        .collect();
    file_names.sort();

    for file_name in file_names {
        let path = dir.join(&file_name);
        if !path.is_file() {
            continue;
        }

        let document = match ProfileDocument::load(&path) {
            Ok(document) => document,
            Err(e) => {
                log::warn!("skipping profile {}: {e}", path.display());
                continue;
            }
        };
        if document.display_name().is_none() {
            log::warn!("skipping profile {}: no <name> field", path.display());
            continue;
        }

        let profile = Profile::new(account_id, file_name, path, document);
        let key = profile.key();
        if found.contains_key(&key) {
            log::warn!(
                "ignoring duplicate profile {} at {}",
                key,
                profile.path().display()
            );
            continue;
        }
        found.insert(key, profile);
    }
}

fn is_profile_file_name(name: &str) -> bool {
    !name.starts_with('.') && name.to_ascii_lowercase().ends_with(".xml")
}

#[cfg(test)]
mod tests {
    use super::{is_profile_file_name, profile_key};

    #[test]
    fn profile_file_filter() {
        assert!(is_profile_file_name("abc.xml"));
        assert!(is_profile_file_name("ABC.XML"));
        assert!(!is_profile_file_name(".hidden.xml"));
        assert!(!is_profile_file_name("abc.xml.bak"));
        assert!(!is_profile_file_name("notes.txt"));
    }

    #[test]
    fn key_joins_account_and_file() {
        assert_eq!(profile_key("1234", "p.xml"), "1234_p.xml");
    }
}
