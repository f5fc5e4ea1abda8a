use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::core_api::CoreError;
use crate::document::ProfileDocument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persistence {
    backup_suffix: String,
    xml_header: String,
}

impl Persistence {
    pub fn new(config: &Config) -> Self {
        Self {
            backup_suffix: config.backup_suffix.clone(),
            xml_header: config.xml_header.clone(),
        }
    }

    pub fn backup_path(&self, path: &Path) -> PathBuf {
        let mut raw = OsString::from(path.as_os_str());
        raw.push(&self.backup_suffix);
        PathBuf::from(raw)
    }

    /// Writes `document` over `path`. The first save for a file copies the
    /// untouched original to the backup path; later saves leave that backup
    /// alone.
    pub fn save(&self, path: &Path, document: &ProfileDocument) -> Result<(), CoreError> {
        self.ensure_backup(path)?;

        let text = document.to_xml_string(&self.xml_header)?;
        fs::write(path, text)
            .map_err(|e| CoreError::io(format!("failed to write {}: {e}", path.display())))?;
        log::info!("saved profile {}", path.display());
        Ok(())
    }

    fn ensure_backup(&self, path: &Path) -> Result<(), CoreError> {
        let backup = self.backup_path(path);
        let exists = backup.try_exists().map_err(|e| {
            CoreError::io(format!("failed to check backup {}: {e}", backup.display()))
        })?;
        if exists {
            return Ok(());
        }

        fs::copy(path, &backup).map_err(|e| {
            CoreError::io(format!(
                "failed to back up {} to {}: {e}",
                path.display(),
                backup.display()
            ))
        })?;
        log::info!("backed up {} to {}", path.display(), backup.display());
        Ok(())
    }
}
