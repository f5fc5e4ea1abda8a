use std::path::PathBuf;

pub const DEFAULT_PROFILE_SUBPATH: [&str; 3] = ["632360", "remote", "UserProfiles"];
pub const DEFAULT_BACKUP_SUFFIX: &str = ".bak";
pub const DEFAULT_XML_HEADER: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Settings shared by the store and the engine. Owned by whoever builds
/// them; nothing here is global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Relative path below `userdata/{account}` that holds profile files.
    pub profile_subpath: PathBuf,
    pub backup_suffix: String,
    /// Emitted verbatim in front of every serialized profile.
    pub xml_header: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile_subpath: DEFAULT_PROFILE_SUBPATH.iter().collect(),
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
            xml_header: DEFAULT_XML_HEADER.to_string(),
        }
    }
}
