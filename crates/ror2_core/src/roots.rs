use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

const LIBRARY_FOLDERS: [&str; 2] = ["steamapps", "libraryfolders.vdf"];

/// Every `"path"` value listed in a Steam `libraryfolders.vdf`.
pub fn parse_library_folders(contents: &str) -> Vec<PathBuf> {
    contents
        .lines()
        .map(str::trim_start)
        .filter(|line| line.starts_with("\"path\""))
        .filter_map(|line| line.split('"').nth(3))
        .map(|raw| PathBuf::from(raw.replace("\\\\", "\\")))
        .collect()
}

/// Library folders registered with the Steam install at `steam_root`.
pub fn library_folders(steam_root: &Path) -> Vec<PathBuf> {
    let vdf = LIBRARY_FOLDERS
        .iter()
        .fold(steam_root.to_path_buf(), |path, part| path.join(part));
    match fs::read_to_string(&vdf) {
        Ok(contents) => parse_library_folders(&contents),
        Err(_) => Vec::new(),
    }
}

/// Existing candidate roots plus the library folders each one lists,
/// deduplicated and sorted.
pub fn expand_roots<I>(candidates: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut out = BTreeSet::new();
    for candidate in candidates {
        if !candidate.is_dir() {
            continue;
        }
        out.extend(library_folders(&candidate));
        out.insert(candidate);
    }
    out.into_iter().collect()
}

/// Well-known Steam install locations for this platform.
pub fn default_roots() -> Vec<PathBuf> {
    expand_roots(platform_candidates())
}

#[cfg(windows)]
fn platform_candidates() -> Vec<PathBuf> {
    let mut out = Vec::new();
    for letter in b'A'..=b'Z' {
        let drive = PathBuf::from(format!("{}:\\", letter as char));
        if !drive.exists() {
            continue;
        }
        out.push(drive.join("Program Files (x86)").join("Steam"));
        out.push(drive.join("Program Files").join("Steam"));
    }
    out
}

#[cfg(not(windows))]
fn platform_candidates() -> Vec<PathBuf> {
    let Some(home) = std::env::var_os("HOME").map(PathBuf::from) else {
        return Vec::new();
    };
    vec![
        home.join(".steam").join("steam"),
        home.join(".local").join("share").join("Steam"),
    ]
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{expand_roots, parse_library_folders};

    const VDF: &str = r#""libraryfolders"
{
	"0"
	{
		"path"		"C:\\Program Files (x86)\\Steam"
		"label"		""
	}
	"1"
	{
		"path"		"D:\\SteamLibrary"
		"apps"
		{
			"632360"		"1234"
		}
	}
}"#;

    fn temp_test_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "ror2_unlocker_{}_{}_{}",
            prefix,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn parses_library_paths() {
        assert_eq!(
            parse_library_folders(VDF),
            vec![
                PathBuf::from("C:\\Program Files (x86)\\Steam"),
                PathBuf::from("D:\\SteamLibrary"),
            ]
        );
    }

    #[test]
    fn ignores_malformed_path_lines() {
        assert!(parse_library_folders("\"path\"\n\"label\" \"x\"").is_empty());
    }

    #[test]
    fn expand_roots_skips_missing_and_adds_libraries() {
        let root = temp_test_dir("roots_expand");
        let steam = root.join("Steam");
        let library = root.join("Library");
        fs::create_dir_all(steam.join("steamapps")).expect("failed to create steamapps");
        fs::create_dir_all(&library).expect("failed to create library");
        fs::write(
            steam.join("steamapps").join("libraryfolders.vdf"),
            format!("\"1\"\n{{\n\t\"path\"\t\t\"{}\"\n}}\n", library.display()),
        )
        .expect("failed to write vdf");

        let roots = expand_roots(vec![steam.clone(), root.join("missing"), steam.clone()]);
        let mut expected = vec![library.clone(), steam.clone()];
        expected.sort();
        assert_eq!(roots, expected);

        let _ = fs::remove_dir_all(&root);
    }
}
