//! Operating system identification and Stata executable discovery

use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Host operating system, identified the way the `platform` config key spells it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
    Other(String),
}

impl Platform {
    /// Platform of the running process
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => Platform::Windows,
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            other => Platform::Other(other.to_string()),
        }
    }

    /// Parse an identifier such as `win32`, `linux` or `darwin`
    pub fn from_identifier(identifier: &str) -> Self {
        match identifier {
            "win32" | "windows" => Platform::Windows,
            "linux" => Platform::Linux,
            "darwin" | "macos" => Platform::MacOs,
            other => Platform::Other(other.to_string()),
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Platform::Windows => "win32",
            Platform::Linux => "linux",
            Platform::MacOs => "darwin",
            Platform::Other(name) => name,
        }
    }

    /// Whether Stata's default log naming is unusable and the log name must be passed explicitly.
    ///
    /// On Windows Stata derives the log name from the last argument, cutting at `::` and dropping
    /// parent directories, so parametrized tasks would overwrite each other's logs.
    pub fn requires_log_override(&self) -> bool {
        matches!(self, Platform::Windows)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl From<String> for Platform {
    fn from(value: String) -> Self {
        Platform::from_identifier(&value)
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        value.identifier().to_string()
    }
}

const MACOS_COMMANDS: &[&str] = &[
    "Stata64MP",
    "StataMP",
    "Stata64SE",
    "StataSE",
    "Stata64",
    "Stata",
];

const LINUX_COMMANDS: &[&str] = &["stata-mp", "stata-se", "stata"];

const WINDOWS_COMMANDS: &[&str] = &[
    "StataMP-64",
    "StataMP-ia",
    "StataMP",
    "StataSE-64",
    "StataSE-ia",
    "StataSE",
    "Stata-64",
    "Stata-ia",
    "Stata",
    "WMPSTATA",
    "WSESTATA",
    "WSTATA",
];

/// Stata executables to look for on `platform`, most capable edition first
pub fn candidate_executables(platform: &Platform) -> &'static [&'static str] {
    match platform {
        Platform::MacOs => MACOS_COMMANDS,
        Platform::Linux => LINUX_COMMANDS,
        Platform::Windows => WINDOWS_COMMANDS,
        Platform::Other(_) => &[],
    }
}

/// Return the first candidate that exists in one of the directories of `path_var`.
///
/// The candidate name is returned as-is so the subprocess resolves it through `PATH` again.
pub fn find_executable(platform: &Platform, path_var: Option<&OsStr>) -> Option<String> {
    let path_var = path_var?;
    let dirs: Vec<PathBuf> = std::env::split_paths(path_var).collect();

    candidate_executables(platform)
        .iter()
        .find(|candidate| {
            dirs.iter()
                .any(|dir| is_executable_in(dir, candidate, platform))
        })
        .map(|candidate| {
            debug!("Found Stata executable: {}", candidate);
            candidate.to_string()
        })
}

/// Discover Stata on the `PATH` of the running process
pub fn discover_executable(platform: &Platform) -> Option<String> {
    let path_var = std::env::var_os("PATH");
    find_executable(platform, path_var.as_deref())
}

fn is_executable_in(dir: &Path, name: &str, platform: &Platform) -> bool {
    if is_executable(&dir.join(name)) {
        return true;
    }
    matches!(platform, Platform::Windows) && is_executable(&dir.join(format!("{name}.exe")))
}

/// A regular file the current user may launch
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .is_ok_and(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_executable(path: &Path) {
        fs::write(path, "").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[test]
    fn test_platform_identifiers_roundtrip() {
        for identifier in ["win32", "linux", "darwin", "freebsd"] {
            assert_eq!(Platform::from_identifier(identifier).identifier(), identifier);
        }
    }

    #[test]
    fn test_only_windows_requires_log_override() {
        assert!(Platform::Windows.requires_log_override());
        assert!(!Platform::Linux.requires_log_override());
        assert!(!Platform::MacOs.requires_log_override());
        assert!(!Platform::Other("freebsd".into()).requires_log_override());
    }

    #[test]
    fn test_candidate_lists() {
        assert_eq!(
            candidate_executables(&Platform::Linux),
            &["stata-mp", "stata-se", "stata"]
        );
        assert_eq!(candidate_executables(&Platform::MacOs)[0], "Stata64MP");
        assert_eq!(candidate_executables(&Platform::Windows).len(), 12);
        assert_eq!(candidate_executables(&Platform::Windows)[11], "WSTATA");
        assert!(candidate_executables(&Platform::Other("aix".into())).is_empty());
    }

    #[test]
    fn test_find_executable_prefers_earlier_candidate() {
        let temp_dir = TempDir::new().unwrap();
        write_executable(&temp_dir.path().join("stata"));
        write_executable(&temp_dir.path().join("stata-se"));

        let path_var = std::env::join_paths([temp_dir.path()]).unwrap();
        let found = find_executable(&Platform::Linux, Some(path_var.as_os_str()));
        assert_eq!(found.as_deref(), Some("stata-se"));
    }

    #[test]
    fn test_find_executable_with_exe_suffix_on_windows() {
        let temp_dir = TempDir::new().unwrap();
        write_executable(&temp_dir.path().join("StataSE-64.exe"));

        let path_var = std::env::join_paths([temp_dir.path()]).unwrap();
        assert_eq!(
            find_executable(&Platform::Windows, Some(path_var.as_os_str())).as_deref(),
            Some("StataSE-64")
        );
        assert_eq!(find_executable(&Platform::Linux, Some(path_var.as_os_str())), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_find_executable_skips_files_without_execute_bit() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let stata = temp_dir.path().join("stata");
        fs::write(&stata, "").unwrap();
        fs::set_permissions(&stata, fs::Permissions::from_mode(0o644)).unwrap();

        let path_var = std::env::join_paths([temp_dir.path()]).unwrap();
        assert_eq!(find_executable(&Platform::Linux, Some(path_var.as_os_str())), None);

        write_executable(&temp_dir.path().join("stata-se"));
        assert_eq!(
            find_executable(&Platform::Linux, Some(path_var.as_os_str())).as_deref(),
            Some("stata-se")
        );
    }

    #[test]
    fn test_find_executable_without_path() {
        assert_eq!(find_executable(&Platform::Linux, None), None);

        let temp_dir = TempDir::new().unwrap();
        let path_var = std::env::join_paths([temp_dir.path()]).unwrap();
        assert_eq!(find_executable(&Platform::Linux, Some(path_var.as_os_str())), None);
    }
}
