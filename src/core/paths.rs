/*
 * Resolves the location of the Windsurf storage file for the host platform and
 * the selected installation variant. The pure path computation is kept separate
 * from the host-dependent base-directory lookup so that the former can be unit
 * tested on any operating system.
 *
 * The base application-support directory follows what Windsurf itself uses:
 * the roaming profile directory on Windows (taken from the `APPDATA`
 * environment variable), `~/Library/Application Support` on macOS and
 * `~/.config` on Linux. An absent `APPDATA` (or an undeterminable home
 * directory) yields an empty base path, which then fails the existence check
 * with `BaseDirectoryMissing` rather than producing a bogus location.
 */
use directories::BaseDirs;
use std::env;
use std::path::{Path, PathBuf};

const STABLE_DIR_NAME: &str = "Windsurf";
const NEXT_DIR_NAME: &str = "Windsurf - Next";
const STORAGE_FILE_NAME: &str = "storage.json";

/*
 * Selects which of the two parallel Windsurf installations is targeted. The
 * variant only influences path resolution; every other part of the reset
 * behaves identically for both.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Stable,
    Next,
}

impl Variant {
    /// Name of the variant's directory under the application-support root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Variant::Stable => STABLE_DIR_NAME,
            Variant::Next => NEXT_DIR_NAME,
        }
    }

    /// Human-readable product name for status output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Variant::Stable => "Windsurf",
            Variant::Next => "Windsurf Next",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Stable => write!(f, "stable"),
            Variant::Next => write!(f, "next"),
        }
    }
}

#[derive(Debug)]
pub enum PathResolutionError {
    UnsupportedPlatform(String),
    BaseDirectoryMissing(PathBuf),
}

impl std::fmt::Display for PathResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathResolutionError::UnsupportedPlatform(os) => {
                write!(f, "Unsupported OS: {os}")
            }
            PathResolutionError::BaseDirectoryMissing(path) => {
                write!(f, "Base directory does not exist: {path:?}")
            }
        }
    }
}

impl std::error::Error for PathResolutionError {}

pub type Result<T> = std::result::Result<T, PathResolutionError>;

/*
 * Maps an OS name (as reported by `std::env::consts::OS`) to the base
 * application-support directory Windsurf stores its configuration under.
 * Returns `None` for operating systems the target application does not ship
 * on. The returned path is not checked for existence here.
 */
pub fn base_support_dir(os_name: &str) -> Option<PathBuf> {
    match os_name {
        "windows" => Some(PathBuf::from(env::var_os("APPDATA").unwrap_or_default())),
        "macos" => Some(home_dir().join("Library").join("Application Support")),
        "linux" => Some(home_dir().join(".config")),
        _ => None,
    }
}

fn home_dir() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_default()
}

/// Pure computation of the storage file path under a given base directory.
pub fn storage_file_path(base_dir: &Path, variant: Variant) -> PathBuf {
    base_dir
        .join(variant.dir_name())
        .join("User")
        .join("globalStorage")
        .join(STORAGE_FILE_NAME)
}

/*
 * Resolves the storage file path under an explicit base directory, first
 * verifying that the base directory itself exists. The per-variant subpath and
 * the storage file are allowed to be absent; only the application-support root
 * is required.
 */
pub fn resolve_in_base(base_dir: &Path, variant: Variant) -> Result<PathBuf> {
    if !base_dir.exists() {
        log::debug!("Paths: Base directory {base_dir:?} does not exist.");
        return Err(PathResolutionError::BaseDirectoryMissing(
            base_dir.to_path_buf(),
        ));
    }
    Ok(storage_file_path(base_dir, variant))
}

/*
 * Resolves the storage file path for a named operating system and variant.
 * Fails with `UnsupportedPlatform` for an unrecognized OS name and with
 * `BaseDirectoryMissing` when the computed application-support root is absent
 * on disk.
 */
pub fn resolve_storage_file(os_name: &str, variant: Variant) -> Result<PathBuf> {
    log::trace!("Paths: Resolving storage file for os '{os_name}', variant '{variant}'");
    let base_dir = base_support_dir(os_name)
        .ok_or_else(|| PathResolutionError::UnsupportedPlatform(os_name.to_string()))?;
    resolve_in_base(&base_dir, variant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_storage_file_path_stable_variant() {
        let base = Path::new("/support/root");
        let path = storage_file_path(base, Variant::Stable);
        assert_eq!(
            path,
            Path::new("/support/root")
                .join("Windsurf")
                .join("User")
                .join("globalStorage")
                .join("storage.json")
        );
    }

    #[test]
    fn test_storage_file_path_next_variant() {
        let base = Path::new("/support/root");
        let path = storage_file_path(base, Variant::Next);
        assert_eq!(
            path,
            Path::new("/support/root")
                .join("Windsurf - Next")
                .join("User")
                .join("globalStorage")
                .join("storage.json")
        );
    }

    #[test]
    fn test_storage_file_path_is_deterministic() {
        let base = Path::new("/some/base");
        for variant in [Variant::Stable, Variant::Next] {
            assert_eq!(
                storage_file_path(base, variant),
                storage_file_path(base, variant),
                "Same inputs must yield the same path"
            );
        }
    }

    #[test]
    fn test_resolve_in_base_with_existing_base() {
        let dir = tempdir().unwrap();
        let resolved = resolve_in_base(dir.path(), Variant::Stable)
            .expect("Resolution should succeed when the base directory exists");
        assert!(resolved.starts_with(dir.path()));
        assert_eq!(
            resolved.file_name().unwrap_or_default(),
            STORAGE_FILE_NAME
        );
        // The storage file itself need not exist for resolution to succeed.
        assert!(!resolved.exists());
    }

    #[test]
    fn test_resolve_in_base_missing_base_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does_not_exist");
        let result = resolve_in_base(&missing, Variant::Stable);
        match result {
            Err(PathResolutionError::BaseDirectoryMissing(path)) => {
                assert_eq!(path, missing);
            }
            other => panic!("Expected BaseDirectoryMissing, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_storage_file_unsupported_os() {
        let result = resolve_storage_file("plan9", Variant::Stable);
        match result {
            Err(PathResolutionError::UnsupportedPlatform(os)) => assert_eq!(os, "plan9"),
            other => panic!("Expected UnsupportedPlatform, got {other:?}"),
        }
    }

    #[test]
    fn test_variant_directory_names() {
        assert_eq!(Variant::Stable.dir_name(), "Windsurf");
        assert_eq!(Variant::Next.dir_name(), "Windsurf - Next");
    }

    #[test]
    fn test_empty_base_path_never_exists() {
        // An absent APPDATA resolves to an empty base path, which must fail
        // the existence check rather than resolve to a relative location.
        let result = resolve_in_base(Path::new(""), Variant::Next);
        assert!(matches!(
            result,
            Err(PathResolutionError::BaseDirectoryMissing(_))
        ));
    }
}
