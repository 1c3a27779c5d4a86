/*
 * Read/modify/write access to the target application's `storage.json`. The
 * file is a flat JSON object mapping string keys to arbitrary JSON values; it
 * is owned by the target application, and this module only touches it for the
 * duration of a single load-modify-save cycle.
 *
 * Loading deliberately never fails: a missing file and malformed contents both
 * yield an empty mapping so the reset can make forward progress even when the
 * target application left the file in a corrupt transient state. Saving writes
 * to a sibling temporary file and renames it over the original, so a failed
 * write never leaves a truncated file behind.
 *
 * A trait (`IdentifierStorageOperations`) abstracts the storage so tests can
 * substitute implementations with controlled paths or injected failures.
 */
use super::paths::{self, Variant};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum StorageError {
    Io(io::Error),
    Serde(serde_json::Error),
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serde(err)
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Serde(e) => write!(f, "Serialization error: {e}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Serde(e) => Some(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

pub trait IdentifierStorageOperations: Send + Sync {
    fn resolve_storage_file(&self, variant: Variant) -> paths::Result<PathBuf>;
    fn load(&self, path: &Path) -> Map<String, Value>;
    fn save(&self, path: &Path, data: &Map<String, Value>) -> Result<()>;
}

/*
 * The concrete storage bound to the host operating system. The OS name is
 * captured at construction so path resolution stays testable with foreign
 * platform names.
 */
pub struct CoreIdentifierStorage {
    os_name: String,
}

impl CoreIdentifierStorage {
    pub fn new() -> Self {
        CoreIdentifierStorage {
            os_name: std::env::consts::OS.to_string(),
        }
    }

    pub fn for_os(os_name: &str) -> Self {
        CoreIdentifierStorage {
            os_name: os_name.to_string(),
        }
    }
}

impl Default for CoreIdentifierStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierStorageOperations for CoreIdentifierStorage {
    fn resolve_storage_file(&self, variant: Variant) -> paths::Result<PathBuf> {
        paths::resolve_storage_file(&self.os_name, variant)
    }

    /*
     * Loads the current contents of the storage file. A missing file yields an
     * empty mapping; so do unreadable or malformed contents, including valid
     * JSON that is not an object. Discarded contents are logged at warn level
     * but never surfaced as errors.
     */
    fn load(&self, path: &Path) -> Map<String, Value> {
        if !path.exists() {
            log::debug!("Storage: File {path:?} does not exist, starting from an empty mapping.");
            return Map::new();
        }

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                log::warn!("Storage: Could not open {path:?} ({e}), treating as empty.");
                return Map::new();
            }
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, Map<String, Value>>(reader) {
            Ok(data) => {
                log::debug!("Storage: Loaded {} keys from {path:?}.", data.len());
                data
            }
            Err(e) => {
                log::warn!("Storage: Discarding malformed contents of {path:?}: {e}");
                Map::new()
            }
        }
    }

    /*
     * Persists the mapping as pretty-printed JSON, fully replacing the file's
     * contents. Missing parent directories are created. The data is written to
     * a sibling temporary file first and renamed into place, so the previous
     * contents remain intact if any step fails.
     */
    fn save(&self, path: &Path, data: &Map<String, Value>) -> Result<()> {
        log::trace!("Storage: Saving {} keys to {path:?}", data.len());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = temp_sibling(path);
        if let Err(e) = write_pretty(&tmp_path, data) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        fs::rename(&tmp_path, path)?;
        log::debug!("Storage: Saved {path:?}.");
        Ok(())
    }
}

fn write_pretty(path: &Path, data: &Map<String, Value>) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer.flush()?;
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut file_name = path.file_name().unwrap_or_default().to_os_string();
    file_name.push(".tmp");
    path.with_file_name(file_name)
}
