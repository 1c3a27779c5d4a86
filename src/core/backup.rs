/*
 * Creates timestamped backup copies of the storage file before it is mutated.
 * A backup is an exact byte-for-byte copy placed alongside the original,
 * named `<original-name>.backup_<YYYYMMDD_HHMMSS>` with the timestamp taken at
 * call time. Backups are never deleted by this tool; once written they belong
 * to the user.
 */
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::macros::format_description;

pub trait BackupOperations: Send + Sync {
    /*
     * Copies the file at `path` to a timestamped sibling and returns the
     * backup's path. A missing source file is a no-op (`Ok(None)`), not an
     * error; the reset then simply has nothing to preserve. Content is copied
     * byte-for-byte, metadata preservation is best-effort.
     */
    fn backup(&self, path: &Path) -> io::Result<Option<PathBuf>>;
}

pub struct CoreBackupManager {}

impl CoreBackupManager {
    pub fn new() -> Self {
        CoreBackupManager {}
    }
}

impl Default for CoreBackupManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BackupOperations for CoreBackupManager {
    fn backup(&self, path: &Path) -> io::Result<Option<PathBuf>> {
        if !path.exists() {
            log::debug!("Backup: {path:?} does not exist, nothing to back up.");
            return Ok(None);
        }

        let mut file_name = path.file_name().unwrap_or_default().to_os_string();
        file_name.push(format!(".backup_{}", timestamp_suffix()?));
        let backup_path = path.with_file_name(file_name);

        fs::copy(path, &backup_path)?;
        log::info!("Backup: Copied {path:?} to {backup_path:?}.");
        Ok(Some(backup_path))
    }
}

/*
 * Second-resolution timestamp in local time, `YYYYMMDD_HHMMSS`. Falls back to
 * UTC when the local offset cannot be determined (the time crate refuses to
 * probe it in multi-threaded processes on some platforms).
 */
fn timestamp_suffix() -> io::Result<String> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let format = format_description!("[year][month][day]_[hour][minute][second]");
    now.format(&format).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_backup_missing_file_is_a_noop() {
        let dir = tempdir().unwrap();
        let manager = CoreBackupManager::new();

        let result = manager.backup(&dir.path().join("storage.json"));
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_backup_copies_content_byte_for_byte() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let content = b"{\n  \"telemetry.machineId\": \"abc\"\n}";
        fs::write(&path, content).unwrap();

        let manager = CoreBackupManager::new();
        let backup_path = manager
            .backup(&path)
            .expect("Backup should succeed")
            .expect("Backup path should be returned for an existing file");

        assert_eq!(fs::read(&backup_path).unwrap(), content);
        // The original must be untouched.
        assert_eq!(fs::read(&path).unwrap(), content);
    }

    #[test]
    fn test_backup_name_and_location() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{}").unwrap();

        let manager = CoreBackupManager::new();
        let backup_path = manager.backup(&path).unwrap().unwrap();

        assert_eq!(backup_path.parent(), path.parent(), "Backup must be a sibling");

        let name = backup_path.file_name().unwrap().to_string_lossy();
        let suffix = name
            .strip_prefix("storage.json.backup_")
            .expect("Backup name should extend the original filename");
        // YYYYMMDD_HHMMSS: 8 digits, underscore, 6 digits.
        assert_eq!(suffix.len(), 15, "Unexpected timestamp suffix: {suffix}");
        assert_eq!(suffix.as_bytes()[8], b'_');
        assert!(
            suffix
                .chars()
                .enumerate()
                .all(|(i, c)| i == 8 || c.is_ascii_digit()),
            "Unexpected timestamp suffix: {suffix}"
        );
    }
}
