/*
 * Orchestrates a full identifier reset: resolve the storage path, optionally
 * back the file up, load whatever is currently stored, generate a fresh
 * identifier set, overlay it onto the loaded mapping and persist the result.
 * The sequence is strictly linear; the only branch is the terminal outcome.
 *
 * `ResetOperation` owns its collaborators behind the core traits so tests can
 * substitute storage, backup or generation. `execute` runs the sequence on the
 * calling thread and reports progress through a callback; `spawn` runs it on a
 * dedicated worker thread and turns the callback into a channel of events
 * ending in exactly one `Finished`, which is the shape an interactive caller
 * consumes.
 */
use super::backup::{BackupOperations, CoreBackupManager};
use super::identity::{CoreIdGenerator, IdGeneratorOperations, IdentifierSet};
use super::paths::{PathResolutionError, Variant};
use super::reset_progress::{ResetProgress, ResetStage};
use super::storage::{CoreIdentifierStorage, IdentifierStorageOperations, StorageError};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;

#[derive(Debug)]
pub enum ResetError {
    UnsupportedPlatform(String),
    BaseDirectoryMissing(PathBuf),
    /*
     * Backup or persist I/O failed. `backup_path` reports whether a backup had
     * already been written when the failure hit, so the caller can point the
     * user at it for manual recovery. The prior on-disk contents are whatever
     * they were before the failing write attempt.
     */
    Persist {
        source: StorageError,
        backup_path: Option<PathBuf>,
    },
}

impl From<PathResolutionError> for ResetError {
    fn from(err: PathResolutionError) -> Self {
        match err {
            PathResolutionError::UnsupportedPlatform(os) => ResetError::UnsupportedPlatform(os),
            PathResolutionError::BaseDirectoryMissing(path) => {
                ResetError::BaseDirectoryMissing(path)
            }
        }
    }
}

impl std::fmt::Display for ResetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetError::UnsupportedPlatform(os) => write!(f, "Unsupported OS: {os}"),
            ResetError::BaseDirectoryMissing(path) => {
                write!(f, "Base directory does not exist: {path:?}")
            }
            ResetError::Persist {
                source,
                backup_path: Some(backup),
            } => write!(
                f,
                "Failed to persist new identifiers: {source} (backup kept at {backup:?})"
            ),
            ResetError::Persist {
                source,
                backup_path: None,
            } => write!(f, "Failed to persist new identifiers: {source}"),
        }
    }
}

impl std::error::Error for ResetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResetError::Persist { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResetError>;

/// Caller-visible choices for one reset invocation.
#[derive(Debug, Clone, Copy)]
pub struct ResetRequest {
    pub variant: Variant,
    pub create_backup: bool,
}

/// Terminal result of a successful reset.
#[derive(Debug, Clone)]
pub struct ResetOutcome {
    pub storage_file: PathBuf,
    pub identifiers: IdentifierSet,
    pub backup_path: Option<PathBuf>,
}

/// Stream element produced by `ResetOperation::spawn`.
#[derive(Debug)]
pub enum ResetEvent {
    Progress(ResetProgress),
    Finished(Result<ResetOutcome>),
}

#[derive(Clone)]
pub struct ResetOperation {
    storage: Arc<dyn IdentifierStorageOperations>,
    backup: Arc<dyn BackupOperations>,
    generator: Arc<dyn IdGeneratorOperations>,
}

impl ResetOperation {
    pub fn new(
        storage: Arc<dyn IdentifierStorageOperations>,
        backup: Arc<dyn BackupOperations>,
        generator: Arc<dyn IdGeneratorOperations>,
    ) -> Self {
        ResetOperation {
            storage,
            backup,
            generator,
        }
    }

    /// Operation wired to the host platform with the concrete core pieces.
    pub fn with_defaults() -> Self {
        ResetOperation::new(
            Arc::new(CoreIdentifierStorage::new()),
            Arc::new(CoreBackupManager::new()),
            Arc::new(CoreIdGenerator::new()),
        )
    }

    /*
     * Runs the reset to completion on the calling thread. `on_progress` is
     * invoked before each step with the stage about to run; it is advisory and
     * must not influence the outcome. Exactly one terminal result is returned:
     * the merged mapping was either fully persisted or not written at all.
     */
    pub fn execute(
        &self,
        request: ResetRequest,
        on_progress: &mut dyn FnMut(ResetProgress),
    ) -> Result<ResetOutcome> {
        log::info!(
            "ResetOperation: Starting reset for variant '{}' (backup: {}).",
            request.variant,
            request.create_backup
        );
        let storage_file = self.storage.resolve_storage_file(request.variant)?;

        let mut backup_path = None;
        if request.create_backup {
            on_progress(ResetProgress::for_stage(ResetStage::CreatingBackup));
            backup_path = self
                .backup
                .backup(&storage_file)
                .map_err(|e| ResetError::Persist {
                    source: StorageError::Io(e),
                    backup_path: None,
                })?;
        }

        on_progress(ResetProgress::for_stage(ResetStage::LoadingConfig));
        let mut data = self.storage.load(&storage_file);

        on_progress(ResetProgress::for_stage(ResetStage::GeneratingIds));
        let identifiers = self.generator.generate();
        merge_identifiers(&mut data, &identifiers);

        on_progress(ResetProgress::for_stage(ResetStage::SavingConfig));
        if let Err(source) = self.storage.save(&storage_file, &data) {
            log::error!("ResetOperation: Persist failed for {storage_file:?}: {source}");
            return Err(ResetError::Persist {
                source,
                backup_path,
            });
        }

        on_progress(ResetProgress::for_stage(ResetStage::Complete));
        log::info!("ResetOperation: Reset succeeded for {storage_file:?}.");
        Ok(ResetOutcome {
            storage_file,
            identifiers,
            backup_path,
        })
    }

    /*
     * Runs the reset on a worker thread and returns the receiving end of the
     * event stream: zero or more `Progress` events followed by exactly one
     * `Finished`. Dropping the receiver early is harmless; the operation still
     * runs to its terminal state.
     */
    pub fn spawn(&self, request: ResetRequest) -> Receiver<ResetEvent> {
        let (sender, receiver) = mpsc::channel();
        let operation = self.clone();
        thread::spawn(move || {
            let progress_sender = sender.clone();
            let mut forward = move |progress: ResetProgress| {
                let _ = progress_sender.send(ResetEvent::Progress(progress));
            };
            let result = operation.execute(request, &mut forward);
            let _ = sender.send(ResetEvent::Finished(result));
        });
        receiver
    }

    /*
     * Returns the telemetry entries currently stored for the given variant, or
     * `None` when the storage file does not exist. Shares `load`'s tolerance:
     * malformed contents read as an empty mapping rather than an error.
     */
    pub fn current_identifiers(&self, variant: Variant) -> Result<Option<Map<String, Value>>> {
        let storage_file = self.storage.resolve_storage_file(variant)?;
        if !storage_file.exists() {
            log::debug!("ResetOperation: No storage file at {storage_file:?}.");
            return Ok(None);
        }
        let data = self.storage.load(&storage_file);
        let telemetry: Map<String, Value> = data
            .into_iter()
            .filter(|(key, _)| key.starts_with("telemetry"))
            .collect();
        Ok(Some(telemetry))
    }
}

/*
 * Pure overlay of the identifier set onto the loaded mapping: the three fixed
 * keys are inserted or overwritten, every other key stays untouched.
 */
fn merge_identifiers(data: &mut Map<String, Value>, identifiers: &IdentifierSet) {
    for (key, value) in identifiers.entries() {
        data.insert(key.to_string(), Value::String(value.to_string()));
    }
}
