/*
 * Consolidates the platform-agnostic logic of the reset tool: storage path
 * resolution, load/save of the target application's configuration mapping,
 * timestamped backups, identifier generation and the orchestrating reset
 * operation with its progress transport. Abstractions
 * (`IdentifierStorageOperations`, `BackupOperations`, `IdGeneratorOperations`)
 * exist so the orchestrator can be exercised against controlled storage in
 * tests.
 */
pub mod backup;
pub mod identity;
pub mod paths;
pub mod reset;
pub mod reset_progress;
pub mod storage;

// Re-export key structures and enums
pub use paths::{PathResolutionError, Variant};

pub use identity::{
    CoreIdGenerator, DEV_DEVICE_ID_KEY, IdGeneratorOperations, IdentifierSet, MACHINE_ID_KEY,
    MAC_MACHINE_ID_KEY,
};

pub use backup::{BackupOperations, CoreBackupManager};

pub use storage::{CoreIdentifierStorage, IdentifierStorageOperations, StorageError};

pub use reset::{ResetError, ResetEvent, ResetOperation, ResetOutcome, ResetRequest};

pub use reset_progress::{ResetProgress, ResetStage};
