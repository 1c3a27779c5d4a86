/*
 * Defines the data shuttled from the reset worker to whichever caller renders
 * progress. Notifications are advisory only: they let an interactive caller
 * show "in progress" feedback, and correctness never depends on them being
 * observed. Each stage is emitted exactly once, before the corresponding work
 * runs, with a monotonically increasing percentage.
 */

/// The visible steps of a reset, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStage {
    CreatingBackup,
    LoadingConfig,
    GeneratingIds,
    SavingConfig,
    Complete,
}

impl ResetStage {
    pub fn percent(&self) -> u8 {
        match self {
            ResetStage::CreatingBackup => 20,
            ResetStage::LoadingConfig => 40,
            ResetStage::GeneratingIds => 60,
            ResetStage::SavingConfig => 80,
            ResetStage::Complete => 100,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResetStage::CreatingBackup => "Creating backup",
            ResetStage::LoadingConfig => "Loading configuration",
            ResetStage::GeneratingIds => "Generating new identifiers",
            ResetStage::SavingConfig => "Saving configuration",
            ResetStage::Complete => "Complete",
        }
    }
}

impl std::fmt::Display for ResetStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetProgress {
    pub stage: ResetStage,
    pub percent: u8,
}

impl ResetProgress {
    pub fn for_stage(stage: ResetStage) -> Self {
        ResetProgress {
            stage,
            percent: stage.percent(),
        }
    }
}
