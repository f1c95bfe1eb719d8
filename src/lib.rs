// Core infrastructure modules
pub mod core {
    pub mod errors;
}

// Install coordination
pub mod coord;

// Re-exports for convenience
pub use crate::core::errors::{CoordError, Result};
pub use coord::{
    Artifact, ArtifactInstaller, CoordinatorConfig, DeferredQueue, Disposition, DrainPolicy,
    DrainReport, InstallCoordinator, InstallRequest, NoopInstaller, Project, ProjectCoordinates,
    ProjectState, ReadinessBarrier, StepOptions, StepReport,
};
