//! Core types for install coordination
//!
//! These types describe one reactor project's trip through the install
//! step: its identity, the immutable request built from it, and the
//! closed set of outcomes the policy gate can pick.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of one reactor project
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectCoordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl ProjectCoordinates {
    /// Create coordinates from the identity triple
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ProjectCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// Reference to one build output file of a project
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Classifier-style name distinguishing this output ("jar", "sources", ...)
    pub name: String,
    /// Where the build left the file
    pub path: PathBuf,
}

impl Artifact {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// One reactor project as seen by the coordinator
///
/// Owned by the surrounding build system; the coordinator only reads it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    pub coordinates: ProjectCoordinates,
    pub artifacts: Vec<Artifact>,
}

impl Project {
    pub fn new(coordinates: ProjectCoordinates) -> Self {
        Self {
            coordinates,
            artifacts: Vec::new(),
        }
    }

    /// Attach one build output
    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.push(artifact);
        self
    }
}

/// Immutable description of what to install for one project
///
/// Built once from a [`Project`] at the moment it reaches the install
/// step, never mutated, consumed exactly once by the installer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InstallRequest {
    pub coordinates: ProjectCoordinates,
    pub artifacts: Vec<Artifact>,
    pub created_at: DateTime<Utc>,
}

impl InstallRequest {
    /// Capture a project's identity and artifact set
    pub fn from_project(project: &Project) -> Self {
        Self {
            coordinates: project.coordinates.clone(),
            artifacts: project.artifacts.clone(),
            created_at: Utc::now(),
        }
    }
}

/// How the policy gate resolved one project's install step
///
/// A closed three-way outcome instead of nested booleans, so the state
/// machine over it stays exhaustive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    /// Installation bypassed for this project
    Skip,
    /// Installed synchronously on the calling task
    Immediate,
    /// Queued for the end-of-build drain
    Deferred,
}

impl Disposition {
    /// Resolve the per-call flags into a single outcome
    ///
    /// Skip wins over deferral: a skipped project never builds a request.
    pub fn resolve(install_at_end: bool, skip: bool) -> Self {
        if skip {
            Self::Skip
        } else if install_at_end {
            Self::Deferred
        } else {
            Self::Immediate
        }
    }
}

/// Where one project currently stands in its install-step state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectState {
    /// Gate resolved to skip; nothing built, nothing installed
    Skipped,
    /// Installed immediately on the calling task
    Installed,
    /// Request appended to the deferred queue
    Queued,
    /// Readiness increment delivered; terminal for every non-winner
    ReadyReported { disposition: Disposition },
    /// This project's call won the barrier and finished the drain
    DrainComplete { disposition: Disposition },
}

/// Summary of one end-of-build drain execution
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DrainReport {
    /// Coordinates installed by the drain, in queue order
    pub installed: Vec<String>,
}

/// What one `reach_install_step` call did
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepReport {
    pub coordinates: ProjectCoordinates,
    pub disposition: Disposition,
    /// Whether this call's readiness increment completed the reactor
    pub last: bool,
    /// Present only on the winning call
    pub drained: Option<DrainReport>,
}
