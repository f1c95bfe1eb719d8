//! ArtifactInstaller - the collaborator that writes into the local store
//!
//! The coordinator never touches the filesystem itself. It decides when
//! and in what order requests are handed to this trait, exactly once per
//! request.

use async_trait::async_trait;

use crate::coord::types::InstallRequest;

/// Writes one project's artifact set into the shared local store
///
/// May be slow (I/O-bound); the coordinator never holds the queue lock
/// across this call. Errors carry a human-readable cause and abort the
/// calling project's install step.
#[async_trait]
pub trait ArtifactInstaller: Send + Sync {
    /// Install one request's artifact set
    async fn install(&self, request: &InstallRequest) -> anyhow::Result<()>;
}

/// Installer that logs each request and succeeds
///
/// Useful for dry runs and as a wiring example.
pub struct NoopInstaller;

#[async_trait]
impl ArtifactInstaller for NoopInstaller {
    async fn install(&self, request: &InstallRequest) -> anyhow::Result<()> {
        tracing::info!(
            "Noop install of {} ({} artifacts)",
            request.coordinates,
            request.artifacts.len()
        );
        Ok(())
    }
}
