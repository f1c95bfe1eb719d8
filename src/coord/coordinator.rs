//! InstallCoordinator - the heart of reactor install coordination
//!
//! Every project's build task calls [`InstallCoordinator::reach_install_step`]
//! once, concurrently with the other projects' tasks. The coordinator gates
//! each call into skip / immediate / deferred, advances the readiness
//! barrier, and lets exactly one call per build run drain the deferred
//! queue in submission order.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::coord::barrier::ReadinessBarrier;
use crate::coord::installer::ArtifactInstaller;
use crate::coord::queue::DeferredQueue;
use crate::coord::types::{
    Disposition, DrainReport, InstallRequest, Project, ProjectState, StepReport,
};
use crate::core::errors::{CoordError, Result};

/// What to do with the rest of the drain when one deferred install fails
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrainPolicy {
    /// Abort the drain on the first failure; later requests stay queued
    #[default]
    FailFast,
    /// Attempt every queued request, then report all failures together
    BestEffort,
}

/// Build-run-wide coordinator settings
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Number of projects participating in the build, fixed for the run.
    /// Must match the number of `reach_install_step` calls eventually made.
    pub reactor_size: usize,
    pub drain_policy: DrainPolicy,
}

impl CoordinatorConfig {
    /// Create a config for a reactor of the given size
    pub fn new(reactor_size: usize) -> Self {
        Self {
            reactor_size,
            drain_policy: DrainPolicy::default(),
        }
    }

    /// Set the drain failure policy
    pub fn with_drain_policy(mut self, policy: DrainPolicy) -> Self {
        self.drain_policy = policy;
        self
    }
}

/// Per-call flags for one project's install step
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct StepOptions {
    /// Defer this project's install until the whole reactor is ready
    pub install_at_end: bool,
    /// Bypass installation for this project entirely
    pub skip: bool,
}

impl StepOptions {
    pub fn install_at_end(mut self) -> Self {
        self.install_at_end = true;
        self
    }

    pub fn skip(mut self) -> Self {
        self.skip = true;
        self
    }
}

/// Coordinates when each reactor project's artifacts reach the local store
///
/// All shared state (deferred queue, readiness barrier, per-project states)
/// is scoped to this value: build one coordinator per build run and drop it
/// afterwards, so nothing leaks between runs.
pub struct InstallCoordinator {
    installer: Arc<dyn ArtifactInstaller>,
    config: CoordinatorConfig,
    queue: DeferredQueue,
    barrier: ReadinessBarrier,
    states: DashMap<String, ProjectState>,
}

impl InstallCoordinator {
    /// Create a coordinator for one build run
    pub fn new(installer: Arc<dyn ArtifactInstaller>, config: CoordinatorConfig) -> Self {
        Self {
            installer,
            barrier: ReadinessBarrier::new(config.reactor_size),
            config,
            queue: DeferredQueue::new(),
            states: DashMap::new(),
        }
    }

    /// One project has reached its install step
    ///
    /// Called once per project per build run, concurrently across projects.
    /// Gates the call, always advances the readiness barrier (skipped
    /// projects count too), and on the call whose arrival completes the
    /// reactor, drains the deferred queue in submission order.
    pub async fn reach_install_step(
        &self,
        project: &Project,
        options: StepOptions,
    ) -> Result<StepReport> {
        let coordinates = project.coordinates.to_string();
        let disposition = Disposition::resolve(options.install_at_end, options.skip);

        match disposition {
            Disposition::Skip => {
                tracing::info!("Skipping artifact installation for {}", coordinates);
                self.states.insert(coordinates.clone(), ProjectState::Skipped);
            }
            Disposition::Immediate => {
                let request = InstallRequest::from_project(project);
                self.install_one(&request).await?;
                self.states
                    .insert(coordinates.clone(), ProjectState::Installed);
            }
            Disposition::Deferred => {
                let request = InstallRequest::from_project(project);
                self.queue.push(request);
                self.states.insert(coordinates.clone(), ProjectState::Queued);
            }
        }

        // The enqueue above happens strictly before this arrival, and the
        // winning arrival happens strictly before the drain below. That
        // ordering is what guarantees the drain sees every request.
        let arrived = self.barrier.arrive();
        if arrived > self.config.reactor_size {
            return Err(CoordError::configuration(format!(
                "{} install steps reported for a reactor of {} projects",
                arrived, self.config.reactor_size
            )));
        }
        let last = arrived == self.config.reactor_size;
        self.states.insert(
            coordinates.clone(),
            ProjectState::ReadyReported { disposition },
        );

        let drained = if last {
            let report = self.drain().await?;
            self.states.insert(
                coordinates.clone(),
                ProjectState::DrainComplete { disposition },
            );
            Some(report)
        } else {
            if disposition == Disposition::Deferred {
                tracing::info!("Installing {} at end", coordinates);
            }
            None
        };

        Ok(StepReport {
            coordinates: project.coordinates.clone(),
            disposition,
            last,
            drained,
        })
    }

    /// Number of requests still waiting in the deferred queue
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of projects that have reported their install step so far
    pub fn arrivals(&self) -> usize {
        self.barrier.arrivals()
    }

    /// Snapshot of every project's current install-step state
    pub fn project_states(&self) -> HashMap<String, ProjectState> {
        self.states
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    /// Pop-until-empty drain of the deferred queue
    ///
    /// Runs on exactly one call's task per build run. Each pop holds the
    /// queue lock only for the removal; the install itself runs outside it.
    async fn drain(&self) -> Result<DrainReport> {
        tracing::info!(
            "Reactor complete, draining {} deferred install(s)",
            self.queue.len()
        );

        let mut report = DrainReport::default();
        let mut failures: Vec<(String, CoordError)> = Vec::new();

        while let Some(request) = self.queue.pop() {
            let coordinates = request.coordinates.to_string();
            tracing::debug!("Draining deferred install of {}", coordinates);
            match self.install_one(&request).await {
                Ok(()) => report.installed.push(coordinates),
                Err(err) => match self.config.drain_policy {
                    DrainPolicy::FailFast => {
                        tracing::error!(
                            "Deferred install of {} failed, aborting drain with {} request(s) left",
                            coordinates,
                            self.queue.len()
                        );
                        return Err(err);
                    }
                    DrainPolicy::BestEffort => {
                        tracing::error!(
                            "Deferred install of {} failed, continuing drain",
                            coordinates
                        );
                        failures.push((coordinates, err));
                    }
                },
            }
        }

        if !failures.is_empty() {
            let failed: Vec<String> = failures.iter().map(|(c, _)| c.clone()).collect();
            let (_, first) = failures.remove(0);
            return Err(CoordError::drain(failed, anyhow::Error::new(first)));
        }

        tracing::info!("Drain complete, {} project(s) installed", report.installed.len());
        Ok(report)
    }

    /// Hand one request to the collaborator, wrapping failure as build-fatal
    async fn install_one(&self, request: &InstallRequest) -> Result<()> {
        self.installer
            .install(request)
            .await
            .map_err(|source| CoordError::install(request.coordinates.to_string(), source))
    }
}
