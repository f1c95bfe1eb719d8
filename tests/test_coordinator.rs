//! Concurrent test suite for the install coordinator
//!
//! Exercises the readiness barrier and deferred queue under real task
//! contention: many projects racing into their install step, exactly one
//! of them draining.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::join_all;
use reactor_install::{
    Artifact, ArtifactInstaller, CoordinatorConfig, InstallCoordinator, InstallRequest, Project,
    ProjectCoordinates, StepOptions, StepReport,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Installer double that records every invocation
struct RecordingInstaller {
    calls: AtomicUsize,
    order: Mutex<Vec<String>>,
}

impl RecordingInstaller {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            order: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn order(&self) -> Vec<String> {
        self.order.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactInstaller for RecordingInstaller {
    async fn install(&self, request: &InstallRequest) -> anyhow::Result<()> {
        // Yield so installs interleave with the other project tasks
        tokio::task::yield_now().await;
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.order
            .lock()
            .unwrap()
            .push(request.coordinates.artifact_id.clone());
        Ok(())
    }
}

fn project(n: usize) -> Project {
    Project::new(ProjectCoordinates::new(
        "org.example.reactor",
        format!("module-{n:03}"),
        "1.0.0",
    ))
    .with_artifact(Artifact::new("jar", format!("target/module-{n:03}.jar")))
}

async fn run_reactor(
    coordinator: Arc<InstallCoordinator>,
    reactor_size: usize,
    options_for: impl Fn(usize) -> StepOptions,
) -> Vec<StepReport> {
    let mut handles = Vec::with_capacity(reactor_size);
    for n in 0..reactor_size {
        let coordinator = Arc::clone(&coordinator);
        let options = options_for(n);
        handles.push(tokio::spawn(async move {
            coordinator.reach_install_step(&project(n), options).await
        }));
    }
    join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_immediate_mode_installs_once_per_call() {
    init_tracing();
    let reactor_size = 16;
    let installer = RecordingInstaller::new();
    let coordinator = Arc::new(InstallCoordinator::new(
        installer.clone(),
        CoordinatorConfig::new(reactor_size),
    ));

    let reports = run_reactor(coordinator.clone(), reactor_size, |_| {
        StepOptions::default()
    })
    .await;

    assert_eq!(installer.calls(), reactor_size);
    assert_eq!(coordinator.pending(), 0);

    let winners: Vec<_> = reports.iter().filter(|r| r.last).collect();
    assert_eq!(winners.len(), 1);
    // Winner still drains, but the queue was never involved
    let drained = winners[0].drained.as_ref().unwrap();
    assert!(drained.installed.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_install_at_end_drains_everything_on_one_task() {
    init_tracing();
    let reactor_size = 32;
    let installer = RecordingInstaller::new();
    let coordinator = Arc::new(InstallCoordinator::new(
        installer.clone(),
        CoordinatorConfig::new(reactor_size),
    ));

    let reports = run_reactor(coordinator.clone(), reactor_size, |_| {
        StepOptions::default().install_at_end()
    })
    .await;

    assert_eq!(installer.calls(), reactor_size);
    assert_eq!(coordinator.pending(), 0);

    let drains: Vec<_> = reports.iter().filter_map(|r| r.drained.as_ref()).collect();
    assert_eq!(drains.len(), 1, "exactly one call may drain");
    assert_eq!(drains[0].installed.len(), reactor_size);

    // Install order is the drain's pop order, i.e. submission order
    let drained_ids: Vec<String> = drains[0]
        .installed
        .iter()
        .map(|coords| {
            coords
                .split(':')
                .nth(1)
                .expect("g:a:v coordinates")
                .to_string()
        })
        .collect();
    assert_eq!(installer.order(), drained_ids);

    let mut sorted = drained_ids.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), reactor_size, "each project installed once");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_single_winner_under_repeated_stress() {
    init_tracing();
    let reactor_size = 64;
    for _ in 0..20 {
        let installer = RecordingInstaller::new();
        let coordinator = Arc::new(InstallCoordinator::new(
            installer.clone(),
            CoordinatorConfig::new(reactor_size),
        ));

        let reports = run_reactor(coordinator.clone(), reactor_size, |n| {
            if n % 2 == 0 {
                StepOptions::default().install_at_end()
            } else {
                StepOptions::default()
            }
        })
        .await;

        let winners = reports.iter().filter(|r| r.last).count();
        let drains = reports.iter().filter(|r| r.drained.is_some()).count();
        assert_eq!(winners, 1);
        assert_eq!(drains, 1);
        assert_eq!(installer.calls(), reactor_size);
        assert_eq!(coordinator.pending(), 0);
        assert_eq!(coordinator.arrivals(), reactor_size);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_skipped_projects_still_count_toward_the_barrier() {
    init_tracing();
    let reactor_size = 50;
    let installer = RecordingInstaller::new();
    let coordinator = Arc::new(InstallCoordinator::new(
        installer.clone(),
        CoordinatorConfig::new(reactor_size),
    ));

    // Every third project skips, the rest defer
    let reports = run_reactor(coordinator.clone(), reactor_size, |n| {
        if n % 3 == 0 {
            StepOptions::default().install_at_end().skip()
        } else {
            StepOptions::default().install_at_end()
        }
    })
    .await;

    let skipped = (0..reactor_size).filter(|n| n % 3 == 0).count();
    assert_eq!(installer.calls(), reactor_size - skipped);
    assert_eq!(reports.iter().filter(|r| r.last).count(), 1);
    assert_eq!(coordinator.pending(), 0);
    assert_eq!(coordinator.arrivals(), reactor_size);
}
