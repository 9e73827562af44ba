//! Poll loop: fetch, detect, dispatch.
//!
//! Cycles are strictly sequential. A cycle always completes (fetch, then
//! detection, then every sink attempt) before the next tick is awaited, so
//! the detector state has a single owner and never needs a lock.

use anyhow::{Context, Result};
use config::AlertConfig;
use notify::{DispatchReport, Dispatcher};
use scm::{FetchError, RunSnapshotFetcher};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::alert;
use crate::detector::{Transition, TransitionDetector};

/// What happened during one cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The fetch failed; detector state was not advanced
    FetchFailed(FetchError),
    /// The fetch succeeded and the snapshot went through the detector
    Observed {
        transition: Transition,
        report: Option<DispatchReport>,
    },
}

/// Drives the monitor for one repository.
pub struct PollLoop {
    fetcher: Box<dyn RunSnapshotFetcher>,
    detector: TransitionDetector,
    dispatcher: Dispatcher,
    repository: String,
    interval: Duration,
    continuous: bool,
}

impl PollLoop {
    pub fn new(
        fetcher: Box<dyn RunSnapshotFetcher>,
        dispatcher: Dispatcher,
        repository: impl Into<String>,
        interval: Duration,
        continuous: bool,
    ) -> Self {
        Self {
            fetcher,
            detector: TransitionDetector::new(),
            dispatcher,
            repository: repository.into(),
            interval,
            continuous,
        }
    }

    /// Validate `config` and wire up the fetcher and sinks.
    ///
    /// Validation runs first, so an unusable config fails before any
    /// network client is created.
    pub fn from_config(config: &AlertConfig) -> Result<Self> {
        config.validate()?;

        let fetcher = scm::fetcher_for(config).context("Failed to create run fetcher")?;
        let dispatcher = Dispatcher::from_config(config).context("Failed to create sinks")?;

        Ok(Self::new(
            fetcher,
            dispatcher,
            config.repository(),
            Duration::from_secs(config.poll_interval_secs),
            config.continuous,
        ))
    }

    pub fn detector(&self) -> &TransitionDetector {
        &self.detector
    }

    /// Run one cycle, or keep cycling every interval until `cancel` fires.
    ///
    /// Returns the number of cycles that ran. Cancellation stops new ticks
    /// from being scheduled; a cycle already in flight runs to completion.
    pub async fn run(&mut self, cancel: CancellationToken) -> usize {
        info!(
            repository = %self.repository,
            platform = self.fetcher.platform(),
            sinks = self.dispatcher.sink_count(),
            continuous = self.continuous,
            interval_secs = self.interval.as_secs(),
            "Starting pipeline monitor"
        );

        if !self.continuous {
            self.poll_once().await;
            return 1;
        }

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut cycles = 0;
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!(cycles, "Cancellation requested, stopping monitor");
                    break;
                }
                _ = ticker.tick() => {}
            }

            self.poll_once().await;
            cycles += 1;
        }
        cycles
    }

    /// Perform a single fetch, detect, dispatch cycle.
    pub async fn poll_once(&mut self) -> CycleOutcome {
        let snapshot = match self.fetcher.fetch_latest().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(
                    repository = %self.repository,
                    error = %e,
                    "Failed to fetch latest run, will retry next poll"
                );
                return CycleOutcome::FetchFailed(e);
            }
        };

        match &snapshot {
            Some(run) => info!(
                repository = %self.repository,
                run_id = %run.id,
                status = %run.status,
                "Polled latest run"
            ),
            None => info!(repository = %self.repository, "No pipeline runs found"),
        }

        let transition = self.detector.observe(snapshot);
        debug!(transition = transition.label(), "Classified run");

        let report = alert::dispatch(&transition, &self.repository, &self.dispatcher).await;
        if let Some(report) = &report {
            info!(
                transition = transition.label(),
                delivered = report.delivered(),
                failed = report.failed(),
                "Alert dispatched"
            );
        }

        CycleOutcome::Observed { transition, report }
    }
}
