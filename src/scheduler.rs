use log::{error, info, warn};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::config::{DashboardConfig, FailurePolicy, JobSource};
use crate::error::Result;
use crate::providers::concourse::{compute_snapshot, ConcourseClient};
use crate::state::{Countdown, SnapshotPublisher};

/// Background refresh loop.
///
/// Owns the only write half of the snapshot slot. Network calls happen here
/// and nowhere else, so a slow server never stalls rendering.
pub struct RefreshScheduler {
    client: ConcourseClient,
    publisher: SnapshotPublisher,
    countdown: Countdown,
    interval: Duration,
    job_source: JobSource,
    policy: FailurePolicy,
}

impl RefreshScheduler {
    pub fn new(
        client: ConcourseClient,
        publisher: SnapshotPublisher,
        countdown: Countdown,
        config: &DashboardConfig,
    ) -> Self {
        Self {
            client,
            publisher,
            countdown,
            interval: config.refresh_interval(),
            job_source: config.job_source,
            policy: config.failure_policy,
        }
    }

    #[cfg(test)]
    fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// One refresh cycle. Publishes the new snapshot, then resets the
    /// countdown; on error neither happens.
    ///
    /// Returns the number of pipelines published.
    pub async fn refresh_once(&self) -> Result<usize> {
        let snapshot = compute_snapshot(&self.client, self.job_source).await?;
        let count = snapshot.pipelines.len();
        self.publisher.publish(snapshot);
        self.countdown.reset(self.interval);
        Ok(count)
    }

    /// Refreshes immediately, then once per interval, until the task is
    /// dropped or the exit policy turns a failure into the return value.
    pub async fn run(self) -> Result<()> {
        let mut tick = interval(self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut failures: u32 = 0;

        info!(
            "Refreshing {} every {}s",
            self.client.base_url(),
            self.interval.as_secs()
        );

        loop {
            tick.tick().await;

            match self.refresh_once().await {
                Ok(count) => {
                    if failures > 0 {
                        info!("Refresh recovered after {failures} failed attempt(s)");
                    }
                    failures = 0;
                    info!("Published snapshot with {count} pipelines");
                }
                Err(e) => {
                    failures += 1;
                    match self.policy {
                        FailurePolicy::Retry => {
                            warn!("Refresh failed ({failures} in a row), keeping last snapshot: {e}");
                        }
                        FailurePolicy::Exit => {
                            error!("Refresh failed, stopping: {e}");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run())
    }
}

/// Decrements the countdown once per second, independently of refreshes.
pub fn spawn_countdown(countdown: Countdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval(Duration::from_secs(1));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        tick.tick().await;
        loop {
            tick.tick().await;
            countdown.tick();
        }
    })
}
