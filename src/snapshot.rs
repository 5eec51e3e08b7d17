use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

pub const SUCCEEDED: &str = "succeeded";
pub const FAILED: &str = "failed";
pub const ERRORED: &str = "errored";
pub const ABORTED: &str = "aborted";
/// Synthetic bucket counting paused jobs, separate from build results.
pub const PAUSED: &str = "paused";

/// Aggregated health of one pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pipeline {
    pub name: String,
    pub team_name: String,
    pub paused: bool,
    /// Some non-paused job has a pending or started build
    pub running: bool,
    /// Job count per status label; the empty label means "never built"
    pub statuses: IndexMap<String, usize>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, team_name: impl Into<String>, paused: bool) -> Self {
        Self {
            name: name.into(),
            team_name: team_name.into(),
            paused,
            running: false,
            statuses: IndexMap::new(),
        }
    }

    pub fn count(&self, status: &str) -> usize {
        self.statuses.get(status).copied().unwrap_or(0)
    }

    pub fn total_jobs(&self) -> usize {
        self.statuses.values().sum()
    }

    /// Every counted job succeeded and there is at least one.
    pub fn is_fully_green(&self) -> bool {
        let total = self.total_jobs();
        total > 0 && self.count(SUCCEEDED) == total
    }
}

/// Everything the dashboard knows after one refresh cycle.
///
/// Published behind an `Arc` and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub pipelines: Vec<Pipeline>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Placeholder shown before the first refresh completes.
    pub fn empty() -> Self {
        Self {
            pipelines: Vec::new(),
            fetched_at: None,
        }
    }

    pub fn new(pipelines: Vec<Pipeline>) -> Self {
        Self {
            pipelines,
            fetched_at: Some(Utc::now()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.fetched_at.is_some()
    }
}
