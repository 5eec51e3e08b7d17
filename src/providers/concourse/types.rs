use serde::Deserialize;

/// A pipeline as listed by `/api/v1/pipelines`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConcoursePipeline {
    /// Pipeline name, unique within its team
    pub name: String,
    /// Whether the whole pipeline is paused
    #[serde(default)]
    pub paused: bool,
    /// Owning team
    #[serde(default)]
    pub team_name: String,
}

/// A job as listed by `/api/v1/jobs` or a pipeline's jobs endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConcourseJob {
    /// Job name as defined in the pipeline config
    #[serde(default)]
    pub name: String,
    /// Name of the owning pipeline
    #[serde(default)]
    pub pipeline_name: String,
    /// Owning team
    #[serde(default)]
    pub team_name: String,
    /// Whether this job alone is paused
    #[serde(default)]
    pub paused: bool,
    /// Build currently pending or in flight, `null` when idle
    #[serde(default)]
    pub next_build: Option<BuildSummary>,
    /// Most recent completed build, `null` when the job never ran
    #[serde(default)]
    pub finished_build: Option<BuildSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct BuildSummary {
    #[serde(default)]
    pub status: String,
}

impl ConcourseJob {
    /// Status of the last finished build; empty when there is none.
    pub fn finished_status(&self) -> &str {
        self.finished_build.as_ref().map_or("", |b| b.status.as_str())
    }

    /// Status of the upcoming build; empty when there is none.
    pub fn next_status(&self) -> &str {
        self.next_build.as_ref().map_or("", |b| b.status.as_str())
    }
}
