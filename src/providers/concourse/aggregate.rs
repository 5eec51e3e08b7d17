use futures::{StreamExt, TryStreamExt};
use log::debug;
use std::collections::HashMap;

use crate::config::JobSource;
use crate::error::{DashboardError, Result};
use crate::snapshot::{Pipeline, Snapshot, PAUSED};

use super::client::ConcourseClient;
use super::types::{ConcourseJob, ConcoursePipeline};

const MAX_CONCURRENT_REQUESTS: usize = 8;

/// Runs one refresh cycle: pipelines, then jobs, then the join.
///
/// Either request failing fails the whole cycle; nothing partial is returned.
///
/// # Errors
///
/// Propagates any network, HTTP status or decode error from the client.
pub async fn compute_snapshot(client: &ConcourseClient, job_source: JobSource) -> Result<Snapshot> {
    let pipelines = client.fetch_pipelines().await?;
    debug!("Fetched {} pipelines", pipelines.len());

    let jobs = match job_source {
        JobSource::Combined => client.fetch_jobs().await?,
        JobSource::PerPipeline => fetch_jobs_per_pipeline(client, &pipelines).await?,
    };
    debug!("Fetched {} jobs", jobs.len());

    Ok(Snapshot::new(aggregate(pipelines, &jobs)))
}

async fn fetch_jobs_per_pipeline(
    client: &ConcourseClient,
    pipelines: &[ConcoursePipeline],
) -> Result<Vec<ConcourseJob>> {
    // Owned items keep the spawned refresh future `Send`.
    let per_pipeline: Vec<Vec<ConcourseJob>> = futures::stream::iter(pipelines.iter().cloned())
        .map(|pipeline| async move {
            let mut jobs = client
                .fetch_pipeline_jobs(&pipeline.team_name, &pipeline.name)
                .await?;
            // The endpoint decides ownership regardless of what the body says.
            for job in &mut jobs {
                job.pipeline_name.clone_from(&pipeline.name);
                job.team_name.clone_from(&pipeline.team_name);
            }
            Ok::<_, DashboardError>(jobs)
        })
        .buffered(MAX_CONCURRENT_REQUESTS)
        .try_collect()
        .await?;

    Ok(per_pipeline.into_iter().flatten().collect())
}

/// Joins jobs onto pipelines and counts statuses.
///
/// Output order follows `pipelines`. Jobs naming a pipeline that is not in
/// the list are ignored.
pub fn aggregate(pipelines: Vec<ConcoursePipeline>, jobs: &[ConcourseJob]) -> Vec<Pipeline> {
    let mut result: Vec<Pipeline> = pipelines
        .into_iter()
        .map(|p| Pipeline::new(p.name, p.team_name, p.paused))
        .collect();

    let lookup = PipelineLookup::new(&result);

    for job in jobs {
        let Some(idx) = lookup.resolve(job) else {
            debug!(
                "Skipping job '{}' of unknown pipeline '{}'",
                job.name, job.pipeline_name
            );
            continue;
        };
        tally(&mut result[idx], job);
    }

    result
}

fn tally(pipeline: &mut Pipeline, job: &ConcourseJob) {
    if job.paused {
        *pipeline.statuses.entry(PAUSED.to_string()).or_insert(0) += 1;
        return;
    }

    *pipeline
        .statuses
        .entry(job.finished_status().to_string())
        .or_insert(0) += 1;

    if !job.next_status().is_empty() {
        pipeline.running = true;
    }
}

/// Index of pipelines by `(team, name)`, with a name-only fallback for jobs
/// whose team is missing or matches no pipeline.
struct PipelineLookup {
    by_team: HashMap<(String, String), usize>,
    by_name: HashMap<String, usize>,
}

impl PipelineLookup {
    fn new(pipelines: &[Pipeline]) -> Self {
        let mut by_team = HashMap::with_capacity(pipelines.len());
        let mut by_name = HashMap::with_capacity(pipelines.len());
        for (idx, pipeline) in pipelines.iter().enumerate() {
            by_team
                .entry((pipeline.team_name.clone(), pipeline.name.clone()))
                .or_insert(idx);
            by_name.entry(pipeline.name.clone()).or_insert(idx);
        }
        Self { by_team, by_name }
    }

    fn resolve(&self, job: &ConcourseJob) -> Option<usize> {
        if !job.team_name.is_empty() {
            let key = (job.team_name.clone(), job.pipeline_name.clone());
            if let Some(idx) = self.by_team.get(&key) {
                return Some(*idx);
            }
        }
        self.by_name.get(&job.pipeline_name).copied()
    }
}
