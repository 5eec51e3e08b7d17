use anyhow::Result;
use clap::Parser;
use console::Term;
use log::info;
use std::path::PathBuf;

use crate::config::{DashboardConfig, FailurePolicy, JobSource};
use crate::error::DashboardError;
use crate::output::{render_summary, Dashboard, RefreshProgress};
use crate::providers::concourse::{compute_snapshot, ConcourseClient};
use crate::scheduler::{spawn_countdown, RefreshScheduler};
use crate::state::{snapshot_channel, Countdown};
use crate::target::{self, default_flyrc_path};

#[derive(Parser, Debug)]
#[command(name = "concourse-summary")]
#[command(author, version, about = "Concourse CI pipeline health dashboard", long_about = None)]
pub struct Cli {
    /// Fly target name, API URL or hostname
    target: String,

    /// Fly targets file [default: ~/.flyrc]
    #[arg(long, env = "FLYRC")]
    flyrc: Option<PathBuf>,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds between refreshes
    #[arg(short, long)]
    interval: Option<u64>,

    #[arg(long, value_enum)]
    failure_policy: Option<FailurePolicy>,

    #[arg(long, value_enum)]
    job_source: Option<JobSource>,

    /// Refresh once, print a summary and exit
    #[arg(long, default_value_t = false)]
    once: bool,

    /// Print the snapshot as JSON instead of a table (with --once)
    #[arg(long, default_value_t = false, requires = "once")]
    json: bool,

    /// Indent the JSON output
    #[arg(short, long, default_value_t = false, requires = "json")]
    pretty: bool,

    #[arg(short, long, requires = "once")]
    output: Option<PathBuf>,
}

impl Cli {
    fn load_config(&self) -> Result<DashboardConfig> {
        let mut config = DashboardConfig::load(self.config.as_deref())?;

        if let Some(secs) = self.interval {
            config.refresh_interval_secs = secs;
        }
        if let Some(policy) = self.failure_policy {
            config.failure_policy = policy;
        }
        if let Some(source) = self.job_source {
            config.job_source = source;
        }

        config.validate()?;
        Ok(config)
    }

    async fn execute_once(&self, client: &ConcourseClient, config: &DashboardConfig) -> Result<()> {
        let progress = RefreshProgress::start(client.base_url().as_str());
        let snapshot = match compute_snapshot(client, config.job_source).await {
            Ok(snapshot) => {
                progress.finish(snapshot.pipelines.len());
                snapshot
            }
            Err(e) => {
                progress.fail();
                return Err(e.into());
            }
        };

        let rendered = if self.json {
            if self.pretty {
                serde_json::to_string_pretty(&snapshot)?
            } else {
                serde_json::to_string(&snapshot)?
            }
        } else {
            render_summary(&snapshot, client.base_url(), config)
        };

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, rendered).map_err(DashboardError::from)?;
            info!("Summary written to: {}", output_path.display());
        } else {
            println!("{rendered}");
        }

        Ok(())
    }

    async fn execute_dashboard(&self, client: ConcourseClient, config: DashboardConfig) -> Result<()> {
        let term = Term::stdout();
        if !term.is_term() {
            return Err(DashboardError::Config(
                "the dashboard needs a terminal, use --once for plain output".into(),
            )
            .into());
        }

        let (publisher, reader) = snapshot_channel();
        let countdown = Countdown::new();
        let base_url = client.base_url().clone();

        let refresher =
            RefreshScheduler::new(client, publisher, countdown.clone(), &config).spawn();
        let ticker = spawn_countdown(countdown.clone());

        let result = Dashboard::new(reader, countdown, base_url, config)
            .run(term, refresher)
            .await;
        ticker.abort();
        result
    }

    pub async fn execute(&self) -> Result<()> {
        let config = self.load_config()?;

        let flyrc = self.flyrc.clone().or_else(default_flyrc_path);
        let target = target::resolve(&self.target, flyrc.as_deref())?;
        info!("Watching Concourse at {}", target.base_url);

        let client = ConcourseClient::new(
            &target,
            config.request_timeout(),
            config.legacy_auth_header,
        )?;

        if self.once {
            self.execute_once(&client, &config).await
        } else {
            self.execute_dashboard(client, config).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;
    use mockito::Server;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn empty_flyrc() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "targets: {{}}").unwrap();
        file
    }

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("concourse-summary").chain(args.iter().copied()))
    }

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    mod parsing {
        use super::*;

        #[test]
        fn target_is_required() {
            let err = parse(&[]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        }

        #[test]
        fn json_requires_once() {
            assert!(parse(&["ci", "--json"]).is_err());
            assert!(parse(&["ci", "--once", "--json"]).is_ok());
        }

        #[test]
        fn pretty_requires_json() {
            assert!(parse(&["ci", "--once", "--pretty"]).is_err());
            assert!(parse(&["ci", "--once", "--json", "--pretty"]).is_ok());
        }

        #[test]
        fn overrides_apply_on_top_of_defaults() {
            let cli = parse(&[
                "ci",
                "--interval",
                "5",
                "--failure-policy",
                "exit",
                "--job-source",
                "per-pipeline",
            ])
            .unwrap();
            let config = cli.load_config().unwrap();

            assert_eq!(config.refresh_interval_secs, 5);
            assert_eq!(config.failure_policy, FailurePolicy::Exit);
            assert_eq!(config.job_source, JobSource::PerPipeline);
        }

        #[test]
        fn zero_interval_is_config_error() {
            let cli = parse(&["ci", "--interval", "0"]).unwrap();
            let err = cli.load_config().unwrap_err();
            let err = err.downcast_ref::<DashboardError>().unwrap();
            assert_eq!(err.exit_code(), 2);
        }
    }

    mod execute {
        use super::*;

        #[tokio::test]
        async fn unknown_target_exits_with_two() {
            let flyrc = empty_flyrc();
            let path = flyrc.path().to_str().unwrap();
            let cli = parse(&["nowhere", "--once", "--flyrc", path]).unwrap();

            let err = cli.execute().await.unwrap_err();
            let err = err.downcast_ref::<DashboardError>().unwrap();
            assert!(matches!(err, DashboardError::UnknownTarget(_)));
            assert_eq!(err.exit_code(), 2);
        }

        #[tokio::test]
        async fn once_writes_json_snapshot() {
            let mut server = Server::new_async().await;
            let _pipelines = server
                .mock("GET", "/api/v1/pipelines")
                .with_status(200)
                .with_body(r#"[{"name":"p1","paused":false,"team_name":"main"}]"#)
                .create_async()
                .await;
            let _jobs = server
                .mock("GET", "/api/v1/jobs")
                .with_status(200)
                .with_body(
                    r#"[{"name":"a","pipeline_name":"p1","team_name":"main",
                        "next_build":{"status":"started"},"finished_build":{"status":"failed"}}]"#,
                )
                .create_async()
                .await;

            let flyrc = empty_flyrc();
            let output = NamedTempFile::new().unwrap();
            let url = server.url();
            let cli = parse(&[
                url.as_str(),
                "--flyrc",
                flyrc.path().to_str().unwrap(),
                "--once",
                "--json",
                "--output",
                output.path().to_str().unwrap(),
            ])
            .unwrap();

            assert!(cli.execute().await.is_ok());

            let written = std::fs::read_to_string(output.path()).unwrap();
            let json: serde_json::Value = serde_json::from_str(&written).unwrap();
            let pipeline = &json["pipelines"][0];
            assert_eq!(pipeline["name"], "p1");
            assert_eq!(pipeline["running"], true);
            assert_eq!(pipeline["statuses"]["failed"], 1);
        }

        #[tokio::test]
        async fn once_propagates_http_errors() {
            let mut server = Server::new_async().await;
            let _pipelines = server
                .mock("GET", "/api/v1/pipelines")
                .with_status(500)
                .create_async()
                .await;
            let _jobs = server
                .mock("GET", "/api/v1/jobs")
                .with_status(200)
                .with_body("[]")
                .create_async()
                .await;

            let flyrc = empty_flyrc();
            let url = server.url();
            let cli = parse(&[
                url.as_str(),
                "--flyrc",
                flyrc.path().to_str().unwrap(),
                "--once",
            ])
            .unwrap();

            let err = cli.execute().await.unwrap_err();
            let err = err.downcast_ref::<DashboardError>().unwrap();
            assert!(matches!(err, DashboardError::HttpStatus { status: 500, .. }));
            assert_eq!(err.exit_code(), 1);
        }
    }
}
