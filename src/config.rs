use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::error::{DashboardError, Result};

/// Dashboard behaviour settings.
///
/// Everything that used to differ between hand-maintained variants of the
/// dashboard (refresh cadence, which statuses get drawn, how pipeline links are
/// built) lives here so a single code path serves every deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DashboardConfig {
    /// Seconds between two refresh cycles
    pub refresh_interval_secs: u64,

    /// Per-request timeout for API calls
    pub request_timeout_secs: u64,

    /// Render loop frames per second
    pub frame_rate: u32,

    /// Status labels drawn on a tile, in display order
    pub statuses: Vec<String>,

    /// How the web URL of a pipeline is built
    pub link_scheme: LinkScheme,

    /// Where job data comes from
    pub job_source: JobSource,

    /// What the scheduler does when a refresh cycle fails
    pub failure_policy: FailurePolicy,

    /// Send `Bearer+<token>` instead of `Bearer <token>`
    pub legacy_auth_header: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LinkScheme {
    /// `{api}/teams/{team}/pipelines/{pipeline}`
    #[default]
    Teams,
    /// `{api}/pipelines/{pipeline}`, for servers predating teams
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum JobSource {
    /// One request to `/api/v1/jobs`
    #[default]
    Combined,
    /// One request per pipeline to its team-scoped jobs endpoint
    PerPipeline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Log the failure, keep the last snapshot and try again on the next tick
    #[default]
    Retry,
    /// Stop the dashboard with the error
    Exit,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
            request_timeout_secs: 2,
            frame_rate: 4,
            statuses: default_statuses(),
            link_scheme: LinkScheme::default(),
            job_source: JobSource::default(),
            failure_policy: FailurePolicy::default(),
            legacy_auth_header: false,
        }
    }
}

fn default_statuses() -> Vec<String> {
    ["aborted", "errored", "failed", "succeeded", "paused"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl DashboardConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.frame_rate.max(1)))
    }

    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./concourse-summary.toml
    /// 3. ./concourse-summary.json
    /// 4. ./concourse-summary.yaml
    /// 5. ./concourse-summary.yml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => {
                let candidates = [
                    "concourse-summary.toml",
                    "concourse-summary.json",
                    "concourse-summary.yaml",
                    "concourse-summary.yml",
                ];

                match candidates.iter().map(Path::new).find(|p| p.exists()) {
                    Some(path) => Self::load_from_path(path)?,
                    None => Self::default(),
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        let parsed = match extension {
            "toml" => toml::from_str(&contents).map_err(|e| e.to_string()),
            "json" => serde_json::from_str(&contents).map_err(|e| e.to_string()),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| e.to_string()),
            _ => toml::from_str(&contents)
                .map_err(|e| e.to_string())
                .or_else(|_| serde_json::from_str(&contents).map_err(|e| e.to_string()))
                .or_else(|_| serde_yaml::from_str(&contents).map_err(|e| e.to_string())),
        };

        parsed.map_err(|e| {
            DashboardError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_secs == 0 {
            return Err(DashboardError::Config(
                "refresh-interval-secs must be at least 1".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(DashboardError::Config(
                "request-timeout-secs must be at least 1".into(),
            ));
        }
        if !(1..=1000).contains(&self.frame_rate) {
            return Err(DashboardError::Config(
                "frame-rate must be between 1 and 1000".into(),
            ));
        }
        if self.statuses.is_empty() {
            return Err(DashboardError::Config("statuses must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for status in &self.statuses {
            if !seen.insert(status.as_str()) {
                return Err(DashboardError::Config(format!(
                    "statuses lists '{status}' more than once"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), Duration::from_secs(2));
        assert_eq!(config.frame_interval(), Duration::from_millis(250));
        assert_eq!(
            config.statuses,
            vec!["aborted", "errored", "failed", "succeeded", "paused"]
        );
        assert_eq!(config.link_scheme, LinkScheme::Teams);
        assert_eq!(config.job_source, JobSource::Combined);
        assert_eq!(config.failure_policy, FailurePolicy::Retry);
        assert!(!config.legacy_auth_header);
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(
            temp_file,
            r#"
refresh-interval-secs = 2
statuses = ["failed", "succeeded"]
link-scheme = "legacy"
job-source = "per-pipeline"
failure-policy = "exit"
legacy-auth-header = true
"#
        )
        .unwrap();

        let config = DashboardConfig::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.refresh_interval_secs, 2);
        assert_eq!(config.request_timeout_secs, 2, "unset keys keep defaults");
        assert_eq!(config.statuses, vec!["failed", "succeeded"]);
        assert_eq!(config.link_scheme, LinkScheme::Legacy);
        assert_eq!(config.job_source, JobSource::PerPipeline);
        assert_eq!(config.failure_policy, FailurePolicy::Exit);
        assert!(config.legacy_auth_header);
    }

    #[test]
    fn test_load_json_config() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        write!(temp_file, r#"{{ "frame-rate": 10, "failure-policy": "retry" }}"#).unwrap();

        let config = DashboardConfig::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.frame_rate, 10);
        assert_eq!(config.frame_interval(), Duration::from_millis(100));
        assert_eq!(config.failure_policy, FailurePolicy::Retry);
    }

    #[test]
    fn test_load_yaml_without_extension() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "refresh-interval-secs: 5\nlink-scheme: legacy\n").unwrap();

        let config = DashboardConfig::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.refresh_interval_secs, 5);
        assert_eq!(config.link_scheme, LinkScheme::Legacy);
    }

    #[test]
    fn test_missing_explicit_path_is_a_config_error() {
        let err = DashboardConfig::load(Some(Path::new("does-not-exist.toml"))).unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(temp_file, "refresh-interval-secs = 0\n").unwrap();

        let err = DashboardConfig::load(Some(temp_file.path())).unwrap_err();
        assert!(err.to_string().contains("refresh-interval-secs"));
    }

    #[test]
    fn test_out_of_range_frame_rate_is_rejected() {
        for rate in [0, 1001, 2000] {
            let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
            write!(temp_file, "frame-rate = {rate}\n").unwrap();

            let err = DashboardConfig::load(Some(temp_file.path())).unwrap_err();
            assert!(err.to_string().contains("frame-rate"), "rate {rate}: {err}");
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn test_fastest_frame_rate_keeps_nonzero_interval() {
        let config = DashboardConfig {
            frame_rate: 1000,
            ..DashboardConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_duplicate_status_is_rejected() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(temp_file, "statuses = [\"failed\", \"failed\"]\n").unwrap();

        let err = DashboardConfig::load(Some(temp_file.path())).unwrap_err();
        assert!(err.to_string().contains("'failed'"), "{err}");
    }

    #[test]
    fn test_unknown_enum_value_is_rejected() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(temp_file, "failure-policy = \"panic\"\n").unwrap();

        assert!(DashboardConfig::load(Some(temp_file.path())).is_err());
    }
}
