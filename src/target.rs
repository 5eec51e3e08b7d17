use log::{debug, info};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use url::Url;

use crate::auth::Token;
use crate::error::{DashboardError, Result};

/// Resolved API endpoint and credential for one Concourse installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub base_url: Url,
    pub token: Option<Token>,
}

/// The subset of the `fly` CLI's `~/.flyrc` this dashboard understands.
#[derive(Debug, Default, Deserialize)]
struct FlyRc {
    #[serde(default)]
    targets: HashMap<String, FlyTarget>,
}

#[derive(Debug, Deserialize)]
struct FlyTarget {
    api: String,
    #[serde(default)]
    token: Option<FlyToken>,
}

#[derive(Debug, Deserialize)]
struct FlyToken {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    value: String,
}

/// Default location of the fly targets file.
pub fn default_flyrc_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".flyrc"))
}

/// Resolves the command line target argument.
///
/// In order of preference the argument is:
/// - the name of a target in the flyrc file, which supplies URL and token
/// - a full `http://` or `https://` URL, used without a token
/// - a bare hostname such as `ci.example.com`, served over HTTPS
///
/// A missing flyrc file only disables the first form; a malformed one is an
/// error.
pub fn resolve(arg: &str, flyrc_path: Option<&Path>) -> Result<Target> {
    let flyrc = match flyrc_path {
        Some(path) => load_flyrc(path)?,
        None => FlyRc::default(),
    };

    if let Some(fly_target) = flyrc.targets.get(arg) {
        info!("Using flyrc target '{arg}' ({})", fly_target.api);
        let base_url = parse_base_url(&fly_target.api)?;
        let token = fly_target
            .token
            .as_ref()
            .filter(|t| !t.value.is_empty())
            .map(|t| {
                debug!("Target '{arg}' carries a '{}' token", t.kind);
                Token::from(t.value.as_str())
            });
        return Ok(Target { base_url, token });
    }

    if arg.starts_with("http://") || arg.starts_with("https://") {
        return Ok(Target {
            base_url: parse_base_url(arg)?,
            token: None,
        });
    }

    if is_hostname(arg) {
        return Ok(Target {
            base_url: parse_base_url(&format!("https://{arg}"))?,
            token: None,
        });
    }

    Err(DashboardError::UnknownTarget(arg.to_string()))
}

fn load_flyrc(path: &Path) -> Result<FlyRc> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No flyrc at {}", path.display());
            return Ok(FlyRc::default());
        }
        Err(e) => {
            return Err(DashboardError::Config(format!(
                "Failed to read {}: {e}",
                path.display()
            )))
        }
    };

    serde_yaml::from_str(&contents).map_err(|e| {
        DashboardError::Config(format!("Failed to parse {}: {e}", path.display()))
    })
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim_end_matches('/'))
        .map_err(|e| DashboardError::Config(format!("Invalid API URL '{raw}': {e}")))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(DashboardError::Config(format!("Invalid API URL '{raw}'")));
    }
    Ok(url)
}

fn is_hostname(arg: &str) -> bool {
    arg.contains('.')
        && arg
            .split(':')
            .next()
            .is_some_and(|host| !host.is_empty() && !host.contains('/'))
        && !arg.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn flyrc(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    const FLYRC: &str = r"
targets:
  main:
    api: https://ci.example.com/
    team: main
    token:
      type: bearer
      value: abc123
  anonymous:
    api: http://localhost:8080
";

    #[test]
    fn resolves_named_target_with_token() {
        let file = flyrc(FLYRC);
        let target = resolve("main", Some(file.path())).unwrap();
        assert_eq!(target.base_url.as_str(), "https://ci.example.com/");
        assert_eq!(target.token, Some(Token::from("abc123")));
    }

    #[test]
    fn named_target_without_token() {
        let file = flyrc(FLYRC);
        let target = resolve("anonymous", Some(file.path())).unwrap();
        assert_eq!(target.base_url.host_str(), Some("localhost"));
        assert_eq!(target.base_url.port(), Some(8080));
        assert!(target.token.is_none());
    }

    #[test]
    fn full_url_is_used_verbatim() {
        let target = resolve("http://10.0.0.5:8080", None).unwrap();
        assert_eq!(target.base_url.as_str(), "http://10.0.0.5:8080/");
        assert!(target.token.is_none());
    }

    #[test]
    fn bare_hostname_becomes_https() {
        let target = resolve("buildpacks.ci.cf-app.com", None).unwrap();
        assert_eq!(target.base_url.as_str(), "https://buildpacks.ci.cf-app.com/");
    }

    #[test]
    fn unknown_name_is_unresolved() {
        let file = flyrc(FLYRC);
        let err = resolve("staging", Some(file.path())).unwrap_err();
        assert!(matches!(err, DashboardError::UnknownTarget(ref t) if t == "staging"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_flyrc_still_allows_urls() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(".flyrc");
        assert!(resolve("https://ci.example.com", Some(&missing)).is_ok());
        assert!(resolve("main", Some(&missing)).is_err());
    }

    #[test]
    fn malformed_flyrc_is_a_config_error() {
        let file = flyrc("targets: [not, a, map");
        let err = resolve("main", Some(file.path())).unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }
}
