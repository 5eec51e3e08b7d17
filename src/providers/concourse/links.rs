use url::Url;

use crate::config::LinkScheme;
use crate::snapshot::Pipeline;

/// Builds the web UI URL of a pipeline.
///
/// # Arguments
///
/// * `base_url` - Concourse base URL (e.g., <https://ci.example.com>)
/// * `scheme` - Team-scoped or pre-teams URL layout
/// * `pipeline` - Pipeline to link to
///
/// # Returns
///
/// Clickable URL (e.g., <https://ci.example.com/teams/main/pipelines/deploy>),
/// with team and pipeline names percent-encoded.
pub fn pipeline_url(base_url: &Url, scheme: LinkScheme, pipeline: &Pipeline) -> String {
    let mut url = base_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty();
        match scheme {
            LinkScheme::Teams => {
                segments.extend(["teams", pipeline.team_name.as_str(), "pipelines", pipeline.name.as_str()]);
            }
            LinkScheme::Legacy => {
                segments.extend(["pipelines", pipeline.name.as_str()]);
            }
        }
    }
    url.to_string()
}
