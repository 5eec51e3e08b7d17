use std::fmt::Write;

use comfy_table::{Cell, Color as TableColor};
use url::Url;

use crate::config::DashboardConfig;
use crate::providers::concourse::pipeline_url;
use crate::snapshot::{Snapshot, ABORTED, ERRORED, FAILED, PAUSED, SUCCEEDED};

use super::styling::{bright_green, bright_red, bright_yellow, cyan, dim};
use super::tables::{count_cell, create_table, cyan_header};
use super::tiles::TileState;

/// Renders a one-shot snapshot as an overview plus one table row per pipeline.
pub fn render_summary(snapshot: &Snapshot, base_url: &Url, config: &DashboardConfig) -> String {
    let mut output = String::new();

    let green = snapshot
        .pipelines
        .iter()
        .filter(|p| TileState::of(p) == TileState::Green)
        .count();
    let failing = snapshot
        .pipelines
        .iter()
        .filter(|p| matches!(TileState::of(p), TileState::Failed | TileState::Errored))
        .count();
    let running = snapshot.pipelines.iter().filter(|p| p.running).count();

    let _ = writeln!(
        output,
        "  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n",
        dim("Target:"),
        cyan(base_url),
        dim("Pipelines:"),
        bright_yellow(snapshot.pipelines.len()),
        dim("Fully green:"),
        bright_green(green),
        dim("Failing:"),
        bright_red(failing),
        dim("Running:"),
        bright_yellow(running),
    );

    if snapshot.pipelines.is_empty() {
        let _ = writeln!(output, "{}", bright_yellow("No pipelines found."));
        return output;
    }

    let mut labels = vec!["Team", "Pipeline", "State"];
    labels.extend(config.statuses.iter().map(String::as_str));
    labels.extend(["Jobs", "URL"]);

    let mut table = create_table();
    table.set_header(cyan_header(&labels));

    for pipeline in &snapshot.pipelines {
        let state = TileState::of(pipeline);
        let state_text = if pipeline.running {
            format!("{} (running)", state.label())
        } else {
            state.label().to_string()
        };

        let mut row = vec![
            Cell::new(&pipeline.team_name),
            Cell::new(&pipeline.name),
            Cell::new(state_text).fg(state.color()),
        ];
        row.extend(
            config
                .statuses
                .iter()
                .map(|status| count_cell(pipeline.count(status), status_color(status))),
        );
        row.push(Cell::new(pipeline.total_jobs()));
        row.push(Cell::new(pipeline_url(base_url, config.link_scheme, pipeline)));
        table.add_row(row);
    }

    let _ = writeln!(output, "{table}");
    if let Some(fetched_at) = snapshot.fetched_at {
        let _ = writeln!(output, "{}", dim(fetched_at.format("Fetched %Y-%m-%d %H:%M:%S UTC")));
    }
    output
}

fn status_color(status: &str) -> TableColor {
    match status {
        SUCCEEDED => TableColor::Green,
        FAILED => TableColor::Red,
        ERRORED => TableColor::DarkYellow,
        ABORTED => TableColor::DarkRed,
        PAUSED => TableColor::Blue,
        _ => TableColor::Grey,
    }
}
