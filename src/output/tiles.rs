use comfy_table::{Attribute, Cell, Color as TableColor};

use crate::snapshot::{Pipeline, ABORTED, ERRORED, FAILED, PAUSED, SUCCEEDED};

/// Overall look of a tile, most important condition first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    Paused,
    Green,
    Failed,
    Errored,
    Aborted,
    Empty,
    Pending,
}

impl TileState {
    pub fn of(pipeline: &Pipeline) -> Self {
        if pipeline.paused {
            Self::Paused
        } else if pipeline.is_fully_green() {
            Self::Green
        } else if pipeline.count(FAILED) > 0 {
            Self::Failed
        } else if pipeline.count(ERRORED) > 0 {
            Self::Errored
        } else if pipeline.count(ABORTED) > 0 {
            Self::Aborted
        } else if pipeline.total_jobs() == 0 {
            Self::Empty
        } else {
            Self::Pending
        }
    }

    pub fn color(self) -> TableColor {
        match self {
            Self::Paused => TableColor::Blue,
            Self::Green => TableColor::Green,
            Self::Failed => TableColor::Red,
            Self::Errored => TableColor::DarkYellow,
            Self::Aborted => TableColor::DarkRed,
            Self::Empty => TableColor::DarkGrey,
            Self::Pending => TableColor::Grey,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Paused => "paused",
            Self::Green => "green",
            Self::Failed => "failed",
            Self::Errored => "errored",
            Self::Aborted => "aborted",
            Self::Empty => "no jobs",
            Self::Pending => "pending",
        }
    }
}

fn glyph(status: &str) -> char {
    match status {
        SUCCEEDED => '=',
        FAILED => 'x',
        ERRORED => '!',
        ABORTED => '-',
        PAUSED => '~',
        _ => '?',
    }
}

/// Proportional bar of the configured statuses, `width` characters long.
///
/// Statuses outside `taxonomy` (including never-built jobs) still count
/// towards the total, so their share is left blank.
pub fn status_bar(pipeline: &Pipeline, taxonomy: &[String], width: usize) -> String {
    let total = pipeline.total_jobs();
    if total == 0 || width == 0 {
        return " ".repeat(width);
    }

    let mut bar = String::with_capacity(width);
    let mut cumulative = 0;
    let mut drawn = 0;
    for status in taxonomy {
        let count = pipeline.count(status);
        if count == 0 {
            continue;
        }
        cumulative += count;
        let end = (cumulative * width / total).min(width);
        bar.extend(std::iter::repeat(glyph(status)).take(end - drawn));
        drawn = end;
    }
    bar.extend(std::iter::repeat(' ').take(width - drawn));
    bar
}

/// `label count` pairs for every configured status present on the pipeline.
pub fn status_counts(pipeline: &Pipeline, taxonomy: &[String]) -> String {
    taxonomy
        .iter()
        .filter_map(|status| {
            let count = pipeline.count(status);
            (count > 0).then(|| format!("{status} {count}"))
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Table cell for one pipeline tile.
pub fn tile_cell(pipeline: &Pipeline, taxonomy: &[String], width: usize, selected: bool) -> Cell {
    let state = TileState::of(pipeline);
    let marker = if pipeline.running { "● " } else { "" };
    let counts = status_counts(pipeline, taxonomy);

    let text = format!(
        "{marker}{}\n[{}]\n{}",
        pipeline.name,
        status_bar(pipeline, taxonomy, width.saturating_sub(2)),
        if counts.is_empty() { state.label() } else { counts.as_str() }
    );

    let mut cell = Cell::new(text).fg(state.color());
    if pipeline.running {
        cell = cell.add_attribute(Attribute::Bold);
    }
    if selected {
        cell = cell.add_attribute(Attribute::Reverse);
    }
    cell
}
