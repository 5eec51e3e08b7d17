use console::{Key, Term};
use log::{debug, info};
use std::fmt::Write;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use url::Url;

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::providers::concourse::pipeline_url;
use crate::snapshot::Snapshot;
use crate::state::{Countdown, SnapshotReader};

use super::layout::{Direction, GridLayout};
use super::styling::{bright_yellow, cyan, dim, magenta_bold};
use super::tables::create_table;
use super::tiles::tile_cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Redraw,
    Ignore,
}

/// Terminal tile grid, redrawn on its own cadence from the shared snapshot.
pub struct Dashboard {
    reader: SnapshotReader,
    countdown: Countdown,
    base_url: Url,
    config: DashboardConfig,
    selected: usize,
    opened: Option<String>,
}

impl Dashboard {
    pub fn new(
        reader: SnapshotReader,
        countdown: Countdown,
        base_url: Url,
        config: DashboardConfig,
    ) -> Self {
        Self {
            reader,
            countdown,
            base_url,
            config,
            selected: 0,
            opened: None,
        }
    }

    /// Runs the render/input loop until the user quits or the refresher stops.
    ///
    /// The refresher only stops on its own under the exit failure policy, in
    /// which case its error is returned here.
    pub async fn run(
        mut self,
        term: Term,
        mut refresher: JoinHandle<Result<()>>,
    ) -> anyhow::Result<()> {
        let (key_tx, mut keys) = mpsc::unbounded_channel();
        spawn_key_reader(term.clone(), key_tx);

        term.hide_cursor()?;
        let result = self.event_loop(&term, &mut keys, &mut refresher).await;
        term.show_cursor()?;
        refresher.abort();
        result
    }

    async fn event_loop(
        &mut self,
        term: &Term,
        keys: &mut mpsc::UnboundedReceiver<Key>,
        refresher: &mut JoinHandle<Result<()>>,
    ) -> anyhow::Result<()> {
        let mut frame = interval(self.config.frame_interval());
        frame.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut dirty = true;
        let mut last_size = term.size();
        let mut last_countdown = self.countdown.remaining();

        loop {
            tokio::select! {
                _ = frame.tick() => {}
                Some(key) = keys.recv() => match self.handle_key(key) {
                    KeyAction::Quit => return Ok(()),
                    KeyAction::Redraw => dirty = true,
                    KeyAction::Ignore => {}
                },
                joined = &mut *refresher => {
                    joined??;
                    return Ok(());
                }
            }

            if self.reader.take_changed() {
                let len = self.reader.current().pipelines.len();
                self.selected = self.selected.min(len.saturating_sub(1));
                dirty = true;
            }

            let size = term.size();
            if size != last_size {
                last_size = size;
                dirty = true;
            }

            let remaining = self.countdown.remaining();
            if remaining != last_countdown {
                last_countdown = remaining;
                dirty = true;
            }

            if dirty {
                let snapshot = self.reader.current();
                let frame_text = self.render(&snapshot, usize::from(size.1));
                term.clear_screen()?;
                term.write_str(&frame_text)?;
                dirty = false;
            }
        }
    }

    pub fn handle_key(&mut self, key: Key) -> KeyAction {
        let snapshot = self.reader.current();
        let layout = GridLayout::new(snapshot.pipelines.len());

        match key {
            Key::Char('q') | Key::Escape => KeyAction::Quit,
            Key::ArrowLeft | Key::Char('h') => self.move_selection(layout, Direction::Left),
            Key::ArrowRight | Key::Char('l') => self.move_selection(layout, Direction::Right),
            Key::ArrowUp | Key::Char('k') => self.move_selection(layout, Direction::Up),
            Key::ArrowDown | Key::Char('j') => self.move_selection(layout, Direction::Down),
            Key::Enter => {
                let Some(pipeline) = snapshot.pipelines.get(self.selected) else {
                    return KeyAction::Ignore;
                };
                let url = pipeline_url(&self.base_url, self.config.link_scheme, pipeline);
                info!("Selected pipeline {}: {url}", pipeline.name);
                self.opened = Some(url);
                KeyAction::Redraw
            }
            _ => KeyAction::Ignore,
        }
    }

    fn move_selection(&mut self, layout: GridLayout, direction: Direction) -> KeyAction {
        let next = layout.neighbor(self.selected, direction);
        if next == self.selected {
            KeyAction::Ignore
        } else {
            self.selected = next;
            KeyAction::Redraw
        }
    }

    /// One full frame: header, tile grid, key help and the last opened link.
    pub fn render(&self, snapshot: &Snapshot, width: usize) -> String {
        let mut output = String::new();
        let _ = write!(
            output,
            "{} {}  ",
            magenta_bold("Concourse Summary"),
            cyan(&self.base_url)
        );

        if !snapshot.is_loaded() {
            let _ = writeln!(output, "{}", bright_yellow("waiting for first refresh..."));
            return output;
        }

        let fetched = snapshot
            .fetched_at
            .map(|at| at.format("fetched %H:%M:%S UTC").to_string())
            .unwrap_or_default();
        let _ = writeln!(
            output,
            "{} pipelines  {}  {}",
            bright_yellow(snapshot.pipelines.len()),
            dim(format!("next refresh ({}s)", self.countdown.remaining())),
            dim(fetched)
        );

        let layout = GridLayout::new(snapshot.pipelines.len());
        if layout.rows > 0 {
            let tile_width = layout.tile_width(width);
            let mut table = create_table();
            if let Ok(width) = u16::try_from(width) {
                table.set_width(width);
            }
            for row in 0..layout.rows {
                let cells: Vec<_> = (0..layout.per_row)
                    .map(|col| match layout.index_at(row, col) {
                        Some(idx) => tile_cell(
                            &snapshot.pipelines[idx],
                            &self.config.statuses,
                            tile_width,
                            idx == self.selected,
                        ),
                        None => comfy_table::Cell::new(""),
                    })
                    .collect();
                table.add_row(cells);
            }
            let _ = writeln!(output, "{table}");
        }

        let _ = writeln!(
            output,
            "{}",
            dim("arrows/hjkl select  enter show link  q quit")
        );
        if let Some(url) = &self.opened {
            let _ = writeln!(output, "{} {}", dim("Open:"), cyan(url));
        }
        output
    }
}

fn spawn_key_reader(term: Term, tx: mpsc::UnboundedSender<Key>) {
    // Blocking reads live on a plain thread; it dies with the process.
    std::thread::spawn(move || loop {
        match term.read_key() {
            Ok(key) => {
                if tx.send(key).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!("Key reader stopped: {e}");
                break;
            }
        }
    });
}
