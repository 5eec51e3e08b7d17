use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright_green, bright_red, bright_yellow};

/// Spinner shown on stderr while a refresh cycle is in flight.
pub struct RefreshProgress {
    pb: ProgressBar,
}

impl RefreshProgress {
    pub fn start(target: &str) -> Self {
        let pb = create_spinner(bright_yellow(format!("Fetching pipelines and jobs from {target}")).to_string());
        Self { pb }
    }

    pub fn finish(self, pipelines: usize) {
        self.pb
            .finish_with_message(bright_green(format!("Fetched {pipelines} pipelines ✓")).to_string());
    }

    pub fn fail(self) {
        self.pb
            .abandon_with_message(bright_red("Refresh failed ✗").to_string());
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
