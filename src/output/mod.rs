mod dashboard;
mod layout;
mod progress;
mod styling;
mod summary;
mod tables;
mod tiles;

pub use dashboard::Dashboard;
pub use progress::RefreshProgress;
pub use styling::{dim, magenta_bold};
pub use summary::render_summary;

/// Prints the Concourse Summary banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("Concourse Summary"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("CI pipeline health dashboard")
    );
}
