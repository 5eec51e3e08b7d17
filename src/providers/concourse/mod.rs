mod aggregate;
mod client;
mod links;
mod types;

pub use aggregate::compute_snapshot;
pub use client::ConcourseClient;
pub use links::pipeline_url;
