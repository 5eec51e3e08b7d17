use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Cannot build request: {0}")]
    Request(String),

    #[error("Received {status} from {path}")]
    HttpStatus { status: u16, path: String },

    #[error("Failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Target must be either a target in flyrc, a hostname or a url: {0}")]
    UnknownTarget(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// Process exit status for an error that ends the program.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::UnknownTarget(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
