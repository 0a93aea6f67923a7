use std::path::PathBuf;
use thiserror::Error;

/// Why a single probe attempt did not reach its endpoint
#[derive(Debug, Error)]
pub enum ProbeError {
    /// URL did not match `http://HOST[:PORT]/`
    #[error("malformed probe URL: {0}")]
    MalformedUrl(String),

    /// Port segment present but not a valid TCP port
    #[error("invalid port {0:?}")]
    InvalidPort(String),

    #[error("connect to {addr} timed out after {timeout_ms}ms")]
    Timeout { addr: String, timeout_ms: u64 },

    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProbeError {
    /// Short status tag for the per-probe log line
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::MalformedUrl(_) => "url",
            ProbeError::InvalidPort(_) => "port",
            ProbeError::Timeout { .. } => "timeout",
            ProbeError::Connect { .. } => "connect",
        }
    }
}

/// Failure reading one of the per-ISP input files
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list directory {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
