//! Publisher error types
//!
//! Only `bind` surfaces errors to callers; `publish` is best-effort
//! and swallows transport failures after logging them.

use thiserror::Error;

/// Publisher-specific errors
#[derive(Debug, Error)]
pub enum PublisherError {
    /// Socket bind error
    #[error("failed to bind publish socket on port {port}: {message}")]
    Bind { port: u16, message: String },

    /// Wire frame exceeds the protocol limit
    #[error("frame too large: {size} bytes (limit {limit})")]
    FrameTooLarge { size: usize, limit: usize },

    /// Decoded frame is malformed
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Transport worker is gone
    #[error("transport terminated")]
    TransportTerminated,

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Contract-level error
    #[error(transparent)]
    Contract(#[from] contracts::ContractError),
}

impl PublisherError {
    /// Create a bind error
    pub fn bind(port: u16, message: impl Into<String>) -> Self {
        Self::Bind {
            port,
            message: message.into(),
        }
    }
}
