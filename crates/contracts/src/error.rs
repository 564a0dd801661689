//! Layered error definitions
//!
//! Categorized by source: config / transport / source / sink.
//!
//! Geometry degeneracies (parallel rays, degenerate segments) are NOT
//! errors - kernel functions return `Option` and callers treat `None`
//! as "mirror inactive this tick".

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Transport Errors =====
    /// Publish socket bind error
    #[error("transport bind error on port {port}: {message}")]
    TransportBind { port: u16, message: String },

    /// Publish send error (terminated transport, closed worker)
    #[error("transport send error: {message}")]
    TransportSend { message: String },

    // ===== Source Errors =====
    /// Frame or pose source unavailable
    #[error("source '{name}' unavailable: {message}")]
    SourceUnavailable { name: String, message: String },

    /// Frame payload does not match announced dimensions/format
    #[error("frame payload mismatch for '{source_name}': {message}")]
    FrameMismatch {
        source_name: String,
        message: String,
    },

    // ===== Renderer Sink Errors =====
    /// Render target creation error
    #[error("render target error for capturer '{capturer_id}': {message}")]
    RenderTarget {
        capturer_id: String,
        message: String,
    },

    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create transport bind error
    pub fn transport_bind(port: u16, message: impl Into<String>) -> Self {
        Self::TransportBind {
            port,
            message: message.into(),
        }
    }

    /// Create transport send error
    pub fn transport_send(message: impl Into<String>) -> Self {
        Self::TransportSend {
            message: message.into(),
        }
    }

    /// Create source unavailable error
    pub fn source_unavailable(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create render target error
    pub fn render_target(capturer_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RenderTarget {
            capturer_id: capturer_id.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
