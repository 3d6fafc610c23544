use std::fmt;

/// Category of a wire error. Lets callers decide between failing the
/// request and surfacing a caller bug without matching on messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed bytes, missing magic prefix, required field absent.
    Format,
    /// Internally inconsistent message (count mismatch, exists + cells, ...).
    Protocol,
    /// Recognized-but-unhandled enum value.
    Unsupported,
    /// Named extension could not be resolved or parsed.
    Plugin,
    /// Underlying stream failed.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Format => f.write_str("format"),
            ErrorKind::Protocol => f.write_str("protocol"),
            ErrorKind::Unsupported => f.write_str("unsupported"),
            ErrorKind::Plugin => f.write_str("plugin"),
            ErrorKind::Io => f.write_str("io"),
        }
    }
}

/// Error returned by every encode/decode operation.
///
/// Codec-originated variants are never retryable: the same bytes fail the
/// same way until the sender (or the plugin registry) changes.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("format: {0}")]
    Format(String),

    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("unsupported {what}: {code}")]
    UnsupportedVariant { what: &'static str, code: i32 },

    #[error("plugin '{name}': {detail}")]
    PluginResolution { name: String, detail: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl WireError {
    pub fn format(msg: impl Into<String>) -> Self {
        WireError::Format(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        WireError::ProtocolViolation(msg.into())
    }

    pub fn unsupported(what: &'static str, code: i32) -> Self {
        WireError::UnsupportedVariant { what, code }
    }

    pub fn plugin(name: impl Into<String>, detail: impl fmt::Display) -> Self {
        WireError::PluginResolution {
            name: name.into(),
            detail: detail.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WireError::Format(_) => ErrorKind::Format,
            WireError::ProtocolViolation(_) => ErrorKind::Protocol,
            WireError::UnsupportedVariant { .. } => ErrorKind::Unsupported,
            WireError::PluginResolution { .. } => ErrorKind::Plugin,
            WireError::Io(_) => ErrorKind::Io,
        }
    }

    /// Only transient stream conditions are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            WireError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }

    /// Add context to the error, preserving the variant.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        match self {
            WireError::Format(msg) => WireError::Format(format!("{ctx}: {msg}")),
            WireError::ProtocolViolation(msg) => {
                WireError::ProtocolViolation(format!("{ctx}: {msg}"))
            }
            WireError::PluginResolution { name, detail } => WireError::PluginResolution {
                name,
                detail: format!("{ctx}: {detail}"),
            },
            other => other,
        }
    }
}
