// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for synchttp
//!
//! Requests report failures through two channels that never overlap:
//!
//! - [`ErrorCode`] values land in [`HttpClient::last_error`](crate::HttpClient::last_error)
//!   for local validation failures and best-effort steps that did not stop the call.
//! - A [`RequestAbort`] tag lands in [`Response::error`](crate::Response::error)
//!   when a step the request cannot continue without fails.
//!
//! [`Error`] covers the remaining fallible API: configuration loading and body decoding.

use std::fmt;

use thiserror::Error;

/// Result type alias for synchttp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for configuration and body decoding
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Numeric error code reported by the engine or by local validation.
///
/// The values follow the Win32/WinHTTP numbering so codes stay comparable
/// with logs produced by native clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ErrorCode(pub u32);

impl ErrorCode {
    pub const SUCCESS: ErrorCode = ErrorCode(0);
    pub const PATH_NOT_FOUND: ErrorCode = ErrorCode(3);
    pub const INVALID_PARAMETER: ErrorCode = ErrorCode(87);
    pub const INSUFFICIENT_BUFFER: ErrorCode = ErrorCode(122);
    pub const TIMEOUT: ErrorCode = ErrorCode(12002);
    pub const INVALID_URL: ErrorCode = ErrorCode(12005);
    pub const UNRECOGNIZED_SCHEME: ErrorCode = ErrorCode(12006);
    pub const NAME_NOT_RESOLVED: ErrorCode = ErrorCode(12007);
    pub const INVALID_OPTION: ErrorCode = ErrorCode(12009);
    pub const INCORRECT_HANDLE_STATE: ErrorCode = ErrorCode(12019);
    pub const CANNOT_CONNECT: ErrorCode = ErrorCode(12029);
    pub const CONNECTION_ERROR: ErrorCode = ErrorCode(12030);
    pub const INVALID_HEADER: ErrorCode = ErrorCode(12153);
    pub const AUTO_PROXY_SERVICE_ERROR: ErrorCode = ErrorCode(12178);

    /// Raw numeric value
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Check if this code signals success
    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ErrorCode> for u32 {
    fn from(code: ErrorCode) -> Self {
        code.0
    }
}

/// Failure reported by an [`Engine`](crate::engine::Engine) call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("engine error {code}: {message}")]
pub struct EngineError {
    /// Engine error code
    pub code: ErrorCode,
    /// Human readable detail
    pub message: String,
    /// Buffer size needed, set with [`ErrorCode::INSUFFICIENT_BUFFER`]
    pub required_size: Option<usize>,
}

impl EngineError {
    /// Create a new engine error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            required_size: None,
        }
    }

    /// Two-phase query probe result: the caller's buffer needs `required` bytes
    pub fn insufficient_buffer(required: usize) -> Self {
        Self {
            code: ErrorCode::INSUFFICIENT_BUFFER,
            message: format!("buffer too small, {} bytes required", required),
            required_size: Some(required),
        }
    }

    /// Handle used out of order
    pub fn handle_state(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::INCORRECT_HANDLE_STATE, message)
    }

    /// Check if this is the "buffer too small" probe answer
    pub fn is_insufficient_buffer(&self) -> bool {
        self.code == ErrorCode::INSUFFICIENT_BUFFER
    }
}

/// Result type for engine calls
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Fatal request failure. Its `Display` text is what lands in `Response::error`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestAbort {
    #[error("URL parse failed")]
    CrackUrl(EngineError),

    #[error("connect failed")]
    Connect(EngineError),

    #[error("open request failed")]
    OpenRequest(EngineError),

    #[error("send request failed")]
    Send(EngineError),

    #[error("receive response failed")]
    ReceiveResponse(EngineError),
}

impl RequestAbort {
    /// Engine error that caused the abort
    pub fn engine_error(&self) -> &EngineError {
        match self {
            RequestAbort::CrackUrl(e)
            | RequestAbort::Connect(e)
            | RequestAbort::OpenRequest(e)
            | RequestAbort::Send(e)
            | RequestAbort::ReceiveResponse(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abort_tags() {
        let cause = EngineError::new(ErrorCode::CANNOT_CONNECT, "refused");

        assert_eq!(RequestAbort::CrackUrl(cause.clone()).to_string(), "URL parse failed");
        assert_eq!(RequestAbort::Send(cause.clone()).to_string(), "send request failed");
        assert_eq!(
            RequestAbort::ReceiveResponse(cause.clone()).engine_error().code,
            ErrorCode::CANNOT_CONNECT
        );
    }

    #[test]
    fn test_insufficient_buffer() {
        let err = EngineError::insufficient_buffer(42);

        assert!(err.is_insufficient_buffer());
        assert_eq!(err.required_size, Some(42));
        assert_eq!(err.code.as_u32(), 122);
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::INVALID_PARAMETER.to_string(), "87");
        assert!(ErrorCode::default().is_success());
    }
}
