// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response record

use std::cell::{Ref, RefCell};
use std::fmt;

use serde::de::DeserializeOwned;

use super::cookie::{extract_cookies, set_cookie_values};
use super::header::{parse_header_block, HeaderRecord};
use crate::error::{EngineError, Error, Result};

/// Request lifecycle step that reported a non-fatal failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    OpenSession,
    SecurityFlags,
    DisableRedirects,
    AddHeaders,
    ProxyAssign,
    ProxyUsername,
    ProxyPassword,
    Send,
    SystemProxyQuery,
    AutoProxyResolve,
    FallbackProxyAssign,
    FallbackSend,
    WriteBody,
    QueryStatus,
    QueryHeaders,
    DataAvailable,
    ReadChunk,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::OpenSession => "open session",
            Step::SecurityFlags => "set security flags",
            Step::DisableRedirects => "disable redirects",
            Step::AddHeaders => "add headers",
            Step::ProxyAssign => "assign proxy",
            Step::ProxyUsername => "set proxy username",
            Step::ProxyPassword => "set proxy password",
            Step::Send => "send",
            Step::SystemProxyQuery => "query system proxy",
            Step::AutoProxyResolve => "resolve auto proxy",
            Step::FallbackProxyAssign => "assign fallback proxy",
            Step::FallbackSend => "resend through proxy",
            Step::WriteBody => "write body",
            Step::QueryStatus => "query status code",
            Step::QueryHeaders => "query raw headers",
            Step::DataAvailable => "query data available",
            Step::ReadChunk => "read body chunk",
        };
        f.write_str(name)
    }
}

/// A failure that was recorded but did not stop the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub step: Step,
    pub error: EngineError,
}

impl Diagnostic {
    pub fn new(step: Step, error: EngineError) -> Self {
        Self { step, error }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.step, self.error)
    }
}

/// Result of one request.
///
/// `error` is non-empty only when the request aborted; whatever was read
/// before the abort stays in place.
#[derive(Debug, Clone, Default)]
pub struct Response {
    /// Numeric status code, 0 when none was received
    pub status_code: u32,
    /// Response body bytes
    pub body: Vec<u8>,
    /// Raw CRLF header block including the status line
    pub raw_headers: String,
    /// Number of body bytes read
    pub content_length: usize,
    /// Abort tag, empty on success
    pub error: String,
    /// Non-fatal failures in the order they happened
    pub diagnostics: Vec<Diagnostic>,
    header_record: RefCell<HeaderRecord>,
}

impl Response {
    /// Create an empty response
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every field, including the cached header record
    pub fn reset(&mut self) {
        self.status_code = 0;
        self.body.clear();
        self.raw_headers.clear();
        self.content_length = 0;
        self.error.clear();
        self.diagnostics.clear();
        self.header_record.get_mut().clear();
    }

    /// Parsed header mapping, built from `raw_headers` while the cached
    /// mapping is empty.
    ///
    /// A non-empty cache is kept until [`reset`](Self::reset).
    pub fn header_record(&self) -> Ref<'_, HeaderRecord> {
        if let Ok(mut cached) = self.header_record.try_borrow_mut() {
            if cached.is_empty() {
                *cached = parse_header_block(&self.raw_headers);
            }
        }
        self.header_record.borrow()
    }

    /// Look up a header by its exact name as rebuilt by the engine.
    ///
    /// [`ReqwestEngine`](crate::engine::ReqwestEngine) writes names in
    /// canonical case (`Content-Type`, `ETag`, `WWW-Authenticate`).
    pub fn header(&self, name: &str) -> Option<String> {
        self.header_record().get(name).cloned()
    }

    /// `Cookie: ` request header built from every `Set-Cookie` line
    pub fn cookies(&self) -> String {
        extract_cookies(&self.raw_headers)
    }

    /// Raw `Set-Cookie` values
    pub fn set_cookies(&self) -> Vec<&str> {
        set_cookie_values(&self.raw_headers)
    }

    /// Check if the request aborted
    pub fn is_aborted(&self) -> bool {
        !self.error.is_empty()
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Get body as text
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.clone()).map_err(|e| Error::Other(e.to_string()))
    }

    /// Get body as text, lossy conversion
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn populated() -> Response {
        let mut resp = Response::new();
        resp.status_code = 200;
        resp.body = b"{\"ok\":true}".to_vec();
        resp.content_length = resp.body.len();
        resp.raw_headers =
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nSet-Cookie: a=1\r\n\r\n"
                .to_string();
        resp.diagnostics.push(Diagnostic::new(
            Step::WriteBody,
            EngineError::new(ErrorCode::CONNECTION_ERROR, "short write"),
        ));
        resp
    }

    #[test]
    fn test_header_record_cached() {
        let mut resp = populated();
        assert_eq!(resp.header("Content-Type").as_deref(), Some("application/json"));

        // Cache survives edits to the raw block until reset
        resp.raw_headers = "X-Other: 1\r\n".to_string();
        assert_eq!(resp.header("Content-Type").as_deref(), Some("application/json"));
        assert_eq!(resp.header("X-Other"), None);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut resp = populated();
        assert_eq!(resp.header_record().len(), 2);

        resp.reset();
        assert_eq!(resp.status_code, 0);
        assert!(resp.body.is_empty());
        assert!(resp.raw_headers.is_empty());
        assert!(resp.error.is_empty());
        assert!(resp.diagnostics.is_empty());
        assert_eq!(resp.content_length, 0);
        assert!(resp.header_record().is_empty());
    }

    #[test]
    fn test_reset_then_repopulate_recomputes() {
        let mut resp = populated();
        assert_eq!(resp.header("Set-Cookie").as_deref(), Some("a=1"));

        resp.reset();
        resp.raw_headers = "HTTP/1.1 302 Found\r\nLocation: /next\r\n\r\n".to_string();
        assert_eq!(resp.header("Location").as_deref(), Some("/next"));
        assert_eq!(resp.header("Set-Cookie"), None);
    }

    #[test]
    fn test_empty_record_rebuilt_once_headers_arrive() {
        let mut resp = Response::new();
        assert!(resp.header_record().is_empty());

        resp.raw_headers = "HTTP/1.1 200 OK\r\nX-A: 1\r\n\r\n".to_string();
        assert_eq!(resp.header("X-A").as_deref(), Some("1"));
    }

    #[test]
    fn test_block_without_valid_lines_rechecked() {
        let mut resp = Response::new();
        resp.raw_headers = "HTTP/1.1 204 No Content\r\n\r\n".to_string();
        assert!(resp.header_record().is_empty());

        resp.raw_headers.push_str("Retry-After: 5\r\n");
        assert_eq!(resp.header("Retry-After").as_deref(), Some("5"));
    }

    #[test]
    fn test_nested_record_borrows() {
        let resp = Response::new();
        let outer = resp.header_record();
        assert!(resp.header("Missing").is_none());
        assert!(outer.is_empty());
    }

    #[test]
    fn test_cookies_and_body() {
        let resp = populated();
        assert_eq!(resp.cookies(), "Cookie: a=1; ");
        assert_eq!(resp.set_cookies(), vec!["a=1"]);
        assert!(resp.is_success());
        assert!(!resp.is_aborted());

        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(resp.text().unwrap(), "{\"ok\":true}");
    }

    #[test]
    fn test_invalid_utf8_body() {
        let mut resp = Response::new();
        resp.body = vec![0xff, b'a'];
        assert!(resp.text().is_err());
        assert_eq!(resp.text_lossy(), "\u{fffd}a");
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new(
            Step::AddHeaders,
            EngineError::new(ErrorCode::INVALID_HEADER, "bad line"),
        );
        assert_eq!(diag.to_string(), "add headers: engine error 12153: bad line");
    }
}
