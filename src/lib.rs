// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # synchttp - Blocking HTTP Client Facade
//!
//! A synchronous HTTP client that drives a platform-style engine one primitive
//! at a time: session, connection, request, options, send, receive, drain.
//!
//! ## Features
//!
//! - One call, one exchange: every request acquires and releases its own handles
//! - Lenient TLS by default, certificate validation on request
//! - Named proxy with credentials, plus a single system proxy fallback on send failure
//! - Raw header block kept verbatim, parsed into a name/value mapping on demand
//! - `Set-Cookie` scraping into a ready-to-send `Cookie: ` header line
//! - Pluggable [`Engine`](engine::Engine); [`ReqwestEngine`](engine::ReqwestEngine) by default
//!
//! ## Example
//!
//! ```rust,no_run
//! use synchttp::HttpClient;
//!
//! let mut client = HttpClient::new(false);
//! let response = client.get("https://example.com/", "Accept: text/html\r\n");
//!
//! if response.is_aborted() {
//!     eprintln!("request failed: {}", response.error);
//! } else {
//!     println!("{} ({} bytes)", response.status_code, response.content_length);
//!     println!("{}", response.cookies());
//! }
//! ```

pub mod engine;
pub mod error;
pub mod http;

// Re-exports for convenience

// Client
pub use http::{ClientConfig, HttpClient};

// Response
pub use http::{Diagnostic, Response, Step};

// Header helpers
pub use http::{extract_cookies, merge_request_headers, parse_header_block, HeaderRecord};

// Engine
pub use engine::{Engine, ReqwestEngine, Timeouts};

// Errors
pub use error::{EngineError, Error, ErrorCode, RequestAbort, Result};

/// synchttp version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One-shot GET with a default client
pub fn get(url: &str) -> Response {
    HttpClient::default().get(url, "")
}

/// One-shot POST with a default client
pub fn post(url: &str, body: impl AsRef<[u8]>) -> Response {
    HttpClient::default().post(url, body, "")
}
