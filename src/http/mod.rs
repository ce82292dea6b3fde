// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP facade layer
//!
//! Provides the blocking [`HttpClient`], the [`Response`] record it fills in,
//! and the raw header helpers used on that record.

mod client;
mod config;
mod cookie;
mod header;
mod request;
mod response;

pub use client::HttpClient;
pub use config::ClientConfig;
pub use cookie::{extract_cookies, set_cookie_values};
pub use header::{parse_header_block, HeaderRecord};
pub use request::merge_request_headers;
pub use response::{Diagnostic, Response, Step};

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36 Edg/110.0.1587.50";

/// Start of the request header line built by [`extract_cookies`]
pub const COOKIE_PREFIX: &str = "Cookie: ";

/// Header names as written into request header blocks
pub mod headers {
    pub const CONTENT_LENGTH: &str = "Content-Length";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const REFERER: &str = "Referer";
    pub const SET_COOKIE: &str = "Set-Cookie";
}

/// Content types the request builder cares about
pub mod content_types {
    pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
    pub const JSON: &str = "application/json";
}
