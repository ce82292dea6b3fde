// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request header block construction

use super::content_types::{FORM_URLENCODED, JSON};
use super::headers::{CONTENT_LENGTH, CONTENT_TYPE, REFERER};

/// Build the header block attached to every request.
///
/// Adds `Content-Length` for a non-empty body, a form-urlencoded
/// `Content-Type` unless `extra_headers` already declares JSON, a `Referer`
/// equal to the request URL, then `extra_headers` verbatim followed by CRLF.
pub fn merge_request_headers(url: &str, body_len: usize, extra_headers: &str) -> String {
    let mut block = String::new();

    if body_len > 0 {
        block.push_str(&format!("{}: {}\r\n", CONTENT_LENGTH, body_len));
    }

    let declares_json = extra_headers.contains(&format!("{}: {}", CONTENT_TYPE, JSON));
    if !declares_json {
        block.push_str(&format!("{}: {}\r\n", CONTENT_TYPE, FORM_URLENCODED));
    }

    block.push_str(&format!("{}: {}\r\n", REFERER, url));
    block.push_str(extra_headers);
    block.push_str("\r\n");
    block
}
