// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie scraping from raw response headers

use lazy_static::lazy_static;
use regex::Regex;

use super::headers::SET_COOKIE;
use super::COOKIE_PREFIX;

lazy_static! {
    static ref SET_COOKIE_LINE: Regex = Regex::new(&format!(r"{}: ([^\r\n]*)", SET_COOKIE))
        .expect("Set-Cookie pattern is valid");
}

/// Values of every `Set-Cookie: ` line, in order of appearance
pub fn set_cookie_values(raw_headers: &str) -> Vec<&str> {
    SET_COOKIE_LINE
        .captures_iter(raw_headers)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Build a `Cookie: ` request header line from the `Set-Cookie` values.
///
/// Every value is followed by `"; "`, the last one included. Without any
/// `Set-Cookie` line the result is just `"Cookie: "`.
pub fn extract_cookies(raw_headers: &str) -> String {
    let mut result = String::from(COOKIE_PREFIX);
    for value in set_cookie_values(raw_headers) {
        result.push_str(value);
        result.push_str("; ");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_cookies() {
        let raw = "HTTP/1.1 200 OK\r\nSet-Cookie: a=1\r\nContent-Type: text/plain\r\nSet-Cookie: b=2\r\n\r\n";
        assert_eq!(extract_cookies(raw), "Cookie: a=1; b=2; ");
    }

    #[test]
    fn test_no_cookies() {
        assert_eq!(extract_cookies("HTTP/1.1 204 No Content\r\n\r\n"), "Cookie: ");
        assert_eq!(extract_cookies(""), "Cookie: ");
    }

    #[test]
    fn test_attributes_kept() {
        let raw = "Set-Cookie: sid=xyz; Path=/; HttpOnly\r\n";
        assert_eq!(extract_cookies(raw), "Cookie: sid=xyz; Path=/; HttpOnly; ");
    }

    #[test]
    fn test_lowercase_name_not_matched() {
        assert_eq!(extract_cookies("set-cookie: a=1\r\n"), "Cookie: ");
    }

    #[test]
    fn test_set_cookie_values() {
        let raw = "Set-Cookie: a=1\nSet-Cookie: b=2";
        assert_eq!(set_cookie_values(raw), vec!["a=1", "b=2"]);
    }
}
