// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Raw header block parsing

use std::collections::HashMap;

/// Header name to header value. Names keep their received case and the last
/// occurrence of a repeated name wins.
pub type HeaderRecord = HashMap<String, String>;

/// Parse a raw `Name: Value\r\n` header block into a [`HeaderRecord`].
///
/// The first `:` on a line splits name from value and one space after it is
/// skipped. CR, LF and CRLF all end a line. Lines with an empty name or an
/// empty value are dropped, which also drops the status line.
pub fn parse_header_block(raw: &str) -> HeaderRecord {
    let mut record = HeaderRecord::new();
    let mut key = String::new();
    let mut value = String::new();
    let mut after_colon = false;
    let mut just_after_colon = false;
    let mut after_cr = false;

    for ch in raw.chars() {
        let prev_was_cr = std::mem::replace(&mut after_cr, false);

        match ch {
            '\n' if prev_was_cr => {}
            '\r' | '\n' => {
                commit(&mut record, &mut key, &mut value);
                after_colon = false;
                just_after_colon = false;
                after_cr = ch == '\r';
            }
            ':' if !after_colon => {
                after_colon = true;
                just_after_colon = true;
            }
            ' ' if just_after_colon => just_after_colon = false,
            _ if after_colon => {
                just_after_colon = false;
                value.push(ch);
            }
            _ => key.push(ch),
        }
    }

    // Block without a final line terminator
    commit(&mut record, &mut key, &mut value);
    record
}

fn commit(record: &mut HeaderRecord, key: &mut String, value: &mut String) {
    if !key.is_empty() && !value.is_empty() {
        record.insert(std::mem::take(key), std::mem::take(value));
    } else {
        key.clear();
        value.clear();
    }
}
