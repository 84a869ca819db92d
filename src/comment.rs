//! SQL comment stripping.
//!
//! Statements are stripped of `/* ... */` block comments and `-- ...` line
//! comments before the trace footer is appended, so a caller-supplied comment
//! can never masquerade as (or break out of) the footer. Contents of
//! single-quoted string literals are preserved verbatim, including `''`
//! escapes, so a `--` or `/*` inside a literal is data, not a comment.

use std::borrow::Cow;

/// Removes SQL comments from `sql`, preserving string literal contents.
///
/// Line comments run to the end of line; the terminating newline is kept so
/// surrounding tokens stay separated. An unterminated block comment means the
/// statement is malformed; this runs on the hot query path, so rather than
/// guessing at intent the input is returned unchanged and the caller's SQL is
/// left for the database to reject.
pub fn strip_comments(sql: &str) -> Cow<'_, str> {
    if !sql.contains("--") && !sql.contains("/*") {
        return Cow::Borrowed(sql);
    }

    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                // Copy the literal through its closing quote. '' is an
                // escaped quote and stays inside the literal.
                let start = i;
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == b'\'' {
                        if i + 1 < bytes.len() && bytes[i + 1] == b'\'' {
                            i += 2;
                            continue;
                        }
                        i += 1;
                        break;
                    }
                    i += 1;
                }
                out.push_str(&sql[start..i]);
            }
            b'-' if i + 1 < bytes.len() && bytes[i + 1] == b'-' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'*' => {
                match sql[i + 2..].find("*/") {
                    Some(end) => i += 2 + end + 2,
                    // Unterminated block comment: fail safe.
                    None => return Cow::Borrowed(sql),
                }
            }
            _ => {
                let ch_len = utf8_len(bytes[i]);
                out.push_str(&sql[i..i + ch_len]);
                i += ch_len;
            }
        }
    }

    Cow::Owned(out)
}

fn utf8_len(first_byte: u8) -> usize {
    match first_byte {
        b if b < 0x80 => 1,
        b if b >= 0xF0 => 4,
        b if b >= 0xE0 => 3,
        _ => 2,
    }
}
