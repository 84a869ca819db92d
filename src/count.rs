//! Count SQL derivation.
//!
//! A paginated SELECT needs a companion `SELECT COUNT(*)` to size the result
//! set. The cheap form replaces the select list with `COUNT(*)` and drops a
//! trailing ORDER BY, which is irrelevant to a count. That rewrite changes
//! the counted row set whenever the statement deduplicates or regroups rows,
//! so DISTINCT, GROUP BY and set operations force the always-correct form:
//! wrapping the untouched statement as a counted subquery.

/// Derived count SQL plus what the derivation did to the statement.
///
/// Produced once per paginated statement and consumed by the interceptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountOutcome {
    /// The SQL to execute for the total.
    pub count_sql: String,
    /// True when a trailing top-level ORDER BY was dropped from the
    /// optimized form.
    pub order_by_stripped: bool,
}

/// Builds the count SQL for `base_sql`.
///
/// With `optimize` unset (or when the statement's shape rules the rewrite
/// out) the result is `SELECT COUNT(*) FROM (<base_sql>) AS _count_src`,
/// which preserves the count under any statement shape.
pub fn build_count_sql(base_sql: &str, optimize: bool) -> CountOutcome {
    let trimmed = base_sql.trim();
    if optimize {
        if let Some(outcome) = try_optimized(trimmed) {
            return outcome;
        }
    }
    CountOutcome {
        count_sql: format!("SELECT COUNT(*) FROM ({trimmed}) AS _count_src"),
        order_by_stripped: false,
    }
}

fn try_optimized(sql: &str) -> Option<CountOutcome> {
    let words = top_level_words(sql);
    match words.first() {
        Some((_, w)) if w == "SELECT" => {}
        _ => return None,
    }

    // Shapes whose row count changes if the select list is replaced.
    for (i, (_, word)) in words.iter().enumerate() {
        match word.as_str() {
            "DISTINCT" | "UNION" | "INTERSECT" | "EXCEPT" => return None,
            "GROUP" if next_word_is(&words, i, "BY") => return None,
            _ => {}
        }
    }

    let from_offset = words
        .iter()
        .find(|(_, w)| w == "FROM")
        .map(|(offset, _)| *offset)?;

    let mut body = &sql[from_offset..];
    let mut order_by_stripped = false;
    if let Some(order_offset) = words
        .iter()
        .enumerate()
        .rev()
        .find(|(i, (offset, w))| {
            *offset >= from_offset && w == "ORDER" && next_word_is(&words, *i, "BY")
        })
        .map(|(_, (offset, _))| *offset - from_offset)
    {
        body = sql[from_offset..from_offset + order_offset].trim_end();
        order_by_stripped = true;
    }

    Some(CountOutcome {
        count_sql: format!("SELECT COUNT(*) {body}"),
        order_by_stripped,
    })
}

fn next_word_is(words: &[(usize, String)], i: usize, expected: &str) -> bool {
    words.get(i + 1).map(|(_, w)| w == expected).unwrap_or(false)
}

/// Splits `sql` into uppercased words at parenthesis depth zero, skipping
/// string literals and parenthesized groups wholesale. Offsets index into
/// the original text.
fn top_level_words(sql: &str) -> Vec<(usize, String)> {
    let bytes = sql.as_bytes();
    let mut words = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => i = skip_literal(bytes, i),
            b'(' => i = skip_group(bytes, i),
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_')
                {
                    i += 1;
                }
                words.push((start, sql[start..i].to_ascii_uppercase()));
            }
            _ => i += 1,
        }
    }
    words
}

fn skip_literal(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if i + 1 < bytes.len() && bytes[i + 1] == b'\'' {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    i
}

fn skip_group(bytes: &[u8], start: usize) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                i = skip_literal(bytes, i);
                continue;
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    i
}
