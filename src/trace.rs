//! Request-tracing footer injection.
//!
//! Every rewritten statement carries a trailing comment correlating it with
//! the originating request in database logs. The footer format is scraped by
//! log tooling and must stay stable:
//!
//! ```text
//!  /*from_api:<request_id><process_id> spid=<sampling_id> dbname=<db_name>*/
//! ```
//!
//! Appending is idempotent on the marker token, and the final SQL is
//! collapsed to a single line so one log record holds one statement.

use std::net::UdpSocket;

use once_cell::sync::Lazy;

use crate::comment::strip_comments;

/// Marker prefix checked for idempotence. Single leading space is part of
/// the stable format.
pub const TRACE_MARKER: &str = " /*from_api:";

/// Process-wide identity, computed once at first use.
#[derive(Debug, Clone)]
pub struct ProcessIdentity {
    /// `<pid>@<host_ip>`.
    pub process_id: String,
    pub host_ip: String,
}

static LOCAL_IDENTITY: Lazy<ProcessIdentity> = Lazy::new(ProcessIdentity::detect);

impl ProcessIdentity {
    fn detect() -> Self {
        let host_ip = detect_host_ip();
        ProcessIdentity {
            process_id: format!("{}@{}", std::process::id(), host_ip),
            host_ip,
        }
    }

    /// The identity of this process. Lazily initialized exactly once; cheap
    /// for concurrent readers afterwards.
    pub fn local() -> &'static ProcessIdentity {
        &LOCAL_IDENTITY
    }
}

// Routing probe: a UDP connect performs no I/O but lets the OS pick the
// outbound interface address.
fn detect_host_ip() -> String {
    UdpSocket::bind("0.0.0.0:0")
        .and_then(|socket| {
            socket.connect("8.8.8.8:80")?;
            socket.local_addr()
        })
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| "127.0.0.1".to_string())
}

/// Trace metadata rendered into the footer.
///
/// The process identity defaults to [`ProcessIdentity::local`] but is an
/// ordinary field, so tests and embedders can substitute a fixed value.
#[derive(Debug, Clone)]
pub struct TraceInfo {
    pub request_id: String,
    pub process_id: String,
    pub sampling_id: String,
    pub db_name: String,
}

impl TraceInfo {
    pub fn new(request_id: &str, sampling_id: &str, db_name: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            process_id: ProcessIdentity::local().process_id.clone(),
            sampling_id: sampling_id.to_string(),
            db_name: db_name.to_string(),
        }
    }

    /// Same as [`TraceInfo::new`] with an explicit process identity.
    pub fn with_process_id(request_id: &str, process_id: &str, sampling_id: &str, db_name: &str) -> Self {
        Self {
            process_id: process_id.to_string(),
            ..Self::new(request_id, sampling_id, db_name)
        }
    }
}

/// Appends the trace footer to `sql` and collapses the result to one line.
///
/// SQL already carrying the marker is returned unchanged, so appending twice
/// equals appending once. Comments are stripped before the footer goes on:
/// a caller comment must not be able to open or close the footer's comment
/// region. Whitespace normalization runs last, after all clause
/// concatenation, so it can only merge separators that are already explicit.
pub fn append_trace_footer(sql: &str, trace: &TraceInfo) -> String {
    if sql.contains(TRACE_MARKER) {
        return sql.to_string();
    }

    let stripped = strip_comments(sql);
    let tagged = format!(
        "{}{}{}{} spid={} dbname={}*/",
        stripped, TRACE_MARKER, trace.request_id, trace.process_id, trace.sampling_id, trace.db_name
    );
    normalize_whitespace(&tagged)
}

/// Collapses newlines, tabs and runs of spaces to single spaces.
fn normalize_whitespace(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut in_whitespace = false;
    for ch in sql.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(ch);
            in_whitespace = false;
        }
    }
    out
}
