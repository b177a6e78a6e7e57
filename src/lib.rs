//! Dirprobe — concurrent web content-discovery probe with soft-404 calibration.
//!
//! Streams a wordlist through a bounded pool of HTTP probes against a base
//! URL, learns the target's "not found" signature before scanning, and
//! reports only responses that survive the exclusion rules. Usable as a
//! library or via the CLI.

pub mod calibrate;
pub mod classify;
pub mod cli;
pub mod engine;
pub mod probe;
pub mod stats;
pub mod wordlist;

use std::time::Duration;

use serde::Serialize;

// Re-export key types for library users.
pub use calibrate::{calibrate, CalibrationError};
pub use classify::{Classifier, ExclusionSet, SizeRange};
pub use engine::{run_scan, Dispatcher, RunReport, RunStatus, StopSignal};
pub use probe::http::{Prober, ProberError};
pub use stats::{StatsCollector, StatsSnapshot};
pub use wordlist::WordSource;

/// Placeholder token substituted with the configured extension when it
/// appears inside a wordlist entry (e.g. `admin.%EXT%`).
pub const EXT_TOKEN: &str = "%EXT%";

// ─────────────────────────────────────────────────────────────────────────────
// Scan configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Immutable configuration for a scan run.
///
/// Built once before scanning (normally by the CLI layer) and shared
/// read-only across all probe workers.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Normalized base URL, always ending in `/` (see [`normalize_url`]).
    pub base_url: String,
    /// HTTP method name ("GET", "HEAD", ...). Validated lazily per request;
    /// an invalid method skips the candidate rather than aborting the run.
    pub method: String,
    /// Optional file extension, without the leading dot.
    pub extension: Option<String>,
    /// When true, append `.<extension>` to every candidate unconditionally.
    /// When false, the extension only replaces `%EXT%` tokens where present.
    pub force_extension: bool,
    /// Optional raw `Cookie` header value, sent verbatim.
    pub cookie: Option<String>,
    /// When true, send the spoofed client-IP header set (all `127.0.0.1`).
    pub waf_bypass: bool,
    /// Follow redirects instead of reporting the first 3xx as the result.
    pub follow_redirects: bool,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Number of concurrent probe workers.
    pub concurrency: usize,
    /// Error-count threshold: once exceeded, no new probes are dispatched.
    pub max_errors: u64,
    /// Report only responses with status 200.
    pub only_success: bool,
    /// Run the wildcard detection probe during calibration.
    pub detect_wildcard: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            method: "GET".to_string(),
            extension: None,
            force_extension: false,
            cookie: None,
            waf_bypass: false,
            follow_redirects: false,
            timeout: Duration::from_secs(10),
            concurrency: 10,
            max_errors: 20,
            only_success: false,
            detect_wildcard: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// URL normalization
// ─────────────────────────────────────────────────────────────────────────────

/// Normalize a target URL: add an `http://` scheme when missing and a
/// trailing `/` when the authority has no path.
///
/// Candidate words are concatenated directly onto the result, so the
/// trailing slash is load-bearing.
pub fn normalize_url(base: &str) -> Result<String, String> {
    let base = base.trim();
    if base.is_empty() {
        return Err("URL is empty".to_string());
    }

    let mut url = if base.contains("://") {
        base.to_string()
    } else {
        format!("http://{base}")
    };

    // "scheme://host" without any path component gets a trailing slash;
    // "scheme://host/anything" is left alone.
    let after_scheme = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => &url[..],
    };
    if !after_scheme.contains('/') {
        url.push('/');
    }

    Ok(url)
}

// ─────────────────────────────────────────────────────────────────────────────
// Probe outcome
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of a single probe, reduced from the HTTP response.
///
/// Exactly one variant is produced per candidate: a response, a transport
/// failure, or a skip when the request could not even be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// The server answered. `size` is the resolved body size in bytes.
    Success {
        url: String,
        status: u16,
        size: u64,
        /// `Location` header value, present on redirects.
        location: Option<String>,
    },
    /// The request failed at the transport layer (DNS, TLS, connect,
    /// timeout, read).
    Failure { url: String, error: String },
    /// The request was never built (invalid method or URL). Does not count
    /// toward the error threshold — it never reached the network.
    Skipped,
}

impl ProbeOutcome {
    /// Resolved URL of this probe, if the request was built.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Success { url, .. } | Self::Failure { url, .. } => Some(url),
            Self::Skipped => None,
        }
    }

    /// HTTP status code, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true for transport failures.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

/// A probe outcome tagged with its reportability verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedResult {
    pub outcome: ProbeOutcome,
    /// Verdict of the [`Classifier`] against the run's exclusion set.
    pub reportable: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
