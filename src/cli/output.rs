//! Output formatters for probe results and run statistics.
//!
//! Result lines carry a wall-clock timestamp, status, size, and URL; the
//! final stats block mirrors the counters the collector tracked. Both have
//! a pretty and a JSON form.

use crate::engine::RunStatus;
use crate::stats::StatsSnapshot;
use crate::{ClassifiedResult, ProbeOutcome};

/// Format one reportable result as a pretty line.
///
/// Returns `None` for non-reportable or skipped outcomes.
pub fn format_result(result: &ClassifiedResult) -> Option<String> {
    if !result.reportable {
        return None;
    }
    let now = chrono::Local::now().format("%H:%M:%S");
    match &result.outcome {
        ProbeOutcome::Success {
            url,
            status,
            size,
            location,
        } => Some(match location {
            Some(loc) => format!("[{now}] {status:<3} {size:>9}  {url} -> {loc}"),
            None => format!("[{now}] {status:<3} {size:>9}  {url}"),
        }),
        ProbeOutcome::Failure { url, error } => {
            Some(format!("[{now}] !!!            {url} : {error}"))
        }
        ProbeOutcome::Skipped => None,
    }
}

/// Format one reportable result as a single JSON line.
pub fn format_result_json(result: &ClassifiedResult) -> Option<String> {
    if !result.reportable {
        return None;
    }
    if matches!(result.outcome, ProbeOutcome::Skipped) {
        return None;
    }
    serde_json::to_string(&result.outcome).ok()
}

/// Format the final stats block as pretty text.
pub fn format_stats_pretty(status: RunStatus, stats: &StatsSnapshot) -> String {
    format!(
        "Status   : {}\n\
         Requests : {}\n\
         Errors   : {}\n\
         Results  : {}\n\
         Time     : {:.2} s\n\
         Req/s    : {:.1}",
        status, stats.requests, stats.errors, stats.results, stats.elapsed_secs, stats.requests_per_sec
    )
}

/// JSON summary structure for the end-of-run stats.
#[derive(serde::Serialize)]
struct JsonSummary<'a> {
    status: &'static str,
    #[serde(flatten)]
    stats: &'a StatsSnapshot,
}

/// Format the final stats block as JSON.
pub fn format_stats_json(status: RunStatus, stats: &StatsSnapshot) -> String {
    serde_json::to_string(&JsonSummary {
        status: status.as_str(),
        stats,
    })
    .unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
}
