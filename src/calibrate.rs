//! Pre-scan calibration: liveness check, wildcard detection, 404 baseline.
//!
//! Runs once, sequentially, before the dispatcher starts. Its probes go
//! through the [`Prober`] directly and never touch the classifier, so the
//! raw outcome is always visible to the heuristics. The returned
//! [`ExclusionSet`] is frozen for the remainder of the run.

use uuid::Uuid;

use crate::classify::ExclusionSet;
use crate::probe::http::Prober;
use crate::{ProbeOutcome, ScanConfig};

/// Fatal calibration outcomes. Anything else is "no additional exclusion
/// learned" and the scan proceeds.
#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    #[error("target unreachable: {0}")]
    TargetDown(String),
    #[error("wildcard response detected at {0}, results would be unreliable")]
    WildcardDetected(String),
}

/// Random path that cannot exist on the target.
fn random_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Run the calibration sequence and augment `exclusions` with what the
/// target's not-found responses look like.
///
/// Order matters: liveness first (fatal on failure), then optional wildcard
/// detection (fatal on detection), then the 404 baseline (never fatal).
pub async fn calibrate(
    prober: &Prober,
    config: &ScanConfig,
    mut exclusions: ExclusionSet,
) -> Result<ExclusionSet, CalibrationError> {
    // 1. Liveness: one probe of the bare base URL.
    match prober.probe("").await {
        ProbeOutcome::Failure { error, .. } => {
            return Err(CalibrationError::TargetDown(error));
        }
        ProbeOutcome::Skipped => {
            return Err(CalibrationError::TargetDown(
                "request construction failed for base URL".to_string(),
            ));
        }
        ProbeOutcome::Success { status, .. } => {
            tracing::debug!(status, "liveness check passed");
        }
    }

    // 2. Wildcard detection: a never-real path answered with 200, or with
    //    any status the operator has not already excluded, means the target
    //    serves arbitrary paths as a catch-all.
    if config.detect_wildcard {
        if let ProbeOutcome::Success { url, status, .. } = prober.probe(&random_token()).await {
            if status == 200 || !exclusions.excludes_status(status) {
                return Err(CalibrationError::WildcardDetected(url));
            }
        }
    }

    // 3. 404 baseline: learn the shape of this server's not-found page. A
    //    non-404 status is itself an exclusion rule; the observed size is
    //    one unconditionally, since soft-404 pages keep their size even
    //    when the status looks legitimate.
    if let ProbeOutcome::Success { status, size, .. } = prober.probe(&random_token()).await {
        if status != 404 {
            exclusions.insert_code(status);
        }
        exclusions.insert_size(size);
        tracing::info!(status, size, "not-found baseline calibrated");
    } else {
        tracing::debug!("baseline probe failed, no additional exclusion learned");
    }

    Ok(exclusions)
}
