//! Dispatch engine — bounded-concurrency fan-out of probes over a lazy
//! word source.
//!
//! One feeder task pulls candidates from the [`WordSource`] into a bounded
//! hand-off channel; exactly N workers pull from it, probe, classify, and
//! funnel results to a single consumer. A [`StopSignal`] carries the first
//! stop reason (error threshold or external interrupt); once set, no new
//! work is dispatched and in-flight probes drain. No task ever exits the
//! process on its own.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

use crate::calibrate::{calibrate, CalibrationError};
use crate::classify::{Classifier, ExclusionSet};
use crate::probe::http::{Prober, ProberError};
use crate::stats::{StatsCollector, StatsSnapshot};
use crate::wordlist::WordSource;
use crate::{ClassifiedResult, ProbeOutcome, ScanConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Stop signal
// ─────────────────────────────────────────────────────────────────────────────

const STOP_NONE: u8 = 0;
const STOP_ERRORS: u8 = 1;
const STOP_INTERRUPT: u8 = 2;

/// Cooperative stop flag shared between the dispatcher, its workers, and
/// the external signal handler. The first reason recorded wins.
#[derive(Debug, Clone)]
pub struct StopSignal(Arc<AtomicU8>);

impl StopSignal {
    pub fn new() -> Self {
        Self(Arc::new(AtomicU8::new(STOP_NONE)))
    }

    /// Record an external interrupt (e.g. Ctrl-C).
    pub fn request_interrupt(&self) {
        let _ = self
            .0
            .compare_exchange(STOP_NONE, STOP_INTERRUPT, Ordering::SeqCst, Ordering::SeqCst);
    }

    /// Record an error-threshold abort.
    pub fn request_error_abort(&self) {
        let _ = self
            .0
            .compare_exchange(STOP_NONE, STOP_ERRORS, Ordering::SeqCst, Ordering::SeqCst);
    }

    /// True once any stop reason has been recorded.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst) != STOP_NONE
    }

    fn reason(&self) -> u8 {
        self.0.load(Ordering::SeqCst)
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Run status / report
// ─────────────────────────────────────────────────────────────────────────────

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Word source exhausted, all probes returned.
    Completed,
    /// Error threshold exceeded; drained and stopped.
    ErrorLimit,
    /// External interrupt; drained and stopped.
    Interrupted,
    /// Calibration flagged the target as a wildcard responder.
    WildcardAbort,
    /// Liveness check failed before any probing started.
    TargetDown,
}

impl RunStatus {
    /// String identifier for logs and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::ErrorLimit => "error-limit",
            Self::Interrupted => "interrupted",
            Self::WildcardAbort => "wildcard",
            Self::TargetDown => "target-down",
        }
    }

    /// Process exit code: 0 completed, 1 aborted, 130 interrupted.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed => 0,
            Self::ErrorLimit | Self::WildcardAbort | Self::TargetDown => 1,
            Self::Interrupted => 130,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final report of a run: terminal status, counters, and the abort reason
/// when calibration cut the run short.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub status: RunStatus,
    pub stats: StatsSnapshot,
    pub reason: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────────────────────────────────────

/// Bounded-concurrency probe dispatcher.
pub struct Dispatcher {
    config: Arc<ScanConfig>,
    prober: Arc<Prober>,
    classifier: Arc<Classifier>,
    stats: Arc<StatsCollector>,
    stop: StopSignal,
}

impl Dispatcher {
    pub fn new(
        config: Arc<ScanConfig>,
        prober: Arc<Prober>,
        classifier: Classifier,
        stats: Arc<StatsCollector>,
        stop: StopSignal,
    ) -> Self {
        Self {
            config,
            prober,
            classifier: Arc::new(classifier),
            stats,
            stop,
        }
    }

    /// Run the scan loop until the word source is exhausted or a stop
    /// reason is recorded. Every result the classifier sees is handed to
    /// `sink` in completion order.
    pub async fn run<F>(&self, words: WordSource, mut sink: F) -> RunStatus
    where
        F: FnMut(&ClassifiedResult),
    {
        let concurrency = self.config.concurrency.max(1);
        let (word_tx, word_rx) = mpsc::channel::<String>(concurrency);
        let word_rx = Arc::new(Mutex::new(word_rx));
        let (result_tx, mut result_rx) = mpsc::channel::<ClassifiedResult>(concurrency);

        // Feeder: pull candidates lazily, never materializing the list.
        let stop = self.stop.clone();
        let feeder = tokio::spawn(async move {
            let mut words = words;
            while let Some(word) = words.next().await {
                if stop.is_stopped() {
                    break;
                }
                if word_tx.send(word).await.is_err() {
                    break;
                }
            }
        });

        // Exactly N workers share the hand-off channel.
        let mut workers = JoinSet::new();
        for _ in 0..concurrency {
            let word_rx = word_rx.clone();
            let result_tx = result_tx.clone();
            let prober = self.prober.clone();
            let classifier = self.classifier.clone();
            let stop = self.stop.clone();
            workers.spawn(async move {
                loop {
                    if stop.is_stopped() {
                        break;
                    }
                    let word = { word_rx.lock().await.recv().await };
                    let Some(word) = word else { break };
                    // A word pulled after the stop reason was set is
                    // discarded, not probed.
                    if stop.is_stopped() {
                        break;
                    }
                    let outcome = prober.probe(&word).await;
                    if matches!(outcome, ProbeOutcome::Skipped) {
                        continue;
                    }
                    let reportable = classifier.reportable(&outcome);
                    let result = ClassifiedResult {
                        outcome,
                        reportable,
                    };
                    if result_tx.send(result).await.is_err() {
                        break;
                    }
                }
            });
        }
        drop(word_rx);
        drop(result_tx);

        // Single consumer: sink hand-off plus the error-threshold circuit
        // breaker, evaluated after every completed probe.
        while let Some(result) = result_rx.recv().await {
            if result.reportable {
                self.stats.record_result();
            }
            sink(&result);
            if !self.stop.is_stopped() && self.stats.errors() > self.config.max_errors {
                tracing::warn!(
                    max_errors = self.config.max_errors,
                    "error threshold exceeded, draining in-flight probes"
                );
                self.stop.request_error_abort();
            }
        }

        let _ = feeder.await;
        while workers.join_next().await.is_some() {}

        match self.stop.reason() {
            STOP_ERRORS => RunStatus::ErrorLimit,
            STOP_INTERRUPT => RunStatus::Interrupted,
            _ => RunStatus::Completed,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Run orchestration
// ─────────────────────────────────────────────────────────────────────────────

/// Run a full scan: build the prober, calibrate, then dispatch.
///
/// Every terminal path — completion, error-threshold abort, interrupt,
/// wildcard detection, dead target — yields a [`RunReport`] with a final
/// stats snapshot. Only prober construction can fail outright.
pub async fn run_scan<F>(
    config: Arc<ScanConfig>,
    base_exclusions: ExclusionSet,
    words: WordSource,
    stop: StopSignal,
    sink: F,
) -> Result<RunReport, ProberError>
where
    F: FnMut(&ClassifiedResult),
{
    let stats = Arc::new(StatsCollector::new());
    let prober = Arc::new(Prober::new(config.clone(), stats.clone())?);

    let exclusions = match calibrate(&prober, &config, base_exclusions).await {
        Ok(set) => set,
        Err(e) => {
            let status = match &e {
                CalibrationError::TargetDown(_) => RunStatus::TargetDown,
                CalibrationError::WildcardDetected(_) => RunStatus::WildcardAbort,
            };
            tracing::error!(error = %e, "calibration aborted the run");
            return Ok(RunReport {
                status,
                stats: stats.snapshot(),
                reason: Some(e.to_string()),
            });
        }
    };

    let classifier = Classifier::new(exclusions, config.only_success);
    let dispatcher = Dispatcher::new(config, prober, classifier, stats.clone(), stop);
    let status = dispatcher.run(words, sink).await;

    Ok(RunReport {
        status,
        stats: stats.snapshot(),
        reason: None,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
