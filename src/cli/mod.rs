//! Command-line interface: argument parsing and run orchestration.

pub mod output;

use std::sync::Arc;

use clap::{Parser, ValueEnum};

use crate::classify::{ExclusionSet, SizeRange};
use crate::engine::{self, StopSignal};
use crate::wordlist::WordSource;
use crate::{normalize_url, ScanConfig};

/// Output format for results and the final stats block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFmt {
    /// Human-readable lines on stdout, stats on stderr.
    Pretty,
    /// One JSON object per line, everything on stdout.
    Json,
}

/// Concurrent web content-discovery probe with soft-404 calibration.
#[derive(Debug, Parser)]
#[command(name = "dirprobe", version, about)]
pub struct Cli {
    /// Base URL to scan (scheme optional, http:// assumed)
    pub url: String,

    /// Wordlist file, one candidate path per line
    #[arg(short = 'w', long)]
    pub wordlist: String,

    /// HTTP method to use
    #[arg(short = 'm', long, default_value = "GET")]
    pub method: String,

    /// File extension, without the leading dot (replaces %EXT% tokens)
    #[arg(short = 'e', long)]
    pub ext: Option<String>,

    /// Append the extension to every candidate, not just %EXT% entries
    #[arg(long, requires = "ext")]
    pub force_ext: bool,

    /// Raw Cookie header value, sent verbatim
    #[arg(long)]
    pub cookie: Option<String>,

    /// Send spoofed client-IP headers (127.0.0.1) to sidestep naive WAF rules
    #[arg(long)]
    pub waf_bypass: bool,

    /// Follow redirects instead of reporting the first 3xx
    #[arg(short = 'f', long)]
    pub follow: bool,

    /// Per-request timeout in seconds
    #[arg(short = 'T', long, default_value_t = 10)]
    pub timeout: u64,

    /// Number of concurrent probe workers
    #[arg(short = 't', long, default_value_t = 10)]
    pub threads: usize,

    /// Abort the scan once this many transport errors have accumulated
    #[arg(short = 'E', long, default_value_t = 20)]
    pub max_errors: u64,

    /// Comma-separated status codes to suppress
    #[arg(short = 'x', long, default_value = "404")]
    pub exclude_codes: String,

    /// Comma-separated body sizes (bytes) to suppress
    #[arg(long)]
    pub exclude_sizes: Option<String>,

    /// Inclusive body-size range to suppress, as MIN-MAX
    #[arg(long)]
    pub size_range: Option<String>,

    /// Report only 200 responses
    #[arg(long)]
    pub only_ok: bool,

    /// Probe a random path first and abort if the target answers everything
    #[arg(long)]
    pub detect_wildcard: bool,

    /// Byte offset into the wordlist to resume a previous run from
    #[arg(long, default_value_t = 0)]
    pub offset: u64,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFmt::Pretty)]
    pub output: OutputFmt,
}

/// Assemble the immutable scan configuration from parsed arguments.
fn build_config(cli: &Cli) -> Result<ScanConfig, String> {
    if cli.threads == 0 {
        return Err("thread count must be at least 1".to_string());
    }
    Ok(ScanConfig {
        base_url: normalize_url(&cli.url)?,
        method: cli.method.to_uppercase(),
        extension: cli.ext.clone(),
        force_extension: cli.force_ext,
        cookie: cli.cookie.clone(),
        waf_bypass: cli.waf_bypass,
        follow_redirects: cli.follow,
        timeout: std::time::Duration::from_secs(cli.timeout),
        concurrency: cli.threads,
        max_errors: cli.max_errors,
        only_success: cli.only_ok,
        detect_wildcard: cli.detect_wildcard,
    })
}

/// Assemble the operator-supplied exclusion rules. Calibration may add to
/// these later.
fn build_exclusions(cli: &Cli) -> Result<ExclusionSet, String> {
    let mut exclusions = ExclusionSet::new();
    exclusions.parse_codes(&cli.exclude_codes)?;
    if let Some(sizes) = &cli.exclude_sizes {
        exclusions.parse_sizes(sizes)?;
    }
    if let Some(range) = &cli.size_range {
        exclusions.set_range(SizeRange::parse(range)?);
    }
    Ok(exclusions)
}

/// Run the scan described by the parsed arguments and return the process
/// exit code.
pub async fn run(cli: Cli) -> i32 {
    let config = match build_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    let exclusions = match build_exclusions(&cli) {
        Ok(x) => x,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    let words = match WordSource::open(&cli.wordlist, cli.offset).await {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: cannot open wordlist '{}': {e}", cli.wordlist);
            return 1;
        }
    };

    tracing::info!(
        url = %config.base_url,
        method = %config.method,
        threads = config.concurrency,
        "starting scan"
    );

    // First Ctrl-C requests a drain; the run winds down on its own.
    let stop = StopSignal::new();
    let signal_stop = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, draining in-flight probes");
            signal_stop.request_interrupt();
        }
    });

    let fmt = cli.output;
    let report = match engine::run_scan(Arc::new(config), exclusions, words, stop, |result| {
        match fmt {
            OutputFmt::Pretty => {
                if let Some(line) = output::format_result(result) {
                    if result.outcome.is_failure() {
                        eprintln!("{line}");
                    } else {
                        println!("{line}");
                    }
                }
            }
            OutputFmt::Json => {
                if let Some(line) = output::format_result_json(result) {
                    println!("{line}");
                }
            }
        }
    })
    .await
    {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    if let Some(reason) = &report.reason {
        eprintln!("Scan aborted: {reason}");
    }
    match fmt {
        OutputFmt::Pretty => eprintln!(
            "\n{}",
            output::format_stats_pretty(report.status, &report.stats)
        ),
        OutputFmt::Json => println!(
            "{}",
            output::format_stats_json(report.status, &report.stats)
        ),
    }

    report.status.exit_code()
}
