//! Request construction: URL assembly, extension handling, headers.
//!
//! Pure with respect to the scan: building a request has no side effects,
//! and a structurally invalid method or URL yields `None` so the candidate
//! is skipped rather than retried or counted as an error.

use reqwest::header::{ACCEPT, COOKIE, USER_AGENT};
use reqwest::{Client, Method, Request, Url};

use crate::probe::useragents;
use crate::{ScanConfig, EXT_TOKEN};

/// Headers spoofed to `127.0.0.1` in WAF-bypass mode.
const WAF_HEADERS: [&str; 5] = [
    "X-Client-IP",
    "X-Forwarded-For",
    "X-Originating-IP",
    "X-Remote-IP",
    "X-Remote-Addr",
];

/// Resolve the candidate URL for a wordlist entry.
///
/// The word is concatenated onto the base URL. With `force_extension` the
/// configured extension is appended to every candidate; otherwise it only
/// replaces `%EXT%` tokens where the wordlist carries them.
pub fn candidate_url(config: &ScanConfig, word: &str) -> String {
    let mut url = format!("{}{}", config.base_url, word);
    if let Some(ext) = &config.extension {
        if config.force_extension {
            url.push('.');
            url.push_str(ext);
        } else if url.contains(EXT_TOKEN) {
            url = url.replace(EXT_TOKEN, ext);
        }
    }
    url
}

/// Build a fully-formed request for one candidate path.
///
/// Returns `None` when the method or URL cannot be constructed; the caller
/// treats that as a skipped candidate.
pub fn build(client: &Client, config: &ScanConfig, word: &str) -> Option<Request> {
    let method = Method::from_bytes(config.method.as_bytes()).ok()?;
    let url = Url::parse(&candidate_url(config, word)).ok()?;

    let mut builder = client
        .request(method, url)
        .header(USER_AGENT, useragents::random())
        .header(ACCEPT, "*/*");

    if let Some(cookie) = &config.cookie {
        builder = builder.header(COOKIE, cookie);
    }

    if config.waf_bypass {
        for name in WAF_HEADERS {
            builder = builder.header(name, "127.0.0.1");
        }
    }

    builder.build().ok()
}
