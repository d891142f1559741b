//! HTTP fetching with bounded retries and jittered dispatch.
//!
//! Sites behind bot protection answer bursts of automated requests with
//! HTTP 403, so the fetcher retries 403 (and timeouts, whether connecting
//! or reading the body) up to 3 total attempts with a strictly increasing
//! delay, and every batched fetch is dispatched after a random 0.1–0.5 s
//! pause.
//!
//! # Retry strategy
//!
//! - Maximum 3 total attempts per URL
//! - Exponential backoff starting at 1 second
//! - Random jitter (0–250 ms) added to each delay; the jitter ceiling is
//!   below the backoff step, so delays strictly increase across attempts
//! - Any HTTP status other than 403 is terminal on the first attempt

use crate::error::{Error, Result};
use rand::{Rng, rng};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Total attempts per URL, including the first one.
pub const MAX_ATTEMPTS: usize = 3;

const BASE_DELAY: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Bounds of the randomized pre-dispatch delay for batched fetches.
pub const DISPATCH_JITTER_MS: (u64, u64) = (100, 500);

/// Shared HTTP client for article fetching.
#[derive(Clone)]
pub struct Fetcher {
    http: reqwest::Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        Self::with_request_timeout(REQUEST_TIMEOUT)
    }

    fn with_request_timeout(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Accept",
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert("Accept-Language", HeaderValue::from_static("en-US,en;q=0.9,ru;q=0.8"));
        headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
        headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Fetcher { http })
    }

    /// Fetch raw HTML for a URL, retrying 403 responses and timeouts.
    ///
    /// Returns [`Error::Fetch`] once retries are exhausted or on the first
    /// non-retryable failure; the caller records the error against that
    /// article and moves on.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let mut last_error = format!("no attempt made for {url}");

        for attempt in 1..=MAX_ATTEMPTS {
            if attempt > 1 {
                let delay = backoff_delay(attempt);
                warn!(%url, attempt, ?delay, "retrying after backoff");
                sleep(delay).await;
            }

            match self.http.get(url).send().await {
                Ok(resp) if resp.status() == StatusCode::FORBIDDEN => {
                    last_error = format!("HTTP 403 Forbidden for {url}");
                }
                Ok(resp) => {
                    let status = resp.status();
                    if !status.is_success() {
                        return Err(Error::Fetch(format!("HTTP {status} for {url}")));
                    }
                    // The request timeout also covers the body read, so a
                    // stalled body gets the same retry treatment as a
                    // stalled connect.
                    match resp.text().await {
                        Ok(body) => {
                            debug!(%url, bytes = body.len(), attempt, "fetched page");
                            return Ok(body);
                        }
                        Err(e) if e.is_timeout() => {
                            last_error = format!("timeout reading body of {url}");
                        }
                        Err(e) => {
                            return Err(Error::Fetch(format!("reading body of {url}: {e}")));
                        }
                    }
                }
                Err(e) if e.is_timeout() => {
                    last_error = format!("timeout fetching {url}");
                }
                Err(e) => return Err(Error::Fetch(format!("request to {url} failed: {e}"))),
            }
        }

        Err(Error::Fetch(format!("{last_error} (after {MAX_ATTEMPTS} attempts)")))
    }
}

/// Delay before the given attempt (attempt numbering starts at 1; the first
/// attempt has no delay). Doubles per attempt with up to 250 ms of jitter.
pub fn backoff_delay(attempt: usize) -> Duration {
    let base = BASE_DELAY.saturating_mul(1 << (attempt.saturating_sub(2)) as u32);
    let jitter_ms: u64 = rng().random_range(0..=250);
    base + Duration::from_millis(jitter_ms)
}

/// Random pre-dispatch delay applied to each fetch in a batch.
pub fn dispatch_jitter() -> Duration {
    let (low, high) = DISPATCH_JITTER_MS;
    Duration::from_millis(rng().random_range(low..=high))
}
