use crate::types::{ProbeAttempt, ProbeResponse, ScanOutcome, ScanReport};
use anyhow::Result;
use std::future::Future;
use time::{format_description::well_known, OffsetDateTime};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Registration accepted, the guessed code is confirmed.
const STATUS_CREATED: u16 = 201;
/// Duplicate account. The endpoint checks the email after the code, so this
/// is a likely-valid signal, but it is not conclusive on its own.
const STATUS_CONFLICT: u16 = 409;

/// Knobs for a code scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Halt on HTTP 409 and report the code as likely valid. Turning this off
    /// treats a conflict as inconclusive and keeps scanning.
    pub stop_on_conflict: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            stop_on_conflict: true,
        }
    }
}

/// Probe candidates in order, one request at a time, until one halts the scan.
///
/// - Each candidate is handed to `request` exactly once, awaited to completion
///   before the next candidate is tried.
/// - Status 201 halts with [`ScanOutcome::CodeFound`]; status 409 halts with
///   [`ScanOutcome::CodeLikelyValid`] unless the config says otherwise.
/// - A transport error is recorded on the attempt and the scan continues.
/// - An exhausted candidate list yields [`ScanOutcome::Exhausted`].
pub async fn run_scan<F, Fut>(
    candidates: &[String],
    request: F,
    config: &ScanConfig,
) -> Result<ScanReport>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<ProbeResponse>>,
{
    run_scan_internal(candidates, request, config, None, |_| {}).await
}

/// Variant that accepts a `CancellationToken` for external cancellation and an
/// observer invoked once per finished attempt, in order.
pub async fn run_scan_with_observer<F, Fut, O>(
    candidates: &[String],
    request: F,
    config: &ScanConfig,
    cancel: CancellationToken,
    observer: O,
) -> Result<ScanReport>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<ProbeResponse>>,
    O: FnMut(&ProbeAttempt),
{
    run_scan_internal(candidates, request, config, Some(cancel), observer).await
}

async fn run_scan_internal<F, Fut, O>(
    candidates: &[String],
    mut request: F,
    config: &ScanConfig,
    cancel_opt: Option<CancellationToken>,
    mut observe: O,
) -> Result<ScanReport>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<ProbeResponse>>,
    O: FnMut(&ProbeAttempt),
{
    let cancel = cancel_opt.unwrap_or_default();

    // Optional: Ctrl-C cancels the scan between attempts.
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        cancel_ctrlc.cancel();
    });

    let mut attempts: Vec<ProbeAttempt> = Vec::with_capacity(candidates.len());
    let mut outcome = ScanOutcome::Exhausted;

    for code in candidates {
        if cancel.is_cancelled() {
            outcome = ScanOutcome::Interrupted;
            break;
        }

        let start = Instant::now();
        let result = request(code.clone()).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let attempt = match result {
            Ok(response) => ProbeAttempt {
                code: code.clone(),
                status: Some(response.status),
                error: None,
                latency_ms,
                timestamp: now_rfc3339(),
            },
            Err(e) => ProbeAttempt {
                code: code.clone(),
                status: None,
                error: Some(e.to_string()),
                latency_ms,
                timestamp: now_rfc3339(),
            },
        };
        observe(&attempt);
        let status = attempt.status;
        attempts.push(attempt);

        match status {
            Some(STATUS_CREATED) => {
                outcome = ScanOutcome::CodeFound { code: code.clone() };
                break;
            }
            Some(STATUS_CONFLICT) if config.stop_on_conflict => {
                outcome = ScanOutcome::CodeLikelyValid { code: code.clone() };
                break;
            }
            _ => {}
        }
    }

    Ok(ScanReport {
        total: candidates.len() as u64,
        tried: attempts.len() as u64,
        outcome,
        attempts,
    })
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
