use crate::types::{FloodAttempt, FloodReport, ProbeResponse, ScreeningRecord};
use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const SEXES: &[&str] = &["man", "woman"];
const RISK_LEVELS: &[&str] = &["green", "yellow", "ambar", "red"];

/// Knobs for a flood run.
#[derive(Debug, Clone)]
pub struct FloodConfig {
    /// How many records to submit.
    pub count: u32,
    /// Pause between submissions.
    pub delay: Duration,
}

/// Synthesize one screening record with a randomized identity, score, and
/// risk level. Study level, answers, and consent are fixed to what the
/// patient questionnaire always submits.
pub fn generate_screening_record(rng: &mut impl Rng) -> ScreeningRecord {
    ScreeningRecord {
        patient_id: format!("FAKE-{}", rng.gen_range(1000..=9999)),
        sex: SEXES.choose(rng).expect("non-empty slice").to_string(),
        study_level: "primary".to_string(),
        answers: json!({ "q1": 1, "q2": 2 }),
        total_score: rng.gen_range(0..=40u8),
        level_result: RISK_LEVELS.choose(rng).expect("non-empty slice").to_string(),
        consent: true,
    }
}

/// Submit `count` freshly generated records, one at a time, sleeping between
/// submissions. Failures of any kind are counted and logged, never fatal.
pub async fn run_flood<F, Fut>(config: &FloodConfig, request: F) -> Result<FloodReport>
where
    F: FnMut(ScreeningRecord) -> Fut,
    Fut: Future<Output = Result<ProbeResponse>>,
{
    run_flood_internal(config, request, None, |_| {}).await
}

/// Variant that accepts a `CancellationToken` and a per-submission observer.
pub async fn run_flood_with_observer<F, Fut, O>(
    config: &FloodConfig,
    request: F,
    cancel: CancellationToken,
    observer: O,
) -> Result<FloodReport>
where
    F: FnMut(ScreeningRecord) -> Fut,
    Fut: Future<Output = Result<ProbeResponse>>,
    O: FnMut(&FloodAttempt),
{
    run_flood_internal(config, request, Some(cancel), observer).await
}

async fn run_flood_internal<F, Fut, O>(
    config: &FloodConfig,
    mut request: F,
    cancel_opt: Option<CancellationToken>,
    mut observe: O,
) -> Result<FloodReport>
where
    F: FnMut(ScreeningRecord) -> Fut,
    Fut: Future<Output = Result<ProbeResponse>>,
    O: FnMut(&FloodAttempt),
{
    let cancel = cancel_opt.unwrap_or_default();

    // Optional: Ctrl-C stops the flood between submissions.
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        cancel_ctrlc.cancel();
    });

    let mut report = FloodReport {
        requested: config.count,
        sent: 0,
        succeeded: 0,
        failed: 0,
        interrupted: false,
    };

    for seq in 1..=config.count {
        if cancel.is_cancelled() {
            report.interrupted = true;
            break;
        }

        // The rng must not be held across an await point.
        let record = {
            let mut rng = rand::thread_rng();
            generate_screening_record(&mut rng)
        };
        let patient_id = record.patient_id.clone();

        let attempt = match request(record).await {
            Ok(response) => {
                if (200..300).contains(&response.status) {
                    report.succeeded += 1;
                } else {
                    report.failed += 1;
                }
                FloodAttempt {
                    seq,
                    patient_id,
                    status: Some(response.status),
                    error: None,
                }
            }
            Err(e) => {
                report.failed += 1;
                FloodAttempt {
                    seq,
                    patient_id,
                    status: None,
                    error: Some(e.to_string()),
                }
            }
        };
        report.sent += 1;
        observe(&attempt);

        if seq < config.count {
            tokio::time::sleep(config.delay).await;
        }
    }

    Ok(report)
}
