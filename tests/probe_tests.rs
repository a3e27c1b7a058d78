use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alco_probe_rs::probe::{run_scan, ScanConfig};
use alco_probe_rs::types::{ProbeResponse, RegisterPayload, ScanOutcome};
use anyhow::anyhow;

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// A request function that replays the scripted statuses in order.
/// `None` simulates a transport-level failure.
fn scripted(
    responses: Vec<Option<u16>>,
    calls: Arc<AtomicUsize>,
) -> impl FnMut(String) -> std::pin::Pin<Box<dyn std::future::Future<Output = anyhow::Result<ProbeResponse>>>>
{
    move |_code: String| {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        let status = responses[n];
        Box::pin(async move {
            match status {
                Some(s) => Ok(ProbeResponse {
                    status: s,
                    body: None,
                }),
                None => Err(anyhow!("connection refused")),
            }
        })
    }
}

#[tokio::test]
async fn stops_after_first_created() {
    let calls = Arc::new(AtomicUsize::new(0));
    let request = scripted(vec![Some(404), Some(201)], calls.clone());

    let report = run_scan(&codes(&["1234", "admin", "root"]), request, &ScanConfig::default())
        .await
        .expect("scan ok");

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(report.tried, 2);
    assert_eq!(report.total, 3);
    assert_eq!(
        report.outcome,
        ScanOutcome::CodeFound {
            code: "admin".to_string()
        }
    );
}

#[tokio::test]
async fn exhausts_in_order_without_a_hit() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));

    let seen_in = seen.clone();
    let calls_in = calls.clone();
    let request = move |code: String| {
        calls_in.fetch_add(1, Ordering::SeqCst);
        seen_in.lock().unwrap().push(code);
        async move {
            Ok::<_, anyhow::Error>(ProbeResponse {
                status: 404,
                body: None,
            })
        }
    };

    let candidates = codes(&["1234", "admin"]);
    let report = run_scan(&candidates, request, &ScanConfig::default())
        .await
        .expect("scan ok");

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(report.outcome, ScanOutcome::Exhausted);
    assert_eq!(*seen.lock().unwrap(), candidates);
}

#[tokio::test]
async fn transport_error_does_not_stop_the_scan() {
    let calls = Arc::new(AtomicUsize::new(0));
    let request = scripted(vec![None, Some(404), Some(201)], calls.clone());

    let report = run_scan(
        &codes(&["1234", "admin", "khaos"]),
        request,
        &ScanConfig::default(),
    )
    .await
    .expect("scan ok");

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        report.outcome,
        ScanOutcome::CodeFound {
            code: "khaos".to_string()
        }
    );
    assert_eq!(report.attempts[0].status, None);
    assert!(report.attempts[0].error.is_some());
    assert_eq!(report.attempts[1].status, Some(404));
}

#[tokio::test]
async fn conflict_halts_by_default() {
    let calls = Arc::new(AtomicUsize::new(0));
    let request = scripted(vec![Some(404), Some(409), Some(201)], calls.clone());

    let report = run_scan(
        &codes(&["1234", "admin", "khaos"]),
        request,
        &ScanConfig::default(),
    )
    .await
    .expect("scan ok");

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        report.outcome,
        ScanOutcome::CodeLikelyValid {
            code: "admin".to_string()
        }
    );
}

#[tokio::test]
async fn conflict_ignored_when_configured() {
    let calls = Arc::new(AtomicUsize::new(0));
    let request = scripted(vec![Some(404), Some(409), Some(201)], calls.clone());

    let config = ScanConfig {
        stop_on_conflict: false,
    };
    let report = run_scan(&codes(&["1234", "admin", "khaos"]), request, &config)
        .await
        .expect("scan ok");

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        report.outcome,
        ScanOutcome::CodeFound {
            code: "khaos".to_string()
        }
    );
}

#[tokio::test]
async fn empty_candidate_list_reports_exhaustion() {
    let calls = Arc::new(AtomicUsize::new(0));
    let request = scripted(vec![], calls.clone());

    let report = run_scan(&[], request, &ScanConfig::default())
        .await
        .expect("scan ok");

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(report.tried, 0);
    assert_eq!(report.outcome, ScanOutcome::Exhausted);
}

#[test]
fn register_payload_uses_wire_field_names() {
    let payload = RegisterPayload::with_hospital_code("hacker@example.com", "khaos");
    let wire = serde_json::to_value(&payload).expect("serialize");
    assert_eq!(wire["hospitalCode"], "khaos");
    assert_eq!(wire["medicalLicense"], "12345");
    assert_eq!(wire["email"], "hacker@example.com");
    assert_eq!(wire["role"], "doctor");
}
