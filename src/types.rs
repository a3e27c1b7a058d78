use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Registration body for `POST /api/auth/register`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    pub specialization: String,
    pub medical_license: String,
    pub role: String,
    pub hospital_code: String,
}

impl RegisterPayload {
    /// Decoy registration identity carrying one hospital-code guess.
    ///
    /// Everything except the email and the code is a fixed throwaway value;
    /// the endpoint only branches on the code and on whether the email is
    /// already registered.
    pub fn with_hospital_code(email: &str, hospital_code: &str) -> Self {
        Self {
            name: "Hacker".to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            specialization: "Hacking".to_string(),
            medical_license: "12345".to_string(),
            role: "doctor".to_string(),
            hospital_code: hospital_code.to_string(),
        }
    }
}

/// Synthetic screening submission for `POST /api/responses`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningRecord {
    pub patient_id: String,
    pub sex: String,
    pub study_level: String,
    pub answers: Value,
    pub total_score: u8,
    pub level_result: String,
    pub consent: bool,
}

/// What a request function yields when the transport succeeded: the HTTP
/// status plus the body, when it parsed as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: Option<Value>,
}

/// One probed candidate: either a status or a transport error, never both.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProbeAttempt {
    pub code: String,
    pub status: Option<u16>,
    pub error: Option<String>,
    pub latency_ms: u64,
    pub timestamp: String,
}

/// Terminal state of a code scan.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScanOutcome {
    /// The target accepted a registration, so the code is confirmed.
    CodeFound { code: String },
    /// The target reported a duplicate account. The code probably passed
    /// validation, but an email collision alone produces the same status.
    CodeLikelyValid { code: String },
    /// Every candidate was tried without a halting response.
    Exhausted,
    /// The scan was cancelled before running out of candidates.
    Interrupted,
}

/// Aggregate scan result: counters, outcome, and the ordered attempt log.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ScanReport {
    pub total: u64,
    pub tried: u64,
    pub outcome: ScanOutcome,
    pub attempts: Vec<ProbeAttempt>,
}

/// Summary of one results dump.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DumpReport {
    pub status: u16,
    pub record_count: Option<usize>,
    pub payload: Option<Value>,
}

/// One flood submission.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FloodAttempt {
    pub seq: u32,
    pub patient_id: String,
    pub status: Option<u16>,
    pub error: Option<String>,
}

/// Aggregate flood counters.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FloodReport {
    pub requested: u32,
    pub sent: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub interrupted: bool,
}
