use crate::client::ApiClient;
use crate::types::{DumpReport, ProbeResponse};
use anyhow::Result;

/// Issue the single results read and summarize whatever came back.
/// One request, no pagination, no retries.
pub async fn run_dump(client: &ApiClient) -> Result<DumpReport> {
    let response = client.fetch_results().await?;
    Ok(summarize(&response))
}

/// Classify a results response. On 200 the payload is kept for printing and
/// the `data` array is counted; any other status is reported bare.
pub fn summarize(response: &ProbeResponse) -> DumpReport {
    if response.status != 200 {
        return DumpReport {
            status: response.status,
            record_count: None,
            payload: None,
        };
    }
    let record_count = response
        .body
        .as_ref()
        .and_then(|body| body.get("data"))
        .and_then(|data| data.as_array())
        .map(|array| array.len());
    DumpReport {
        status: response.status,
        record_count,
        payload: response.body.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counts_the_data_array_on_200() {
        let response = ProbeResponse {
            status: 200,
            body: Some(json!({ "success": true, "data": [{}, {}, {}] })),
        };
        let report = summarize(&response);
        assert_eq!(report.status, 200);
        assert_eq!(report.record_count, Some(3));
        assert!(report.payload.is_some());
    }

    #[test]
    fn missing_data_array_keeps_payload_without_count() {
        let response = ProbeResponse {
            status: 200,
            body: Some(json!({ "success": true })),
        };
        let report = summarize(&response);
        assert_eq!(report.record_count, None);
        assert!(report.payload.is_some());
    }

    #[test]
    fn non_200_reports_status_only() {
        let response = ProbeResponse {
            status: 403,
            body: Some(json!({ "success": false, "error": "No autorizado" })),
        };
        let report = summarize(&response);
        assert_eq!(report.status, 403);
        assert_eq!(report.record_count, None);
        assert_eq!(report.payload, None);
    }
}
