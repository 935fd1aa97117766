//! JSON-lines request replay.
//!
//! Every request runs on its own blocking task against one shared service,
//! the same way concurrent transport handlers would.

use crate::service::{ComplaintService, Request, Response};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Parse every non-blank line as a `Request`. Fails on the first malformed line.
pub fn parse_requests(input: &str) -> Result<Vec<Request>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Invalid request on line {}", idx + 1))
        })
        .collect()
}

/// Process requests concurrently; responses come back in input order.
pub async fn run_batch(service: Arc<ComplaintService>, requests: Vec<Request>) -> Result<Vec<Response>> {
    let handles: Vec<_> = requests
        .into_iter()
        .map(|request| {
            let service = Arc::clone(&service);
            tokio::task::spawn_blocking(move || service.handle(&request))
        })
        .collect();

    let mut responses = Vec::with_capacity(handles.len());
    for (idx, handle) in handles.into_iter().enumerate() {
        let response = handle
            .await
            .with_context(|| format!("Request {} did not complete", idx + 1))?;
        responses.push(response);
    }

    log::info!("Batch complete: {} requests processed", responses.len());
    Ok(responses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::service::ResponseStatus;

    const SUBMIT: &str = r#"{"op":"submit","description":"Low pressure","category":"Water Supply","phone":"9876543210","public_id":"AB12345678","email":"a@b.com"}"#;

    #[test]
    fn test_parse_skips_blank_lines() {
        let input = format!("{SUBMIT}\n\n{}\n", r#"{"op":"login","username":"john.doe@gov.in","password":"doe","govt_id":"GOV1001A"}"#);
        let requests = parse_requests(&input).unwrap();
        assert_eq!(requests.len(), 2);
        assert!(matches!(requests[0], Request::Submit(_)));
        assert!(matches!(requests[1], Request::Login(_)));
    }

    #[test]
    fn test_parse_reports_line_number() {
        let input = format!("{SUBMIT}\n{{\"op\":\"delete\"}}\n");
        let err = parse_requests(&input).unwrap_err();
        assert!(format!("{err}").contains("line 2"));
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_counts() {
        let mut config = Config::default();
        // keep every submission below the escalation threshold
        config.classification.max_jitter = 0;
        let service = Arc::new(ComplaintService::from_config(&config));
        let before: u32 = service.workloads().unwrap().values().sum();

        let mut lines: Vec<String> = (0..40).map(|_| SUBMIT.to_string()).collect();
        lines.push(r#"{"op":"login","username":"john.doe@gov.in"}"#.to_string());
        let requests = parse_requests(&lines.join("\n")).unwrap();

        let responses = run_batch(Arc::clone(&service), requests).await.unwrap();
        assert_eq!(responses.len(), 41);
        assert!(responses[..40]
            .iter()
            .all(|r| r.status() == ResponseStatus::Ok));
        assert_eq!(responses[40].status(), ResponseStatus::BadRequest);

        let after: u32 = service.workloads().unwrap().values().sum();
        assert_eq!(after, before + 40);
    }
}
