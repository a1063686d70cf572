//! HEC Forwarder Module
//!
//! This module submits extracted record rows to a Splunk HTTP Event Collector.
//! Each row is wrapped in an `{event: row}` envelope and the whole batch goes
//! out as a single JSON array in one POST. A non-success response fails the
//! invocation; there is no retry and no chunking.

use crate::config::Config;
use crate::error::{RelayError, Result};
use crate::models::DmarcRecordRow;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Url};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct HecEvent<'a> {
    event: &'a DmarcRecordRow,
}

/// HecForwarder submits event batches to a configured collector endpoint.
#[derive(Debug)]
pub struct HecForwarder {
    client: Client,
    url: Url,
    token: String,
}

impl HecForwarder {
    /// Creates a new forwarder for the given endpoint, token, and timeout.
    pub fn new(url: impl AsRef<str>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = Url::parse(url.as_ref())
            .map_err(|e| RelayError::Config(format!("invalid HEC URL: {e}")))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url,
            token: token.into(),
        })
    }

    /// Builds a forwarder from process configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.hec_url,
            config.hec_token.clone(),
            Duration::from_secs(config.hec_timeout_secs),
        )
    }

    /// Forwards the rows as one batch.
    ///
    /// # Errors
    ///
    /// `RelayError::Http` if the endpoint is unreachable, `RelayError::Forwarding`
    /// if it answers with a non-success status.
    pub async fn forward(&self, rows: &[DmarcRecordRow]) -> Result<()> {
        let payload: Vec<HecEvent<'_>> = rows.iter().map(|row| HecEvent { event: row }).collect();
        let response = self
            .client
            .post(self.url.clone())
            .header(AUTHORIZATION, format!("Splunk {}", self.token))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read response body".to_string());
        if !status.is_success() {
            return Err(RelayError::Forwarding(format!("HTTP {status}: {body}")));
        }
        log::debug!("collector acknowledged {} events: {}", rows.len(), body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlignmentType, DispositionType, DmarcResultType};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_row() -> DmarcRecordRow {
        DmarcRecordRow {
            report_metadata_report_id: "2021_01-01_example".to_string(),
            report_metadata_org_name: "acme.example".to_string(),
            report_metadata_date_range_begin: 1609459200,
            report_metadata_date_range_end: 1609545600,
            report_metadata_error: String::new(),
            policy_published_domain: "example.com".to_string(),
            policy_published_adkim: AlignmentType::Relaxed,
            policy_published_aspf: AlignmentType::Relaxed,
            policy_published_p: DispositionType::None,
            policy_published_sp: DispositionType::None,
            policy_published_pct: 100,
            record_row_source_ip: "192.0.2.10".to_string(),
            record_row_count: 3,
            record_row_policy_evaluated_dkim: DmarcResultType::Pass,
            record_row_policy_evaluated_spf: DmarcResultType::Pass,
            record_row_policy_evaluated_disposition: DispositionType::None,
            record_row_policy_evaluated_reason_type: None,
            record_identifiers_envelope_to: "example.com".to_string(),
            record_identifiers_header_from: "example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_forward_success_with_splunk_auth() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/collector"))
            .and(header("Authorization", "Splunk t0k3n"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"text":"Success"}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let forwarder = HecForwarder::new(
            format!("{}/services/collector", mock_server.uri()),
            "t0k3n",
            Duration::from_secs(5),
        )
        .unwrap();
        forwarder.forward(&[sample_row()]).await.unwrap();
    }

    #[test]
    fn test_event_envelope_shape() {
        let row = sample_row();
        let json = serde_json::to_value(vec![HecEvent { event: &row }]).unwrap();
        assert_eq!(json[0]["event"]["recordRowSourceIP"], "192.0.2.10");
        assert_eq!(json[0]["event"]["policyPublishedADKIM"], "relaxed");
        // Absent override reason stays absent in the serialized event.
        assert!(json[0]["event"]
            .get("recordRowPolicyEvaluatedReasonType")
            .is_none());
    }

    #[tokio::test]
    async fn test_batch_goes_out_as_single_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let forwarder =
            HecForwarder::new(mock_server.uri(), "t0k3n", Duration::from_secs(5)).unwrap();
        let rows = vec![sample_row(), sample_row(), sample_row()];
        forwarder.forward(&rows).await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_non_success_is_forwarding_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("invalid token"))
            .expect(1) // exactly one attempt, no retry
            .mount(&mock_server)
            .await;

        let forwarder =
            HecForwarder::new(mock_server.uri(), "bad", Duration::from_secs(5)).unwrap();
        let err = forwarder.forward(&[sample_row()]).await.unwrap_err();
        assert!(matches!(err, RelayError::Forwarding(_)));
        assert!(err.to_string().contains("403"));
    }

    #[test]
    fn test_invalid_url() {
        let result = HecForwarder::new("not a url", "t0k3n", Duration::from_secs(5));
        assert!(matches!(result, Err(RelayError::Config(_))));
    }
}
