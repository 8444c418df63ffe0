use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::payload::{Envelope, SubmissionPayload};
use crate::traits::MessageTransport;

/// Posts payloads to the collection endpoint with a static bearer token.
pub(crate) struct HttpTransport {
    http: Client,
    api_url: String,
    bearer_token: String,
}

impl HttpTransport {
    pub(crate) fn new(api_url: String, bearer_token: String) -> Self {
        Self {
            http: Client::new(),
            api_url,
            bearer_token,
        }
    }
}

#[async_trait]
impl MessageTransport for HttpTransport {
    /// Any response whose body parses as JSON counts as delivered, whatever
    /// its status code.
    async fn deliver(&self, payload: &SubmissionPayload) -> Result<Value, AppError> {
        let resp = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.bearer_token)
            .json(&Envelope { data: payload })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%status, "Collection endpoint returned non-success status");
        }

        let body = resp.text().await?;
        let data: Value = serde_json::from_str(&body)?;
        debug!(%status, response = %data, "Delivery response");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload() -> SubmissionPayload {
        SubmissionPayload {
            date: "Minggu, 18 Oktober 2026".into(),
            time: "14.30".into(),
            message: "This is a perfectly fine anonymous note.".into(),
        }
    }

    #[tokio::test]
    async fn test_deliver_posts_envelope_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notes"))
            .and(header("authorization", "Bearer s3cret"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "data": {
                    "date": "Minggu, 18 Oktober 2026",
                    "time": "14.30",
                    "message": "This is a perfectly fine anonymous note.",
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(format!("{}/notes", server.uri()), "s3cret".into());
        let data = transport.deliver(&payload()).await.unwrap();
        assert_eq!(data["ok"], true);
    }

    #[tokio::test]
    async fn test_deliver_non_json_body_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(server.uri(), "t".into());
        let err = transport.deliver(&payload()).await.unwrap_err();
        assert!(matches!(err, AppError::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_deliver_json_error_status_still_counts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({"error": "later"})))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(server.uri(), "t".into());
        let data = transport.deliver(&payload()).await.unwrap();
        assert_eq!(data["error"], "later");
    }

    #[tokio::test]
    async fn test_deliver_unreachable_endpoint_is_network_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport = HttpTransport::new(format!("http://127.0.0.1:{port}/notes"), "t".into());
        let err = transport.deliver(&payload()).await.unwrap_err();
        assert!(matches!(err, AppError::Network(_)), "got {err:?}");
    }
}
