//! 메일 릴레이 클라이언트.
//!
//! `ComplaintMailer` 포트 구현. 구성된 메일을 JSON으로 릴레이 HTTP API에 `POST`한다.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};
use trafficdesk_core::error::CoreError;
use trafficdesk_core::models::mail::OutgoingMail;
use trafficdesk_core::ports::mailer::ComplaintMailer;

use crate::http_client::check_response;

/// 릴레이 요청 본문
#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

/// 메일 릴레이 클라이언트 — `ComplaintMailer` 포트 구현
pub struct MailRelayClient {
    client: reqwest::Client,
    relay_url: String,
    from_address: String,
    api_key: Option<String>,
}

impl MailRelayClient {
    pub fn new(
        relay_url: &str,
        from_address: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        if relay_url.trim().is_empty() {
            return Err(CoreError::Config("메일 릴레이 URL이 비어 있습니다".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {}", e)))?;

        Ok(Self {
            client,
            relay_url: relay_url.to_string(),
            from_address: from_address.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl ComplaintMailer for MailRelayClient {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), CoreError> {
        let message = RelayMessage {
            from: &self.from_address,
            to: [&mail.to],
            subject: &mail.subject,
            text: &mail.body,
        };
        debug!("메일 릴레이 요청: to={}, {}바이트", mail.to, mail.body.len());

        let mut request = self.client.post(&self.relay_url).json(&message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("메일 릴레이 요청 실패: {e}")))?;
        check_response(resp).await?;

        info!("메일 발송 완료: {}", mail.to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn mail() -> OutgoingMail {
        OutgoingMail {
            to: "officer@chandleraz.gov".to_string(),
            subject: "Complaint Collection".to_string(),
            body: "Complaint ID: ab12cd34\n".to_string(),
        }
    }

    #[test]
    fn empty_relay_url_is_config_error() {
        let err = MailRelayClient::new("", "noreply@chandleraz.gov", None, Duration::from_secs(5))
            .err()
            .unwrap();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[tokio::test]
    async fn deliver_posts_message_with_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/send")
            .match_header("authorization", "Bearer relay-key")
            .match_body(Matcher::Json(serde_json::json!({
                "from": "noreply@chandleraz.gov",
                "to": ["officer@chandleraz.gov"],
                "subject": "Complaint Collection",
                "text": "Complaint ID: ab12cd34\n"
            })))
            .with_status(202)
            .create_async()
            .await;

        let client = MailRelayClient::new(
            &format!("{}/api/send", server.url()),
            "noreply@chandleraz.gov",
            Some("relay-key".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        client.deliver(&mail()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn relay_rejection_maps_to_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/send")
            .with_status(503)
            .with_body("relay down")
            .create_async()
            .await;

        let client = MailRelayClient::new(
            &format!("{}/api/send", server.url()),
            "noreply@chandleraz.gov",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        let err = client.deliver(&mail()).await.unwrap_err();
        assert!(matches!(err, CoreError::ServiceUnavailable(ref m) if m == "relay down"));
    }
}
