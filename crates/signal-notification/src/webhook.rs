//! 웹훅 푸시 알림 서비스.
//!
//! 알림을 JSON으로 직렬화해 사용자 지정 엔드포인트로 POST합니다.
//! 모바일 푸시 게이트웨이 등 외부 팬아웃 서비스가 이 웹훅을
//! 구독하는 구조입니다.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::types::{
    Notification, NotificationError, NotificationEvent, NotificationResult, NotificationSender,
};

/// 웹훅 전송 설정.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// POST 대상 URL
    pub url: String,
    /// 전송 활성화 여부
    pub enabled: bool,
}

impl WebhookConfig {
    /// 새 웹훅 설정을 생성합니다.
    pub fn new(url: String) -> Self {
        Self { url, enabled: true }
    }

    /// 환경 변수에서 설정을 생성합니다.
    ///
    /// - `PUSH_WEBHOOK_URL`: POST 대상 URL (없으면 None)
    /// - `PUSH_WEBHOOK_ENABLED`: 활성화 여부 (기본 true)
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("PUSH_WEBHOOK_URL").ok()?;
        let enabled = std::env::var("PUSH_WEBHOOK_ENABLED")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(true);
        Some(Self { url, enabled })
    }
}

/// 웹훅 알림 전송기.
pub struct WebhookSender {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl WebhookSender {
    /// 새 웹훅 전송기를 생성합니다.
    pub fn new(config: WebhookConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// 환경 변수에서 전송기를 생성합니다.
    pub fn from_env() -> Option<Self> {
        WebhookConfig::from_env().map(Self::new)
    }

    /// 알림을 웹훅 페이로드로 포맷합니다.
    fn format_payload(&self, notification: &Notification) -> serde_json::Value {
        let title = match &notification.event {
            NotificationEvent::SignalTriggered { coin, action, .. } => {
                format!("{} {}", coin, action)
            }
            NotificationEvent::SystemError { component, .. } => {
                format!("시스템 오류: {}", component)
            }
        };

        json!({
            "title": title,
            "notification": notification,
        })
    }
}

#[async_trait]
impl NotificationSender for WebhookSender {
    fn channel(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, notification: &Notification) -> NotificationResult {
        if !self.config.enabled {
            debug!("웹훅 채널 비활성화 상태, 전송 생략");
            return Err(NotificationError::Disabled("webhook".to_string()));
        }

        let payload = self.format_payload(notification);

        let response = self
            .client
            .post(&self.config.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "웹훅 전송 실패");
            return Err(NotificationError::Delivery(format!(
                "웹훅 응답 status={}",
                response.status()
            )));
        }

        debug!(url = %self.config.url, "웹훅 알림 전송 완료");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Notification;
    use rust_decimal_macros::dec;
    use signal_core::SignalAction;

    #[tokio::test]
    async fn test_webhook_posts_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_header("content-type", "application/json")
            .with_status(200)
            .create_async()
            .await;

        let sender = WebhookSender::new(WebhookConfig::new(format!("{}/hook", server.url())));
        let notification =
            Notification::signal("ethereum", 95, SignalAction::Buy, dec!(2500), 90);

        sender.send(&notification).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_webhook_error_status_surfaces() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/hook")
            .with_status(500)
            .create_async()
            .await;

        let sender = WebhookSender::new(WebhookConfig::new(format!("{}/hook", server.url())));
        let notification =
            Notification::signal("ethereum", 95, SignalAction::Buy, dec!(2500), 90);

        let result = sender.send(&notification).await;
        assert!(matches!(result, Err(NotificationError::Delivery(_))));
    }
}
