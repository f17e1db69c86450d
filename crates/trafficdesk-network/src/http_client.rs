//! 민원 검색 API 클라이언트.
//!
//! `ComplaintSearch` 포트 구현. 검색 페이로드를 JSON으로 `PUT`하고 응답을 그대로 돌려준다.
//! 선택한 민원의 메일 발송 요청도 같은 API 서버로 보낸다.
//! 재시도는 하지 않는다 (재조회는 사용자가 직접 요청).

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use trafficdesk_core::error::CoreError;
use trafficdesk_core::models::mail::{EmailRequest, EmailResponse};
use trafficdesk_core::models::search::{SearchRequest, SearchResponse};
use trafficdesk_core::ports::search::ComplaintSearch;

/// 상태 코드와 본문을 에러로 매핑
pub(crate) fn status_error(status_code: u16, text: String) -> CoreError {
    match status_code {
        400 => CoreError::validation("request", text),
        404 => CoreError::NotFound {
            resource_type: "API".to_string(),
            id: text,
        },
        503 => CoreError::ServiceUnavailable(text),
        _ => CoreError::Internal(format!("API 에러 ({status_code}): {text}")),
    }
}

/// 응답 상태 코드 확인
pub(crate) async fn check_response(
    resp: reqwest::Response,
) -> Result<reqwest::Response, CoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_else(|e| {
        warn!("응답 본문 읽기 실패: {e}");
        String::new()
    });
    Err(status_error(status.as_u16(), text))
}

fn leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// 검색 API 클라이언트 — `ComplaintSearch` 포트 구현
pub struct HttpSearchClient {
    client: reqwest::Client,
    base_url: String,
    search_path: String,
    email_path: String,
}

impl HttpSearchClient {
    /// 새 클라이언트 생성
    pub fn new(base_url: &str, search_path: &str, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            search_path: leading_slash(search_path),
            email_path: "/send-email".to_string(),
        })
    }

    /// 메일 발송 엔드포인트 경로 지정 (기본 `/send-email`)
    pub fn with_email_path(mut self, email_path: &str) -> Self {
        self.email_path = leading_slash(email_path);
        self
    }

    /// 검색 엔드포인트 전체 URL
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.search_path)
    }

    /// 메일 발송 엔드포인트 전체 URL
    pub fn email_endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.email_path)
    }

    /// 선택한 민원 메일 발송 요청
    pub async fn send_email(&self, request: &EmailRequest) -> Result<EmailResponse, CoreError> {
        debug!(
            "메일 발송 요청: to={}, {}건",
            request.send_to,
            request.selected_complaints.len()
        );

        let resp = self
            .client
            .post(self.email_endpoint())
            .json(request)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("메일 발송 요청 실패: {e}")))?;

        let resp = check_response(resp).await?;
        let body: EmailResponse = resp
            .json()
            .await
            .map_err(|e| CoreError::Internal(format!("메일 응답 파싱 실패: {e}")))?;

        if body.status >= 400 {
            return Err(status_error(body.status, body.message));
        }
        Ok(body)
    }
}

#[async_trait]
impl ComplaintSearch for HttpSearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, CoreError> {
        debug!(
            "검색 요청: page={}, beats={}, categories={}",
            request.page,
            request.beat_number.len(),
            request.problem_category.len()
        );

        let resp = self
            .client
            .put(self.endpoint())
            .json(request)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("검색 요청 실패: {e}")))?;

        let resp = check_response(resp).await?;
        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| CoreError::Internal(format!("검색 응답 파싱 실패: {e}")))?;

        // 본문에 실린 처리 상태도 확인
        if body.status >= 400 {
            return Err(status_error(body.status, body.message));
        }

        debug!(
            "검색 응답: page={}, {}건 / 전체 {}건",
            body.page,
            body.complaints_data.len(),
            body.total_complaint
        );
        Ok(body)
    }
}
