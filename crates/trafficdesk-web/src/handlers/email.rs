//! 선택 민원 메일 발송 핸들러.

use axum::extract::State;
use axum::Json;
use tracing::{info, warn};
use trafficdesk_core::models::mail::{EmailRequest, EmailResponse};

use crate::error::ApiError;
use crate::AppState;

/// 선택한 민원을 시 직원에게 메일로 보낸다
///
/// POST /{stage}/send-email
pub async fn send_email(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<EmailResponse>, ApiError> {
    let mail = request.compose()?;

    let Some(mailer) = state.mailer.as_ref() else {
        warn!("메일 발송 요청 거부: 메일러 미구성");
        return Err(ApiError::ServiceUnavailable(
            "메일 발송이 구성되지 않았습니다".to_string(),
        ));
    };

    mailer.deliver(&mail).await?;
    info!(
        "선택 민원 {}건 메일 발송: {}",
        request.selected_complaints.len(),
        mail.to
    );

    Ok(Json(EmailResponse {
        status: 200,
        message: "Email sent successfully".to_string(),
    }))
}
