//! 민원 접수/수정 API 핸들러.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use trafficdesk_core::models::complaint::{Complaint, ManagementRequest};

use crate::error::ApiError;
use crate::AppState;

const CREATED_MESSAGE: &str = "Complaint recorded successfully";
const UPDATED_MESSAGE: &str = "Record updated successfully";

/// 접수/수정 응답
#[derive(Debug, Serialize)]
pub struct ManagementResponse {
    pub status: u16,
    pub message: String,
    pub body: Complaint,
}

/// `isUpdate` 플래그에 따라 민원 접수 또는 단일 속성 수정
///
/// PUT|POST /{stage}/
pub async fn manage(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ManagementResponse>, ApiError> {
    let request = ManagementRequest::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("관리 요청 형식 오류: {e}")))?;

    let (complaint, message) = match request {
        ManagementRequest::Create(form) => (state.intake.create(form).await?, CREATED_MESSAGE),
        ManagementRequest::Update(update) => (
            state
                .intake
                .update(&update.complaint_id, &update.attribute, &update.value)
                .await?,
            UPDATED_MESSAGE,
        ),
    };

    Ok(Json(ManagementResponse {
        status: 200,
        message: message.to_string(),
        body: complaint,
    }))
}
