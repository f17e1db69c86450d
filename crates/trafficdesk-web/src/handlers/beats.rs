//! 비트별 집계 API 핸들러.

use axum::extract::State;
use axum::Json;
use trafficdesk_core::models::complaint::BeatOpenCases;

use crate::error::ApiError;
use crate::AppState;

/// 비트별 Open 민원 수
///
/// GET /{stage}/beat-open-cases
pub async fn open_cases(State(state): State<AppState>) -> Result<Json<BeatOpenCases>, ApiError> {
    Ok(Json(state.store.open_cases_per_beat().await?))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, seed, send};
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn counts_open_per_beat() {
        let (storage, app) = app();
        seed(&storage, "00000001", "B1", "Open").await;
        seed(&storage, "00000002", "B1", "Open").await;
        seed(&storage, "00000003", "B4", "Closed").await;

        let (status, body) = send(app, Method::GET, "/Development/beat-open-cases", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["B1"], 2);
        assert_eq!(body["B4"], 0);
    }
}
