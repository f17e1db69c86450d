//! 민원 검색 API 핸들러.

use axum::extract::State;
use axum::Json;
use tracing::debug;
use trafficdesk_core::models::search::{SearchRequest, SearchResponse};

use crate::error::ApiError;
use crate::AppState;

/// 필터 조건으로 민원 검색
///
/// PUT|POST /{stage}/db-filter-query-api
pub async fn search(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<SearchResponse>, ApiError> {
    let request: SearchRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("검색 요청 형식 오류: {e}")))?;
    debug!("검색 요청 수신: page={}", request.page);

    let response = state.store.search(&request).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, seed, send};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn search_filters_by_beat() {
        let (storage, app) = app();
        seed(&storage, "00000001", "B1", "Open").await;
        seed(&storage, "00000002", "B2", "Closed").await;

        let (status, body) = send(
            app,
            Method::PUT,
            "/Development/db-filter-query-api",
            Some(json!({
                "tableName": "Complaints_table",
                "beatNumber": ["B2"],
                "complaintId": [],
                "problemCategory": [],
                "startDate": "", "endDate": "", "startTime": "", "endTime": "",
                "complaintStatus": [],
                "page": 1
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalComplaint"], 1);
        assert_eq!(body["complaintsData"][0]["complaintId"], "00000002");
        assert_eq!(body["totalStatusCounts"]["TotalClosed"], 1);
        assert_eq!(body["page"], 1);
    }

    #[tokio::test]
    async fn out_of_range_page_is_no_page() {
        let (storage, app) = app();
        seed(&storage, "00000001", "B1", "Open").await;

        let (status, body) = send(
            app,
            Method::POST,
            "/Development/db-filter-query-api",
            Some(json!({"tableName": "Complaints_table", "page": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], -1);
        assert_eq!(body["message"], "Page out of limit");
    }

    #[tokio::test]
    async fn unknown_table_is_404() {
        let (_storage, app) = app();
        let (status, body) = send(
            app,
            Method::PUT,
            "/Development/db-filter-query-api",
            Some(json!({"tableName": "Users", "page": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], 404);
    }

    #[tokio::test]
    async fn malformed_time_is_400() {
        let (_storage, app) = app();
        let (status, _) = send(
            app,
            Method::PUT,
            "/Development/db-filter-query-api",
            Some(json!({
                "tableName": "Complaints_table",
                "startTime": "noon", "endTime": "2024-05-01T15:00:00Z",
                "page": 1
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_table_name_is_400() {
        let (_storage, app) = app();
        let (status, _) = send(
            app,
            Method::PUT,
            "/Development/db-filter-query-api",
            Some(json!({"page": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
