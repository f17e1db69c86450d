//! API 라우트 정의.

use axum::routing::{get, post, MethodRouter};
use axum::Router;

use crate::handlers;
use crate::AppState;

/// 스테이지 경로 정규화 (`"Development/"` → `"/Development"`, 빈 값/`"/"` → `""`)
pub fn normalize_stage(stage: &str) -> String {
    let trimmed = stage.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

fn manage_route() -> MethodRouter<AppState> {
    post(handlers::management::manage).put(handlers::management::manage)
}

/// API 라우트 생성. 모든 경로는 스테이지 경로 아래에 붙는다.
pub fn api_routes(stage: &str) -> Router<AppState> {
    let stage = normalize_stage(stage);

    // 민원 접수 / 속성 수정
    let mut router = Router::new().route(&format!("{stage}/"), manage_route());
    if !stage.is_empty() {
        router = router.route(&stage, manage_route());
    }

    router
        // 비트별 Open 민원 수 (히트맵)
        .route(
            &format!("{stage}/beat-open-cases"),
            get(handlers::beats::open_cases),
        )
        // 민원 검색
        .route(
            &format!("{stage}/db-filter-query-api"),
            post(handlers::search::search).put(handlers::search::search),
        )
        // 선택 민원 메일 발송
        .route(
            &format!("{stage}/send-email"),
            post(handlers::email::send_email),
        )
}
