//! 필터 브라우징 명령.
//!
//! 공유 URL 쿼리로 필터 화면에 진입하고, 명령줄 필터를 적용한 뒤
//! 한 페이지를 터미널 표로 출력한다. 선택한 행은 메일로 보낼 수 있다.

use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, info, warn};
use trafficdesk_core::engine::FilterSyncEngine;
use trafficdesk_core::error::CoreError;
use trafficdesk_core::models::mail::EmailResponse;
use trafficdesk_core::filter_sync::{format_time_of_day, FilterChange};
use trafficdesk_core::models::filter::{ComplaintStatus, FilterKind, FilterState};
use trafficdesk_core::ports::search::ComplaintSearch;
use trafficdesk_core::session::{
    BrowsingSession, DisplayRow, LoadState, PageChange, SessionOptions,
};
use trafficdesk_network::http_client::HttpSearchClient;

/// 브라우징 요청
#[derive(Debug, Clone, Default)]
pub struct BrowseRequest {
    /// 공유 URL 쿼리 (`?` 유무 무관)
    pub query: String,
    /// 명령줄에서 지정한 필터 (한 번에 한 차원)
    pub filter: Option<FilterChange>,
    /// 0부터 시작하는 페이지 인덱스
    pub page_index: usize,
    /// 표시된 페이지에서 선택할 민원 ID
    pub select: Vec<String>,
    pub options: SessionOptions,
}

/// 변경 값이 속한 필터 차원
fn kind_of(change: &FilterChange) -> FilterKind {
    match change {
        FilterChange::Kind(kind) => *kind,
        FilterChange::TimeRange(_) => FilterKind::TimeRange,
        FilterChange::DateRange(_) => FilterKind::DateRange,
        FilterChange::BeatNumbers(_) => FilterKind::BeatNumber,
        FilterChange::ProblemCategories(_) => FilterKind::ProblemCategory,
        FilterChange::ComplaintStatus(_) => FilterKind::ComplaintStatus,
    }
}

impl BrowseRequest {
    /// 적용 순서대로의 변경 목록
    ///
    /// 화면에서의 조작 순서대로 차원을 먼저 연 다음 값을 넣는다.
    /// 차원 전환은 다른 차원의 값을 비우므로 필터는 하나만 받는다.
    fn changes(&self) -> Vec<FilterChange> {
        match &self.filter {
            None => Vec::new(),
            Some(change @ FilterChange::Kind(_)) => vec![change.clone()],
            Some(change) => vec![FilterChange::Kind(kind_of(change)), change.clone()],
        }
    }
}

/// 필터 화면 진입 → 필터 적용 → 페이지 이동
pub async fn browse(
    search: Arc<dyn ComplaintSearch>,
    request: &BrowseRequest,
) -> FilterSyncEngine {
    let mut engine = FilterSyncEngine::mount(search, &request.query, request.options).await;

    for change in request.changes() {
        let report = engine.apply(change).await;
        debug!("필터 적용: rule={:?}, fetched={}", report.rule, report.fetched);
    }

    if request.page_index != engine.session().page_index() {
        match engine.change_page(request.page_index).await {
            PageChange::Applied(page) => info!("페이지 이동: {}", page + 1),
            PageChange::Unchanged => {}
            PageChange::NeedsConfirmation(page) => {
                // 명령줄에는 선택 행이 없지만 확인 절차는 그대로 따른다
                info!("페이지 {} 이동 확인", page + 1);
                engine.confirm_page_change().await;
            }
        }
    }

    select_rows(&mut engine, &request.select);
    engine
}

fn on_page(engine: &FilterSyncEngine, id: &str) -> bool {
    engine
        .session()
        .complaints()
        .iter()
        .any(|c| c.complaint_id == id)
}

/// 현재 페이지에 있는 행만 선택한다. 페이지에서 사라진 기존 선택은 해제.
fn select_rows(engine: &mut FilterSyncEngine, ids: &[String]) {
    let stale: Vec<String> = engine
        .session()
        .selected()
        .iter()
        .filter(|id| !on_page(engine, id))
        .cloned()
        .collect();
    for id in stale {
        engine.session_mut().deselect(&id);
    }

    for id in ids {
        if on_page(engine, id) {
            engine.session_mut().select(id.as_str());
        } else {
            warn!("현재 페이지에 없는 민원 선택 무시: {id}");
        }
    }
}

/// 선택한 민원을 메일로 보내고 선택을 해제한다
pub async fn email_selection(
    engine: &mut FilterSyncEngine,
    client: &HttpSearchClient,
    send_to: &str,
) -> Result<EmailResponse, CoreError> {
    let request = engine.selection_email(send_to)?;
    let response = client.send_email(&request).await?;
    info!(
        "선택 민원 {}건 메일 발송: {send_to}",
        request.selected_complaints.len()
    );
    engine.session_mut().clear_selection();
    Ok(response)
}

fn describe_filters(state: &FilterState) -> String {
    let mut parts = Vec::new();
    if let (Some(start), Some(end)) = (state.time_range.start, state.time_range.end) {
        parts.push(format!(
            "시간대 {}–{}",
            format_time_of_day(&start),
            format_time_of_day(&end)
        ));
    }
    if let (Some(start), Some(end)) = (state.date_range.start, state.date_range.end) {
        parts.push(format!("날짜 {start}–{end}"));
    }
    if !state.beat_numbers.is_empty() {
        let beats: Vec<&str> = state.beat_numbers.iter().map(String::as_str).collect();
        parts.push(format!("비트 {}", beats.join(", ")));
    }
    if !state.problem_categories.is_empty() {
        let categories: Vec<&str> = state.problem_categories.iter().map(|c| c.as_str()).collect();
        parts.push(format!("유형 {}", categories.join(", ")));
    }
    if let Some(status) = state.complaint_status {
        parts.push(format!("상태 {status}"));
    }

    let values = if parts.is_empty() {
        "없음".to_string()
    } else {
        parts.join(" / ")
    };
    match state.active_kind {
        FilterKind::None => values,
        kind => format!("[{}] {values}", kind.label()),
    }
}

fn render_counts(session: &BrowsingSession) -> String {
    let counts = session.status_counts();
    ComplaintStatus::ALL
        .iter()
        .map(|status| format!("{status} {}", counts.get(*status)))
        .collect::<Vec<_>>()
        .join(" · ")
}

/// 현재 세션을 터미널 표로 렌더링
pub fn render(engine: &FilterSyncEngine) -> String {
    let session = engine.session();
    let mut out = String::new();

    let _ = writeln!(out, "필터: {}", describe_filters(engine.state()));
    let _ = writeln!(out, "공유 쿼리: ?{}", engine.location());
    let _ = writeln!(
        out,
        "전체 {}건 · 페이지 {}/{} (페이지당 {}건) · {}",
        session.total_complaints(),
        session.page_index() + 1,
        session.total_pages().max(1),
        session.rows_per_page(),
        render_counts(session)
    );
    let _ = writeln!(
        out,
        "  {:<10} {:<11} {:<9} {:<6} {:<26} {}",
        "ID", "날짜", "시각", "비트", "유형", "상태"
    );

    for row in session.display_rows() {
        match row {
            DisplayRow::FetchFailed => {
                let message = match session.load_state() {
                    LoadState::Failed(msg) => msg.as_str(),
                    _ => "",
                };
                let _ = writeln!(out, "⚠️  조회 실패 — 다시 시도하세요 ({message})");
            }
            DisplayRow::Complaint(c) => {
                let mark = if session.selected().contains(&c.complaint_id) {
                    '*'
                } else {
                    ' '
                };
                let _ = writeln!(
                    out,
                    "{mark} {:<10} {:<11} {:<9} {:<6} {:<26} {}",
                    c.complaint_id,
                    c.start_date,
                    c.start_time,
                    c.beat_number,
                    c.problem_category,
                    c.complaint_status
                );
            }
        }
    }
    out
}
