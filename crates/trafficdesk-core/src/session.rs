//! 브라우징 세션 저장소.
//!
//! 현재 페이지의 민원 목록, 페이지 정보, 상태별 집계, 선택된 행, 로딩/실패 상태를
//! 한 곳에서 관리한다. 화면 계층은 이 객체만 읽고 쓴다.

use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::models::complaint::{Complaint, UpdatableAttribute};
use crate::models::search::{SearchResponse, StatusCounts, PAGE_SIZE};

/// 조회 진행 상태
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    /// 마지막 조회 실패 (메시지)
    Failed(String),
}

/// 세션 동작 옵션
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// 더 최근 요청이 시작된 뒤 도착한 응답을 버릴지 여부.
    /// 기본값은 `false`로, 응답은 도착 순서대로 반영된다.
    pub discard_stale_responses: bool,
}

/// 진행 중인 조회 요청 표식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// 응답 반영 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Applied,
    /// 더 최근 요청이 있어 버림
    DiscardedStale,
}

/// 화면 행
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayRow<'a> {
    Complaint(&'a Complaint),
    /// 조회 실패 안내 행 (목록 맨 앞)
    FetchFailed,
}

/// 페이지 이동 요청 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageChange {
    /// 이동 완료
    Applied(usize),
    /// 현재 페이지와 같음
    Unchanged,
    /// 선택된 행이 있어 사용자 확인 필요
    NeedsConfirmation(usize),
}

/// 브라우징 세션
#[derive(Debug, Clone)]
pub struct BrowsingSession {
    options: SessionOptions,
    complaints: Vec<Complaint>,
    load_state: LoadState,
    page_index: usize,
    total_complaints: u64,
    total_pages: u64,
    status_counts: StatusCounts,
    selected: BTreeSet<String>,
    pending_page: Option<usize>,
    generation: u64,
}

impl Default for BrowsingSession {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl BrowsingSession {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            complaints: Vec::new(),
            load_state: LoadState::Idle,
            page_index: 0,
            total_complaints: 0,
            total_pages: 1,
            status_counts: StatusCounts::default(),
            selected: BTreeSet::new(),
            pending_page: None,
            generation: 0,
        }
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn complaints(&self) -> &[Complaint] {
        &self.complaints
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    /// 0부터 시작하는 현재 페이지
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn total_complaints(&self) -> u64 {
        self.total_complaints
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn rows_per_page(&self) -> usize {
        PAGE_SIZE
    }

    pub fn status_counts(&self) -> &StatusCounts {
        &self.status_counts
    }

    pub fn pending_page(&self) -> Option<usize> {
        self.pending_page
    }

    /// 페이지 인덱스를 직접 설정 (필터 변경으로 인한 초기화)
    pub fn set_page_index(&mut self, page_index: usize) {
        self.page_index = page_index;
    }

    /// 조회 시작 — 로딩 상태로 전환하고 요청 표식 발급
    pub fn begin_request(&mut self) -> RequestTicket {
        self.generation += 1;
        self.load_state = LoadState::Loading;
        RequestTicket {
            generation: self.generation,
        }
    }

    fn is_stale(&self, ticket: RequestTicket) -> bool {
        self.options.discard_stale_responses && ticket.generation != self.generation
    }

    /// 조회 성공 반영
    pub fn finish_success(&mut self, ticket: RequestTicket, response: SearchResponse) -> Disposition {
        if self.is_stale(ticket) {
            debug!(
                "오래된 응답 무시: generation={} (현재 {})",
                ticket.generation, self.generation
            );
            return Disposition::DiscardedStale;
        }

        self.load_state = LoadState::Idle;
        self.status_counts = response.total_status_counts;
        self.total_complaints = response.total_complaint;

        if response.page < 1 {
            self.complaints.clear();
            self.page_index = 0;
            self.total_pages = 1;
        } else {
            self.complaints = response.complaints_data;
            self.page_index = (response.page - 1) as usize;
            self.total_pages = response.total_pages.max(1);
        }

        debug!(
            "조회 결과 반영: {}건, page_index={}, total_pages={}",
            self.complaints.len(),
            self.page_index,
            self.total_pages
        );
        Disposition::Applied
    }

    /// 조회 실패 반영 — 이전 목록은 유지한다
    pub fn finish_failure(&mut self, ticket: RequestTicket, message: impl Into<String>) -> Disposition {
        if self.is_stale(ticket) {
            debug!("오래된 실패 응답 무시: generation={}", ticket.generation);
            return Disposition::DiscardedStale;
        }

        let message = message.into();
        warn!("민원 조회 실패: {message}");
        self.load_state = LoadState::Failed(message);
        Disposition::Applied
    }

    /// 화면에 그릴 행 목록 (실패 시 안내 행이 맨 앞)
    pub fn display_rows(&self) -> Vec<DisplayRow<'_>> {
        let failed = matches!(self.load_state, LoadState::Failed(_));
        failed
            .then_some(DisplayRow::FetchFailed)
            .into_iter()
            .chain(self.complaints.iter().map(DisplayRow::Complaint))
            .collect()
    }

    // ── 행 선택 ──

    pub fn select(&mut self, complaint_id: impl Into<String>) {
        self.selected.insert(complaint_id.into());
    }

    pub fn deselect(&mut self, complaint_id: &str) {
        self.selected.remove(complaint_id);
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    /// 선택된 행 중 현재 페이지에 있는 민원 (목록 순서)
    pub fn selected_complaints(&self) -> Vec<Complaint> {
        self.complaints
            .iter()
            .filter(|c| self.selected.contains(&c.complaint_id))
            .cloned()
            .collect()
    }

    // ── 페이지 이동 ──

    /// 페이지 이동 요청. 선택된 행이 있으면 확인을 기다린다.
    pub fn request_page_change(&mut self, page_index: usize) -> PageChange {
        if page_index == self.page_index {
            return PageChange::Unchanged;
        }
        if !self.selected.is_empty() {
            self.pending_page = Some(page_index);
            return PageChange::NeedsConfirmation(page_index);
        }
        self.page_index = page_index;
        PageChange::Applied(page_index)
    }

    /// 대기 중인 페이지 이동 확정 (선택 해제)
    pub fn confirm_page_change(&mut self) -> Option<usize> {
        let page_index = self.pending_page.take()?;
        self.selected.clear();
        self.page_index = page_index;
        Some(page_index)
    }

    /// 대기 중인 페이지 이동 취소
    pub fn cancel_page_change(&mut self) {
        self.pending_page = None;
    }

    /// 현재 페이지의 민원 한 건을 재조회 없이 수정
    pub fn update_complaint(
        &mut self,
        complaint_id: &str,
        attribute: UpdatableAttribute,
        value: &str,
    ) -> bool {
        match self
            .complaints
            .iter_mut()
            .find(|c| c.complaint_id == complaint_id)
        {
            Some(complaint) => {
                attribute.apply_to(complaint, value);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::filter::ComplaintStatus;

    fn complaint(id: &str) -> Complaint {
        Complaint {
            complaint_id: id.to_string(),
            complaint_status: "Open".to_string(),
            ..Default::default()
        }
    }

    fn response(page: i64, ids: &[&str], total_pages: u64) -> SearchResponse {
        let mut counts = StatusCounts::default();
        counts.set(ComplaintStatus::Open, ids.len() as u64);
        SearchResponse {
            complaints_data: ids.iter().map(|id| complaint(id)).collect(),
            page,
            total_complaint: ids.len() as u64,
            total_pages,
            total_status_counts: counts,
            status: 200,
            message: String::new(),
        }
    }

    #[test]
    fn success_replaces_rows_and_page() {
        let mut session = BrowsingSession::default();
        let ticket = session.begin_request();
        assert!(session.is_loading());

        session.finish_success(ticket, response(2, &["a1", "a2"], 3));
        assert_eq!(session.load_state(), &LoadState::Idle);
        assert_eq!(session.page_index(), 1);
        assert_eq!(session.total_pages(), 3);
        assert_eq!(session.complaints().len(), 2);
        assert_eq!(session.status_counts().open, 2);
    }

    #[test]
    fn no_page_response_empties_rows() {
        let mut session = BrowsingSession::default();
        let t = session.begin_request();
        session.finish_success(t, response(2, &["a1"], 2));

        let t = session.begin_request();
        session.finish_success(t, response(-1, &[], 0));
        assert!(session.complaints().is_empty());
        assert_eq!(session.page_index(), 0);
        assert_eq!(session.total_pages(), 1);
    }

    #[test]
    fn failure_keeps_rows_and_shows_sentinel() {
        let mut session = BrowsingSession::default();
        let t = session.begin_request();
        session.finish_success(t, response(1, &["a1"], 1));

        let t = session.begin_request();
        session.finish_failure(t, "connection refused");
        assert_eq!(session.load_state(), &LoadState::Failed("connection refused".into()));

        let rows = session.display_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], DisplayRow::FetchFailed);
        assert!(matches!(rows[1], DisplayRow::Complaint(c) if c.complaint_id == "a1"));
    }

    #[test]
    fn late_response_wins_by_default() {
        let mut session = BrowsingSession::default();
        let first = session.begin_request();
        let second = session.begin_request();

        session.finish_success(second, response(1, &["new"], 1));
        let disposition = session.finish_success(first, response(1, &["old"], 1));
        assert_eq!(disposition, Disposition::Applied);
        assert_eq!(session.complaints()[0].complaint_id, "old");
    }

    #[test]
    fn stale_response_discarded_when_enabled() {
        let mut session = BrowsingSession::new(SessionOptions {
            discard_stale_responses: true,
        });
        let first = session.begin_request();
        let second = session.begin_request();

        session.finish_success(second, response(1, &["new"], 1));
        assert_eq!(
            session.finish_success(first, response(1, &["old"], 1)),
            Disposition::DiscardedStale
        );
        assert_eq!(
            session.finish_failure(first, "timeout"),
            Disposition::DiscardedStale
        );
        assert_eq!(session.complaints()[0].complaint_id, "new");
        assert_eq!(session.load_state(), &LoadState::Idle);
    }

    #[test]
    fn page_change_with_selection_needs_confirmation() {
        let mut session = BrowsingSession::default();
        assert_eq!(session.request_page_change(0), PageChange::Unchanged);
        assert_eq!(session.request_page_change(1), PageChange::Applied(1));

        session.select("a1");
        assert_eq!(session.request_page_change(2), PageChange::NeedsConfirmation(2));
        assert_eq!(session.page_index(), 1);

        session.cancel_page_change();
        assert_eq!(session.confirm_page_change(), None);
        assert_eq!(session.selected().len(), 1);

        session.request_page_change(2);
        assert_eq!(session.confirm_page_change(), Some(2));
        assert_eq!(session.page_index(), 2);
        assert!(session.selected().is_empty());
    }

    #[test]
    fn selected_complaints_follow_page_rows() {
        let mut session = BrowsingSession::default();
        let t = session.begin_request();
        session.finish_success(t, response(1, &["a1", "a2", "a3"], 1));

        session.select("a3");
        session.select("a1");
        session.select("zz");
        let ids: Vec<_> = session
            .selected_complaints()
            .into_iter()
            .map(|c| c.complaint_id)
            .collect();
        assert_eq!(ids, vec!["a1", "a3"]);

        session.deselect("a1");
        assert_eq!(session.selected_complaints().len(), 1);
        session.clear_selection();
        assert!(session.selected_complaints().is_empty());
        assert_eq!(session.rows_per_page(), 10);
    }

    #[test]
    fn local_update_patches_row() {
        let mut session = BrowsingSession::default();
        let t = session.begin_request();
        session.finish_success(t, response(1, &["a1", "a2"], 1));

        assert!(session.update_complaint("a2", UpdatableAttribute::ComplaintStatus, "Closed"));
        assert_eq!(session.complaints()[1].complaint_status, "Closed");
        assert!(!session.update_complaint("zz", UpdatableAttribute::Description, "x"));
    }
}
