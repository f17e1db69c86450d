//! 필터 동기화 엔진.
//!
//! `FilterState`, 공유 URL, 브라우징 세션을 묶어 필터 변경 → URL 갱신 → 검색 요청 →
//! 세션 반영 흐름을 조율한다. 검색 백엔드는 `ComplaintSearch` 포트로 주입된다.

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::CoreError;
use crate::filter_sync::{self, ApplyRule, FilterChange};
use crate::models::filter::FilterState;
use crate::models::mail::{validate_recipient, EmailRequest};
use crate::models::search::{SearchRequest, SearchResponse};
use crate::ports::search::ComplaintSearch;
use crate::session::{BrowsingSession, Disposition, PageChange, RequestTicket, SessionOptions};

/// 필터 변경 처리 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyReport {
    pub rule: ApplyRule,
    /// 검색 요청을 보냈는지
    pub fetched: bool,
}

pub struct FilterSyncEngine {
    search: Arc<dyn ComplaintSearch>,
    state: FilterState,
    location: String,
    session: BrowsingSession,
}

impl FilterSyncEngine {
    /// 빈 필터로 엔진 생성 (조회는 하지 않음)
    pub fn new(search: Arc<dyn ComplaintSearch>, options: SessionOptions) -> Self {
        Self {
            search,
            state: FilterState::new(),
            location: String::new(),
            session: BrowsingSession::new(options),
        }
    }

    /// 공유 URL 쿼리로 화면 진입 — 상태 복원 후 첫 페이지 조회
    pub async fn mount(
        search: Arc<dyn ComplaintSearch>,
        location_query: &str,
        options: SessionOptions,
    ) -> Self {
        let mut engine = Self::new(search, options);
        engine.state = filter_sync::init_from_location(location_query);
        engine.location = filter_sync::serialize_to_location(&engine.state);
        info!(
            "필터 화면 진입: kind={}, query=\"{}\"",
            engine.state.active_kind, engine.location
        );
        engine.fetch().await;
        engine
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// 현재 상태를 표현하는 쿼리 문자열 (`?` 없음)
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn session(&self) -> &BrowsingSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut BrowsingSession {
        &mut self.session
    }

    /// 필터 변경 적용. 결정표에 따라 URL을 갱신하고 필요하면 재조회한다.
    pub async fn apply(&mut self, change: FilterChange) -> ApplyReport {
        self.state.page_index = self.session.page_index();
        let outcome = filter_sync::apply(&self.state, change);

        self.state = outcome.state;
        self.session.set_page_index(self.state.page_index);
        self.location = filter_sync::serialize_to_location(&self.state);

        if outcome.refetch {
            self.fetch().await;
        }
        ApplyReport {
            rule: outcome.rule,
            fetched: outcome.refetch,
        }
    }

    /// 페이지 이동. 선택된 행이 있으면 확인을 기다리며 조회하지 않는다.
    pub async fn change_page(&mut self, page_index: usize) -> PageChange {
        let change = self.session.request_page_change(page_index);
        if let PageChange::Applied(_) = change {
            self.fetch().await;
        }
        change
    }

    /// 대기 중인 페이지 이동 확정 후 조회
    pub async fn confirm_page_change(&mut self) -> bool {
        match self.session.confirm_page_change() {
            Some(_) => {
                self.fetch().await;
                true
            }
            None => false,
        }
    }

    pub fn cancel_page_change(&mut self) {
        self.session.cancel_page_change();
    }

    /// 선택한 민원을 보낼 메일 요청 구성
    ///
    /// 수신 주소가 허용 도메인이 아니거나 현재 페이지에 선택된 행이 없으면 검증 에러.
    pub fn selection_email(&self, send_to: &str) -> Result<EmailRequest, CoreError> {
        validate_recipient(send_to)?;
        let selected_complaints = self.session.selected_complaints();
        if selected_complaints.is_empty() {
            return Err(CoreError::validation(
                "selectedComplaints",
                "선택된 민원이 없습니다",
            ));
        }
        debug!("메일 요청 구성: {}건 → {send_to}", selected_complaints.len());
        Ok(EmailRequest {
            send_to: send_to.to_string(),
            selected_complaints,
        })
    }

    /// 현재 필터와 페이지로 재조회
    pub async fn refresh(&mut self) {
        self.fetch().await;
    }

    /// 조회 시작 — 요청 표식과 페이로드 반환.
    /// 응답은 `complete_fetch`로 반영한다.
    pub fn begin_fetch(&mut self) -> (RequestTicket, SearchRequest) {
        let ticket = self.session.begin_request();
        let payload = filter_sync::build_search_payload(&self.state, self.session.page_index());
        debug!(
            "검색 요청 준비: generation={}, page={}",
            ticket.generation(),
            payload.page
        );
        (ticket, payload)
    }

    /// 조회 결과 반영
    pub fn complete_fetch(
        &mut self,
        ticket: RequestTicket,
        result: Result<SearchResponse, CoreError>,
    ) -> Disposition {
        let disposition = match result {
            Ok(response) => self.session.finish_success(ticket, response),
            Err(e) => {
                error!("검색 요청 실패: {e}");
                self.session.finish_failure(ticket, e.to_string())
            }
        };
        self.state.page_index = self.session.page_index();
        disposition
    }

    async fn fetch(&mut self) -> Disposition {
        let (ticket, payload) = self.begin_fetch();
        let result = self.search.search(&payload).await;
        self.complete_fetch(ticket, result)
    }
}
