//! 필터 상태 ⇄ 공유 URL ⇄ 검색 페이로드 동기화.
//!
//! 세 개의 순수 함수(`init_from_location`, `serialize_to_location`, `build_search_payload`)와
//! 필터 변경 결정표(`apply`)로 구성된다. 상태 변경은 `apply`로만 이루어진다.
//!
//! # 결정표 (먼저 일치하는 규칙 적용)
//! 1. 활성 차원 필드를 비움 → 전체 초기화, 재조회
//! 2. 다른 필드를 비움 (빈 값, 또는 모든 원소가 비어 있는 범위) → 해당 필드만 갱신, 재조회
//! 3. 활성 차원을 범위형이 아닌 차원으로 변경 → 새 차원만 남기고 초기화, 재조회 보류
//! 4. 활성 차원을 시간대/날짜 범위로 변경 → 초기화, 범위가 완전할 때만 재조회
//! 5. 범위 값 갱신 → 즉시 저장, 양끝이 모두 채워지거나 모두 비었을 때만 재조회
//! 6. 그 외 → 해당 필드 갱신, 재조회

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use std::collections::BTreeSet;
use tracing::debug;
use url::form_urlencoded;

use crate::models::filter::{
    ComplaintStatus, DateRange, FilterKind, FilterState, ProblemCategory, TimeRange,
};
use crate::models::search::{SearchRequest, StatusField, COMPLAINTS_TABLE};

/// URL 쿼리 파라미터 키
pub mod keys {
    pub const FILTER: &str = "filter";
    pub const START_TIME: &str = "startTime";
    pub const END_TIME: &str = "endTime";
    pub const BEAT_NUMBER: &str = "beatNumber";
    pub const PROBLEM_CATEGORY: &str = "problemCategory";
    pub const COMPLAINT_STATUS: &str = "complaintStatus";
    pub const START_DATE: &str = "startDate";
    pub const END_DATE: &str = "endDate";
}

/// 변경 대상 필드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionKey {
    /// 활성 필터 차원 필드 자체
    Filter,
    TimeRange,
    DateRange,
    BeatNumber,
    ProblemCategory,
    ComplaintStatus,
}

/// UI 이벤트 — (대상 필드, 새 값)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    /// 활성 차원 변경 (`FilterKind::None`은 비움)
    Kind(FilterKind),
    TimeRange(TimeRange),
    DateRange(DateRange),
    BeatNumbers(BTreeSet<String>),
    ProblemCategories(BTreeSet<ProblemCategory>),
    ComplaintStatus(Option<ComplaintStatus>),
}

impl FilterChange {
    /// 비트 번호 목록에서 생성 (공백 값 제외)
    pub fn beat_numbers<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterChange::BeatNumbers(
            values
                .into_iter()
                .map(Into::into)
                .filter(|v| !v.trim().is_empty())
                .collect(),
        )
    }

    /// 문제 유형 목록에서 생성
    pub fn problem_categories<I>(values: I) -> Self
    where
        I: IntoIterator<Item = ProblemCategory>,
    {
        FilterChange::ProblemCategories(values.into_iter().collect())
    }

    /// 시간대 변경 (역전 범위는 종료를 비움)
    pub fn time_range(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        FilterChange::TimeRange(TimeRange::clamped(start, end))
    }

    /// 날짜 범위 변경 (역전 범위는 종료를 비움)
    pub fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        FilterChange::DateRange(DateRange::clamped(start, end))
    }

    /// 대상 필드
    pub fn key(&self) -> DimensionKey {
        match self {
            FilterChange::Kind(_) => DimensionKey::Filter,
            FilterChange::TimeRange(_) => DimensionKey::TimeRange,
            FilterChange::DateRange(_) => DimensionKey::DateRange,
            FilterChange::BeatNumbers(_) => DimensionKey::BeatNumber,
            FilterChange::ProblemCategories(_) => DimensionKey::ProblemCategory,
            FilterChange::ComplaintStatus(_) => DimensionKey::ComplaintStatus,
        }
    }

    /// 값이 비었는지 (범위는 양끝 모두 비어야 함)
    pub fn is_cleared(&self) -> bool {
        match self {
            FilterChange::Kind(kind) => *kind == FilterKind::None,
            FilterChange::TimeRange(r) => r.is_empty(),
            FilterChange::DateRange(r) => r.is_empty(),
            FilterChange::BeatNumbers(set) => set.iter().all(|v| v.trim().is_empty()),
            FilterChange::ProblemCategories(set) => set.is_empty(),
            FilterChange::ComplaintStatus(status) => status.is_none(),
        }
    }

    /// 직접 생성된 값 정규화 (역전 범위 클램프, 공백 비트 제거)
    fn normalized(self) -> Self {
        match self {
            FilterChange::TimeRange(r) => FilterChange::TimeRange(TimeRange::clamped(r.start, r.end)),
            FilterChange::DateRange(r) => FilterChange::DateRange(DateRange::clamped(r.start, r.end)),
            FilterChange::BeatNumbers(set) => FilterChange::beat_numbers(set),
            other => other,
        }
    }
}

/// 적용된 결정표 규칙
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyRule {
    /// 1: 활성 차원 비움 → 전체 초기화
    Reset,
    /// 2: 비활성 필드 비움 → 해당 필드만 갱신
    ClearField,
    /// 3: 범위형이 아닌 차원으로 전환
    SwitchKind,
    /// 4: 범위형 차원으로 전환
    SwitchRangeKind,
    /// 5: 범위 값 갱신
    RangeUpdate,
    /// 6: 일반 필드 갱신
    Update,
}

/// `apply` 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// 다음 상태
    pub state: FilterState,
    /// 재조회 필요 여부
    pub refetch: bool,
    /// 적용된 규칙
    pub rule: ApplyRule,
}

/// 단일 필드 교체. 값이 실제로 바뀌면 페이지 인덱스를 0으로 되돌린다.
fn with_field(current: &FilterState, change: FilterChange) -> FilterState {
    let mut next = current.clone();
    match change {
        FilterChange::Kind(kind) => next.active_kind = kind,
        FilterChange::TimeRange(r) => next.time_range = r,
        FilterChange::DateRange(r) => next.date_range = r,
        FilterChange::BeatNumbers(set) => next.beat_numbers = set,
        FilterChange::ProblemCategories(set) => next.problem_categories = set,
        FilterChange::ComplaintStatus(status) => next.complaint_status = status,
    }

    let values_changed = next.time_range != current.time_range
        || next.date_range != current.date_range
        || next.beat_numbers != current.beat_numbers
        || next.problem_categories != current.problem_categories
        || next.complaint_status != current.complaint_status;
    if values_changed {
        next.page_index = 0;
    }
    next
}

/// 필터 변경 결정표 적용
pub fn apply(current: &FilterState, change: FilterChange) -> ApplyOutcome {
    let change = change.normalized();
    let targets_kind = change.key() == DimensionKey::Filter;
    let cleared = change.is_cleared();

    let outcome = if targets_kind && cleared {
        ApplyOutcome {
            state: FilterState::new(),
            refetch: true,
            rule: ApplyRule::Reset,
        }
    } else if !targets_kind && cleared {
        ApplyOutcome {
            state: with_field(current, change),
            refetch: true,
            rule: ApplyRule::ClearField,
        }
    } else if let FilterChange::Kind(kind) = change {
        let state = FilterState::with_kind(kind);
        if kind.is_range() {
            let range_complete = match kind {
                FilterKind::TimeRange => state.time_range.is_complete(),
                _ => state.date_range.is_complete(),
            };
            ApplyOutcome {
                state,
                refetch: range_complete,
                rule: ApplyRule::SwitchRangeKind,
            }
        } else {
            ApplyOutcome {
                state,
                refetch: false,
                rule: ApplyRule::SwitchKind,
            }
        }
    } else if matches!(change, FilterChange::TimeRange(_) | FilterChange::DateRange(_)) {
        let settled = match &change {
            FilterChange::TimeRange(r) => r.is_complete() || r.is_empty(),
            FilterChange::DateRange(r) => r.is_complete() || r.is_empty(),
            _ => false,
        };
        ApplyOutcome {
            state: with_field(current, change),
            refetch: settled,
            rule: ApplyRule::RangeUpdate,
        }
    } else {
        ApplyOutcome {
            state: with_field(current, change),
            refetch: true,
            rule: ApplyRule::Update,
        }
    };

    debug!(
        "필터 변경 적용: rule={:?}, kind={}, refetch={}",
        outcome.rule, outcome.state.active_kind, outcome.refetch
    );
    outcome
}

/// 시간대 시작 선택기 변경 (시작이 종료보다 뒤면 종료를 비움)
pub fn set_time_start(current: &FilterState, start: Option<DateTime<Utc>>) -> ApplyOutcome {
    apply(current, FilterChange::TimeRange(current.time_range.with_start(start)))
}

/// 시간대 종료 선택기 변경 (시작보다 앞선 종료는 비움)
pub fn set_time_end(current: &FilterState, end: Option<DateTime<Utc>>) -> ApplyOutcome {
    apply(current, FilterChange::TimeRange(current.time_range.with_end(end)))
}

/// 날짜 시작 선택기 변경
pub fn set_date_start(current: &FilterState, start: Option<NaiveDate>) -> ApplyOutcome {
    apply(current, FilterChange::DateRange(current.date_range.with_start(start)))
}

/// 날짜 종료 선택기 변경
pub fn set_date_end(current: &FilterState, end: Option<NaiveDate>) -> ApplyOutcome {
    apply(current, FilterChange::DateRange(current.date_range.with_end(end)))
}

// ============================================================
// URL 인코딩/디코딩
// ============================================================

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(value).map(|dt| dt.date_naive()))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 쿼리 문자열에서 필터 상태 복원
///
/// 알 수 없는 키, 어휘 밖의 값, 잘못된 일시는 모두 "값 없음"으로 처리한다.
pub fn init_from_location(query: &str) -> FilterState {
    let query = query.trim_start_matches('?');
    let mut state = FilterState::new();
    let mut kind: Option<FilterKind> = None;
    let mut start_time = None;
    let mut end_time = None;
    let mut start_date = None;
    let mut end_date = None;
    let mut status: Option<Option<ComplaintStatus>> = None;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        // 단일 값 키는 첫 번째 값만 사용
        match key.as_ref() {
            keys::FILTER if kind.is_none() => {
                kind = Some(FilterKind::from_key(&value).unwrap_or_default());
            }
            keys::START_TIME if start_time.is_none() => start_time = Some(parse_datetime(&value)),
            keys::END_TIME if end_time.is_none() => end_time = Some(parse_datetime(&value)),
            keys::START_DATE if start_date.is_none() => start_date = Some(parse_date(&value)),
            keys::END_DATE if end_date.is_none() => end_date = Some(parse_date(&value)),
            keys::COMPLAINT_STATUS if status.is_none() => {
                status = Some(value.parse().ok());
            }
            keys::BEAT_NUMBER => {
                if !value.trim().is_empty() {
                    state.beat_numbers.insert(value.into_owned());
                }
            }
            keys::PROBLEM_CATEGORY => {
                if let Ok(category) = value.parse::<ProblemCategory>() {
                    state.problem_categories.insert(category);
                }
            }
            _ => {}
        }
    }

    state.active_kind = kind.unwrap_or_default();
    state.time_range = TimeRange::clamped(start_time.flatten(), end_time.flatten());
    state.date_range = DateRange::clamped(start_date.flatten(), end_date.flatten());
    state.complaint_status = status.flatten();
    state
}

/// 필터 상태를 공유 가능한 쿼리 문자열로 인코딩 (`?` 없음)
///
/// 비어 있는 값은 생략하고, 다중 값은 키를 반복한다. 페이지 인덱스는 포함하지 않는다.
pub fn serialize_to_location(state: &FilterState) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());

    if state.active_kind != FilterKind::None {
        query.append_pair(keys::FILTER, state.active_kind.as_key());
    }
    if let Some(start) = &state.time_range.start {
        query.append_pair(keys::START_TIME, &format_datetime(start));
    }
    if let Some(end) = &state.time_range.end {
        query.append_pair(keys::END_TIME, &format_datetime(end));
    }
    for beat in &state.beat_numbers {
        query.append_pair(keys::BEAT_NUMBER, beat);
    }
    for category in &state.problem_categories {
        query.append_pair(keys::PROBLEM_CATEGORY, category.as_str());
    }
    if let Some(status) = &state.complaint_status {
        query.append_pair(keys::COMPLAINT_STATUS, status.as_str());
    }
    if let Some(start) = &state.date_range.start {
        query.append_pair(keys::START_DATE, &format_date(start));
    }
    if let Some(end) = &state.date_range.end {
        query.append_pair(keys::END_DATE, &format_date(end));
    }

    query.finish()
}

/// 일시를 현지 표시용 `HH:MM:SS`로 포맷
///
/// 검색 페이로드에는 사용하지 않는다. 시각은 ISO 일시 그대로 전송된다.
pub fn format_time_of_day(dt: &DateTime<Utc>) -> String {
    dt.format("%H:%M:%S").to_string()
}

/// 검색 요청 페이로드 생성 (`page`는 1부터 시작)
pub fn build_search_payload(state: &FilterState, page_index: usize) -> SearchRequest {
    let iso = |dt: &Option<DateTime<Utc>>| {
        dt.map(|d| d.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default()
    };
    let ymd = |d: &Option<NaiveDate>| d.as_ref().map(format_date).unwrap_or_default();

    SearchRequest {
        table_name: COMPLAINTS_TABLE.to_string(),
        beat_number: state.beat_numbers.iter().cloned().collect(),
        complaint_id: Vec::new(),
        problem_category: state
            .problem_categories
            .iter()
            .map(|c| c.as_str().to_string())
            .collect(),
        start_date: ymd(&state.date_range.start),
        end_date: ymd(&state.date_range.end),
        start_time: iso(&state.time_range.start),
        end_time: iso(&state.time_range.end),
        complaint_status: StatusField::from_status(state.complaint_status),
        page: page_index as i64 + 1,
    }
}
