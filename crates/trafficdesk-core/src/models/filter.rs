//! 필터 상태 모델.
//!
//! 민원 목록 화면의 필터 차원(시간대, 날짜 범위, 비트 번호, 민원 상태, 문제 유형)과
//! 브라우징 세션당 하나 존재하는 `FilterState`를 정의한다.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// 현재 편집 중인 필터 차원 (한 번에 하나만 열린다)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    /// 필터 없음
    #[default]
    None,
    /// 시간대
    TimeRange,
    /// 비트(순찰 구역) 번호
    BeatNumber,
    /// 날짜 범위
    DateRange,
    /// 민원 상태
    ComplaintStatus,
    /// 문제 유형
    ProblemCategory,
}

impl FilterKind {
    /// 선택 가능한 필터 차원 (None 제외)
    pub const SELECTABLE: [FilterKind; 5] = [
        FilterKind::TimeRange,
        FilterKind::BeatNumber,
        FilterKind::DateRange,
        FilterKind::ComplaintStatus,
        FilterKind::ProblemCategory,
    ];

    /// URL `filter` 파라미터 값. `None`은 빈 문자열.
    pub fn as_key(&self) -> &'static str {
        match self {
            FilterKind::None => "",
            FilterKind::TimeRange => "timeRange",
            FilterKind::BeatNumber => "beatNumber",
            FilterKind::DateRange => "dateRange",
            FilterKind::ComplaintStatus => "complaintStatus",
            FilterKind::ProblemCategory => "problemCategory",
        }
    }

    /// 화면 표시용 레이블
    pub fn label(&self) -> &'static str {
        match self {
            FilterKind::None => "",
            FilterKind::TimeRange => "Time Range",
            FilterKind::BeatNumber => "Beat Number",
            FilterKind::DateRange => "Date Range",
            FilterKind::ComplaintStatus => "Complaint Status",
            FilterKind::ProblemCategory => "Problem Category",
        }
    }

    /// URL 키에서 파싱. 알 수 없는 값은 `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::SELECTABLE.into_iter().find(|k| k.as_key() == key)
    }

    /// 범위형 차원 여부 (시간대, 날짜 범위)
    pub fn is_range(&self) -> bool {
        matches!(self, FilterKind::TimeRange | FilterKind::DateRange)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

/// 민원 상태 (닫힌 어휘)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComplaintStatus {
    Open,
    Closed,
    #[serde(rename = "Follow-Up")]
    FollowUp,
    #[serde(rename = "Red-Star")]
    RedStar,
}

impl ComplaintStatus {
    /// 전체 상태 목록 (집계 순서)
    pub const ALL: [ComplaintStatus; 4] = [
        ComplaintStatus::Open,
        ComplaintStatus::Closed,
        ComplaintStatus::FollowUp,
        ComplaintStatus::RedStar,
    ];

    /// 와이어 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Open => "Open",
            ComplaintStatus::Closed => "Closed",
            ComplaintStatus::FollowUp => "Follow-Up",
            ComplaintStatus::RedStar => "Red-Star",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| format!("알 수 없는 민원 상태: {s}"))
    }
}

/// 문제 유형 (닫힌 어휘)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProblemCategory {
    Speed,
    #[serde(rename = "Stop sign")]
    StopSign,
    #[serde(rename = "Red light")]
    RedLight,
    #[serde(rename = "School traffic complaint")]
    SchoolTraffic,
    Racing,
    #[serde(rename = "Reckless Driving")]
    RecklessDriving,
}

impl ProblemCategory {
    pub const ALL: [ProblemCategory; 6] = [
        ProblemCategory::Speed,
        ProblemCategory::StopSign,
        ProblemCategory::RedLight,
        ProblemCategory::SchoolTraffic,
        ProblemCategory::Racing,
        ProblemCategory::RecklessDriving,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemCategory::Speed => "Speed",
            ProblemCategory::StopSign => "Stop sign",
            ProblemCategory::RedLight => "Red light",
            ProblemCategory::SchoolTraffic => "School traffic complaint",
            ProblemCategory::Racing => "Racing",
            ProblemCategory::RecklessDriving => "Reckless Driving",
        }
    }
}

impl fmt::Display for ProblemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProblemCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("알 수 없는 문제 유형: {s}"))
    }
}

/// 시작/종료 쌍. 양쪽 모두 선택적이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range<T> {
    pub start: Option<T>,
    pub end: Option<T>,
}

impl<T> Default for Range<T> {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
        }
    }
}

impl<T: PartialOrd + Copy> Range<T> {
    /// 범위 생성. 종료가 시작보다 앞서면 종료를 비운다 (역전 범위는 저장하지 않음).
    pub fn clamped(start: Option<T>, end: Option<T>) -> Self {
        let end = match (start, end) {
            (Some(s), Some(e)) if e < s => None,
            _ => end,
        };
        Self { start, end }
    }

    /// 양쪽 모두 설정됨
    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// 양쪽 모두 비어 있음
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// 시작값 변경. 새 시작이 기존 종료보다 뒤면 종료를 비운다.
    pub fn with_start(&self, start: Option<T>) -> Self {
        let end = match (start, self.end) {
            (Some(s), Some(e)) if s > e => None,
            _ => self.end,
        };
        Self { start, end }
    }

    /// 종료값 변경. 시작보다 앞선 종료는 `None`으로 클램프된다.
    pub fn with_end(&self, end: Option<T>) -> Self {
        Self::clamped(self.start, end)
    }
}

/// 시간대 범위 (ISO 일시, 시각 부분만 의미를 가짐)
pub type TimeRange = Range<DateTime<Utc>>;

/// 날짜 범위
pub type DateRange = Range<NaiveDate>;

/// 필터 상태 — 브라우징 세션당 하나
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// 현재 열린 필터 차원
    pub active_kind: FilterKind,
    /// 시간대
    pub time_range: TimeRange,
    /// 날짜 범위
    pub date_range: DateRange,
    /// 비트 번호 (다중 값)
    pub beat_numbers: BTreeSet<String>,
    /// 문제 유형 (다중 값)
    pub problem_categories: BTreeSet<ProblemCategory>,
    /// 민원 상태 (단일 값)
    pub complaint_status: Option<ComplaintStatus>,
    /// 0부터 시작하는 페이지 인덱스 (URL에 포함되지 않음)
    pub page_index: usize,
}

impl FilterState {
    /// 빈 상태 (마운트 시점)
    pub fn new() -> Self {
        Self::default()
    }

    /// 활성 차원만 지정된 기본 상태
    pub fn with_kind(kind: FilterKind) -> Self {
        Self {
            active_kind: kind,
            ..Self::default()
        }
    }

    /// 모든 필터 차원 값이 비어 있는지
    pub fn has_no_values(&self) -> bool {
        self.time_range.is_empty()
            && self.date_range.is_empty()
            && self.beat_numbers.is_empty()
            && self.problem_categories.is_empty()
            && self.complaint_status.is_none()
    }
}
