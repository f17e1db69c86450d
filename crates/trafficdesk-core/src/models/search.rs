//! 민원 검색 계약.
//!
//! 검색 엔드포인트(`PUT /db-filter-query-api`)의 요청/응답 본문.
//! 필드명은 와이어 형식(camelCase)을 그대로 따른다.

use serde::{Deserialize, Serialize};

use super::complaint::Complaint;
use super::filter::ComplaintStatus;

/// 검색 대상 테이블 식별자
pub const COMPLAINTS_TABLE: &str = "Complaints_table";

/// 한 페이지당 민원 수
pub const PAGE_SIZE: usize = 10;

/// 결과 없음 / 페이지 범위 초과를 나타내는 페이지 값
pub const NO_PAGE: i64 = -1;

/// 민원 상태 필드 — 단일 문자열 또는 목록
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusField {
    One(String),
    Many(Vec<String>),
}

impl Default for StatusField {
    fn default() -> Self {
        StatusField::Many(Vec::new())
    }
}

impl StatusField {
    /// 필터 상태 값에서 생성. 비어 있으면 `[]`.
    pub fn from_status(status: Option<ComplaintStatus>) -> Self {
        match status {
            Some(s) => StatusField::One(s.as_str().to_string()),
            None => StatusField::Many(Vec::new()),
        }
    }

    /// 공백 값을 제외한 상태 목록
    pub fn values(&self) -> Vec<&str> {
        match self {
            StatusField::One(s) => [s.as_str()]
                .into_iter()
                .filter(|s| !s.trim().is_empty())
                .collect(),
            StatusField::Many(list) => list
                .iter()
                .map(String::as_str)
                .filter(|s| !s.trim().is_empty())
                .collect(),
        }
    }
}

/// 검색 요청 본문
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// 테이블 식별자
    pub table_name: String,
    /// 비트 번호 목록 (OR)
    #[serde(default)]
    pub beat_number: Vec<String>,
    /// 민원 ID 목록 (OR)
    #[serde(default)]
    pub complaint_id: Vec<String>,
    /// 문제 유형 목록 (OR)
    #[serde(default)]
    pub problem_category: Vec<String>,
    /// 시작 날짜 `YYYY-MM-DD` 또는 빈 문자열
    #[serde(default)]
    pub start_date: String,
    /// 종료 날짜 `YYYY-MM-DD` 또는 빈 문자열
    #[serde(default)]
    pub end_date: String,
    /// 시작 시각 (ISO 일시) 또는 빈 문자열
    #[serde(default)]
    pub start_time: String,
    /// 종료 시각 (ISO 일시) 또는 빈 문자열
    #[serde(default)]
    pub end_time: String,
    /// 민원 상태
    #[serde(default)]
    pub complaint_status: StatusField,
    /// 1부터 시작하는 페이지 번호
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    NO_PAGE
}

impl SearchRequest {
    /// 필터 없는 요청 (지정 페이지)
    pub fn unfiltered(page: i64) -> Self {
        Self {
            table_name: COMPLAINTS_TABLE.to_string(),
            beat_number: Vec::new(),
            complaint_id: Vec::new(),
            problem_category: Vec::new(),
            start_date: String::new(),
            end_date: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            complaint_status: StatusField::default(),
            page,
        }
    }
}

/// 상태별 민원 수
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    #[serde(rename = "TotalOpen", default)]
    pub open: u64,
    #[serde(rename = "TotalClosed", default)]
    pub closed: u64,
    #[serde(rename = "TotalFollow-Up", default)]
    pub follow_up: u64,
    #[serde(rename = "TotalRed-Star", default)]
    pub red_star: u64,
}

impl StatusCounts {
    /// 상태별 카운트 조회
    pub fn get(&self, status: ComplaintStatus) -> u64 {
        match status {
            ComplaintStatus::Open => self.open,
            ComplaintStatus::Closed => self.closed,
            ComplaintStatus::FollowUp => self.follow_up,
            ComplaintStatus::RedStar => self.red_star,
        }
    }

    /// 상태별 카운트 설정
    pub fn set(&mut self, status: ComplaintStatus, count: u64) {
        match status {
            ComplaintStatus::Open => self.open = count,
            ComplaintStatus::Closed => self.closed = count,
            ComplaintStatus::FollowUp => self.follow_up = count,
            ComplaintStatus::RedStar => self.red_star = count,
        }
    }
}

/// 검색 응답 본문
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// 현재 페이지의 민원
    #[serde(default)]
    pub complaints_data: Vec<Complaint>,
    /// 1부터 시작하는 페이지, 결과 없음이면 -1
    pub page: i64,
    /// 필터에 일치한 전체 민원 수
    #[serde(default)]
    pub total_complaint: u64,
    /// 전체 페이지 수
    #[serde(default)]
    pub total_pages: u64,
    /// 상태별 민원 수
    #[serde(default)]
    pub total_status_counts: StatusCounts,
    /// 처리 상태 코드
    #[serde(default = "default_status")]
    pub status: u16,
    /// 처리 메시지
    #[serde(default)]
    pub message: String,
}

fn default_status() -> u16 {
    200
}

impl SearchResponse {
    /// 결과 없음 / 범위 초과 응답 여부
    pub fn is_no_page(&self) -> bool {
        self.page == NO_PAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_names() {
        let mut req = SearchRequest::unfiltered(1);
        req.beat_number = vec!["B100".to_string()];
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["tableName"], "Complaints_table");
        assert_eq!(json["beatNumber"][0], "B100");
        assert_eq!(json["complaintStatus"], serde_json::json!([]));
        assert_eq!(json["startDate"], "");
        assert_eq!(json["page"], 1);
    }

    #[test]
    fn status_field_accepts_string_or_list() {
        let one: StatusField = serde_json::from_str("\"Open\"").unwrap();
        assert_eq!(one.values(), vec!["Open"]);

        let many: StatusField = serde_json::from_str("[\"Open\", \"Closed\"]").unwrap();
        assert_eq!(many.values(), vec!["Open", "Closed"]);

        let blank: StatusField = serde_json::from_str("\"\"").unwrap();
        assert!(blank.values().is_empty());
    }

    #[test]
    fn response_parses_status_counts() {
        let body = r#"{
            "complaintsData": [],
            "page": -1,
            "totalComplaint": 0,
            "totalPages": 0,
            "totalStatusCounts": {"TotalOpen": 3, "TotalClosed": 1, "TotalFollow-Up": 0, "TotalRed-Star": 2}
        }"#;
        let resp: SearchResponse = serde_json::from_str(body).unwrap();

        assert!(resp.is_no_page());
        assert_eq!(resp.total_status_counts.get(ComplaintStatus::Open), 3);
        assert_eq!(resp.total_status_counts.get(ComplaintStatus::RedStar), 2);
        assert_eq!(resp.status, 200);
    }
}
