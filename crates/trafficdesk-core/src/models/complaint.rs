//! 민원 모델.
//!
//! 저장된 민원 레코드, 접수 양식, 속성 수정 요청, 비트 조회 결과.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// 저장된 민원 레코드 (와이어 형식 camelCase)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Complaint {
    /// 민원 ID (8자리 16진수)
    pub complaint_id: String,
    pub is_urgent_checked: bool,
    pub first_name: String,
    pub last_name: String,
    pub days_of_week: Vec<String>,
    /// 현지 시작 시각 (`HH:MM:SS`)
    pub start_time: String,
    /// 현지 종료 시각 (`HH:MM:SS`)
    pub end_time: String,
    /// 위치 입력 방식 (`address` / `intersection`)
    pub location: String,
    pub address_direction: String,
    pub address_street: String,
    pub address_zipcode: String,
    #[serde(rename = "intersection1Direction")]
    pub intersection1_direction: String,
    #[serde(rename = "intersection1Street")]
    pub intersection1_street: String,
    #[serde(rename = "intersection2Direction")]
    pub intersection2_direction: String,
    #[serde(rename = "intersection2Street")]
    pub intersection2_street: String,
    pub intersection_zipcode: String,
    pub problem_category: String,
    pub description: String,
    /// 알림 수신 여부 (`"yes"` / `"no"`, 미응답 시 빈 문자열)
    #[serde(deserialize_with = "alert_opt_in")]
    pub subscribe_to_alerts: String,
    pub email: String,
    pub phone: String,
    pub officers_notes: String,
    pub complaint_status: String,
    pub beat_number: String,
    /// 지오코딩 좌표 (x, y), 미확인 시 빈 문자열
    pub coordinates: (String, String),
    /// 접수 기준 날짜 (`YYYY-MM-DD`)
    pub date_of_complaint: String,
    pub start_date: String,
    pub end_date: String,
}

/// 알림 수신 응답 해석
///
/// 접수 양식은 `"yes"`/`"no"` 문자열을 보내지만 bool이나 `null`을 보내는 클라이언트도 있다.
fn alert_opt_in<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Flag(bool),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(answer)) => answer,
        Some(Raw::Flag(flag)) => alert_answer(flag).to_string(),
        None => String::new(),
    })
}

/// bool 응답 → 양식 문자열
pub fn alert_answer(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

impl Complaint {
    /// 알림 수신 동의 여부 (대소문자 무시)
    pub fn wants_alerts(&self) -> bool {
        self.subscribe_to_alerts.trim().eq_ignore_ascii_case("yes")
    }
}

/// 위치 입력 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationMode {
    Address,
    Intersection,
    #[default]
    #[serde(other)]
    Unspecified,
}

/// 민원 접수 양식
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewComplaint {
    pub is_urgent_checked: bool,
    pub first_name: String,
    pub last_name: String,
    pub days_of_week: Vec<String>,
    /// ISO 일시 (UTC) 또는 빈 문자열
    pub start_time: String,
    /// ISO 일시 (UTC) 또는 빈 문자열
    pub end_time: String,
    pub location: LocationMode,
    pub address_direction: String,
    pub address_street: String,
    pub address_zipcode: String,
    #[serde(rename = "intersection1Direction")]
    pub intersection1_direction: String,
    #[serde(rename = "intersection1Street")]
    pub intersection1_street: String,
    #[serde(rename = "intersection2Direction")]
    pub intersection2_direction: String,
    #[serde(rename = "intersection2Street")]
    pub intersection2_street: String,
    pub intersection_zipcode: String,
    pub problem_category: String,
    pub description: String,
    #[serde(deserialize_with = "alert_opt_in")]
    pub subscribe_to_alerts: String,
    pub email: String,
    pub phone: String,
    /// 접수 시 경찰 메모 (양식 필드명 `officersNote`)
    #[serde(rename = "officersNote")]
    pub officers_note: String,
}

impl NewComplaint {
    /// 지오코더에 보낼 위치 문자열 구성
    ///
    /// 주소: `방향 거리 우편번호 `, 교차로: `방향1 거리1 & 방향2 거리2 `.
    pub fn location_query(&self) -> String {
        let mut out = String::new();
        match self.location {
            LocationMode::Address => {
                for part in [
                    &self.address_direction,
                    &self.address_street,
                    &self.address_zipcode,
                ] {
                    out.push_str(part);
                    out.push(' ');
                }
            }
            LocationMode::Intersection => {
                for part in [&self.intersection1_direction, &self.intersection1_street] {
                    out.push_str(part);
                    out.push(' ');
                }
                out.push_str("& ");
                for part in [&self.intersection2_direction, &self.intersection2_street] {
                    out.push_str(part);
                    out.push(' ');
                }
            }
            LocationMode::Unspecified => {}
        }
        out
    }
}

/// 수정 가능한 민원 속성
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdatableAttribute {
    ComplaintStatus,
    OfficersNotes,
    ProblemCategory,
    BeatNumber,
    Description,
}

impl UpdatableAttribute {
    pub const ALL: [UpdatableAttribute; 5] = [
        UpdatableAttribute::ComplaintStatus,
        UpdatableAttribute::OfficersNotes,
        UpdatableAttribute::ProblemCategory,
        UpdatableAttribute::BeatNumber,
        UpdatableAttribute::Description,
    ];

    /// 와이어 속성명
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdatableAttribute::ComplaintStatus => "complaintStatus",
            UpdatableAttribute::OfficersNotes => "officersNotes",
            UpdatableAttribute::ProblemCategory => "problemCategory",
            UpdatableAttribute::BeatNumber => "beatNumber",
            UpdatableAttribute::Description => "description",
        }
    }

    /// 레코드의 해당 필드에 값 반영
    pub fn apply_to(&self, complaint: &mut Complaint, value: &str) {
        let field = match self {
            UpdatableAttribute::ComplaintStatus => &mut complaint.complaint_status,
            UpdatableAttribute::OfficersNotes => &mut complaint.officers_notes,
            UpdatableAttribute::ProblemCategory => &mut complaint.problem_category,
            UpdatableAttribute::BeatNumber => &mut complaint.beat_number,
            UpdatableAttribute::Description => &mut complaint.description,
        };
        *field = value.to_string();
    }
}

impl fmt::Display for UpdatableAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdatableAttribute {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| CoreError::validation("attribute", format!("수정할 수 없는 속성: {s}")))
    }
}

/// 민원 속성 수정 요청
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintUpdate {
    pub complaint_id: String,
    pub attribute: String,
    #[serde(default)]
    pub value: String,
}

/// 관리 엔드포인트 요청 — `isUpdate` 플래그로 접수/수정 구분
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagementRequest {
    Create(NewComplaint),
    Update(ComplaintUpdate),
}

impl ManagementRequest {
    /// JSON 본문 해석
    pub fn from_value(value: serde_json::Value) -> Result<Self, CoreError> {
        let is_update = value
            .get("isUpdate")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);

        if is_update {
            Ok(ManagementRequest::Update(serde_json::from_value(value)?))
        } else {
            Ok(ManagementRequest::Create(serde_json::from_value(value)?))
        }
    }
}

/// 지오코딩으로 확인한 비트와 좌표
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatMatch {
    pub beat_number: String,
    pub x: String,
    pub y: String,
}

/// 비트별 미처리(Open) 민원 수
pub type BeatOpenCases = BTreeMap<String, u64>;
