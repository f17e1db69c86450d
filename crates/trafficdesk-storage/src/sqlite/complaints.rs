//! 민원 레코드 스토리지 메서드.
//!
//! 저장, 단건 조회, 속성 수정, 비트별 Open 집계.

use rusqlite::types::ValueRef;
use rusqlite::{params, Row};
use tracing::debug;
use trafficdesk_core::error::CoreError;
use trafficdesk_core::models::complaint::{
    alert_answer, BeatOpenCases, Complaint, UpdatableAttribute,
};

use super::SqliteStorage;

/// SELECT 컬럼 목록 (`row_to_complaint` 순서와 일치)
pub(super) const COMPLAINT_COLUMNS: &str = "complaint_id, is_urgent_checked, first_name, last_name, \
     days_of_week, start_time, end_time, location, address_direction, address_street, \
     address_zipcode, intersection1_direction, intersection1_street, intersection2_direction, \
     intersection2_street, intersection_zipcode, problem_category, description, \
     subscribe_to_alerts, email, phone, officers_notes, complaint_status, beat_number, \
     coord_x, coord_y, date_of_complaint, start_date, end_date";

/// 알림 수신 컬럼 → 양식 문자열 (정수로 저장된 행은 yes/no로 변환)
fn alert_opt_in(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Integer(flag) => alert_answer(flag != 0).to_string(),
        ValueRef::Text(text) => String::from_utf8_lossy(text).into_owned(),
        _ => String::new(),
    }
}

/// 조회 행 → 민원 레코드
pub(super) fn row_to_complaint(row: &Row<'_>) -> rusqlite::Result<Complaint> {
    let days_json: String = row.get(4)?;
    Ok(Complaint {
        complaint_id: row.get(0)?,
        is_urgent_checked: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        days_of_week: serde_json::from_str(&days_json).unwrap_or_default(),
        start_time: row.get(5)?,
        end_time: row.get(6)?,
        location: row.get(7)?,
        address_direction: row.get(8)?,
        address_street: row.get(9)?,
        address_zipcode: row.get(10)?,
        intersection1_direction: row.get(11)?,
        intersection1_street: row.get(12)?,
        intersection2_direction: row.get(13)?,
        intersection2_street: row.get(14)?,
        intersection_zipcode: row.get(15)?,
        problem_category: row.get(16)?,
        description: row.get(17)?,
        subscribe_to_alerts: alert_opt_in(row.get_ref(18)?),
        email: row.get(19)?,
        phone: row.get(20)?,
        officers_notes: row.get(21)?,
        complaint_status: row.get(22)?,
        beat_number: row.get(23)?,
        coordinates: (row.get(24)?, row.get(25)?),
        date_of_complaint: row.get(26)?,
        start_date: row.get(27)?,
        end_date: row.get(28)?,
    })
}

/// 수정 가능한 속성 → 컬럼명
fn attribute_column(attribute: UpdatableAttribute) -> &'static str {
    match attribute {
        UpdatableAttribute::ComplaintStatus => "complaint_status",
        UpdatableAttribute::OfficersNotes => "officers_notes",
        UpdatableAttribute::ProblemCategory => "problem_category",
        UpdatableAttribute::BeatNumber => "beat_number",
        UpdatableAttribute::Description => "description",
    }
}

impl SqliteStorage {
    /// 민원 저장
    pub fn save_complaint(&self, c: &Complaint) -> Result<(), CoreError> {
        let days_json = serde_json::to_string(&c.days_of_week)?;
        let conn = self.lock()?;

        conn.execute(
            &format!(
                "INSERT INTO complaints ({COMPLAINT_COLUMNS}) VALUES \
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, \
                  ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29)"
            ),
            params![
                c.complaint_id,
                c.is_urgent_checked,
                c.first_name,
                c.last_name,
                days_json,
                c.start_time,
                c.end_time,
                c.location,
                c.address_direction,
                c.address_street,
                c.address_zipcode,
                c.intersection1_direction,
                c.intersection1_street,
                c.intersection2_direction,
                c.intersection2_street,
                c.intersection_zipcode,
                c.problem_category,
                c.description,
                c.subscribe_to_alerts,
                c.email,
                c.phone,
                c.officers_notes,
                c.complaint_status,
                c.beat_number,
                c.coordinates.0,
                c.coordinates.1,
                c.date_of_complaint,
                c.start_date,
                c.end_date,
            ],
        )
        .map_err(|e| CoreError::Internal(format!("민원 저장 실패: {e}")))?;

        debug!("민원 저장: id={}, beat={}", c.complaint_id, c.beat_number);
        Ok(())
    }

    /// 민원 ID 존재 여부
    pub fn has_complaint(&self, complaint_id: &str) -> Result<bool, CoreError> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM complaints WHERE complaint_id = ?1",
                params![complaint_id],
                |row| row.get(0),
            )
            .map_err(|e| CoreError::Internal(format!("민원 조회 실패: {e}")))?;
        Ok(count > 0)
    }

    /// 민원 단건 조회
    pub fn get_complaint(&self, complaint_id: &str) -> Result<Option<Complaint>, CoreError> {
        let conn = self.lock()?;
        let result = conn.query_row(
            &format!("SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE complaint_id = ?1"),
            params![complaint_id],
            row_to_complaint,
        );

        match result {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(CoreError::Internal(format!("민원 조회 실패: {e}"))),
        }
    }

    /// 단일 속성 수정 후 수정된 레코드 반환
    pub fn set_attribute(
        &self,
        complaint_id: &str,
        attribute: UpdatableAttribute,
        value: &str,
    ) -> Result<Complaint, CoreError> {
        let updated = {
            let conn = self.lock()?;
            conn.execute(
                &format!(
                    "UPDATE complaints SET {} = ?1 WHERE complaint_id = ?2",
                    attribute_column(attribute)
                ),
                params![value, complaint_id],
            )
            .map_err(|e| CoreError::Internal(format!("민원 수정 실패: {e}")))?
        };

        if updated == 0 {
            return Err(CoreError::not_found("Complaint", complaint_id));
        }
        debug!("민원 수정: id={complaint_id}, {attribute}={value}");

        self.get_complaint(complaint_id)?
            .ok_or_else(|| CoreError::not_found("Complaint", complaint_id))
    }

    /// 비트별 Open 민원 수 (민원이 있는 모든 비트 포함, Open 0건도 포함)
    pub fn count_open_by_beat(&self) -> Result<BeatOpenCases, CoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT beat_number, \
                        SUM(CASE WHEN complaint_status = 'Open' THEN 1 ELSE 0 END) \
                 FROM complaints GROUP BY beat_number",
            )
            .map_err(|e| CoreError::Internal(format!("쿼리 준비 실패: {e}")))?;

        let rows = stmt
            .query_map([], |row| {
                let beat: String = row.get(0)?;
                let open: i64 = row.get(1)?;
                Ok((beat, open.max(0) as u64))
            })
            .map_err(|e| CoreError::Internal(format!("쿼리 실행 실패: {e}")))?;

        let mut cases = BeatOpenCases::new();
        for row in rows {
            let (beat, open) =
                row.map_err(|e| CoreError::Internal(format!("행 읽기 실패: {e}")))?;
            cases.insert(beat, open);
        }
        Ok(cases)
    }
}
