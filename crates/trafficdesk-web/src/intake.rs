//! 민원 접수 서비스.
//!
//! 접수 양식을 저장 가능한 민원 레코드로 만든다.
//! ID 발급, 현지 날짜/시각 분리, 위치 문자열 구성, 비트 조회를 담당한다.

use std::sync::Arc;
use tracing::{debug, info, warn};
use trafficdesk_core::city_time::split_city_date_time;
use trafficdesk_core::error::CoreError;
use trafficdesk_core::models::complaint::{
    BeatMatch, Complaint, LocationMode, NewComplaint, UpdatableAttribute,
};
use trafficdesk_core::models::filter::ComplaintStatus;
use trafficdesk_core::ports::geocoder::BeatLocator;
use trafficdesk_core::ports::storage::ComplaintStore;
use uuid::Uuid;

/// ID 충돌 시 재발급 최대 횟수
const MAX_ID_ATTEMPTS: usize = 16;

/// 민원 ID 길이 (16진수 문자)
const COMPLAINT_ID_LEN: usize = 8;

fn location_label(mode: LocationMode) -> &'static str {
    match mode {
        LocationMode::Address => "address",
        LocationMode::Intersection => "intersection",
        LocationMode::Unspecified => "",
    }
}

/// 민원 접수/수정 서비스
pub struct ComplaintIntake {
    store: Arc<dyn ComplaintStore>,
    locator: Option<Arc<dyn BeatLocator>>,
}

impl ComplaintIntake {
    pub fn new(store: Arc<dyn ComplaintStore>, locator: Option<Arc<dyn BeatLocator>>) -> Self {
        Self { store, locator }
    }

    /// 저장소에 없는 8자리 ID 발급
    async fn issue_id(&self) -> Result<String, CoreError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let mut id = Uuid::new_v4().simple().to_string();
            id.truncate(COMPLAINT_ID_LEN);
            if !self.store.complaint_exists(&id).await? {
                return Ok(id);
            }
            debug!("민원 ID 충돌, 재발급: {id}");
        }
        Err(CoreError::Internal(format!(
            "민원 ID 발급 실패: {MAX_ID_ATTEMPTS}회 충돌"
        )))
    }

    /// 위치 문자열로 비트 조회. 지오코더 실패는 비트 없이 접수한다.
    async fn locate(&self, location: &str) -> Option<BeatMatch> {
        let locator = self.locator.as_ref()?;
        if location.trim().is_empty() {
            return None;
        }
        match locator.locate(location).await {
            Ok(found) => found,
            Err(e) => {
                warn!("비트 조회 실패, 비트 없이 접수: {e}");
                None
            }
        }
    }

    /// 민원 접수
    pub async fn create(&self, form: NewComplaint) -> Result<Complaint, CoreError> {
        let start = split_city_date_time("startTime", &form.start_time)?;
        let end = split_city_date_time("endTime", &form.end_time)?;
        let (start_date, start_time) = start
            .map(|(d, t)| (d.format("%Y-%m-%d").to_string(), t))
            .unwrap_or_default();
        let (end_date, end_time) = end
            .map(|(d, t)| (d.format("%Y-%m-%d").to_string(), t))
            .unwrap_or_default();

        let complaint_id = self.issue_id().await?;
        let beat = self.locate(&form.location_query()).await.unwrap_or_default();

        let complaint = Complaint {
            complaint_id,
            is_urgent_checked: form.is_urgent_checked,
            first_name: form.first_name,
            last_name: form.last_name,
            days_of_week: form.days_of_week,
            start_time,
            end_time,
            location: location_label(form.location).to_string(),
            address_direction: form.address_direction,
            address_street: form.address_street,
            address_zipcode: form.address_zipcode,
            intersection1_direction: form.intersection1_direction,
            intersection1_street: form.intersection1_street,
            intersection2_direction: form.intersection2_direction,
            intersection2_street: form.intersection2_street,
            intersection_zipcode: form.intersection_zipcode,
            problem_category: form.problem_category,
            description: form.description,
            subscribe_to_alerts: form.subscribe_to_alerts,
            email: form.email,
            phone: form.phone,
            officers_notes: form.officers_note,
            complaint_status: ComplaintStatus::Open.as_str().to_string(),
            beat_number: beat.beat_number,
            coordinates: (beat.x, beat.y),
            date_of_complaint: start_date.clone(),
            start_date,
            end_date,
        };

        self.store.insert_complaint(&complaint).await?;
        info!(
            "민원 접수: id={}, category={}, beat={}",
            complaint.complaint_id, complaint.problem_category, complaint.beat_number
        );
        Ok(complaint)
    }

    /// 단일 속성 수정
    pub async fn update(
        &self,
        complaint_id: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Complaint, CoreError> {
        let attribute: UpdatableAttribute = attribute.parse()?;
        let updated = self
            .store
            .update_attribute(complaint_id, attribute, value)
            .await?;
        info!("민원 수정: id={complaint_id}, {attribute}={value}");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use trafficdesk_storage::sqlite::SqliteStorage;

    struct FixedLocator {
        result: Result<Option<BeatMatch>, ()>,
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BeatLocator for FixedLocator {
        async fn locate(&self, location: &str) -> Result<Option<BeatMatch>, CoreError> {
            self.queries.lock().unwrap().push(location.to_string());
            self.result
                .clone()
                .map_err(|_| CoreError::Network("timeout".to_string()))
        }
    }

    fn locator(result: Result<Option<BeatMatch>, ()>) -> Arc<FixedLocator> {
        Arc::new(FixedLocator {
            result,
            queries: Mutex::new(Vec::new()),
        })
    }

    fn form() -> NewComplaint {
        NewComplaint {
            first_name: "Ana".to_string(),
            start_time: "2024-03-02T03:30:00.000Z".to_string(),
            end_time: "2024-03-02T05:00:00.000Z".to_string(),
            location: LocationMode::Intersection,
            intersection1_direction: "W".to_string(),
            intersection1_street: "Ray Rd".to_string(),
            intersection2_direction: "S".to_string(),
            intersection2_street: "Dobson Rd".to_string(),
            problem_category: "Racing".to_string(),
            officers_note: "seen twice".to_string(),
            ..Default::default()
        }
    }

    fn store() -> Arc<SqliteStorage> {
        Arc::new(SqliteStorage::open_in_memory("Complaints_table").unwrap())
    }

    #[tokio::test]
    async fn create_splits_city_time_and_resolves_beat() {
        let store = store();
        let found = locator(Ok(Some(BeatMatch {
            beat_number: "B9".to_string(),
            x: "-111.87".to_string(),
            y: "33.32".to_string(),
        })));
        let intake = ComplaintIntake::new(store.clone(), Some(found.clone()));

        let c = intake.create(form()).await.unwrap();
        assert_eq!(c.complaint_id.len(), 8);
        assert!(c.complaint_id.chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_eq!(c.start_date, "2024-03-01");
        assert_eq!(c.date_of_complaint, "2024-03-01");
        assert_eq!(c.start_time, "20:30:00");
        assert_eq!(c.end_time, "22:00:00");
        assert_eq!(c.complaint_status, "Open");
        assert_eq!(c.location, "intersection");
        assert_eq!(c.officers_notes, "seen twice");
        assert_eq!(c.beat_number, "B9");
        assert_eq!(c.coordinates, ("-111.87".to_string(), "33.32".to_string()));
        assert_eq!(
            found.queries.lock().unwrap().as_slice(),
            ["W Ray Rd & S Dobson Rd ".to_string()]
        );

        assert!(store.complaint_exists(&c.complaint_id).await.unwrap());
    }

    #[tokio::test]
    async fn geocoder_failure_still_records_complaint() {
        let intake = ComplaintIntake::new(store(), Some(locator(Err(()))));
        let c = intake.create(form()).await.unwrap();
        assert_eq!(c.beat_number, "");
        assert_eq!(c.coordinates, (String::new(), String::new()));
    }

    #[tokio::test]
    async fn blank_times_leave_dates_empty() {
        let intake = ComplaintIntake::new(store(), None);
        let c = intake
            .create(NewComplaint {
                start_time: String::new(),
                end_time: String::new(),
                ..form()
            })
            .await
            .unwrap();
        assert_eq!(c.start_date, "");
        assert_eq!(c.start_time, "");
        assert_eq!(c.end_date, "");
    }

    #[tokio::test]
    async fn malformed_time_is_rejected() {
        let intake = ComplaintIntake::new(store(), None);
        let err = intake
            .create(NewComplaint {
                start_time: "tomorrow".to_string(),
                ..form()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[tokio::test]
    async fn update_checks_allow_list() {
        let store = store();
        let intake = ComplaintIntake::new(store.clone(), None);
        let c = intake.create(form()).await.unwrap();

        let updated = intake
            .update(&c.complaint_id, "complaintStatus", "Red-Star")
            .await
            .unwrap();
        assert_eq!(updated.complaint_status, "Red-Star");

        let err = intake.update(&c.complaint_id, "email", "x@y.z").await.unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }
}
