//! 선택 민원 메일 모델.
//!
//! 목록에서 선택한 민원을 시 직원에게 메일로 보낸다. 수신자는 시 도메인으로 제한된다.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::error::CoreError;
use crate::models::complaint::Complaint;

/// 수신 허용 도메인
pub const ALLOWED_RECIPIENT_DOMAINS: [&str; 2] = ["chandleraz.gov", "chandlerazpd.gov"];

/// 메일 제목
pub const MAIL_SUBJECT: &str = "Complaint Collection";

/// 민원 구분선
const SEPARATOR_WIDTH: usize = 40;

/// 메일 발송 요청 (와이어 형식)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    /// 수신 주소
    pub send_to: String,
    /// 선택한 민원 레코드
    #[serde(default)]
    pub selected_complaints: Vec<Complaint>,
}

/// 발송할 메일
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// 메일 발송 응답 (`status`, `message`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailResponse {
    pub status: u16,
    pub message: String,
}

/// 수신 주소 검증
///
/// `local@domain` 형식이어야 하고 공백을 포함할 수 없다.
/// 도메인은 허용 목록과 대소문자 무시로 정확히 일치해야 한다.
pub fn validate_recipient(address: &str) -> Result<(), CoreError> {
    let invalid = || CoreError::validation("sendTo", "Invalid Email");

    if address.is_empty() || address.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = address.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let allowed = ALLOWED_RECIPIENT_DOMAINS
        .iter()
        .any(|d| domain.eq_ignore_ascii_case(d));
    if allowed {
        Ok(())
    } else {
        Err(invalid())
    }
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// 민원 한 건을 메일 본문 블록으로 포맷
pub fn format_complaint(c: &Complaint) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Complaint ID: {}", c.complaint_id);
    let _ = writeln!(out, "Name: {} {}", c.first_name, c.last_name);
    let _ = writeln!(out, "Description: {}", c.description);
    let _ = writeln!(out, "Status: {}", c.complaint_status);
    let _ = writeln!(out, "Date of Complaint: {}", c.date_of_complaint);
    let _ = writeln!(out, "Beat Number: {}", c.beat_number);
    let _ = writeln!(out, "Problem Category: {}", or_na(&c.problem_category));
    let _ = writeln!(out, "Is Urgent: {}", yes_no(c.is_urgent_checked));
    let _ = writeln!(
        out,
        "Address: {}, {} {}",
        or_na(&c.address_street),
        or_na(&c.address_direction),
        or_na(&c.address_zipcode)
    );
    let _ = writeln!(out, "Location Type: {}", or_na(&c.location));
    let _ = writeln!(out, "Days of Week: {}", c.days_of_week.join(", "));
    let _ = writeln!(out, "Start Date: {}", or_na(&c.start_date));
    let _ = writeln!(out, "End Date: {}", or_na(&c.end_date));
    let _ = writeln!(out, "Start Time: {}", or_na(&c.start_time));
    let _ = writeln!(out, "End Time: {}", or_na(&c.end_time));
    let _ = writeln!(
        out,
        "Coordinates: Latitude {}, Longitude {}",
        c.coordinates.1, c.coordinates.0
    );
    let _ = writeln!(out, "Officer's Notes: {}", or_na(&c.officers_notes));
    let _ = writeln!(out);
    let _ = writeln!(out, "Intersection Details:");
    let _ = writeln!(
        out,
        "    Intersection 1 Street: {}",
        or_na(&c.intersection1_street)
    );
    let _ = writeln!(
        out,
        "    Intersection 1 Direction: {}",
        or_na(&c.intersection1_direction)
    );
    let _ = writeln!(
        out,
        "    Intersection 2 Street: {}",
        or_na(&c.intersection2_street)
    );
    let _ = writeln!(
        out,
        "    Intersection 2 Direction: {}",
        or_na(&c.intersection2_direction)
    );
    let _ = writeln!(
        out,
        "    Intersection Zipcode: {}",
        or_na(&c.intersection_zipcode)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Subscribe to Alerts: {}", yes_no(c.wants_alerts()));
    let _ = writeln!(out);
    out.push_str(&"=".repeat(SEPARATOR_WIDTH));
    out.push('\n');
    out
}

impl EmailRequest {
    /// 수신자와 선택 민원을 검증하고 발송할 메일을 구성
    pub fn compose(&self) -> Result<OutgoingMail, CoreError> {
        validate_recipient(&self.send_to)?;
        if self.selected_complaints.is_empty() {
            return Err(CoreError::validation(
                "selectedComplaints",
                "선택된 민원이 없습니다",
            ));
        }

        let body = self
            .selected_complaints
            .iter()
            .map(format_complaint)
            .collect::<Vec<_>>()
            .join("\n");

        Ok(OutgoingMail {
            to: self.send_to.clone(),
            subject: MAIL_SUBJECT.to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complaint(id: &str) -> Complaint {
        Complaint {
            complaint_id: id.to_string(),
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            complaint_status: "Open".to_string(),
            beat_number: "B7".to_string(),
            subscribe_to_alerts: "yes".to_string(),
            days_of_week: vec!["Monday".to_string(), "Friday".to_string()],
            coordinates: ("-111.84".to_string(), "33.30".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn recipients_limited_to_city_domains() {
        assert!(validate_recipient("officer@chandleraz.gov").is_ok());
        assert!(validate_recipient("sgt.ray@chandlerazpd.gov").is_ok());
        assert!(validate_recipient("Officer@ChandlerAZ.gov").is_ok());

        for bad in [
            "",
            "officer@gmail.com",
            "officer@chandleraz.gov.example.com",
            "officer@mail.chandleraz.gov",
            "@chandleraz.gov",
            "of ficer@chandleraz.gov",
            "a@b@chandleraz.gov",
            "chandleraz.gov",
        ] {
            let err = validate_recipient(bad).unwrap_err();
            assert!(
                matches!(err, CoreError::Validation { ref message, .. } if message == "Invalid Email"),
                "{bad}"
            );
        }
    }

    #[test]
    fn complaint_block_lists_fields() {
        let text = format_complaint(&complaint("ab12cd34"));
        assert!(text.starts_with("Complaint ID: ab12cd34\n"));
        assert!(text.contains("Name: Ana Lopez\n"));
        assert!(text.contains("Problem Category: N/A\n"));
        assert!(text.contains("Is Urgent: No\n"));
        assert!(text.contains("Days of Week: Monday, Friday\n"));
        assert!(text.contains("Coordinates: Latitude 33.30, Longitude -111.84\n"));
        assert!(text.contains("Subscribe to Alerts: Yes\n"));
        assert!(text.ends_with(&format!("{}\n", "=".repeat(40))));
    }

    #[test]
    fn compose_joins_selected_complaints() {
        let request = EmailRequest {
            send_to: "officer@chandleraz.gov".to_string(),
            selected_complaints: vec![complaint("ab12cd34"), complaint("ef56ab78")],
        };
        let mail = request.compose().unwrap();
        assert_eq!(mail.to, "officer@chandleraz.gov");
        assert_eq!(mail.subject, "Complaint Collection");
        assert_eq!(mail.body.matches("Complaint ID:").count(), 2);
        assert!(mail.body.contains("ef56ab78"));
    }

    #[test]
    fn compose_requires_selection() {
        let request = EmailRequest {
            send_to: "officer@chandleraz.gov".to_string(),
            selected_complaints: vec![],
        };
        assert!(matches!(
            request.compose(),
            Err(CoreError::Validation { ref field, .. }) if field == "selectedComplaints"
        ));
    }

    #[test]
    fn request_wire_names() {
        let request: EmailRequest = serde_json::from_str(
            r#"{"sendTo":"officer@chandleraz.gov","selectedComplaints":[{"complaintId":"ab12cd34","subscribeToAlerts":"no"}]}"#,
        )
        .unwrap();
        assert_eq!(request.selected_complaints[0].complaint_id, "ab12cd34");
        assert_eq!(request.selected_complaints[0].subscribe_to_alerts, "no");
    }
}
