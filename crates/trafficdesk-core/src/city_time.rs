//! 시 현지 시각 변환.
//!
//! 민원 레코드의 날짜/시각은 시 현지 고정 오프셋(UTC-7, 일광절약 없음) 기준으로 저장된다.
//! 클라이언트는 ISO 일시(UTC)를 보내므로 저장·비교 전에 현지 날짜와 시각으로 나눈다.

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};

use crate::error::CoreError;

/// 시 현지 UTC 오프셋 (시간)
pub const CITY_UTC_OFFSET_HOURS: i32 = -7;

fn city_offset() -> FixedOffset {
    FixedOffset::east_opt(CITY_UTC_OFFSET_HOURS * 3600).expect("고정 오프셋은 ±24h 범위 안")
}

/// 현지 시각을 `HH:MM:SS` 문자열로 포맷 (마이크로초가 있으면 `.ffffff` 추가)
fn format_time(dt: &DateTime<FixedOffset>) -> String {
    let micros = dt.nanosecond() / 1_000;
    if micros == 0 {
        dt.format("%H:%M:%S").to_string()
    } else {
        format!("{}.{:06}", dt.format("%H:%M:%S"), micros)
    }
}

/// ISO 일시를 현지 일시로 변환
pub fn parse_to_city(field: &str, iso: &str) -> Result<DateTime<FixedOffset>, CoreError> {
    DateTime::parse_from_rfc3339(iso.trim())
        .map(|dt| dt.with_timezone(&city_offset()))
        .map_err(|e| CoreError::validation(field, format!("ISO-8601 일시가 아님 ({iso}): {e}")))
}

/// ISO 일시 → 현지 시각 문자열 (`HH:MM:SS`)
pub fn city_time_of_day(field: &str, iso: &str) -> Result<String, CoreError> {
    parse_to_city(field, iso).map(|dt| format_time(&dt))
}

/// ISO 일시 → (현지 날짜, 현지 시각 문자열). 빈 문자열이면 `None`.
pub fn split_city_date_time(
    field: &str,
    iso: &str,
) -> Result<Option<(NaiveDate, String)>, CoreError> {
    if iso.trim().is_empty() {
        return Ok(None);
    }
    let dt = parse_to_city(field, iso)?;
    Ok(Some((dt.date_naive(), format_time(&dt))))
}
