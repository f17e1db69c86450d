//! 비트 지오코더 클라이언트.
//!
//! `BeatLocator` 포트 구현. 주소/교차로 문자열을 `findAddressCandidates`에 보내고
//! 후보 중 순찰 비트와 좌표를 고른다.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use trafficdesk_core::error::CoreError;
use trafficdesk_core::models::complaint::BeatMatch;
use trafficdesk_core::ports::geocoder::BeatLocator;

use crate::http_client::check_response;

/// 요청 출력 필드
const OUT_FIELDS: &str = "Shape, Match_addr, Score, Loc_name, City, PoliceBeat";

/// 좌표계 (WGS84)
const OUT_SR: &str = "4326";

#[derive(Debug, Deserialize)]
struct CandidatesResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    score: f64,
    #[serde(default)]
    location: CandidateLocation,
    #[serde(default)]
    attributes: CandidateAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateLocation {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateAttributes {
    #[serde(rename = "PoliceBeat", default)]
    police_beat: String,
}

impl Candidate {
    fn to_match(&self) -> BeatMatch {
        BeatMatch {
            beat_number: self.attributes.police_beat.clone(),
            x: self.location.x.to_string(),
            y: self.location.y.to_string(),
        }
    }
}

/// 후보 선택
///
/// 첫 후보가 기준 점수를 넘어야 한다. 첫 후보의 비트가 비어 있고 두 번째 후보가
/// 비트를 가지며 기준을 넘으면 두 번째를 고른다.
fn pick_candidate(candidates: &[Candidate], min_score: f64) -> Option<BeatMatch> {
    let first = candidates.first()?;
    if first.score <= min_score {
        return None;
    }

    match candidates.get(1) {
        Some(second)
            if first.attributes.police_beat.is_empty()
                && !second.attributes.police_beat.is_empty()
                && second.score > min_score =>
        {
            Some(second.to_match())
        }
        _ => Some(first.to_match()),
    }
}

/// 지오코더 클라이언트 — `BeatLocator` 포트 구현
pub struct GeocodeBeatClient {
    client: reqwest::Client,
    url: String,
    city: String,
    min_score: f64,
}

impl GeocodeBeatClient {
    pub fn new(url: &str, city: &str, min_score: f64, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
            city: city.to_string(),
            min_score,
        })
    }
}

#[async_trait]
impl BeatLocator for GeocodeBeatClient {
    async fn locate(&self, location: &str) -> Result<Option<BeatMatch>, CoreError> {
        debug!("비트 조회 요청: \"{location}\"");

        let form = [
            ("Address", location),
            ("City", self.city.as_str()),
            ("outFields", OUT_FIELDS),
            ("outSR", OUT_SR),
            ("f", "json"),
        ];
        let resp = self
            .client
            .post(&self.url)
            .form(&form)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("지오코딩 요청 실패: {e}")))?;

        let resp = check_response(resp).await?;
        let body: CandidatesResponse = resp
            .json()
            .await
            .map_err(|e| CoreError::Internal(format!("지오코딩 응답 파싱 실패: {e}")))?;

        let candidates = body.candidates.unwrap_or_default();
        let picked = pick_candidate(&candidates, self.min_score);
        match &picked {
            Some(m) => info!("비트 확인: {} ({}, {})", m.beat_number, m.x, m.y),
            None => debug!("비트 후보 없음: 후보 {}개", candidates.len()),
        }
        Ok(picked)
    }
}
