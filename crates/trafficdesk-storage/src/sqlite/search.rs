//! 검색 요청 평가.
//!
//! 차원 내부는 OR(`IN`), 차원 사이는 AND. 상태별 집계는 필터 결과에 대해 계산하고
//! 결과는 10건 단위 페이지로 자른다.

use rusqlite::params_from_iter;
use tracing::debug;
use trafficdesk_core::city_time::city_time_of_day;
use trafficdesk_core::error::CoreError;
use trafficdesk_core::models::filter::ComplaintStatus;
use trafficdesk_core::models::search::{
    SearchRequest, SearchResponse, StatusCounts, NO_PAGE, PAGE_SIZE,
};

use super::complaints::{row_to_complaint, COMPLAINT_COLUMNS};
use super::SqliteStorage;

const FETCHED_MESSAGE: &str = "Complaints fetched successfully";
const OUT_OF_LIMIT_MESSAGE: &str = "Page out of limit";

/// WHERE 절 빌더 (위치 파라미터 `?`)
#[derive(Debug, Default)]
struct Filter {
    conditions: Vec<String>,
    params: Vec<String>,
}

impl Filter {
    fn push_in<'a, I>(&mut self, column: &str, values: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let values: Vec<&str> = values
            .into_iter()
            .filter(|v| !v.trim().is_empty())
            .collect();
        if values.is_empty() {
            return;
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        self.conditions.push(format!("{column} IN ({placeholders})"));
        self.params.extend(values.into_iter().map(str::to_string));
    }

    fn push_between(&mut self, column: &str, low: String, high: String) {
        self.conditions.push(format!("{column} BETWEEN ? AND ?"));
        self.params.push(low);
        self.params.push(high);
    }

    fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }
}

fn both_set(a: &str, b: &str) -> bool {
    !a.trim().is_empty() && !b.trim().is_empty()
}

/// 검색 요청 → 필터 조건
fn build_filter(request: &SearchRequest) -> Result<Filter, CoreError> {
    let mut filter = Filter::default();

    if both_set(&request.start_date, &request.end_date) {
        filter.push_between(
            "start_date",
            request.start_date.trim().to_string(),
            request.end_date.trim().to_string(),
        );
    }

    // 시각은 시 현지 시각으로 바꿔 저장된 시작 시각과 비교
    if both_set(&request.start_time, &request.end_time) {
        let low = city_time_of_day("startTime", &request.start_time)?;
        let high = city_time_of_day("endTime", &request.end_time)?;
        filter.push_between("start_time", low, high);
    }

    filter.push_in("beat_number", request.beat_number.iter().map(String::as_str));
    filter.push_in("complaint_id", request.complaint_id.iter().map(String::as_str));
    filter.push_in(
        "problem_category",
        request.problem_category.iter().map(String::as_str),
    );
    filter.push_in("complaint_status", request.complaint_status.values());

    Ok(filter)
}

impl SqliteStorage {
    /// 검색 요청 평가
    pub fn search_complaints(&self, request: &SearchRequest) -> Result<SearchResponse, CoreError> {
        if request.table_name != self.table_name {
            return Err(CoreError::not_found("Table", &request.table_name));
        }

        let filter = build_filter(request)?;
        let where_sql = filter.where_sql();
        let conn = self.lock()?;

        // 상태별 집계
        let mut counts = StatusCounts::default();
        let mut total: u64 = 0;
        {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT complaint_status, COUNT(*) FROM complaints{where_sql} \
                     GROUP BY complaint_status"
                ))
                .map_err(|e| CoreError::Internal(format!("쿼리 준비 실패: {e}")))?;
            let rows = stmt
                .query_map(params_from_iter(filter.params.iter()), |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                })
                .map_err(|e| CoreError::Internal(format!("쿼리 실행 실패: {e}")))?;

            for row in rows {
                let (status, count) =
                    row.map_err(|e| CoreError::Internal(format!("행 읽기 실패: {e}")))?;
                let count = count.max(0) as u64;
                total += count;
                if let Ok(status) = status.parse::<ComplaintStatus>() {
                    counts.set(status, count);
                }
            }
        }

        let page_size = PAGE_SIZE as u64;
        let total_pages = total.div_ceil(page_size);
        let in_range = request.page >= 1 && (request.page as u64) <= total_pages;

        let (complaints_data, page, message) = if in_range {
            let offset = (request.page as u64 - 1) * page_size;
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {COMPLAINT_COLUMNS} FROM complaints{where_sql} \
                     ORDER BY id LIMIT {page_size} OFFSET {offset}"
                ))
                .map_err(|e| CoreError::Internal(format!("쿼리 준비 실패: {e}")))?;
            let complaints = stmt
                .query_map(params_from_iter(filter.params.iter()), row_to_complaint)
                .map_err(|e| CoreError::Internal(format!("쿼리 실행 실패: {e}")))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| CoreError::Internal(format!("행 읽기 실패: {e}")))?;
            (complaints, request.page, FETCHED_MESSAGE)
        } else {
            (Vec::new(), NO_PAGE, OUT_OF_LIMIT_MESSAGE)
        };

        debug!(
            "검색 평가: 조건 {}개, 전체 {total}건, page={page}/{total_pages}",
            filter.conditions.len()
        );

        Ok(SearchResponse {
            complaints_data,
            page,
            total_complaint: total,
            total_pages,
            total_status_counts: counts,
            status: 200,
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::complaint;
    use super::*;
    use trafficdesk_core::models::search::StatusField;

    fn seeded() -> SqliteStorage {
        let storage = SqliteStorage::open_in_memory("Complaints_table").unwrap();
        let rows = [
            ("00000001", "B1", "Speed", "Open", "2024-05-01", "07:30:00"),
            ("00000002", "B1", "Racing", "Closed", "2024-05-02", "08:15:00"),
            ("00000003", "B2", "Speed", "Open", "2024-05-03", "12:00:00"),
            ("00000004", "B3", "Red light", "Follow-Up", "2024-05-04", "18:45:00"),
            ("00000005", "B2", "Speed", "Red-Star", "2024-05-10", "08:30:00"),
        ];
        for (id, beat, category, status, date, time) in rows {
            let mut c = complaint(id, beat, category, status);
            c.start_date = date.to_string();
            c.start_time = time.to_string();
            storage.save_complaint(&c).unwrap();
        }
        storage
    }

    fn ids(resp: &SearchResponse) -> Vec<&str> {
        resp.complaints_data
            .iter()
            .map(|c| c.complaint_id.as_str())
            .collect()
    }

    #[test]
    fn unfiltered_counts_everything() {
        let resp = seeded().search_complaints(&SearchRequest::unfiltered(1)).unwrap();
        assert_eq!(resp.total_complaint, 5);
        assert_eq!(resp.total_pages, 1);
        assert_eq!(resp.page, 1);
        assert_eq!(resp.total_status_counts.open, 2);
        assert_eq!(resp.total_status_counts.closed, 1);
        assert_eq!(resp.total_status_counts.follow_up, 1);
        assert_eq!(resp.total_status_counts.red_star, 1);
        assert_eq!(resp.message, "Complaints fetched successfully");
    }

    #[test]
    fn lists_are_or_within_and_across() {
        let mut req = SearchRequest::unfiltered(1);
        req.beat_number = vec!["B1".to_string(), "B2".to_string()];
        req.problem_category = vec!["Speed".to_string()];

        let resp = seeded().search_complaints(&req).unwrap();
        assert_eq!(ids(&resp), vec!["00000001", "00000003", "00000005"]);
        assert_eq!(resp.total_status_counts.open, 2);
        assert_eq!(resp.total_status_counts.red_star, 1);
        assert_eq!(resp.total_status_counts.closed, 0);
    }

    #[test]
    fn status_filter_counts_only_that_status() {
        let mut req = SearchRequest::unfiltered(1);
        req.complaint_status = StatusField::One("Open".to_string());

        let resp = seeded().search_complaints(&req).unwrap();
        assert_eq!(resp.total_complaint, 2);
        assert_eq!(resp.total_status_counts.open, 2);
        assert_eq!(resp.total_status_counts.closed, 0);
    }

    #[test]
    fn date_range_requires_both_ends() {
        let storage = seeded();
        let mut req = SearchRequest::unfiltered(1);
        req.start_date = "2024-05-02".to_string();
        req.end_date = "2024-05-04".to_string();
        assert_eq!(
            ids(&storage.search_complaints(&req).unwrap()),
            vec!["00000002", "00000003", "00000004"]
        );

        req.end_date = String::new();
        assert_eq!(storage.search_complaints(&req).unwrap().total_complaint, 5);
    }

    #[test]
    fn time_range_compares_city_local_time() {
        // 14:00Z–15:30Z → 현지 07:00–08:30
        let mut req = SearchRequest::unfiltered(1);
        req.start_time = "2024-05-01T14:00:00.000Z".to_string();
        req.end_time = "2024-05-01T15:30:00.000Z".to_string();

        let resp = seeded().search_complaints(&req).unwrap();
        assert_eq!(ids(&resp), vec!["00000001", "00000002", "00000005"]);
    }

    #[test]
    fn malformed_time_is_validation_error() {
        let mut req = SearchRequest::unfiltered(1);
        req.start_time = "morning".to_string();
        req.end_time = "2024-05-01T15:30:00.000Z".to_string();
        let err = seeded().search_complaints(&req).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn pagination_and_out_of_range() {
        let storage = SqliteStorage::open_in_memory("Complaints_table").unwrap();
        for i in 0..23 {
            storage
                .save_complaint(&complaint(&format!("{i:08x}"), "B1", "Speed", "Open"))
                .unwrap();
        }

        let third = storage.search_complaints(&SearchRequest::unfiltered(3)).unwrap();
        assert_eq!(third.total_pages, 3);
        assert_eq!(third.complaints_data.len(), 3);
        assert_eq!(third.complaints_data[0].complaint_id, format!("{:08x}", 20));

        for page in [0, 4, -1] {
            let resp = storage.search_complaints(&SearchRequest::unfiltered(page)).unwrap();
            assert_eq!(resp.page, -1);
            assert!(resp.complaints_data.is_empty());
            assert_eq!(resp.total_complaint, 23);
            assert_eq!(resp.message, "Page out of limit");
        }
    }

    #[test]
    fn empty_result_is_no_page() {
        let mut req = SearchRequest::unfiltered(1);
        req.beat_number = vec!["B99".to_string()];
        let resp = seeded().search_complaints(&req).unwrap();
        assert_eq!(resp.page, -1);
        assert_eq!(resp.total_pages, 0);
    }

    #[test]
    fn unknown_table_is_not_found() {
        let mut req = SearchRequest::unfiltered(1);
        req.table_name = "Other_table".to_string();
        let err = seeded().search_complaints(&req).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { ref resource_type, .. } if resource_type == "Table"));
    }
}
