//! 스키마 마이그레이션.
//!
//! 버전 기반 SQLite 스키마 관리.

use rusqlite::Connection;
use tracing::{debug, info};

/// 현재 스키마 버전
const CURRENT_VERSION: u32 = 2;

/// 스키마 마이그레이션 실행
pub fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current = get_version(conn)?;
    info!("현재 스키마 버전: {current}, 목표: {CURRENT_VERSION}");

    if current < 1 {
        migrate_v1(conn)?;
    }

    if current < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// 현재 스키마 버전 조회
pub fn get_version(conn: &Connection) -> Result<u32, rusqlite::Error> {
    let result: Result<u32, _> = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    );
    result.or(Ok(0))
}

/// V1: complaints 테이블 생성
fn migrate_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    debug!("마이그레이션 V1 실행: complaints 테이블");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS complaints (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            complaint_id TEXT NOT NULL UNIQUE,
            is_urgent_checked INTEGER NOT NULL DEFAULT 0,
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            days_of_week TEXT NOT NULL DEFAULT '[]',
            start_time TEXT NOT NULL DEFAULT '',
            end_time TEXT NOT NULL DEFAULT '',
            location TEXT NOT NULL DEFAULT '',
            address_direction TEXT NOT NULL DEFAULT '',
            address_street TEXT NOT NULL DEFAULT '',
            address_zipcode TEXT NOT NULL DEFAULT '',
            intersection1_direction TEXT NOT NULL DEFAULT '',
            intersection1_street TEXT NOT NULL DEFAULT '',
            intersection2_direction TEXT NOT NULL DEFAULT '',
            intersection2_street TEXT NOT NULL DEFAULT '',
            intersection_zipcode TEXT NOT NULL DEFAULT '',
            problem_category TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            subscribe_to_alerts TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL DEFAULT '',
            phone TEXT NOT NULL DEFAULT '',
            officers_notes TEXT NOT NULL DEFAULT '',
            complaint_status TEXT NOT NULL DEFAULT 'Open',
            beat_number TEXT NOT NULL DEFAULT '',
            coord_x TEXT NOT NULL DEFAULT '',
            coord_y TEXT NOT NULL DEFAULT '',
            date_of_complaint TEXT NOT NULL DEFAULT '',
            start_date TEXT NOT NULL DEFAULT '',
            end_date TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        INSERT INTO schema_version (version) VALUES (1);
        ",
    )?;

    info!("마이그레이션 V1 완료");
    Ok(())
}

/// V2: 필터 차원 인덱스
fn migrate_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    debug!("마이그레이션 V2 실행: 필터 인덱스");

    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_complaints_status ON complaints(complaint_status);
        CREATE INDEX IF NOT EXISTS idx_complaints_beat ON complaints(beat_number);
        CREATE INDEX IF NOT EXISTS idx_complaints_category ON complaints(problem_category);
        CREATE INDEX IF NOT EXISTS idx_complaints_start_date ON complaints(start_date);

        INSERT INTO schema_version (version) VALUES (2);
        ",
    )?;

    info!("마이그레이션 V2 완료");
    Ok(())
}
