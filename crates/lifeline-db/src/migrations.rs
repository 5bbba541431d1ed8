use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub const LATEST_VERSION: i64 = 1;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial collections)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id           TEXT PRIMARY KEY,
                email        TEXT NOT NULL UNIQUE,
                name         TEXT,
                avatar       TEXT,
                blood_group  TEXT,
                district_id  TEXT,
                upazila      TEXT,
                role         TEXT NOT NULL DEFAULT 'donor',
                status       TEXT NOT NULL DEFAULT 'active',
                created_at   TEXT NOT NULL,
                last_login   TEXT NOT NULL
            );

            CREATE TABLE donation_requests (
                id                  TEXT PRIMARY KEY,
                requester_name      TEXT,
                requester_email     TEXT NOT NULL,
                recipient_name      TEXT,
                recipient_district  TEXT,
                recipient_upazila   TEXT,
                hospital_name       TEXT,
                full_address        TEXT,
                blood_group         TEXT,
                donation_date       TEXT,
                donation_time       TEXT,
                request_message     TEXT,
                donation_status     TEXT NOT NULL DEFAULT 'pending',
                donor_name          TEXT,
                donor_email         TEXT,
                created_at          TEXT NOT NULL
            );

            CREATE INDEX idx_requests_requester
                ON donation_requests(requester_email);

            CREATE TABLE blogs (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                content     TEXT NOT NULL,
                thumbnail   TEXT,
                status      TEXT NOT NULL DEFAULT 'draft',
                created_at  TEXT NOT NULL
            );

            CREATE TABLE funds (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                email       TEXT NOT NULL,
                amount      REAL NOT NULL,
                status      TEXT NOT NULL DEFAULT 'success',
                created_at  TEXT NOT NULL
            );

            CREATE TABLE contact_messages (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                email       TEXT NOT NULL,
                contact     TEXT NOT NULL,
                message     TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
