use anyhow::{Result, ensure};
use rusqlite::Row;

use lifeline_types::api::NewFund;
use lifeline_types::models::Fund;

use crate::{Database, now, parse_timestamp, timestamp};

const FUND_SUCCESS: &str = "success";

impl Database {
    pub fn insert_fund(&self, id: &str, fund: &NewFund) -> Result<Fund> {
        ensure!(
            fund.amount.is_finite() && fund.amount > 0.0,
            "fund amount must be positive, got {}",
            fund.amount
        );

        let record = Fund {
            id: id.to_string(),
            name: fund.name.clone(),
            email: fund.email.clone(),
            amount: fund.amount,
            status: FUND_SUCCESS.to_string(),
            created_at: now(),
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO funds (id, name, email, amount, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    record.id,
                    record.name,
                    record.email,
                    record.amount,
                    record.status,
                    timestamp(&record.created_at),
                ],
            )?;
            Ok(())
        })?;

        Ok(record)
    }

    pub fn list_funds(&self) -> Result<Vec<Fund>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, email, amount, status, created_at FROM funds ORDER BY rowid DESC",
            )?;
            let rows = stmt.query_map([], map_fund)?.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    pub fn total_funding(&self) -> Result<f64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COALESCE(SUM(amount), 0.0) FROM funds", [], |r| r.get(0))?)
        })
    }
}

fn map_fund(row: &Row<'_>) -> rusqlite::Result<Fund> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(5)?;
    Ok(Fund {
        name: row.get(1)?,
        email: row.get(2)?,
        amount: row.get(3)?,
        status: row.get(4)?,
        created_at: parse_timestamp(&created_at, &id),
        id,
    })
}
