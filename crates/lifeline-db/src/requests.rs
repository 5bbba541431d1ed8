use anyhow::{Result, ensure};
use rusqlite::{OptionalExtension, Row};

use lifeline_types::api::{DonationRequestPatch, NewDonationRequest};
use lifeline_types::models::{DonationRequest, DonationStatus};

use crate::{Changed, Database, enum_column, now, parse_timestamp, timestamp};

const REQUEST_COLUMNS: &str = "id, requester_name, requester_email, recipient_name, recipient_district, \
     recipient_upazila, hospital_name, full_address, blood_group, donation_date, donation_time, \
     request_message, donation_status, donor_name, donor_email, created_at";

impl Database {
    /// Insert a new request owned by `requester_email`. The stored status is
    /// always `pending`. Whether the requester may create requests at all is
    /// decided by the caller.
    pub fn insert_request(
        &self,
        id: &str,
        requester_email: &str,
        req: &NewDonationRequest,
    ) -> Result<DonationRequest> {
        let created_at = now();
        let record = DonationRequest {
            id: id.to_string(),
            requester_name: req.requester_name.clone(),
            requester_email: requester_email.to_string(),
            recipient_name: req.recipient_name.clone(),
            recipient_district: req.recipient_district.clone(),
            recipient_upazila: req.recipient_upazila.clone(),
            hospital_name: req.hospital_name.clone(),
            full_address: req.full_address.clone(),
            blood_group: req.blood_group.clone(),
            donation_date: req.donation_date.clone(),
            donation_time: req.donation_time.clone(),
            request_message: req.request_message.clone(),
            donation_status: DonationStatus::Pending,
            donor_name: None,
            donor_email: None,
            created_at,
        };

        self.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO donation_requests ({REQUEST_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
                ),
                rusqlite::params![
                    record.id,
                    record.requester_name,
                    record.requester_email,
                    record.recipient_name,
                    record.recipient_district,
                    record.recipient_upazila,
                    record.hospital_name,
                    record.full_address,
                    record.blood_group,
                    record.donation_date,
                    record.donation_time,
                    record.request_message,
                    record.donation_status.as_str(),
                    record.donor_name,
                    record.donor_email,
                    timestamp(&record.created_at),
                ],
            )?;
            Ok(())
        })?;

        Ok(record)
    }

    pub fn get_request(&self, id: &str) -> Result<Option<DonationRequest>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {REQUEST_COLUMNS} FROM donation_requests WHERE id = ?1"))?;
            Ok(stmt.query_row([id], map_request).optional()?)
        })
    }

    /// Requests owned by `email`, newest first.
    pub fn list_requests_for_owner(
        &self,
        email: &str,
        status: Option<DonationStatus>,
    ) -> Result<Vec<DonationRequest>> {
        self.query_requests(Some(email), status, None)
    }

    /// The `limit` newest requests owned by `email`, any status.
    pub fn list_recent_requests_for_owner(&self, email: &str, limit: u32) -> Result<Vec<DonationRequest>> {
        self.query_requests(Some(email), None, Some(limit))
    }

    /// Every request, newest first. Role gating is the caller's job.
    pub fn list_requests(&self, status: Option<DonationStatus>) -> Result<Vec<DonationRequest>> {
        self.query_requests(None, status, None)
    }

    fn query_requests(
        &self,
        owner: Option<&str>,
        status: Option<DonationStatus>,
        limit: Option<u32>,
    ) -> Result<Vec<DonationRequest>> {
        self.with_conn(|conn| {
            let mut clauses: Vec<String> = Vec::new();
            let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

            if let Some(email) = owner {
                params.push(Box::new(email.to_string()));
                clauses.push(format!("requester_email = ?{}", params.len()));
            }
            if let Some(status) = status {
                params.push(Box::new(status.as_str()));
                clauses.push(format!("donation_status = ?{}", params.len()));
            }

            let mut sql = format!("SELECT {REQUEST_COLUMNS} FROM donation_requests");
            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push_str(" ORDER BY rowid DESC");
            if let Some(limit) = limit {
                params.push(Box::new(limit));
                sql.push_str(&format!(" LIMIT ?{}", params.len()));
            }

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(params.iter()), map_request)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    /// Compare-and-set status move. The update matches on both the id and the
    /// expected current status, so of two racing identical transitions only
    /// one observes a changed row. Returns whether the row moved.
    pub fn transition_request(&self, id: &str, from: DonationStatus, to: DonationStatus) -> Result<bool> {
        ensure!(
            from.can_transition_to(to),
            "illegal donation status transition {} -> {}",
            from,
            to
        );

        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE donation_requests SET donation_status = ?3
                 WHERE id = ?1 AND donation_status = ?2",
                rusqlite::params![id, from.as_str(), to.as_str()],
            )?;
            Ok(n > 0)
        })
    }

    /// Move a pending request into progress and record who is donating.
    pub fn start_donation(&self, id: &str, donor_name: Option<&str>, donor_email: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE donation_requests
                 SET donation_status = ?2, donor_name = ?3, donor_email = ?4
                 WHERE id = ?1 AND donation_status = ?5",
                rusqlite::params![
                    id,
                    DonationStatus::InProgress.as_str(),
                    donor_name,
                    donor_email,
                    DonationStatus::Pending.as_str(),
                ],
            )?;
            Ok(n > 0)
        })
    }

    /// Apply a partial edit. Only pending requests are editable; anything
    /// else matches zero documents.
    pub fn update_request(&self, id: &str, patch: &DonationRequestPatch) -> Result<Changed> {
        let fields = patch.fields();
        ensure!(!fields.is_empty(), "no request fields to update");

        self.with_conn(|conn| {
            let assignments: Vec<String> = fields
                .iter()
                .enumerate()
                .map(|(i, (col, _))| format!("{} = ?{}", col, i + 3))
                .collect();
            let sql = format!(
                "UPDATE donation_requests SET {} WHERE id = ?1 AND donation_status = ?2",
                assignments.join(", ")
            );

            let pending = DonationStatus::Pending.as_str();
            let mut params: Vec<&dyn rusqlite::types::ToSql> = vec![&id, &pending];
            params.extend(fields.iter().map(|(_, v)| v as &dyn rusqlite::types::ToSql));

            let n = conn.execute(&sql, params.as_slice())?;
            Ok(Changed { matched: n, modified: n })
        })
    }

    pub fn delete_request(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM donation_requests WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    pub fn count_requests(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM donation_requests", [], |r| r.get(0))?;
            Ok(n as u64)
        })
    }
}

fn map_request(row: &Row<'_>) -> rusqlite::Result<DonationRequest> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(15)?;
    Ok(DonationRequest {
        requester_name: row.get(1)?,
        requester_email: row.get(2)?,
        recipient_name: row.get(3)?,
        recipient_district: row.get(4)?,
        recipient_upazila: row.get(5)?,
        hospital_name: row.get(6)?,
        full_address: row.get(7)?,
        blood_group: row.get(8)?,
        donation_date: row.get(9)?,
        donation_time: row.get(10)?,
        request_message: row.get(11)?,
        donation_status: enum_column(row, 12)?,
        donor_name: row.get(13)?,
        donor_email: row.get(14)?,
        created_at: parse_timestamp(&created_at, &id),
        id,
    })
}
