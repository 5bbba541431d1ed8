use anyhow::Result;
use rusqlite::Row;

use lifeline_types::models::ContactMessage;

use crate::{Database, now, parse_timestamp, timestamp};

impl Database {
    pub fn insert_contact(
        &self,
        id: &str,
        name: &str,
        email: &str,
        contact: &str,
        message: &str,
    ) -> Result<ContactMessage> {
        let record = ContactMessage {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            contact: contact.to_string(),
            message: message.to_string(),
            created_at: now(),
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO contact_messages (id, name, email, contact, message, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    record.id,
                    record.name,
                    record.email,
                    record.contact,
                    record.message,
                    timestamp(&record.created_at),
                ],
            )?;
            Ok(())
        })?;

        Ok(record)
    }

    pub fn list_contacts(&self) -> Result<Vec<ContactMessage>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, email, contact, message, created_at
                 FROM contact_messages ORDER BY rowid DESC",
            )?;
            let rows = stmt.query_map([], map_contact)?.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}

fn map_contact(row: &Row<'_>) -> rusqlite::Result<ContactMessage> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(5)?;
    Ok(ContactMessage {
        name: row.get(1)?,
        email: row.get(2)?,
        contact: row.get(3)?,
        message: row.get(4)?,
        created_at: parse_timestamp(&created_at, &id),
        id,
    })
}
