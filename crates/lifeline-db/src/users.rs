use anyhow::{Result, ensure};
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use lifeline_types::api::{LoginProfile, ProfileUpdate};
use lifeline_types::models::{Role, User, UserStatus};

use crate::{Changed, Database, enum_column, now, parse_timestamp, timestamp};

const USER_COLUMNS: &str =
    "id, email, name, avatar, blood_group, district_id, upazila, role, status, created_at, last_login";

/// What `upsert_login` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// First login: a donor record was created with this id.
    Created(String),
    /// Returning user: only `last_login` was touched.
    Updated(Changed),
}

impl Database {
    /// Create the user on first login, otherwise bump `last_login`.
    ///
    /// New users always start as active donors. Profile fields, role and
    /// status of an existing user are left untouched.
    pub fn upsert_login(&self, profile: &LoginProfile) -> Result<LoginOutcome> {
        // Sessions are signed for the trimmed address; store the same key.
        let email = profile.email.trim();
        ensure!(!email.is_empty(), "email is required");

        self.with_conn(|conn| {
            let ts = timestamp(&now());
            let existing: Option<String> = conn
                .query_row("SELECT id FROM users WHERE email = ?1", [email], |row| {
                    row.get(0)
                })
                .optional()?;

            if let Some(id) = existing {
                let modified = conn.execute(
                    "UPDATE users SET last_login = ?2 WHERE id = ?1",
                    rusqlite::params![id, ts],
                )?;
                return Ok(LoginOutcome::Updated(Changed { matched: 1, modified }));
            }

            let id = Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO users (id, email, name, avatar, blood_group, district_id, upazila, role, status, created_at, last_login)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
                rusqlite::params![
                    id,
                    email,
                    profile.name,
                    profile.avatar,
                    profile.blood_group,
                    profile.district,
                    profile.upazila,
                    Role::Donor.as_str(),
                    UserStatus::Active.as_str(),
                    ts,
                ],
            )?;
            Ok(LoginOutcome::Created(id))
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn find_role(&self, email: &str) -> Result<Option<Role>> {
        Ok(self.get_user_by_email(email)?.map(|u| u.role))
    }

    pub fn list_users(&self, status: Option<UserStatus>) -> Result<Vec<User>> {
        self.with_conn(|conn| {
            let mut sql = format!("SELECT {USER_COLUMNS} FROM users");
            if status.is_some() {
                sql.push_str(" WHERE status = ?1");
            }
            sql.push_str(" ORDER BY rowid");

            let mut stmt = conn.prepare(&sql)?;
            let rows = match status {
                Some(s) => stmt.query_map([s.as_str()], map_user)?,
                None => stmt.query_map([], map_user)?,
            };
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    pub fn set_user_status(&self, id: &str, status: UserStatus) -> Result<Changed> {
        self.set_user_field(id, "status", status.as_str())
    }

    pub fn set_user_role(&self, id: &str, role: Role) -> Result<Changed> {
        ensure!(role.is_assignable(), "role '{}' cannot be assigned", role);
        self.set_user_field(id, "role", role.as_str())
    }

    fn set_user_field(&self, id: &str, column: &'static str, value: &str) -> Result<Changed> {
        self.with_conn(|conn| {
            let modified = conn.execute(
                &format!("UPDATE users SET {column} = ?2 WHERE id = ?1 AND {column} <> ?2"),
                rusqlite::params![id, value],
            )?;
            let matched = if modified > 0 {
                modified
            } else {
                conn.query_row("SELECT COUNT(*) FROM users WHERE id = ?1", [id], |r| {
                    r.get::<_, i64>(0)
                })? as usize
            };
            Ok(Changed { matched, modified })
        })
    }

    /// Owner-side profile edit. Only the fields present in `update` change.
    pub fn update_profile(&self, email: &str, update: &ProfileUpdate) -> Result<Changed> {
        let fields: Vec<(&str, &Option<String>)> = vec![
            ("name", &update.name),
            ("avatar", &update.avatar),
            ("blood_group", &update.blood_group),
            ("district_id", &update.district),
            ("upazila", &update.upazila),
        ];
        let present: Vec<(&str, &str)> = fields
            .into_iter()
            .filter_map(|(col, v)| v.as_deref().map(|v| (col, v)))
            .collect();
        ensure!(!present.is_empty(), "no profile fields to update");

        self.with_conn(|conn| {
            let assignments: Vec<String> = present
                .iter()
                .enumerate()
                .map(|(i, (col, _))| format!("{} = ?{}", col, i + 2))
                .collect();
            let sql = format!("UPDATE users SET {} WHERE email = ?1", assignments.join(", "));

            let mut params: Vec<&dyn rusqlite::types::ToSql> = vec![&email];
            params.extend(present.iter().map(|(_, v)| v as &dyn rusqlite::types::ToSql));

            let n = conn.execute(&sql, params.as_slice())?;
            Ok(Changed { matched: n, modified: n })
        })
    }

    /// Active donors whose blood group, district and upazila all match exactly.
    pub fn search_donors(&self, blood_group: &str, district: &str, upazila: &str) -> Result<Vec<User>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users
                 WHERE role = 'donor' AND status = 'active'
                   AND blood_group = ?1 AND district_id = ?2 AND upazila = ?3
                 ORDER BY rowid"
            ))?;
            let rows = stmt
                .query_map([blood_group, district, upazila], map_user)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    pub fn count_donors(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 =
                conn.query_row("SELECT COUNT(*) FROM users WHERE role = 'donor'", [], |r| r.get(0))?;
            Ok(n as u64)
        })
    }
}

fn query_user(conn: &Connection, key: &'static str, value: &str) -> Result<Option<User>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE {key} = ?1"))?;
    Ok(stmt.query_row([value], map_user).optional()?)
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(9)?;
    let last_login: String = row.get(10)?;
    Ok(User {
        email: row.get(1)?,
        name: row.get(2)?,
        avatar: row.get(3)?,
        blood_group: row.get(4)?,
        district: row.get(5)?,
        upazila: row.get(6)?,
        role: enum_column(row, 7)?,
        status: enum_column(row, 8)?,
        created_at: parse_timestamp(&created_at, &id),
        last_login: parse_timestamp(&last_login, &id),
        id,
    })
}
