use anyhow::Result;
use rusqlite::{OptionalExtension, Row};

use lifeline_types::api::NewBlog;
use lifeline_types::models::{Blog, BlogStatus};

use crate::{Changed, Database, enum_column, now, parse_timestamp, timestamp};

impl Database {
    /// New blogs are always drafts.
    pub fn insert_blog(&self, id: &str, blog: &NewBlog) -> Result<Blog> {
        let record = Blog {
            id: id.to_string(),
            title: blog.title.clone(),
            content: blog.content.clone(),
            thumbnail: blog.thumbnail.clone(),
            status: BlogStatus::Draft,
            created_at: now(),
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO blogs (id, title, content, thumbnail, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    record.id,
                    record.title,
                    record.content,
                    record.thumbnail,
                    record.status.as_str(),
                    timestamp(&record.created_at),
                ],
            )?;
            Ok(())
        })?;

        Ok(record)
    }

    pub fn get_blog(&self, id: &str) -> Result<Option<Blog>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT id, title, content, thumbnail, status, created_at FROM blogs WHERE id = ?1",
                    [id],
                    map_blog,
                )
                .optional()?)
        })
    }

    /// Blogs newest first, optionally only those in `status`.
    pub fn list_blogs(&self, status: Option<BlogStatus>) -> Result<Vec<Blog>> {
        self.with_conn(|conn| {
            let mut sql = String::from("SELECT id, title, content, thumbnail, status, created_at FROM blogs");
            if status.is_some() {
                sql.push_str(" WHERE status = ?1");
            }
            sql.push_str(" ORDER BY rowid DESC");

            let mut stmt = conn.prepare(&sql)?;
            let rows = match status {
                Some(s) => stmt.query_map([s.as_str()], map_blog)?,
                None => stmt.query_map([], map_blog)?,
            };
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    pub fn set_blog_status(&self, id: &str, status: BlogStatus) -> Result<Changed> {
        self.with_conn(|conn| {
            let modified = conn.execute(
                "UPDATE blogs SET status = ?2 WHERE id = ?1 AND status <> ?2",
                rusqlite::params![id, status.as_str()],
            )?;
            let matched: i64 =
                conn.query_row("SELECT COUNT(*) FROM blogs WHERE id = ?1", [id], |r| r.get(0))?;
            Ok(Changed { matched: matched as usize, modified })
        })
    }

    pub fn delete_blog(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM blogs WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }
}

fn map_blog(row: &Row<'_>) -> rusqlite::Result<Blog> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(5)?;
    Ok(Blog {
        title: row.get(1)?,
        content: row.get(2)?,
        thumbnail: row.get(3)?,
        status: enum_column(row, 4)?,
        created_at: parse_timestamp(&created_at, &id),
        id,
    })
}
