use rusqlite::{Connection, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// A rating the backend never acknowledged. Re-posted on the next review
/// session; deleted once a POST finally succeeds.
#[derive(Debug, Clone)]
pub struct PendingRating {
    pub id: i64,
    pub word_id: String,
    pub quality: u8,
    pub attempts: u32,
    pub created_at: u64,
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

pub fn enqueue(conn: &Connection, word_id: &str, quality: u8) -> Result<i64> {
    conn.execute(
        "INSERT INTO review_outbox (word_id, quality, created_at) VALUES (?, ?, ?)",
        rusqlite::params![word_id, quality, now()],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Oldest-first, so ratings replay in the order they were given.
pub fn pending(conn: &Connection, limit: usize) -> Result<Vec<PendingRating>> {
    let mut stmt = conn.prepare(
        "SELECT id, word_id, quality, attempts, created_at
         FROM review_outbox ORDER BY created_at ASC, id ASC LIMIT ?",
    )?;

    let ratings = stmt
        .query_map([limit], |row| {
            Ok(PendingRating {
                id: row.get(0)?,
                word_id: row.get(1)?,
                quality: row.get(2)?,
                attempts: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();

    Ok(ratings)
}

pub fn delete(conn: &Connection, id: i64) -> Result<()> {
    conn.execute("DELETE FROM review_outbox WHERE id = ?", [id])?;
    Ok(())
}

pub fn bump_attempts(conn: &Connection, id: i64) -> Result<()> {
    conn.execute(
        "UPDATE review_outbox SET attempts = attempts + 1 WHERE id = ?",
        [id],
    )?;
    Ok(())
}

pub fn count(conn: &Connection) -> Result<usize> {
    conn.query_row("SELECT COUNT(*) FROM review_outbox", [], |row| row.get(0))
}
