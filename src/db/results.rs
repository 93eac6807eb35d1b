use rusqlite::{Connection, Result};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub struct LessonResult {
    pub id: i64,
    pub lesson_id: String,
    pub score: u8,
    pub completed_at: u64,
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

pub fn record_result(conn: &Connection, lesson_id: &str, score: u8) -> Result<i64> {
    conn.execute(
        "INSERT INTO lesson_results (lesson_id, score, completed_at) VALUES (?, ?, ?)",
        rusqlite::params![lesson_id, score, now()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn recent_results(conn: &Connection, limit: usize) -> Result<Vec<LessonResult>> {
    let mut stmt = conn.prepare(
        "SELECT id, lesson_id, score, completed_at
         FROM lesson_results ORDER BY completed_at DESC, id DESC LIMIT ?",
    )?;

    let results = stmt
        .query_map([limit], |row| {
            Ok(LessonResult {
                id: row.get(0)?,
                lesson_id: row.get(1)?,
                score: row.get(2)?,
                completed_at: row.get(3)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();

    Ok(results)
}

pub fn best_score(conn: &Connection, lesson_id: &str) -> Result<Option<u8>> {
    conn.query_row(
        "SELECT MAX(score) FROM lesson_results WHERE lesson_id = ?",
        [lesson_id],
        |row| row.get(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_test_db;

    #[test]
    fn test_record_and_list_results() {
        let temp_dir = tempfile::tempdir().unwrap();
        let conn = open_test_db(&temp_dir.path().join("test.db"));

        record_result(&conn, "essential-greetings", 83).unwrap();
        record_result(&conn, "cafe-ordering", 100).unwrap();

        let results = recent_results(&conn, 10).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().any(|r| r.score == 83));
    }

    #[test]
    fn test_recent_results_limit() {
        let temp_dir = tempfile::tempdir().unwrap();
        let conn = open_test_db(&temp_dir.path().join("test.db"));

        for score in [10u8, 20, 30] {
            record_result(&conn, "essential-greetings", score).unwrap();
        }
        assert_eq!(recent_results(&conn, 2).unwrap().len(), 2);
    }

    #[test]
    fn test_best_score() {
        let temp_dir = tempfile::tempdir().unwrap();
        let conn = open_test_db(&temp_dir.path().join("test.db"));

        assert_eq!(best_score(&conn, "essential-greetings").unwrap(), None);
        record_result(&conn, "essential-greetings", 67).unwrap();
        record_result(&conn, "essential-greetings", 100).unwrap();
        record_result(&conn, "cafe-ordering", 50).unwrap();
        assert_eq!(
            best_score(&conn, "essential-greetings").unwrap(),
            Some(100)
        );
    }
}
