use rusqlite::{Connection, Result};
use std::path::PathBuf;

pub mod outbox;
pub mod results;

fn get_data_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| "C:\\Users\\User".to_string());
        PathBuf::from(home).join(".local\\share\\ulpan")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/home/user".to_string());
        PathBuf::from(home).join(".local/share/ulpan")
    }
}

pub fn get_db_path() -> PathBuf {
    get_data_dir().join("ulpan.db")
}

pub fn init_db() -> Result<Connection> {
    let db_path = get_db_path();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let conn = Connection::open(&db_path)?;

    run_migrations(&conn)?;

    Ok(conn)
}

fn run_migrations(conn: &Connection) -> Result<()> {
    // Ratings whose POST failed; drained at the start of the next review
    // session. All real scheduling state stays on the server.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS review_outbox (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            word_id TEXT NOT NULL,
            quality INTEGER NOT NULL,
            attempts INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_outbox_created ON review_outbox(created_at)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS lesson_results (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            lesson_id TEXT NOT NULL,
            score INTEGER NOT NULL,
            completed_at INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_results_lesson ON lesson_results(lesson_id)",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
pub fn open_test_db(path: &std::path::Path) -> Connection {
    let conn = Connection::open(path).unwrap();
    run_migrations(&conn).unwrap();
    conn
}
