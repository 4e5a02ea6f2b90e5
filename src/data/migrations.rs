use rusqlite::Connection;

use crate::error::AppError;

const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS dirs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    path TEXT UNIQUE NOT NULL
);

CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    dir_id INTEGER NOT NULL REFERENCES dirs(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    size INTEGER NOT NULL DEFAULT 0,
    created_at TEXT,
    modified_at TEXT NOT NULL,
    analyzed_at TEXT,
    thumbed_at TEXT,
    image_w INTEGER,
    image_h INTEGER,
    UNIQUE(dir_id, name)
);

CREATE INDEX IF NOT EXISTS idx_files_dir ON files(dir_id);
CREATE INDEX IF NOT EXISTS idx_files_analyzed ON files(analyzed_at);
CREATE INDEX IF NOT EXISTS idx_files_thumbed ON files(thumbed_at);

CREATE TABLE IF NOT EXISTS tags (
    file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    term TEXT NOT NULL,
    score INTEGER NOT NULL,
    UNIQUE(file_id, term)
);

CREATE INDEX IF NOT EXISTS idx_tags_term ON tags(term);

-- Quarantine for files that repeatedly fail decoding. Schema-level only;
-- nothing writes here yet.
CREATE TABLE IF NOT EXISTS broken_files (
    file_id INTEGER NOT NULL UNIQUE REFERENCES files(id) ON DELETE CASCADE,
    reason TEXT,
    recorded_at TEXT DEFAULT CURRENT_TIMESTAMP
);
";

pub fn run_migrations(conn: &Connection) -> Result<(), AppError> {
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    conn.execute_batch(SCHEMA_V1)?;
    Ok(())
}
