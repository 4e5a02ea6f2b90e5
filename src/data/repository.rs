use rusqlite::{params, Connection, OptionalExtension};

use crate::error::AppError;
use crate::models::file_record::{FileRecord, PendingFile};
use crate::models::tag::TagRow;

pub fn upsert_dir(conn: &Connection, path: &str) -> Result<i64, AppError> {
    conn.execute("INSERT OR IGNORE INTO dirs (path) VALUES (?1)", params![path])?;
    let id = conn.query_row("SELECT id FROM dirs WHERE path = ?1", params![path], |row| {
        row.get(0)
    })?;
    Ok(id)
}

// The registrar's write path: new files insert, re-registered files keep
// their id (and any tags) but refresh size and modified time.
pub fn register_file(
    conn: &Connection,
    dir_id: i64,
    name: &str,
    size: i64,
    created_at: Option<&str>,
    modified_at: &str,
) -> Result<i64, AppError> {
    conn.execute(
        "INSERT INTO files (dir_id, name, size, created_at, modified_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(dir_id, name)
         DO UPDATE SET size = ?3, modified_at = ?5",
        params![dir_id, name, size, created_at, modified_at],
    )?;
    let id = conn.query_row(
        "SELECT id FROM files WHERE dir_id = ?1 AND name = ?2",
        params![dir_id, name],
        |row| row.get(0),
    )?;
    Ok(id)
}

pub fn get_file(conn: &Connection, id: i64) -> Result<Option<FileRecord>, AppError> {
    let record = conn
        .query_row(
            "SELECT id, dir_id, name, size, created_at, modified_at,
                    analyzed_at, thumbed_at, image_w, image_h
             FROM files WHERE id = ?1",
            params![id],
            |row| {
                Ok(FileRecord {
                    id: row.get(0)?,
                    dir_id: row.get(1)?,
                    name: row.get(2)?,
                    size: row.get(3)?,
                    created_at: row.get(4)?,
                    modified_at: row.get(5)?,
                    analyzed_at: row.get(6)?,
                    thumbed_at: row.get(7)?,
                    image_w: row.get(8)?,
                    image_h: row.get(9)?,
                })
            },
        )
        .optional()?;
    Ok(record)
}

// RFC 3339 timestamps compare lexicographically, so the staleness check
// runs inside SQLite.
pub fn files_pending_analysis(conn: &Connection) -> Result<Vec<PendingFile>, AppError> {
    pending_by_column(conn, "analyzed_at")
}

pub fn files_pending_thumbnail(conn: &Connection) -> Result<Vec<PendingFile>, AppError> {
    pending_by_column(conn, "thumbed_at")
}

fn pending_by_column(conn: &Connection, column: &str) -> Result<Vec<PendingFile>, AppError> {
    let sql = format!(
        "SELECT f.id, d.path || '/' || f.name
         FROM files f JOIN dirs d ON d.id = f.dir_id
         WHERE f.{column} IS NULL OR f.{column} < f.modified_at
         ORDER BY f.id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let files = stmt
        .query_map([], |row| {
            Ok(PendingFile {
                id: row.get(0)?,
                path: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(files)
}

// Re-inserting an existing (file, term) pair is a no-op; reanalysis after
// a partial flush must not fail or duplicate.
pub fn insert_tags(
    conn: &Connection,
    file_id: i64,
    tags: &[(&str, i64)],
) -> Result<(), AppError> {
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO tags (file_id, term, score) VALUES (?1, ?2, ?3)",
    )?;
    for (term, score) in tags {
        stmt.execute(params![file_id, term, score])?;
    }
    Ok(())
}

pub fn mark_analyzed(conn: &Connection, file_id: i64, analyzed_at: &str) -> Result<(), AppError> {
    conn.execute(
        "UPDATE files SET analyzed_at = ?1 WHERE id = ?2",
        params![analyzed_at, file_id],
    )?;
    Ok(())
}

pub fn set_dimensions_and_mark_thumbed(
    conn: &Connection,
    file_id: i64,
    width: u32,
    height: u32,
    thumbed_at: &str,
) -> Result<(), AppError> {
    conn.execute(
        "UPDATE files SET image_w = ?1, image_h = ?2, thumbed_at = ?3 WHERE id = ?4",
        params![width, height, thumbed_at, file_id],
    )?;
    Ok(())
}

pub fn tags_for_file(conn: &Connection, file_id: i64) -> Result<Vec<TagRow>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT file_id, term, score FROM tags WHERE file_id = ?1 ORDER BY term",
    )?;
    let rows = stmt
        .query_map(params![file_id], |row| {
            Ok(TagRow {
                file_id: row.get(0)?,
                term: row.get(1)?,
                score: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
