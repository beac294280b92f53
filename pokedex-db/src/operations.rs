//! Writes to the catalog table.

use rusqlite::{Connection, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything the loader writes for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub id: u32,
    pub name: String,
    pub types: Vec<String>,
    pub meta_json: String,
    pub image_blob: Vec<u8>,
    pub image_mime: String,
    pub thumb_blob: Option<Vec<u8>>,
    pub thumb_mime: Option<String>,
    pub checksum: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Insert `row`, or replace every mutable column of the existing row with
/// the same id. Runs in its own transaction; `created_at` is kept from the
/// first insert.
pub fn upsert_entry(conn: &Connection, row: &CatalogRow) -> Result<UpsertOutcome, OperationError> {
    let types = serde_json::to_string(&row.types)?;
    // Thumbnail columns are null together or not at all.
    let (thumb_blob, thumb_mime) = match (&row.thumb_blob, &row.thumb_mime) {
        (Some(blob), Some(mime)) => (Some(blob), Some(mime)),
        _ => (None, None),
    };

    let tx = conn.unchecked_transaction()?;
    let existed: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM catalog WHERE id = ?1)",
        [row.id],
        |r| r.get(0),
    )?;
    tx.execute(
        "INSERT INTO catalog (id, name, types, meta_json, image_blob, image_mime,
                              thumb_blob, thumb_mime, checksum, image_size)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(id) DO UPDATE SET
             name = excluded.name,
             types = excluded.types,
             meta_json = excluded.meta_json,
             image_blob = excluded.image_blob,
             image_mime = excluded.image_mime,
             thumb_blob = excluded.thumb_blob,
             thumb_mime = excluded.thumb_mime,
             checksum = excluded.checksum,
             image_size = excluded.image_size",
        params![
            row.id,
            row.name,
            types,
            row.meta_json,
            row.image_blob,
            row.image_mime,
            thumb_blob,
            thumb_mime,
            row.checksum,
            row.image_blob.len() as i64,
        ],
    )?;
    tx.commit()?;

    Ok(if existed {
        UpsertOutcome::Updated
    } else {
        UpsertOutcome::Inserted
    })
}
