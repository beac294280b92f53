//! Read-only queries over the catalog table.

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use crate::operations::OperationError;

/// A stored image with what a server needs to return it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlob {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub checksum: Option<String>,
}

impl ImageBlob {
    /// Strong `ETag` value derived from the checksum.
    pub fn etag(&self) -> Option<String> {
        self.checksum.as_ref().map(|c| format!("\"{}\"", c))
    }
}

/// Catalog row without the blobs.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub id: u32,
    pub name: String,
    pub types: Vec<String>,
    pub image_mime: String,
    pub image_size: i64,
    pub thumb_mime: Option<String>,
    pub checksum: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Id,
    Name,
}

/// Filters and paging for [`list_entries`].
#[derive(Debug, Clone)]
pub struct ListQuery {
    /// Case-insensitive substring of the name.
    pub name_contains: Option<String>,
    /// Exact type name.
    pub type_name: Option<String>,
    pub sort: SortKey,
    pub descending: bool,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            name_contains: None,
            type_name: None,
            sort: SortKey::Id,
            descending: false,
            limit: 50,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EntryPage {
    pub entries: Vec<CatalogEntry>,
    /// Rows matching the filters, ignoring limit/offset.
    pub total: u64,
}

/// Summary statistics for the catalog.
#[derive(Debug, Default)]
pub struct CatalogStats {
    pub entries: i64,
    pub with_thumbnail: i64,
    pub image_bytes: i64,
    pub thumb_bytes: i64,
    pub by_mime: Vec<(String, i64)>,
    pub by_type: Vec<(String, i64)>,
}

const ENTRY_COLUMNS: &str =
    "id, name, types, image_mime, image_size, thumb_mime, checksum, created_at";

fn row_to_entry(row: &Row) -> rusqlite::Result<CatalogEntry> {
    let types: String = row.get(2)?;
    Ok(CatalogEntry {
        id: row.get(0)?,
        name: row.get(1)?,
        types: serde_json::from_str(&types).unwrap_or_default(),
        image_mime: row.get(3)?,
        image_size: row.get(4)?,
        thumb_mime: row.get(5)?,
        checksum: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn image_for_id(conn: &Connection, id: u32) -> Result<Option<ImageBlob>, OperationError> {
    conn.query_row(
        "SELECT image_blob, image_mime, checksum FROM catalog WHERE id = ?1",
        params![id],
        |row| {
            Ok(ImageBlob {
                bytes: row.get(0)?,
                mime: row.get(1)?,
                checksum: row.get(2)?,
            })
        },
    )
    .optional()
    .map_err(Into::into)
}

/// Thumbnail for `id`, if the entry exists and has one.
pub fn thumb_for_id(conn: &Connection, id: u32) -> Result<Option<ImageBlob>, OperationError> {
    conn.query_row(
        "SELECT thumb_blob, thumb_mime FROM catalog
         WHERE id = ?1 AND thumb_blob IS NOT NULL AND thumb_mime IS NOT NULL",
        params![id],
        |row| {
            Ok(ImageBlob {
                bytes: row.get(0)?,
                mime: row.get(1)?,
                checksum: None,
            })
        },
    )
    .optional()
    .map_err(Into::into)
}

pub fn get_entry(conn: &Connection, id: u32) -> Result<Option<CatalogEntry>, OperationError> {
    conn.query_row(
        &format!("SELECT {ENTRY_COLUMNS} FROM catalog WHERE id = ?1"),
        params![id],
        row_to_entry,
    )
    .optional()
    .map_err(Into::into)
}

/// The metadata JSON an entry was loaded from.
pub fn metadata_json(conn: &Connection, id: u32) -> Result<Option<String>, OperationError> {
    conn.query_row(
        "SELECT meta_json FROM catalog WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

/// Filtered, sorted page of entries plus the total match count.
pub fn list_entries(conn: &Connection, query: &ListQuery) -> Result<EntryPage, OperationError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(name) = query.name_contains.as_deref().filter(|s| !s.is_empty()) {
        clauses.push("name LIKE ? ESCAPE '\\'");
        values.push(Value::Text(format!("%{}%", escape_like(name))));
    }
    if let Some(kind) = query.type_name.as_deref().filter(|s| !s.is_empty()) {
        clauses.push("EXISTS (SELECT 1 FROM json_each(catalog.types) WHERE json_each.value = ?)");
        values.push(Value::Text(kind.to_lowercase()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM catalog{where_sql}"),
        params_from_iter(values.iter()),
        |r| r.get(0),
    )?;

    let direction = if query.descending { "DESC" } else { "ASC" };
    let order = match query.sort {
        SortKey::Id => format!("id {direction}"),
        SortKey::Name => format!("name COLLATE NOCASE {direction}, id ASC"),
    };

    let mut page_values = values;
    page_values.push(Value::Integer(query.limit as i64));
    page_values.push(Value::Integer(query.offset as i64));

    let mut stmt = conn.prepare(&format!(
        "SELECT {ENTRY_COLUMNS} FROM catalog{where_sql} ORDER BY {order} LIMIT ? OFFSET ?"
    ))?;
    let entries = stmt
        .query_map(params_from_iter(page_values.iter()), row_to_entry)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EntryPage {
        entries,
        total: total as u64,
    })
}

pub fn catalog_stats(conn: &Connection) -> Result<CatalogStats, OperationError> {
    let (entries, with_thumbnail, image_bytes, thumb_bytes): (i64, i64, i64, i64) = conn.query_row(
        "SELECT COUNT(*),
                COUNT(thumb_blob),
                COALESCE(SUM(image_size), 0),
                COALESCE(SUM(LENGTH(thumb_blob)), 0)
         FROM catalog",
        [],
        |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
    )?;

    let mut stmt = conn.prepare(
        "SELECT image_mime, COUNT(*) FROM catalog GROUP BY image_mime ORDER BY COUNT(*) DESC, image_mime",
    )?;
    let by_mime: Vec<(String, i64)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT json_each.value, COUNT(*) FROM catalog, json_each(catalog.types)
         GROUP BY json_each.value ORDER BY COUNT(*) DESC, json_each.value",
    )?;
    let by_type: Vec<(String, i64)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CatalogStats {
        entries,
        with_thumbnail,
        image_bytes,
        thumb_bytes,
        by_mime,
        by_type,
    })
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
