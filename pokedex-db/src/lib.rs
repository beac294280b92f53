//! SQLite store for loaded catalog entries.
//!
//! Free functions take a `&Connection`; [`CatalogDb`] owns one and is what
//! the loader and the CLI pass around.

pub mod operations;
pub mod queries;
pub mod schema;

use std::path::Path;

use rusqlite::Connection;

pub use operations::{CatalogRow, OperationError, UpsertOutcome, upsert_entry};
pub use queries::{
    CatalogEntry, CatalogStats, EntryPage, ImageBlob, ListQuery, SortKey, catalog_stats,
    get_entry, image_for_id, list_entries, metadata_json, thumb_for_id,
};
pub use schema::{CURRENT_VERSION, SchemaError, open_database, open_memory, schema_version};

/// Owned handle on a catalog database. Closed when dropped.
pub struct CatalogDb {
    conn: Connection,
}

impl CatalogDb {
    pub fn open(path: &Path) -> Result<Self, SchemaError> {
        Ok(Self {
            conn: open_database(path)?,
        })
    }

    pub fn open_memory() -> Result<Self, SchemaError> {
        Ok(Self {
            conn: open_memory()?,
        })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn schema_version(&self) -> Result<i32, SchemaError> {
        schema_version(&self.conn)
    }

    pub fn upsert(&self, row: &CatalogRow) -> Result<UpsertOutcome, OperationError> {
        upsert_entry(&self.conn, row)
    }

    pub fn image(&self, id: u32) -> Result<Option<ImageBlob>, OperationError> {
        image_for_id(&self.conn, id)
    }

    pub fn thumb(&self, id: u32) -> Result<Option<ImageBlob>, OperationError> {
        thumb_for_id(&self.conn, id)
    }

    pub fn entry(&self, id: u32) -> Result<Option<CatalogEntry>, OperationError> {
        get_entry(&self.conn, id)
    }

    pub fn metadata_json(&self, id: u32) -> Result<Option<String>, OperationError> {
        metadata_json(&self.conn, id)
    }

    pub fn list(&self, query: &ListQuery) -> Result<EntryPage, OperationError> {
        list_entries(&self.conn, query)
    }

    pub fn stats(&self) -> Result<CatalogStats, OperationError> {
        catalog_stats(&self.conn)
    }
}
