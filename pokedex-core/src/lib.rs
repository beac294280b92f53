//! Shared data model for the Pokédex ingestion pipeline.
//!
//! The fetch pass produces [`MetadataRecord`]s and a [`RunSummary`]; the load
//! pass consumes the records. Both passes agree on file locations through
//! [`ArtifactLayout`].

pub mod config;
pub mod layout;
pub mod types;

pub use config::{
    Config, ConfigError, FetchSettings, PathSettings, ThumbFormat, ThumbnailSettings, config_path,
};
pub use layout::{ArtifactLayout, file_stem, is_summary_file, sanitize_name};
pub use types::{
    DerivedArtifact, EntityDescriptor, EntityOutcome, FetchedAsset, METADATA_SCHEMA_VERSION,
    MetadataRecord, RecordError, RunSummary,
};
