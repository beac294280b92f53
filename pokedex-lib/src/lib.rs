//! Pipeline building blocks shared by the fetch pass and the CLI: artifact
//! processing, metadata persistence and event draining.

pub mod artifact;
pub mod async_util;
pub mod error;
pub mod metadata;

pub use artifact::{ArtifactProcessor, ProcessedArtifact, sha256_hex, sniff_mime};
pub use async_util::run_with_events;
pub use error::WriteError;
pub use metadata::{EntityWrite, MetadataWriter, write_atomic};
