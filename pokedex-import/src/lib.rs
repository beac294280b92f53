//! Load pass: metadata descriptors and their image files into the catalog
//! store.

pub mod loader;
pub mod progress;

pub use loader::{
    ERROR_CODE, ImportError, LoadOutcome, LoadStats, SkipReason, load_file, load_metadata_dir,
    metadata_files,
};
pub use progress::{ImportProgress, LogProgress, SilentProgress};
