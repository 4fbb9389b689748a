pub mod file;

use std::path::PathBuf;

use serde_json::Value;

use crate::app::Result;

pub use file::FileStore;

/// Blob store for daily payloads, keyed by output file name.
pub trait Store {
    /// Replace the payload stored under `key`, returning where it landed.
    fn put(&self, key: &str, payload: &Value) -> Result<PathBuf>;
    fn exists(&self, key: &str) -> bool;
    fn path_for(&self, key: &str) -> PathBuf;
}
