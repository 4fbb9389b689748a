use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::Builder;

use crate::app::Result;
use crate::store::Store;

/// Stores each payload as a pretty-printed JSON file in one directory.
///
/// Writes go to a hidden temporary file next to the target and are renamed
/// over it once flushed, so readers only ever see a complete file. A failed
/// write drops the temporary file.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Store for FileStore {
    fn put(&self, key: &str, payload: &Value) -> Result<PathBuf> {
        let target = self.path_for(key);

        let mut tmp = Builder::new()
            .prefix(&format!(".{}.", key))
            .suffix(".tmp")
            .tempfile_in(&self.dir)?;

        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            // serde_json leaves non-ASCII characters unescaped and indents by two spaces
            serde_json::to_writer_pretty(&mut writer, payload).map_err(std::io::Error::from)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;

        tmp.persist(&target).map_err(|e| e.error)?;
        Ok(target)
    }

    fn exists(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}
