use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::record::Domain;

const RECORDINGS_DIR: &str = "speaking_recordings";

/// Where every persisted artifact lives, relative to one data directory.
#[derive(Debug, Clone, PartialEq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        DataLayout {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn csv_path(&self, domain: Domain) -> PathBuf {
        self.root.join(domain.file_name())
    }

    pub fn recordings_dir(&self) -> PathBuf {
        self.root.join(RECORDINGS_DIR)
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        create_dir_all(&self.root)
            .with_context(|| format!("Failed create data directory {:?}", self.root))?;
        create_dir_all(self.recordings_dir())
            .with_context(|| format!("Failed create recordings directory {:?}", self.root))?;
        Ok(())
    }
}
