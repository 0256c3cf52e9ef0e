//! Durable append handle for the resume log. Owned by the pipeline's writer thread.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::Outcome;

use super::{ResumeLogError, SEPARATOR};

pub struct ResumeLog {
    path: PathBuf,
    file: File,
}

impl ResumeLog {
    /// Open (or create) the log for appending. Creates missing parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create resume log dir {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open resume log {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one `id,OUTCOME` line and sync it to disk before returning.
    /// The line goes out in a single write so a crash never leaves half a record from this call.
    pub fn append(&mut self, id: &str, outcome: Outcome) -> Result<()> {
        if id.is_empty() || id.contains(['\n', '\r', SEPARATOR]) {
            return Err(ResumeLogError::InvalidId(id.to_string()).into());
        }
        let line = format!("{id}{SEPARATOR}{outcome}\n");
        self.file
            .write_all(line.as_bytes())
            .with_context(|| format!("append to resume log {}", self.path.display()))?;
        self.file
            .flush()
            .with_context(|| format!("flush resume log {}", self.path.display()))?;
        self.file
            .sync_data()
            .with_context(|| format!("sync resume log {}", self.path.display()))?;
        Ok(())
    }
}
