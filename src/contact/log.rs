//! Append-only CSV log of contact submissions

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{ContactError, Submission};

/// Serializes appends so concurrent requests never interleave rows
#[derive(Debug)]
pub struct SubmissionLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SubmissionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, writing the header first when the log is new or empty
    pub fn append(&self, submission: &Submission) -> Result<(), ContactError> {
        let _guard = self.lock.lock().map_err(|_| ContactError::Poisoned)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|error| self.open_error(error))?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|error| self.open_error(error))?;
        let is_new = file
            .metadata()
            .map(|meta| meta.len() == 0)
            .map_err(|error| self.open_error(error))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_new {
            writer.write_record(Submission::FIELDS)?;
        }
        writer.serialize(submission)?;
        writer.flush().map_err(csv::Error::from)?;

        tracing::debug!("Appended submission to {:?}", self.path);
        Ok(())
    }

    fn open_error(&self, error: std::io::Error) -> ContactError {
        ContactError::Open {
            path: self.path.clone(),
            error,
        }
    }
}
