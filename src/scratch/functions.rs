//! The impls and functions
//!
use std::{fmt, fs, io, path::Path, sync::atomic::{AtomicU64, Ordering}};
use chrono::Utc;
use log::*;
use crate::error::PipelineError;
use crate::scratch::{RunId, ScratchFiles};

static RUN_SEQUENCE: AtomicU64 = AtomicU64::new(0);

impl RunId {
    /// A new id: the current time in nanoseconds plus a process wide sequence number,
    /// so two runs starting in the same clock tick still differ.
    pub fn next() -> Self {
        let now = Utc::now();
        let nanos = now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp_micros() * 1000);
        let sequence = RUN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        RunId(format!("{}-{}", nanos, sequence))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ScratchFiles {
    /// Create the text and binary file for `run_id` in `directory`.
    /// If the directory is not writable, or a file of the same name already exists, this fails and nothing is left behind.
    pub fn acquire(
        directory: &Path,
        run_id: &RunId,
    ) -> Result<ScratchFiles, PipelineError>
    {
        let text_path = directory.join(format!("heap-{}.txt", run_id));
        let binary_path = directory.join(format!("heap-{}.pprof", run_id));

        create_exclusive(&text_path)?;
        if let Err(error) = create_exclusive(&binary_path) {
            remove_if_exists(&text_path).unwrap_or_else(|e| {
                warn!("Cannot remove file: {}: {}", text_path.display(), e);
            });
            return Err(error);
        }
        debug!("acquired {} and {}", text_path.display(), binary_path.display());

        Ok(ScratchFiles {
            run_id: run_id.clone(),
            text_path,
            binary_path,
            removed: false,
        })
    }
    /// Write the fetched profile text to the text file.
    pub fn write_text(&self, data: &[u8]) -> Result<(), PipelineError> {
        fs::write(&self.text_path, data)
            .map_err(|e| PipelineError::io("cannot write", &self.text_path, e))
    }
    /// Remove both files. Removing a file that is already gone is not an error.
    pub fn close(mut self) -> Result<(), PipelineError> {
        self.remove()
    }
    fn remove(&mut self) -> Result<(), PipelineError> {
        if self.removed {
            return Ok(());
        }
        self.removed = true;
        let text = remove_if_exists(&self.text_path)
            .map_err(|e| PipelineError::io("cannot remove", &self.text_path, e));
        let binary = remove_if_exists(&self.binary_path)
            .map_err(|e| PipelineError::io("cannot remove", &self.binary_path, e));
        debug!("removed scratch files of run {}", self.run_id);
        text.and(binary)
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        if let Err(e) = self.remove() {
            warn!("{}", e);
        }
    }
}

fn create_exclusive(path: &Path) -> Result<(), PipelineError> {
    fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)
        .map(|_| ())
        .map_err(|e| PipelineError::io("cannot create", path, e))
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
