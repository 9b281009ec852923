//! NDJSON Trace Writer
//!
//! Writes execution events to newline-delimited JSON files for debugging.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{EventLog, ExecutionEvent};
use crate::error::{FlowError, Result};

/// NDJSON trace writer
pub struct TraceWriter {
    writer: Arc<Mutex<BufWriter<File>>>,
    path: PathBuf,
}

impl TraceWriter {
    /// Create (or truncate) the trace file, creating parent directories
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let file = File::create(&path)?;
        tracing::info!(path = %path.display(), "Created trace file");

        Ok(Self {
            writer: Arc::new(Mutex::new(BufWriter::new(file))),
            path,
        })
    }

    /// Write a single event as one JSON line
    pub fn write_event(&self, event: &ExecutionEvent) -> Result<()> {
        let json = serde_json::to_string(event)?;

        let mut writer = self.writer.lock();
        writeln!(writer, "{}", json)?;
        writer.flush()?;

        Ok(())
    }

    /// Write every event of a log
    pub fn write_all(&self, log: &EventLog) -> Result<()> {
        for event in log.events() {
            self.write_event(&event)?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn close(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }
}

/// Read a trace file back into events
pub fn read_trace(path: impl AsRef<Path>) -> Result<Vec<ExecutionEvent>> {
    let content = fs::read_to_string(path)?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(FlowError::from))
        .collect()
}
