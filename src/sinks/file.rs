//! File sink implementation

use crate::core::{LoggerError, Result, Sink};
use fs2::FileExt;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// How the log file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Keep existing content and append
    #[default]
    Append,
    /// Discard existing content when the sink is created
    Truncate,
}

/// Appends each batch to a file.
///
/// The file is locked exclusively (advisory `flock`) for the duration of
/// each batch write, so several processes can share one log file without
/// interleaving partial batches.
///
/// # Example
///
/// ```no_run
/// use rust_batch_logger::prelude::*;
/// use rust_batch_logger::sinks::{FileSink, OpenMode};
///
/// let logger = Logger::builder()
///     .sink(FileSink::new("/var/log/app.log", OpenMode::Append).unwrap())
///     .buffer_size(50)
///     .build()
///     .unwrap();
/// ```
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>, mode: OpenMode) -> Result<Self> {
        let path = path.into();
        let mut options = OpenOptions::new();
        options.create(true);
        match mode {
            OpenMode::Append => options.append(true),
            OpenMode::Truncate => options.write(true).truncate(true),
        };
        let file = options.open(&path).map_err(|e| {
            LoggerError::io_operation(
                format!("opening log file {}", path.display()),
                e.to_string(),
                e,
            )
        })?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn write_batch(&self, batch: &[String]) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let text = batch.concat();

        let mut file = self.file.lock();
        FileExt::lock_exclusive(&*file)?;
        let written = file.write_all(text.as_bytes());
        let unlocked = FileExt::unlock(&*file);
        written?;
        unlocked?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.file.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.file.get_mut().flush();
    }
}
