//! Macro sources
//!
//! A `MacroSource` produces the macro list for the fetch service. The JSON
//! file source backs the desktop binary; the in-memory source backs tests
//! and demos.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::data::MacroRecords;
use crate::error::{Result, SourceError};

/// Backend that lists stored macros
#[async_trait]
pub trait MacroSource: Send + Sync {
    /// Fetch the current macro list
    async fn list_macros(&self) -> std::result::Result<MacroRecords, SourceError>;
}

/// Reads `{"records": [...]}` from a JSON file
///
/// A missing file is an empty list.
#[derive(Debug, Clone)]
pub struct JsonFileMacroSource {
    path: PathBuf,
}

impl JsonFileMacroSource {
    /// Source backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `records` to the backing file, creating parent directories
    pub async fn save(&self, records: &MacroRecords) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&self.path, json).await?;
        tracing::debug!("Saved {} macros to {}", records.len(), self.path.display());
        Ok(())
    }

    /// Create the backing file with an empty list if it does not exist
    ///
    /// Returns true when a file was created.
    pub async fn ensure_exists(&self) -> Result<bool> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(false);
        }
        self.save(&MacroRecords::default()).await?;
        Ok(true)
    }
}

#[async_trait]
impl MacroSource for JsonFileMacroSource {
    async fn list_macros(&self) -> std::result::Result<MacroRecords, SourceError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No macro file at {}", self.path.display());
                return Ok(MacroRecords::default());
            }
            Err(err) => {
                return Err(SourceError::ReadFailed {
                    path: self.path.display().to_string(),
                    reason: err.to_string(),
                })
            }
        };

        serde_json::from_str(&text).map_err(|err| SourceError::Malformed {
            reason: err.to_string(),
        })
    }
}

/// Holds macros in memory, optionally failing or delaying responses
#[derive(Debug, Default)]
pub struct InMemoryMacroSource {
    records: RwLock<MacroRecords>,
    failure: RwLock<Option<SourceError>>,
    delay: RwLock<Option<Duration>>,
    calls: AtomicUsize,
}

impl InMemoryMacroSource {
    /// Source returning `records`
    pub fn new(records: MacroRecords) -> Self {
        Self {
            records: RwLock::new(records),
            ..Default::default()
        }
    }

    /// Replace the stored macros
    pub fn set_records(&self, records: MacroRecords) {
        *self.records.write() = records;
    }

    /// Fail every request with `failure` until reset with `None`
    pub fn fail_with(&self, failure: Option<SourceError>) {
        *self.failure.write() = failure;
    }

    /// Wait before answering each request
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write() = delay;
    }

    /// Number of requests served
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MacroSource for InMemoryMacroSource {
    async fn list_macros(&self) -> std::result::Result<MacroRecords, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(failure) = self.failure.read().clone() {
            return Err(failure);
        }
        Ok(self.records.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Macro;
    use std::io::Write;

    #[tokio::test]
    async fn test_json_file_source_reads_records() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"records":[{{"id":"a","name":"Home","content":"$H"}},{{"id":2,"name":"Zero","content":"G10 L20 P1 X0 Y0"}}]}}"#
        )
        .expect("write");

        let source = JsonFileMacroSource::new(file.path());
        let records = source.list_macros().await.expect("should parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records.records[0].name, "Home");
        assert_eq!(records.records[1].id.as_str(), "2");
    }

    #[tokio::test]
    async fn test_ensure_exists_creates_empty_file_once() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("fresh").join("macros.json");
        let source = JsonFileMacroSource::new(&path);

        assert!(source.ensure_exists().await.expect("create"));
        assert!(path.exists());
        assert!(source.list_macros().await.expect("list").is_empty());

        source
            .save(&MacroRecords::new(vec![Macro::new("1", "Home", "$H")]))
            .await
            .expect("save");
        assert!(!source.ensure_exists().await.expect("exists"));
        assert_eq!(source.list_macros().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn test_json_file_source_save_then_list() {
        let dir = tempfile::tempdir().expect("temp dir");
        let source = JsonFileMacroSource::new(dir.path().join("nested").join("macros.json"));
        let records = MacroRecords::new(vec![Macro::new("1", "Spindle warmup", "M3 S8000")]);

        source.save(&records).await.expect("save");
        assert_eq!(source.list_macros().await.expect("list"), records);
    }

    #[tokio::test]
    async fn test_json_file_source_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let source = JsonFileMacroSource::new(dir.path().join("absent.json"));
        let records = source.list_macros().await.expect("missing file is empty");
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_json_file_source_malformed() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write");

        let source = JsonFileMacroSource::new(file.path());
        let err = source.list_macros().await.expect_err("should fail");
        assert!(matches!(err, SourceError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_in_memory_source() {
        let source = InMemoryMacroSource::new(MacroRecords::new(vec![Macro::new(
            "1", "M1", "G0",
        )]));
        assert_eq!(source.list_macros().await.expect("ok").len(), 1);

        source.fail_with(Some(SourceError::Unavailable {
            reason: "down".to_string(),
        }));
        assert!(source.list_macros().await.is_err());

        source.fail_with(None);
        source.set_records(MacroRecords::default());
        assert!(source.list_macros().await.expect("ok").is_empty());
        assert_eq!(source.call_count(), 3);
    }
}
