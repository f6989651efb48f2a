//! Append-only CSV log of feedback records.
//!
//! The store is a single delimited text file with a header row followed by one
//! row per prediction. Rows are never rewritten. Appends within one process are
//! serialized by an explicit lock and each record reaches the file through a
//! single `write_all`, so two requests can never interleave inside a row.
//! Nothing guards against a second process writing the same file; deployments
//! are expected to run a single writer.

use crate::constants::{FEEDBACK_HEADER, TAG_SEPARATOR};
use crate::types::{validate_timestamp, FeedbackRecord, Sentiment};
use crate::{Error, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Records read back from the log, plus the number of rows that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub records: Vec<FeedbackRecord>,
    pub skipped_rows: usize,
}

impl StoreSnapshot {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Append-only feedback log backed by a CSV file.
#[derive(Debug)]
pub struct FeedbackStore {
    path: PathBuf,
    append_lock: Mutex<()>,
}

impl FeedbackStore {
    /// Create a handle without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Mutex::new(()),
        }
    }

    /// Create a handle and make sure the file and its header exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(path);
        store.initialize()?;
        Ok(store)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Create parent directories and the file, writing the header if the file is empty.
    pub fn initialize(&self) -> Result<()> {
        let _guard = self.append_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = self.open_for_append()?;
        if file.metadata()?.len() == 0 {
            file.write_all(&encode_rows(None)?)?;
            info!("Initialized feedback log at {}", self.path.display());
        }
        Ok(())
    }

    /// Append one record as a single CSV row.
    pub fn append(&self, record: &FeedbackRecord) -> Result<()> {
        let _guard = self.append_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = self.open_for_append()?;
        // The header is normally written by `initialize`; this covers a log
        // deleted or truncated while the service is running.
        let needs_header = file.metadata()?.len() == 0;
        let bytes = if needs_header {
            warn!(
                "Feedback log {} was empty on append, rewriting header",
                self.path.display()
            );
            let mut bytes = encode_rows(None)?;
            bytes.extend(encode_rows(Some(record))?);
            bytes
        } else {
            encode_rows(Some(record))?
        };
        file.write_all(&bytes)?;
        file.flush()?;
        debug!(
            "Appended feedback record ({} tags, {})",
            record.tags.len(),
            record.sentiment
        );
        Ok(())
    }

    /// Read every well-formed record after the header.
    ///
    /// Fails with [`Error::StoreUnavailable`] when the file does not exist.
    /// Malformed rows are skipped and counted instead of failing the read.
    pub fn read_all(&self) -> Result<StoreSnapshot> {
        if !self.exists() {
            return Err(Error::StoreUnavailable(self.path.display().to_string()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let mut snapshot = StoreSnapshot::default();
        for row in reader.records() {
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    warn!("Skipping unreadable feedback row: {}", err);
                    snapshot.skipped_rows += 1;
                    continue;
                }
            };
            match parse_row(&row) {
                Ok(record) => snapshot.records.push(record),
                Err(err) => {
                    let line = row.position().map(|p| p.line()).unwrap_or_default();
                    warn!("Skipping malformed feedback row at line {}: {}", line, err);
                    snapshot.skipped_rows += 1;
                }
            }
        }

        Ok(snapshot)
    }

    fn open_for_append(&self) -> Result<fs::File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?)
    }
}

/// Encode the header (`None`) or a record row into CSV bytes.
fn encode_rows(record: Option<&FeedbackRecord>) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    match record {
        None => writer.write_record(FEEDBACK_HEADER)?,
        Some(record) => writer.write_record([
            record.timestamp.as_str(),
            record.raw_text.as_str(),
            record.tags.join(TAG_SEPARATOR).as_str(),
            record.sentiment.as_str(),
            format!("{:?}", record.score).as_str(),
        ])?,
    }
    writer
        .into_inner()
        .map_err(|e| Error::store(format!("failed to encode feedback row: {}", e)))
}

fn parse_row(row: &csv::StringRecord) -> Result<FeedbackRecord> {
    if row.len() != FEEDBACK_HEADER.len() {
        return Err(Error::Validation(format!(
            "expected {} fields, found {}",
            FEEDBACK_HEADER.len(),
            row.len()
        )));
    }

    let timestamp = row[0].trim();
    validate_timestamp(timestamp)?;

    let tags = row[2]
        .split(TAG_SEPARATOR)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect();

    let sentiment: Sentiment = row[3].parse()?;

    let score: f64 = row[4]
        .trim()
        .parse()
        .map_err(|_| Error::Validation(format!("invalid score '{}'", &row[4])))?;
    if !score.is_finite() || !(0.0..=1.0).contains(&score) {
        return Err(Error::Validation(format!("score {} outside [0, 1]", score)));
    }

    Ok(FeedbackRecord {
        timestamp: timestamp.to_string(),
        raw_text: row[1].to_string(),
        tags,
        sentiment,
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn unique_log_path() -> PathBuf {
        let epoch_nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let seq = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir()
            .join(format!("revtag_store_{}_{}", epoch_nanos, seq))
            .join("reviews.csv")
    }

    fn record(text: &str, tags: &[&str], sentiment: Sentiment, score: f64) -> FeedbackRecord {
        FeedbackRecord::new(
            text,
            tags.iter().map(|t| t.to_string()).collect(),
            sentiment,
            score,
        )
    }

    #[test]
    fn read_all_fails_when_log_missing() {
        let store = FeedbackStore::new(unique_log_path());
        assert!(matches!(store.read_all(), Err(Error::StoreUnavailable(_))));
    }

    #[test]
    fn open_writes_header_once() -> Result<()> {
        let path = unique_log_path();
        let store = FeedbackStore::open(&path)?;
        store.initialize()?;
        let _reopened = FeedbackStore::open(&path)?;

        let content = fs::read_to_string(&path)?;
        assert_eq!(content, "timestamp,feedback,tags,sentiment,score\r\n");
        assert!(store.read_all()?.is_empty());
        Ok(())
    }

    #[test]
    fn append_then_read_preserves_order_and_fields() -> Result<()> {
        let store = FeedbackStore::open(unique_log_path())?;
        let first = record(
            "Great, fast delivery",
            &["delivery", "quality"],
            Sentiment::Positive,
            0.33,
        );
        let second = record("meh", &[], Sentiment::Neutral, 0.0);
        store.append(&first)?;
        store.append(&second)?;

        let snapshot = store.read_all()?;
        assert_eq!(snapshot.skipped_rows, 0);
        assert_eq!(snapshot.records, vec![first, second]);

        let content = fs::read_to_string(store.path())?;
        assert_eq!(content.matches("timestamp,feedback").count(), 1);
        assert!(content.contains("\"Great, fast delivery\",\"delivery, quality\",positive,0.33"));
        assert!(content.contains(",meh,,neutral,0.0"));
        Ok(())
    }

    #[test]
    fn append_restores_header_after_external_truncation() -> Result<()> {
        let store = FeedbackStore::open(unique_log_path())?;
        fs::write(store.path(), "")?;
        store.append(&record("again", &["price"], Sentiment::Negative, 0.5))?;

        let content = fs::read_to_string(store.path())?;
        assert!(content.starts_with("timestamp,feedback,tags,sentiment,score\r\n"));
        assert_eq!(store.read_all()?.records.len(), 1);
        Ok(())
    }

    #[test]
    fn malformed_rows_are_skipped_and_counted() -> Result<()> {
        let store = FeedbackStore::open(unique_log_path())?;
        store.append(&record("good one", &["quality"], Sentiment::Positive, 0.25))?;
        let mut file = OpenOptions::new().append(true).open(store.path())?;
        file.write_all(b"only,three,fields\r\n")?;
        file.write_all(b"not-a-date,text,quality,positive,0.25\r\n")?;
        file.write_all(b"2024-01-01T00:00:00.000000,text,quality,ecstatic,0.25\r\n")?;
        file.write_all(b"2024-01-01T00:00:00.000000,text,quality,positive,1.5\r\n")?;
        file.write_all(b"2024-01-01T00:00:00.000000,text,,neutral,0.0\r\n")?;

        let snapshot = store.read_all()?;
        assert_eq!(snapshot.skipped_rows, 4);
        assert_eq!(snapshot.records.len(), 2);
        assert!(snapshot.records[1].tags.is_empty());
        Ok(())
    }

    #[test]
    fn concurrent_appends_do_not_interleave() -> Result<()> {
        let store = Arc::new(FeedbackStore::open(unique_log_path())?);
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || -> Result<()> {
                    for i in 0..25 {
                        let text = format!("worker {} review {} {}", worker, i, "x".repeat(512));
                        let tags = ["quality", "price"];
                        store.append(&record(&text, &tags, Sentiment::Neutral, 0.4))?;
                    }
                    Ok(())
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("append thread panicked")?;
        }

        let snapshot = store.read_all()?;
        assert_eq!(snapshot.skipped_rows, 0);
        assert_eq!(snapshot.records.len(), 200);
        Ok(())
    }
}
