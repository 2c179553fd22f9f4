use chrono::Utc;
use csv::Writer;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::models::TradeLogRecord;
use crate::Result;

/// Append-only CSV sink for per-iteration trade data
///
/// One file per process run. The header is written when the file is
/// created; every row is flushed as soon as it is appended, so a crash
/// never leaves a partial record.
pub struct TradeLog {
    writer: Writer<File>,
    path: PathBuf,
}

impl TradeLog {
    /// Create `trade_data_<UTC timestamp>.csv` under `dir` for this run,
    /// creating the directory when it is missing.
    pub fn create_in(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("trade_data_{}.csv", stamp));
        Self::open(path)
    }

    /// Open a specific file path, appending without a second header when
    /// it already exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let write_header = !path.exists();

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);

        Ok(Self { writer, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row and flush it to disk.
    pub fn append(&mut self, record: &TradeLogRecord) -> Result<()> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use chrono::{TimeZone, Utc};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "autotrader_{}_{}.csv",
            name,
            std::process::id()
        ))
    }

    fn sample_record() -> TradeLogRecord {
        TradeLogRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            symbol: "EURUSD".to_string(),
            exposure: 1.0,
            last_close: Some(1.1050),
            sma: Some(1.1005),
            signal: Direction::Buy,
            account_balance: 10000.0,
            account_equity: 10012.5,
        }
    }

    #[test]
    fn test_record_round_trip() {
        let path = temp_path("round_trip");
        let _ = fs::remove_file(&path);

        let record = sample_record();
        {
            let mut log = TradeLog::open(&path).unwrap();
            log.append(&record).unwrap();
        }

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<TradeLogRecord> = reader
            .deserialize()
            .collect::<std::result::Result<_, _>>()
            .unwrap();

        assert_eq!(rows, vec![record]);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_signal_fields_round_trip_empty() {
        let path = temp_path("flat_fields");
        let _ = fs::remove_file(&path);

        let record = TradeLogRecord {
            last_close: None,
            sma: None,
            signal: Direction::Flat,
            ..sample_record()
        };
        {
            let mut log = TradeLog::open(&path).unwrap();
            log.append(&record).unwrap();
        }

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<TradeLogRecord> = reader
            .deserialize()
            .collect::<std::result::Result<_, _>>()
            .unwrap();

        assert_eq!(rows[0].last_close, None);
        assert_eq!(rows[0].sma, None);
        assert_eq!(rows[0].signal, Direction::Flat);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_header_written_once_across_reopen() {
        let path = temp_path("reopen");
        let _ = fs::remove_file(&path);

        {
            let mut log = TradeLog::open(&path).unwrap();
            log.append(&sample_record()).unwrap();
        }
        {
            let mut log = TradeLog::open(&path).unwrap();
            log.append(&sample_record()).unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        let header_lines = contents
            .lines()
            .filter(|l| l.starts_with("timestamp,"))
            .count();
        assert_eq!(header_lines, 1);
        assert_eq!(contents.lines().count(), 3);
        fs::remove_file(&path).unwrap();
    }
}
