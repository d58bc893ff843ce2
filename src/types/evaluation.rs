//! User evaluation collected at the end of the wizard

use chrono::{Local, NaiveDateTime};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Column names of the evaluation file
pub const EVALUATION_HEADER: [&str; 4] = ["data", "recomendaria", "nota_geral", "comentario"];

/// Default evaluation file name inside the output directory
pub const EVALUATION_FILE: &str = "avaliacoes.csv";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("failed to write evaluation file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode evaluation row: {0}")]
    Csv(#[from] csv::Error),
}

/// One submitted evaluation row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRecord {
    pub timestamp: NaiveDateTime,
    pub recommend: bool,
    pub rating: u8,
    pub comment: String,
}

impl EvaluationRecord {
    /// Create a record stamped with the current local time
    pub fn new(
        recommend: bool,
        rating: u8,
        comment: impl Into<String>,
    ) -> Result<Self, EvaluationError> {
        Self::at(Local::now().naive_local(), recommend, rating, comment)
    }

    pub fn at(
        timestamp: NaiveDateTime,
        recommend: bool,
        rating: u8,
        comment: impl Into<String>,
    ) -> Result<Self, EvaluationError> {
        if !(1..=5).contains(&rating) {
            return Err(EvaluationError::InvalidRating(rating));
        }
        Ok(Self {
            timestamp,
            recommend,
            rating,
            comment: comment.into(),
        })
    }

    fn to_row(&self) -> [String; 4] {
        [
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            if self.recommend { "Sim" } else { "Não" }.to_string(),
            self.rating.to_string(),
            self.comment.clone(),
        ]
    }
}

/// Append-only CSV log of evaluations
pub struct EvaluationLog {
    path: PathBuf,
}

impl EvaluationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log stored as `avaliacoes.csv` under `output_dir`
    pub fn in_dir(output_dir: &Path) -> Self {
        Self::new(output_dir.join(EVALUATION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, writing the header first when the file is new
    pub fn append(&self, record: &EvaluationRecord) -> Result<(), EvaluationError> {
        let io_err = |source| EvaluationError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let write_header = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;

        let mut writer = csv::Writer::from_writer(file);
        if write_header {
            writer.write_record(EVALUATION_HEADER)?;
        }
        writer.write_record(record.to_row())?;
        writer.flush().map_err(io_err)?;

        tracing::info!(
            rating = record.rating,
            recommend = record.recommend,
            path = %self.path.display(),
            "Evaluation recorded"
        );
        Ok(())
    }

    /// Read every data row (header excluded)
    pub fn rows(&self) -> Result<Vec<Vec<String>>, EvaluationError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at_noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_rating_out_of_range_is_rejected() {
        assert!(matches!(
            EvaluationRecord::at(at_noon(), true, 0, ""),
            Err(EvaluationError::InvalidRating(0))
        ));
        assert!(matches!(
            EvaluationRecord::at(at_noon(), true, 6, ""),
            Err(EvaluationError::InvalidRating(6))
        ));
        assert!(EvaluationRecord::at(at_noon(), false, 5, "").is_ok());
    }

    #[test]
    fn test_append_writes_header_once() {
        let temp_dir = TempDir::new().unwrap();
        let log = EvaluationLog::in_dir(temp_dir.path());

        let first = EvaluationRecord::at(at_noon(), true, 4, "ótimo, rápido").unwrap();
        let second = EvaluationRecord::at(at_noon(), false, 2, "").unwrap();
        log.append(&first).unwrap();
        log.append(&second).unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(contents.matches("data,recomendaria").count(), 1);

        let rows = log.rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["2024-06-01 12:00:00", "Sim", "4", "ótimo, rápido"]);
        assert_eq!(rows[1][1], "Não");
    }

    #[test]
    fn test_rows_of_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let log = EvaluationLog::in_dir(temp_dir.path());
        assert!(log.rows().unwrap().is_empty());
    }
}
