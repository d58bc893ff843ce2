//! CSV and spreadsheet file connector

use calamine::{open_workbook_auto, Reader};
use std::path::{Path, PathBuf};

use super::{ConnectorError, DataSource, TabularData};

/// Dataset stored as a local `.csv`, `.xlsx` or `.xls` file
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

enum FileKind {
    Csv,
    Spreadsheet,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn kind(&self) -> Result<FileKind, ConnectorError> {
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(FileKind::Csv),
            "xlsx" | "xls" => Ok(FileKind::Spreadsheet),
            _ => Err(ConnectorError::UnsupportedFormat(
                self.path.display().to_string(),
            )),
        }
    }

    fn load_csv(&self) -> Result<TabularData, ConnectorError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;

        let columns = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        TabularData::new(columns, rows)
    }

    fn load_spreadsheet(&self) -> Result<TabularData, ConnectorError> {
        let mut workbook = open_workbook_auto(&self.path)
            .map_err(|e| ConnectorError::Spreadsheet(e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ConnectorError::Spreadsheet("workbook has no sheets".to_string()))?
            .map_err(|e| ConnectorError::Spreadsheet(e.to_string()))?;

        let mut rows = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>());

        let columns = rows.next().ok_or(ConnectorError::Empty)?;
        let columns = columns.into_iter().map(|c| c.trim().to_string()).collect();
        TabularData::new(columns, rows.collect())
    }
}

impl DataSource for FileSource {
    fn describe(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn load(&self) -> Result<TabularData, ConnectorError> {
        if !self.path.is_file() {
            return Err(ConnectorError::Io {
                path: self.path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            });
        }

        let data = match self.kind()? {
            FileKind::Csv => self.load_csv()?,
            FileKind::Spreadsheet => self.load_spreadsheet()?,
        };
        tracing::info!(
            source = %self.describe(),
            columns = data.columns.len(),
            rows = data.row_count(),
            "Dataset loaded"
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_csv_columns_and_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vendas.csv");
        std::fs::write(&path, "data, regiao ,receita\n2024-01-01,Sul,100\n2024-01-02,Norte,250\n")
            .unwrap();

        let data = FileSource::new(&path).load().unwrap();
        assert_eq!(data.columns, vec!["data", "regiao", "receita"]);
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.rows[1], vec!["2024-01-02", "Norte", "250"]);
    }

    #[test]
    fn test_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dados.parquet");
        std::fs::write(&path, "x").unwrap();

        assert!(matches!(
            FileSource::new(&path).load(),
            Err(ConnectorError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileSource::new(temp_dir.path().join("nada.csv")).load();
        assert!(matches!(result, Err(ConnectorError::Io { .. })));
    }

    #[test]
    fn test_corrupt_spreadsheet_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("quebrado.xlsx");
        std::fs::write(&path, "definitely not a zip archive").unwrap();

        assert!(matches!(
            FileSource::new(&path).load(),
            Err(ConnectorError::Spreadsheet(_))
        ));
    }

    #[test]
    fn test_describe_uses_file_name() {
        assert_eq!(FileSource::new("/tmp/x/base.xlsx").describe(), "base.xlsx");
    }
}
