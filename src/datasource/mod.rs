//! Tabular data sources used by the data validation step.
//!
//! Only file uploads are handled here. Database and cloud connectors plug in
//! by implementing [`DataSource`].

mod file;

pub use file::FileSource;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("unsupported file format '{0}' (expected .csv or .xlsx)")]
    UnsupportedFormat(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("dataset has no columns")]
    Empty,

    #[error("{0}")]
    Other(String),
}

/// Rows and columns loaded from a source; every cell is kept as text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TabularData {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, ConnectorError> {
        if columns.iter().all(|c| c.trim().is_empty()) {
            return Err(ConnectorError::Empty);
        }
        Ok(Self { columns, rows })
    }

    /// First `n` rows, for previews
    pub fn head(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column names joined the way prompts list them
    pub fn column_list(&self) -> String {
        self.columns.join(", ")
    }
}

/// A connector that yields a table with named columns
pub trait DataSource: Send + Sync {
    /// Short description for status lines and logs
    fn describe(&self) -> String;

    fn load(&self) -> Result<TabularData, ConnectorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TabularData {
        TabularData::new(
            vec!["regiao".into(), "receita".into()],
            (0..8)
                .map(|i| vec![format!("r{}", i), format!("{}", i * 10)])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_head_is_bounded() {
        let data = table();
        assert_eq!(data.head(5).len(), 5);
        assert_eq!(data.head(50).len(), 8);
        assert_eq!(data.head(0).len(), 0);
    }

    #[test]
    fn test_column_list() {
        assert_eq!(table().column_list(), "regiao, receita");
    }

    #[test]
    fn test_blank_header_is_rejected() {
        assert!(matches!(
            TabularData::new(vec![String::new()], Vec::new()),
            Err(ConnectorError::Empty)
        ));
    }
}
