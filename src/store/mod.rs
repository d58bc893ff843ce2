//! File-backed document store.
//!
//! Every slot is an independent pretty-printed JSON file under the data
//! directory. Writes fully replace the file and are not atomic; there is no
//! locking, so the last writer wins. Uploaded images and datasets live next
//! to the slots as raw files.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Named JSON documents kept by the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Progress,
    Roteiro,
    Checklist,
    OcrResult,
    Plataforma,
    EtapaAtual,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::Progress,
        Slot::Roteiro,
        Slot::Checklist,
        Slot::OcrResult,
        Slot::Plataforma,
        Slot::EtapaAtual,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Slot::Progress => "progress",
            Slot::Roteiro => "roteiro",
            Slot::Checklist => "checklist",
            Slot::OcrResult => "ocr_result",
            Slot::Plataforma => "plataforma",
            Slot::EtapaAtual => "etapa_atual",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.name())
    }
}

/// Raw binary uploads stored under fixed names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset {
    /// Screenshot of the dashboard on the origin platform
    SourceImage,
    /// Screenshot of the dashboard rebuilt in Power BI
    TargetImage,
}

impl Asset {
    pub fn file_name(&self) -> &'static str {
        match self {
            Asset::SourceImage => "uploaded_image.png",
            Asset::TargetImage => "powerbi_dashboard.png",
        }
    }
}

/// Subdirectory holding uploads that have not been accepted yet
const STAGING_DIR: &str = ".staging";

/// File extensions recognised as tabular datasets
pub const DATASET_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("slot '{slot}' holds invalid JSON: {source}")]
    Parse {
        slot: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize slot '{slot}': {source}")]
    Serialize {
        slot: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid upload file name '{0}'")]
    InvalidFileName(String),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Typed access to the slots under one data directory
#[derive(Debug, Clone)]
pub struct Store {
    data_dir: PathBuf,
}

impl Store {
    /// Open (and create if needed) a store rooted at `data_dir`
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|e| StoreError::io(&data_dir, e))?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn slot_path(&self, slot: Slot) -> PathBuf {
        self.data_dir.join(slot.file_name())
    }

    pub fn exists(&self, slot: Slot) -> bool {
        self.slot_path(slot).exists()
    }

    /// Load a slot; a slot that was never written yields `T::default()`
    pub fn get<T>(&self, slot: Slot) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.slot_path(slot);
        if !path.exists() {
            return Ok(T::default());
        }

        let contents = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
        serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
            slot: slot.name(),
            source,
        })
    }

    /// Replace a slot's content with `value`
    pub fn put<T>(&self, slot: Slot, value: &T) -> Result<(), StoreError>
    where
        T: Serialize,
    {
        let path = self.slot_path(slot);
        let contents =
            serde_json::to_string_pretty(value).map_err(|source| StoreError::Serialize {
                slot: slot.name(),
                source,
            })?;
        fs::write(&path, contents).map_err(|e| StoreError::io(&path, e))?;
        tracing::debug!(slot = slot.name(), "Slot written");
        Ok(())
    }

    pub fn asset_path(&self, asset: Asset) -> PathBuf {
        self.data_dir.join(asset.file_name())
    }

    pub fn has_asset(&self, asset: Asset) -> bool {
        self.asset_path(asset).is_file()
    }

    pub fn put_asset(&self, asset: Asset, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        let path = self.asset_path(asset);
        fs::write(&path, bytes).map_err(|e| StoreError::io(&path, e))?;
        tracing::info!(asset = asset.file_name(), bytes = bytes.len(), "Asset stored");
        Ok(path)
    }

    pub fn read_asset(&self, asset: Asset) -> Result<Vec<u8>, StoreError> {
        let path = self.asset_path(asset);
        fs::read(&path).map_err(|e| StoreError::io(&path, e))
    }

    /// Store an uploaded dataset under its original file name.
    ///
    /// Only the final path component is kept so a name cannot escape the
    /// data directory.
    pub fn put_upload(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        let staged = self.stage_upload(file_name, bytes)?;
        self.commit_upload(&staged)
    }

    /// Write an upload under the staging directory, where
    /// [`Store::find_dataset`] does not look
    pub fn stage_upload(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        let base = upload_name(file_name)?;
        let staging = self.data_dir.join(STAGING_DIR);
        fs::create_dir_all(&staging).map_err(|e| StoreError::io(&staging, e))?;
        let path = staging.join(base);
        fs::write(&path, bytes).map_err(|e| StoreError::io(&path, e))?;
        Ok(path)
    }

    /// Move a staged upload next to the slots, replacing any file of that name
    pub fn commit_upload(&self, staged: &Path) -> Result<PathBuf, StoreError> {
        let base = staged
            .file_name()
            .ok_or_else(|| StoreError::InvalidFileName(staged.display().to_string()))?;
        let path = self.data_dir.join(base);
        fs::rename(staged, &path).map_err(|e| StoreError::io(&path, e))?;
        let bytes = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        tracing::info!(file = %path.display(), bytes, "Upload stored");
        Ok(path)
    }

    /// Drop a staged upload that will not be committed
    pub fn discard_upload(&self, staged: &Path) {
        if let Err(e) = fs::remove_file(staged) {
            tracing::warn!(path = %staged.display(), error = %e, "Failed to remove staged upload");
        }
    }

    /// First dataset file in the data directory, by file name order
    pub fn find_dataset(&self) -> Result<Option<PathBuf>, StoreError> {
        let entries = fs::read_dir(&self.data_dir).map_err(|e| StoreError::io(&self.data_dir, e))?;

        let mut datasets: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_dataset_file(path))
            .collect();
        datasets.sort();
        Ok(datasets.into_iter().next())
    }
}

fn upload_name(file_name: &str) -> Result<&std::ffi::OsStr, StoreError> {
    Path::new(file_name)
        .file_name()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| StoreError::InvalidFileName(file_name.to_string()))
}

/// Whether a path has a tabular dataset extension
pub fn is_dataset_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| DATASET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OcrResult, PlatformSelection, ProgressRecord};
    use tempfile::TempDir;

    fn test_store() -> (TempDir, Store) {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path().join("data")).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_open_creates_directory() {
        let (temp_dir, store) = test_store();
        assert!(temp_dir.path().join("data").is_dir());
        assert_eq!(store.data_dir(), temp_dir.path().join("data"));
    }

    #[test]
    fn test_unwritten_slot_yields_default() {
        let (_temp_dir, store) = test_store();
        let ocr: OcrResult = store.get(Slot::OcrResult).unwrap();
        assert!(ocr.is_empty());
        assert!(!store.exists(Slot::OcrResult));
    }

    #[test]
    fn test_put_replaces_previous_content() {
        let (_temp_dir, store) = test_store();
        store
            .put(Slot::OcrResult, &OcrResult { text: "first".into() })
            .unwrap();
        store
            .put(Slot::OcrResult, &OcrResult { text: "second".into() })
            .unwrap();

        let ocr: OcrResult = store.get(Slot::OcrResult).unwrap();
        assert_eq!(ocr.text, "second");
    }

    #[test]
    fn test_slot_files_use_slot_names() {
        let (_temp_dir, store) = test_store();
        store
            .put(Slot::Plataforma, &PlatformSelection::default())
            .unwrap();
        assert!(store.data_dir().join("plataforma.json").exists());
        assert_eq!(Slot::EtapaAtual.file_name(), "etapa_atual.json");
    }

    #[test]
    fn test_corrupt_slot_is_reported() {
        let (_temp_dir, store) = test_store();
        std::fs::write(store.slot_path(Slot::Progress), "{ not json").unwrap();

        let result: Result<ProgressRecord, _> = store.get(Slot::Progress);
        assert!(matches!(result, Err(StoreError::Parse { slot: "progress", .. })));
    }

    #[test]
    fn test_assets_round_trip() {
        let (_temp_dir, store) = test_store();
        assert!(!store.has_asset(Asset::SourceImage));

        store.put_asset(Asset::SourceImage, b"\x89PNG data").unwrap();
        assert!(store.has_asset(Asset::SourceImage));
        assert!(!store.has_asset(Asset::TargetImage));
        assert_eq!(store.read_asset(Asset::SourceImage).unwrap(), b"\x89PNG data");
    }

    #[test]
    fn test_upload_keeps_only_file_name() {
        let (_temp_dir, store) = test_store();
        let path = store.put_upload("../../vendas.csv", b"a,b\n1,2\n").unwrap();
        assert_eq!(path, store.data_dir().join("vendas.csv"));
        assert!(matches!(
            store.put_upload("", b""),
            Err(StoreError::InvalidFileName(_))
        ));
    }

    #[test]
    fn test_find_dataset_picks_first_by_name() {
        let (_temp_dir, store) = test_store();
        assert!(store.find_dataset().unwrap().is_none());

        store.put_upload("zeta.xlsx", b"").unwrap();
        store.put_upload("alpha.CSV", b"a\n").unwrap();
        store.put_upload("notes.txt", b"").unwrap();

        let found = store.find_dataset().unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), "alpha.CSV");
    }

    #[test]
    fn test_staged_upload_is_invisible_until_committed() {
        let (_temp_dir, store) = test_store();
        let staged = store.stage_upload("vendas.csv", b"a,b\n1,2\n").unwrap();
        assert!(store.find_dataset().unwrap().is_none());

        let path = store.commit_upload(&staged).unwrap();
        assert_eq!(path, store.data_dir().join("vendas.csv"));
        assert!(!staged.exists());
        assert_eq!(store.find_dataset().unwrap(), Some(path));
    }

    #[test]
    fn test_discarded_upload_leaves_existing_file() {
        let (_temp_dir, store) = test_store();
        let good = store.put_upload("vendas.csv", b"a,b\n1,2\n").unwrap();

        let staged = store.stage_upload("vendas.csv", b"broken").unwrap();
        store.discard_upload(&staged);

        assert_eq!(fs::read(&good).unwrap(), b"a,b\n1,2\n");
        assert!(!staged.exists());
    }
}
