//! JSON snapshot persistence for the record store
//!
//! The whole collection is rewritten on every mutation: serialized to a
//! sibling `.tmp` file, synced, then renamed over the target so readers
//! never observe a half-written file.

use clientmap_core::{ClientRecord, Error, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records. A missing file is an empty collection.
    pub fn load(&self) -> Result<Vec<ClientRecord>> {
        if !self.path.exists() {
            debug!("No snapshot at {:?}, starting empty", self.path);
            return Ok(Vec::new());
        }
        let bytes = fs::read(&self.path)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            Error::Store(format!(
                "Corrupt record snapshot {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Atomically replace the snapshot with `records`
    pub fn save(&self, records: &[ClientRecord]) -> Result<()> {
        let data = serde_json::to_vec_pretty(records)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        let result = write_synced(&temp_path, &data).and_then(|_| {
            fs::rename(&temp_path, &self.path)
        });
        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(Error::Store(format!(
                "Failed to write record snapshot {}: {}",
                self.path.display(),
                e
            )));
        }
        debug!("Wrote {} records to {:?}", records.len(), self.path);
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.as_os_str().to_owned();
        temp.push(".tmp");
        PathBuf::from(temp)
    }
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.flush()?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use clientmap_core::{Coordinate, RecordId, Stage};
    use tempfile::TempDir;

    fn record(id: &str) -> ClientRecord {
        ClientRecord {
            id: RecordId::from_string(id),
            name: "Umbrella".to_string(),
            description: "Raccoon City".to_string(),
            salesperson: "ada@example.com".to_string(),
            stage: Stage::CurrentClient,
            coordinate: Coordinate::new(40.0, -75.0),
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let file = SnapshotFile::new(temp_dir.path().join("records.json"));
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = SnapshotFile::new(temp_dir.path().join("nested/records.json"));

        file.save(&[record("a"), record("b")]).unwrap();
        let loaded = file.load().unwrap();

        assert_eq!(loaded, vec![record("a"), record("b")]);
        assert!(!temp_dir.path().join("nested/records.json.tmp").exists());
    }

    #[test]
    fn test_save_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file = SnapshotFile::new(temp_dir.path().join("records.json"));

        file.save(&[record("a"), record("b")]).unwrap();
        file.save(&[record("c")]).unwrap();

        assert_eq!(file.load().unwrap(), vec![record("c")]);
    }

    #[test]
    fn test_corrupt_file_is_store_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("records.json");
        fs::write(&path, b"{not json").unwrap();

        let err = SnapshotFile::new(&path).load().unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }
}
