//! JSON checkpoint implementation
//!
//! Writes the three flat files older tooling expects:
//!
//! - `results_dict.json`: URL to list of emails
//! - `code_dict.json`: URL to HTTP status (`-1` on failure)
//! - `website_mapping.json`: origin index to ordered URLs
//!
//! Each file is written beside its final path and renamed into place.

use crate::crawler::{EmailSet, FAILED_STATUS};
use crate::state::{CrawlState, ExtractionRecord, OriginMapping};
use crate::storage::traits::{CheckpointStore, StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const RESULTS_FILE: &str = "results_dict.json";
pub const CODES_FILE: &str = "code_dict.json";
pub const MAPPING_FILE: &str = "website_mapping.json";

/// JSON file checkpoint backend
#[derive(Debug, Clone)]
pub struct JsonCheckpoint {
    directory: PathBuf,
}

impl JsonCheckpoint {
    /// Uses `directory` for the checkpoint files, creating it if needed
    pub fn new(directory: &Path) -> StorageResult<Self> {
        fs::create_dir_all(directory)?;
        Ok(Self {
            directory: directory.to_path_buf(),
        })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }

    fn write_atomic<T: Serialize>(&self, name: &str, value: &T) -> StorageResult<()> {
        let target = self.path(name);
        let temp = self.path(&format!("{}.tmp", name));
        let contents = serde_json::to_string(value)?;
        fs::write(&temp, contents)?;
        fs::rename(&temp, &target)?;
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> StorageResult<Option<T>> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }
}

impl CheckpointStore for JsonCheckpoint {
    fn persist(&mut self, state: &CrawlState) -> StorageResult<()> {
        let results: BTreeMap<&str, &EmailSet> = state
            .records
            .values()
            .map(|record| (record.url.as_str(), &record.emails))
            .collect();
        let codes: BTreeMap<&str, i32> = state
            .records
            .values()
            .map(|record| (record.url.as_str(), record.status_code))
            .collect();

        self.write_atomic(RESULTS_FILE, &results)?;
        self.write_atomic(CODES_FILE, &codes)?;
        self.write_atomic(MAPPING_FILE, state.mapping.as_map())?;
        Ok(())
    }

    fn load(&self) -> StorageResult<Option<CrawlState>> {
        let Some(mapping) = self.read::<BTreeMap<usize, Vec<String>>>(MAPPING_FILE)? else {
            return Ok(None);
        };

        let mut results: BTreeMap<String, EmailSet> = self
            .read(RESULTS_FILE)?
            .ok_or_else(|| StorageError::Incomplete(format!("missing {}", RESULTS_FILE)))?;
        let codes: BTreeMap<String, i32> = self
            .read(CODES_FILE)?
            .ok_or_else(|| StorageError::Incomplete(format!("missing {}", CODES_FILE)))?;

        let mut records = BTreeMap::new();
        for (url, status) in codes {
            let emails = results.remove(&url).unwrap_or_default();
            records.insert(url.clone(), ExtractionRecord::new(url, emails, status));
        }
        for (url, emails) in results {
            records.insert(url.clone(), ExtractionRecord::new(url, emails, FAILED_STATUS));
        }

        Ok(Some(CrawlState {
            records,
            mapping: OriginMapping::from(mapping),
        }))
    }

    fn artifacts(&self) -> Vec<PathBuf> {
        vec![
            self.path(RESULTS_FILE),
            self.path(CODES_FILE),
            self.path(MAPPING_FILE),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_state() -> CrawlState {
        let mut state = CrawlState::new();
        let emails: EmailSet = vec!["info@alpha.org".to_string()].into_iter().collect();
        state.record(0, ExtractionRecord::new("https://alpha.org/", emails, 200));
        state.record(
            0,
            ExtractionRecord::new("https://alpha.org/about", EmailSet::new(), 500),
        );
        state.record(1, ExtractionRecord::new("http://beta.org/", EmailSet::new(), -1));
        state
    }

    #[test]
    fn test_missing_files_load_none() {
        let dir = TempDir::new().unwrap();
        let store = JsonCheckpoint::new(dir.path()).unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_persist_and_load() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonCheckpoint::new(dir.path()).unwrap();
        let state = sample_state();

        store.persist(&state).unwrap();

        assert_eq!(store.load().unwrap().unwrap(), state);
        for artifact in store.artifacts() {
            assert!(artifact.exists());
        }
        assert!(!dir.path().join("code_dict.json.tmp").exists());
    }

    #[test]
    fn test_file_layout() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonCheckpoint::new(dir.path()).unwrap();
        store.persist(&sample_state()).unwrap();

        let codes: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join(CODES_FILE)).unwrap())
                .unwrap();
        assert_eq!(codes["https://alpha.org/"], 200);
        assert_eq!(codes["http://beta.org/"], -1);

        let mapping: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join(MAPPING_FILE)).unwrap())
                .unwrap();
        assert_eq!(mapping["0"][1], "https://alpha.org/about");

        let results: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join(RESULTS_FILE)).unwrap())
                .unwrap();
        assert_eq!(results["https://alpha.org/"][0], "info@alpha.org");
    }

    #[test]
    fn test_incomplete_checkpoint_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MAPPING_FILE), r#"{"0": ["https://alpha.org/"]}"#).unwrap();

        let store = JsonCheckpoint::new(dir.path()).unwrap();
        assert!(matches!(store.load(), Err(StorageError::Incomplete(_))));
    }
}
