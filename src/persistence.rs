//! Persistence for device run state
//!
//! The decision core only mutates the in-memory run-state map it is handed
//! per cycle; keeping that map across process restarts is the caller's job.
//! This module is that collaborator: a small JSON file store for the map.

use crate::devices::RunStateMap;
use crate::error::Result;
use crate::logging::get_logger;
use std::path::Path;

/// JSON-file store for the run-state map
pub struct RunStateStore {
    file_path: String,
    logger: crate::logging::StructuredLogger,
}

impl RunStateStore {
    /// Create a store backed by the given file path.
    pub fn new(file_path: &str) -> Self {
        Self {
            file_path: file_path.to_string(),
            logger: get_logger("persistence"),
        }
    }

    /// Load the run-state map from disk. A missing file is not an error;
    /// every device simply starts out off.
    pub fn load(&self) -> Result<RunStateMap> {
        let path = Path::new(&self.file_path);

        if !path.exists() {
            self.logger
                .info("No run-state file found, all devices start off");
            return Ok(RunStateMap::new());
        }

        let contents = std::fs::read_to_string(path)?;
        let map: RunStateMap = serde_json::from_str(&contents)?;
        self.logger
            .info(&format!("Loaded run state for {} devices", map.len()));

        Ok(map)
    }

    /// Save the run-state map to disk.
    pub fn save(&self, run_state: &RunStateMap) -> Result<()> {
        let contents = serde_json::to_string_pretty(run_state)?;
        std::fs::write(&self.file_path, contents)?;
        self.logger.debug("Saved run state to disk");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{is_running, set_running};

    #[test]
    fn test_missing_file_yields_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let store = RunStateStore::new(path.to_str().unwrap());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_state.json");
        let store = RunStateStore::new(path.to_str().unwrap());

        let mut map = RunStateMap::new();
        set_running(&mut map, "compute-1", true);
        set_running(&mut map, "dump-1", false);
        store.save(&map).unwrap();

        let restored = store.load().unwrap();
        assert!(is_running(&restored, "compute-1"));
        assert!(!is_running(&restored, "dump-1"));
    }
}
