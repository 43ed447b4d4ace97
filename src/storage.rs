use crate::errors::TrackerError;
use crate::models::{Entry, Goals};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, warn};

pub const ENTRIES_KEY: &str = "fitness_tracker_entries_v1";
pub const GOALS_KEY: &str = "fitness_tracker_goals_v1";

/// Key-value store backed by one JSON file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub async fn ensure_dir(&self) -> Result<(), TrackerError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Missing or unparseable blobs yield an empty list; unreadable records are skipped.
    pub async fn load_entries(&self) -> Vec<Entry> {
        let Some(bytes) = self.read_key(ENTRIES_KEY).await else {
            return Vec::new();
        };

        let raw: Vec<Value> = match serde_json::from_slice(&bytes) {
            Ok(raw) => raw,
            Err(err) => {
                error!("failed to parse entries blob: {err}");
                return Vec::new();
            }
        };

        raw.into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<Entry>(value) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(index, "skipping unreadable entry: {err}");
                    None
                }
            })
            .collect()
    }

    pub async fn save_entries(&self, entries: &[Entry]) -> Result<(), TrackerError> {
        self.write_key(ENTRIES_KEY, entries).await
    }

    /// Missing fields take defaults; a corrupt blob falls back to defaults entirely.
    pub async fn load_goals(&self) -> Goals {
        let Some(bytes) = self.read_key(GOALS_KEY).await else {
            return Goals::default();
        };

        match serde_json::from_slice::<Option<Goals>>(&bytes) {
            Ok(goals) => goals.unwrap_or_default(),
            Err(err) => {
                error!("failed to parse goals blob: {err}");
                Goals::default()
            }
        }
    }

    pub async fn save_goals(&self, goals: &Goals) -> Result<(), TrackerError> {
        self.write_key(GOALS_KEY, goals).await
    }

    async fn read_key(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.key_path(key);
        match fs::read(&path).await {
            Ok(bytes) => Some(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                error!("failed to read {}: {err}", path.display());
                None
            }
        }
    }

    async fn write_key<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), TrackerError> {
        let payload = serde_json::to_vec_pretty(value)?;
        fs::write(self.key_path(key), payload).await?;
        Ok(())
    }
}
