use std::{fs, io, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use tracing::{debug, warn};

/// Maximum number of remembered cities.
pub const MAX_RECENT: usize = 5;

/// Most-recent-first, de-duplicated list of searched cities, persisted as a JSON
/// array of strings.
///
/// Every mutation writes the whole list back before returning.
#[derive(Debug, Clone)]
pub struct RecentCityStore {
    path: PathBuf,
    cities: Vec<String>,
}

impl RecentCityStore {
    /// An empty store backed by `path`. Nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cities: Vec::new(),
        }
    }

    /// Create a store backed by `path` and load whatever is persisted there.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::new(path);
        store.load();
        store
    }

    /// Default location: `recent.json` in the platform data directory.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "cityweather")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(dirs.data_dir().join("recent.json"))
    }

    pub fn all(&self) -> &[String] {
        &self.cities
    }

    /// Replace the in-memory list with the persisted one.
    ///
    /// A missing, unreadable or corrupt file yields an empty list.
    pub fn load(&mut self) {
        self.cities = match fs::read_to_string(&self.path) {
            Ok(contents) => match serde_json::from_str::<Vec<String>>(&contents) {
                Ok(cities) => sanitize(cities),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Recent cities file is corrupt; starting empty");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read recent cities; starting empty");
                Vec::new()
            }
        };
        debug!(count = self.cities.len(), "Loaded recent cities");
    }

    /// Write the full list, creating parent directories as needed.
    pub fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string(&self.cities)
            .context("Failed to serialize recent cities")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write recent cities: {}", self.path.display()))
    }

    /// Move `city` to the front, dropping any exact (case-sensitive) duplicate,
    /// and keep only the newest [`MAX_RECENT`] entries.
    pub fn record(&mut self, city: &str) -> Result<()> {
        self.cities.retain(|c| c != city);
        self.cities.insert(0, city.to_string());
        self.cities.truncate(MAX_RECENT);
        self.persist()
    }

    /// Delete by position. Out-of-range positions leave the list untouched.
    pub fn remove(&mut self, index: usize) -> Result<()> {
        if index >= self.cities.len() {
            debug!(index, len = self.cities.len(), "Ignoring out-of-range removal");
            return Ok(());
        }
        self.cities.remove(index);
        self.persist()
    }
}

fn sanitize(cities: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(MAX_RECENT);
    for city in cities {
        if out.len() == MAX_RECENT {
            break;
        }
        if !city.trim().is_empty() && !out.contains(&city) {
            out.push(city);
        }
    }
    out
}
