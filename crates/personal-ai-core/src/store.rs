//! Local storage for the trained profile.
//!
//! The whole persisted state is one JSON record under a fixed key. The form
//! writes it wholesale on submission; the chat only ever reads it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::profile::Profile;

/// Fixed key the profile is stored under.
pub const STORAGE_KEY: &str = "personalAIData";

pub trait ProfileStore {
    /// Read the stored profile, `None` if nothing has been saved yet.
    fn load(&self) -> Result<Option<Profile>>;

    /// Replace the stored profile. Either the whole record lands or nothing does.
    fn save(&mut self, profile: &Profile) -> Result<()>;
}

/// JSON file store, `<data_dir>/personal-ai/personalAIData.json` by default.
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the configured path, or the default location in the data dir.
    pub fn from_config(config: &Config) -> Result<Self> {
        let path = match &config.store_path {
            Some(path) => path.clone(),
            None => Config::data_dir()?.join(format!("{}.json", STORAGE_KEY)),
        };
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for FileProfileStore {
    fn load(&self) -> Result<Option<Profile>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no stored profile");
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let profile: Profile = serde_json::from_str(&content)?;
        Ok(Some(profile))
    }

    fn save(&mut self, profile: &Profile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Serialize before touching disk so a bad record never clobbers a good one
        let content = serde_json::to_string_pretty(profile)?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)?;

        info!(path = %self.path.display(), name = %profile.name, "saved profile");
        Ok(())
    }
}

/// In-memory store, for tests and for running without a data directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    profile: Option<Profile>,
    writes: usize,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(profile: Profile) -> Self {
        Self {
            profile: Some(profile),
            writes: 0,
        }
    }

    /// How many times `save` has been called.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load(&self) -> Result<Option<Profile>> {
        Ok(self.profile.clone())
    }

    fn save(&mut self, profile: &Profile) -> Result<()> {
        self.profile = Some(profile.clone());
        self.writes += 1;
        Ok(())
    }
}
