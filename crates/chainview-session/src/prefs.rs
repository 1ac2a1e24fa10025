//! Persisted user preferences.
//!
//! One JSON file, currently holding a single entry: the preferred network,
//! a one-shot intent to switch chains on the next connect. Written by the
//! network-switch flow and consumed exactly once via
//! [`Preferences::take_preferred_network`], which reads and clears in one
//! step so the preference never acts as a standing pin.

use chainview_error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
struct PrefsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    preferred_network: Option<u64>,
}

/// File-backed preference store.
#[derive(Debug, Clone)]
pub struct Preferences {
    path: PathBuf,
}

impl Preferences {
    /// Opens (without reading) the store at `path`. A missing file reads as
    /// empty defaults.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    fn load(&self) -> Result<PrefsFile> {
        if !self.path.exists() {
            return Ok(PrefsFile::default());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, prefs: &PrefsFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(prefs)?)?;
        Ok(())
    }

    /// Records `chain_id` as the network to switch to on next connect.
    pub fn set_preferred_network(&self, chain_id: u64) -> Result<()> {
        let mut prefs = self.load()?;
        prefs.preferred_network = Some(chain_id);
        self.save(&prefs)
    }

    /// Peeks at the stored preference without clearing it.
    pub fn preferred_network(&self) -> Result<Option<u64>> {
        Ok(self.load()?.preferred_network)
    }

    /// Reads and clears the stored preference in one step.
    ///
    /// The preference is consumed even if the subsequent switch fails; a
    /// caller that wants the intent to survive a `SwitchFailed` outcome
    /// must store it again via [`Preferences::set_preferred_network`].
    pub fn take_preferred_network(&self) -> Result<Option<u64>> {
        let mut prefs = self.load()?;
        let taken = prefs.preferred_network.take();
        if taken.is_some() {
            self.save(&prefs)?;
        }
        Ok(taken)
    }
}
