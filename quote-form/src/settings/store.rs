use crate::error::{FormError, Result};
use crate::settings::Settings;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Settings persisted as a single JSON blob on disk.
///
/// Nothing is cached: every `load` reads the file again, so a save from the
/// admin page is visible to the next submission.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record, or defaults if it was never saved
    pub async fn load(&self) -> Result<Settings> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", self.path.display());
                return Ok(Settings::default());
            }
            Err(e) => {
                return Err(FormError::Settings(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_slice(&content).map_err(|e| {
            FormError::Settings(format!("Corrupt settings at {}: {}", self.path.display(), e))
        })
    }

    pub async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    FormError::Settings(format!("Failed to create directory {:?}: {}", parent, e))
                })?;
            }
        }

        let data = serde_json::to_vec_pretty(settings)?;

        // Write beside the target, then rename over it (atomic operation)
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, data).await?;
        fs::rename(&tmp_path, &self.path).await?;

        info!("Saved settings to {}", self.path.display());

        Ok(())
    }
}
