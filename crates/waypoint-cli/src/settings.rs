use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use waypoint_geometry::Metrics;

const APP_DIR: &str = "waypoint";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub metrics: Metrics,
    pub callout: CalloutSettings,
    /// SQLite file holding tour progress. Defaults to the user data directory.
    pub progress_db: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalloutSettings {
    pub width: f64,
    pub height: f64,
}

impl Default for CalloutSettings {
    fn default() -> Self {
        let size = waypoint_tour::callout::DEFAULT_CALLOUT_SIZE;
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("settings.json"))
    }

    pub fn load_from(path: &Path) -> Self {
        tracing::info!("Loading settings from {:?}", path);
        if !path.exists() {
            tracing::info!("Settings file not found, using defaults");
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => {
                    tracing::debug!("Settings loaded: {:?}", settings);
                    settings
                }
                Err(e) => {
                    tracing::error!("Failed to parse settings: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::error!("Failed to read settings file: {}", e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Where the progress database lives, honoring the configured override.
    pub fn progress_db_path(&self) -> PathBuf {
        self.progress_db.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(APP_DIR)
                .join("progress.db")
        })
    }
}
