use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppPaths {
    pub db_path: PathBuf,
    pub thumbs_dir: PathBuf,
}

impl Default for AppPaths {
    fn default() -> Self {
        let dirs = directories::ProjectDirs::from("", "", "chromadex");
        let data_dir = dirs
            .as_ref()
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        let cache_dir = dirs
            .as_ref()
            .map(|d| d.cache_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        AppPaths {
            db_path: data_dir.join("chromadex.db"),
            thumbs_dir: cache_dir.join("thumbnails"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    // Tags scoring below this are not persisted; 0 keeps every positive tag.
    #[serde(default)]
    pub min_tag_score: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: AppPaths,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

pub fn load_config(path: &Path) -> Result<Config, AppError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)?;
    let config = serde_json::from_str(&text)?;
    Ok(config)
}
