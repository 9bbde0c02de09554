use anyhow::{Context, Result};
use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

pub const DEFAULT_ALBUM: &str = "Wallpapers";
pub const PEXELS_KEY_ENV: &str = "PEXELS_API_KEY";
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";

/// Resolved directories plus the user settings read from `settings.json`.
#[derive(Debug, Clone)]
pub struct Config {
    pub config_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub library_dir: PathBuf,
    pub settings_file: PathBuf,
    pub settings: Settings,
}

/// Keyword search parameters for the stock-photo provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub endpoint: String,
    pub query: String,
    pub per_page: u32,
    pub page_min: u32,
    pub page_max: u32,
    pub orientation: String,
    pub size: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.pexels.com/v1/search".to_string(),
            query: "nature".to_string(),
            per_page: 20,
            page_min: 1,
            page_max: 50,
            orientation: "portrait".to_string(),
            size: "large".to_string(),
        }
    }
}

impl SearchSettings {
    /// Pages the random draw may land on. A reversed pair is read as a single page.
    pub fn page_range(&self) -> RangeInclusive<u32> {
        let low = self.page_min.max(1);
        let high = self.page_max.max(low);
        low..=high
    }
}

/// Sampling configuration for the image generation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            model: "gemini-2.0-flash-exp-image-generation".to_string(),
            temperature: 1.0,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pexels_api_key: String,
    pub gemini_api_key: String,
    pub album: String,
    pub search: SearchSettings,
    pub generation: GenerationSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pexels_api_key: String::new(),
            gemini_api_key: String::new(),
            album: DEFAULT_ALBUM.to_string(),
            search: SearchSettings::default(),
            generation: GenerationSettings::default(),
        }
    }
}

impl Settings {
    /// Reads settings from `path`, writing the defaults there first if it is missing.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let settings = Settings::default();
            let content = serde_json::to_string_pretty(&settings)?;
            fs::write(path, content)
                .with_context(|| format!("Failed to write default settings to {}", path.display()))?;
            log::info!("Created default settings: {:?}", path);
            return Ok(settings);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))?;
        log::info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Overrides stored API keys with non-empty values from `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(PEXELS_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            log::debug!("Using {} from environment", PEXELS_KEY_ENV);
            self.pexels_api_key = key;
        }
        if let Some(key) = lookup(GEMINI_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            log::debug!("Using {} from environment", GEMINI_KEY_ENV);
            self.gemini_api_key = key;
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "wallstudio", "wallstudio")
            .context("Failed to get project directories")?;

        let config_dir = proj_dirs.config_dir().to_path_buf();
        let staging_dir = proj_dirs.data_dir().join("staging");
        let library_dir = UserDirs::new()
            .and_then(|dirs| dirs.picture_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| proj_dirs.data_dir().join("library"));

        Self::from_dirs(config_dir, staging_dir, library_dir)
    }

    /// Lays out every directory under `root`. Used by tests and portable installs.
    pub fn at(root: &Path) -> Result<Self> {
        Self::from_dirs(root.join("config"), root.join("staging"), root.join("library"))
    }

    fn from_dirs(config_dir: PathBuf, staging_dir: PathBuf, library_dir: PathBuf) -> Result<Self> {
        // The library directory is created lazily by the permission gate.
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create {}", config_dir.display()))?;
        fs::create_dir_all(&staging_dir)
            .with_context(|| format!("Failed to create {}", staging_dir.display()))?;

        let settings_file = config_dir.join("settings.json");
        let mut settings = Settings::load_or_create(&settings_file)?;
        settings.apply_env_overrides(|name| std::env::var(name).ok());

        log::info!(
            "Config ready - config_dir: {:?}, staging_dir: {:?}, library_dir: {:?}",
            config_dir,
            staging_dir,
            library_dir
        );

        Ok(Config {
            config_dir,
            staging_dir,
            library_dir,
            settings_file,
            settings,
        })
    }
}
