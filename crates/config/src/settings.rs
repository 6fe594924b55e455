// Application settings
// Loaded from ~/.config/mediagrid/config.toml (or --config / MEDIAGRID_CONFIG)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "MEDIAGRID_CONFIG";

#[derive(Debug)]
pub enum SettingsError {
    /// Config file could not be read.
    Io { path: PathBuf, message: String },
    /// TOML parse / deserialization error.
    Parse(String),
    /// Values parsed but make no sense together.
    Invalid(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "cannot read {}: {message}", path.display()),
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {}

/// External catalog (TVMaze) settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub base_url: String,
    /// Maximum memoized lookups per run
    pub cache_capacity: usize,
    pub timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.tvmaze.com".to_string(),
            cache_capacity: 1024,
            timeout_secs: 15,
        }
    }
}

/// Local media server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventorySettings {
    /// Detail-fetch worker pool size
    pub workers: usize,
    pub timeout_secs: u64,
    /// Library sections to report; empty = every movie and show section
    pub sections: Vec<String>,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            workers: 10,
            timeout_secs: 30,
            sections: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Characters added to the widest value when sizing columns
    pub column_padding: usize,
    /// Register each sheet as a filterable Excel table
    pub register_table: bool,
    /// Default output is `<file_prefix>_<YYYYMMDD>.xlsx`
    pub file_prefix: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            column_padding: 2,
            register_table: true,
            file_prefix: "media_audit".to_string(),
        }
    }
}

/// Resolution tiers that highlight a whole row in flat sheets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualitySettings {
    pub low: Vec<String>,
    pub high: Vec<String>,
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self {
            low: ["sd", "480", "576", "720"].map(String::from).to_vec(),
            high: ["4k", "uhd"].map(String::from).to_vec(),
        }
    }
}

/// Fill colors as `RRGGBB` hex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteSettings {
    pub complete: String,
    pub partial: String,
    pub nonexistent: String,
    pub low_quality: String,
    pub high_quality: String,
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self {
            complete: "90EE90".to_string(),
            partial: "FFB6B6".to_string(),
            nonexistent: "D3D3D3".to_string(),
            low_quality: "FFFFCC".to_string(),
            high_quality: "E3F4EA".to_string(),
        }
    }
}

impl PaletteSettings {
    /// (name, value) pairs, in declaration order
    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("complete", &self.complete),
            ("partial", &self.partial),
            ("nonexistent", &self.nonexistent),
            ("low_quality", &self.low_quality),
            ("high_quality", &self.high_quality),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub inventory: InventorySettings,
    pub report: ReportSettings,
    pub quality: QualitySettings,
    pub palette: PaletteSettings,
}

impl Settings {
    pub fn from_toml(s: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(s).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings: explicit path, then `MEDIAGRID_CONFIG`, then the user
    /// config file if it exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::load_file(&path),
            None => match Self::settings_path() {
                Some(path) if path.is_file() => Self::load_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_file(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&contents)
    }

    /// Get the default settings file path
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mediagrid").join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.inventory.workers == 0 {
            return Err(SettingsError::Invalid("inventory.workers must be at least 1".into()));
        }
        if self.catalog.cache_capacity == 0 {
            return Err(SettingsError::Invalid("catalog.cache_capacity must be at least 1".into()));
        }
        for (name, value) in self.palette.entries() {
            if !is_hex_color(value) {
                return Err(SettingsError::Invalid(format!(
                    "palette.{name}: expected RRGGBB hex color, got \"{value}\""
                )));
            }
        }
        for tier in &self.quality.low {
            let tier = tier.trim().to_lowercase();
            if self.quality.high.iter().any(|h| h.trim().to_lowercase() == tier) {
                return Err(SettingsError::Invalid(format!(
                    "quality tier \"{tier}\" is listed as both low and high"
                )));
            }
        }
        Ok(())
    }
}

fn is_hex_color(s: &str) -> bool {
    let hex = s.trim().trim_start_matches('#');
    hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit())
}
