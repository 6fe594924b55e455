// Configuration loading

pub mod settings;

pub use settings::{
    CatalogSettings, InventorySettings, PaletteSettings, QualitySettings, ReportSettings, Settings, SettingsError,
    CONFIG_ENV,
};
