mod settings;

pub use settings::{BillingSettings, Config, Depot};

use crate::error::{DepotError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.gasdepot or XDG config)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "gasdepot") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.gasdepot/
    let home = dirs_home().ok_or_else(|| {
        DepotError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".gasdepot"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Load the main config.toml
pub fn load_config(config_dir: &PathBuf) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(DepotError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| DepotError::ConfigParse { path, source: e })
}

/// Format an order number from a template like "BS-{year}-{seq:04}"
pub fn format_order_number(format: &str, year: u32, seq: u32) -> String {
    format
        .replace("{year}", &year.to_string())
        .replace("{seq:04}", &format!("{:04}", seq))
        .replace("{seq:05}", &format!("{:05}", seq))
        .replace("{seq:03}", &format!("{:03}", seq))
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"# Competitor brands accepted when recording foreign bottles.
brands = ["Naftal", "Sidi Kebir", "inconnu"]

[depot]
name = "Your Depot Name"
address = "123 Industrial Road"
city = "Oran"
# phone = "+213-555-123-456"   # optional
# tax_id = "12-3456789"        # optional

[billing]
supply_number_format = "BS-{year}-{seq:04}"  # Bon de Sortie, e.g. BS-2026-0001
return_number_format = "BR-{year}-{seq:04}"  # Bon de Retour, e.g. BR-2026-0001
currency = "DZD"
currency_symbol = "DA "
default_tax_rate = 0.19  # fractional, e.g. 0.19 for 19%
"#;
