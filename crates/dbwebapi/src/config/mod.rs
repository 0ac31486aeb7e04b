//! Configuration management
//!
//! Precedence: CLI > env > file > defaults. CLI overrides are applied by the binary.

mod builder;
mod detection;
mod env;
mod file;

pub use builder::{
    Config, ConfigBuilder, DEFAULT_MAX_UPLOAD_BYTES, TelemetryConfig, TransportConfig,
    UploadConfig,
};
pub use detection::DetectionConfig;

use crate::Result;

/// Load configuration with precedence: env > file > defaults
pub fn load_config() -> Result<ConfigBuilder> {
    let mut builder = ConfigBuilder::new();

    // Load from config file if exists
    if let Some(path) = file::find_config_file() {
        tracing::info!("Loading configuration from {}", path.display());
        builder = file::load_from_file(&path, builder)?;
    }

    // Override with environment variables
    builder = env::load_from_env(builder)?;

    Ok(builder)
}

/// Load configuration from a specific file path
pub fn load_config_from_path(path: &std::path::Path) -> Result<ConfigBuilder> {
    let mut builder = ConfigBuilder::new();

    builder = file::load_from_file(path, builder)?;

    // Override with environment variables
    builder = env::load_from_env(builder)?;

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_from_missing_path_fails() {
        let result = load_config_from_path(std::path::Path::new("/nonexistent/dbwebapi.toml"));
        assert!(result.unwrap_err().is_config());
    }
}
