mod config;

pub use config::{Config, DisplayConfig, SoundConfig, SpeechConfig, TimerSection};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the configuration directory.
///
/// `CUETIMER_CONFIG_DIR` wins when set. Otherwise `~/.config/cuetimer[-dev]/`,
/// with the `-dev` suffix when `CUETIMER_ENV=dev`.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("CUETIMER_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base = dirs::home_dir()
                .ok_or(ConfigError::NoConfigDir)?
                .join(".config");
            let env = std::env::var("CUETIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base.join("cuetimer-dev")
            } else {
                base.join("cuetimer")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::SaveFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
