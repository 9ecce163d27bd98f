pub mod config;
pub mod presets;
pub mod run;
pub mod simulate;

use cuetimer_core::presets::{self as core_presets, Preset};
use cuetimer_core::Config;

/// Preset chosen on the command line, falling back to the configured one.
pub(crate) fn resolve_preset(
    key: Option<&str>,
    config: &Config,
) -> Result<Preset, Box<dyn std::error::Error>> {
    Ok(match key {
        Some(key) => core_presets::lookup(key)?,
        None => config.preset()?,
    })
}
