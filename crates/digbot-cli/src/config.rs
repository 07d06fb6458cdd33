//! Startup configuration – reads `digbot.toml`.
//!
//! All values are read once at startup.  Missing fields fall back to their
//! defaults, and a handful of `DIGBOT_*` environment variables override the
//! file for quick field tweaks.

use digbot_types::{DigError, Joint};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Frame the hazard transform hangs off.
    #[serde(default = "default_parent_frame")]
    pub parent_frame: String,

    /// The hazard's own frame name.
    #[serde(default = "default_hazard_frame")]
    pub hazard_frame: String,

    /// Advertised name of the localize service.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Hazard broadcast rate in Hz.
    #[serde(default = "default_hz")]
    pub hz: f64,

    /// Hazard ring diameter in meters.
    #[serde(default = "default_diameter")]
    pub diameter: f64,

    /// Fixed z offset of the hazard origin.
    #[serde(default = "default_height")]
    pub height: f64,

    /// Drive wheel radius in meters.
    #[serde(default = "default_wheel_radius")]
    pub wheel_radius: f64,

    /// Span between the tread centerlines in meters.
    #[serde(default = "default_wheel_span")]
    pub wheel_span: f64,

    /// Rate of the hardware read/write cycle in Hz.
    #[serde(default = "default_control_rate_hz")]
    pub control_rate_hz: f64,

    /// Per-joint lower position bounds, register-file order.
    #[serde(default = "default_lower_limits")]
    pub lower_limits: [f64; Joint::COUNT],

    /// Per-joint upper position bounds, register-file order.
    #[serde(default = "default_upper_limits")]
    pub upper_limits: [f64; Joint::COUNT],
}

fn default_parent_frame() -> String {
    "map".to_string()
}
fn default_hazard_frame() -> String {
    "hazard".to_string()
}
fn default_service_name() -> String {
    "localize_hazard".to_string()
}
fn default_hz() -> f64 {
    5.0
}
fn default_diameter() -> f64 {
    0.0
}
fn default_height() -> f64 {
    -0.16
}
fn default_wheel_radius() -> f64 {
    0.2
}
fn default_wheel_span() -> f64 {
    0.8
}
fn default_control_rate_hz() -> f64 {
    50.0
}
fn default_lower_limits() -> [f64; Joint::COUNT] {
    [f64::MIN; Joint::COUNT]
}
fn default_upper_limits() -> [f64; Joint::COUNT] {
    [f64::MAX; Joint::COUNT]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parent_frame: default_parent_frame(),
            hazard_frame: default_hazard_frame(),
            service_name: default_service_name(),
            hz: default_hz(),
            diameter: default_diameter(),
            height: default_height(),
            wheel_radius: default_wheel_radius(),
            wheel_span: default_wheel_span(),
            control_rate_hz: default_control_rate_hz(),
            lower_limits: default_lower_limits(),
            upper_limits: default_upper_limits(),
        }
    }
}

/// Return the config path: `$DIGBOT_CONFIG` or `./digbot.toml`.
pub fn config_path() -> PathBuf {
    std::env::var("DIGBOT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("digbot.toml"))
}

/// Load the config from disk.  A missing file is not an error: defaults
/// apply.
pub fn load() -> Result<Config, DigError> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &Path) -> Result<Config, DigError> {
    let mut cfg = if path.exists() {
        let raw = fs::read_to_string(path).map_err(|e| {
            DigError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&raw)
            .map_err(|e| DigError::Config(format!("failed to parse {}: {e}", path.display())))?
    } else {
        Config::default()
    };
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Apply `DIGBOT_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `DIGBOT_HZ` | `hz` |
/// | `DIGBOT_DIAMETER` | `diameter` |
/// | `DIGBOT_HEIGHT` | `height` |
/// | `DIGBOT_WHEEL_RADIUS` | `wheel_radius` |
/// | `DIGBOT_WHEEL_SPAN` | `wheel_span` |
pub fn apply_env_overrides(cfg: &mut Config) {
    let overrides: [(&str, &mut f64); 5] = [
        ("DIGBOT_HZ", &mut cfg.hz),
        ("DIGBOT_DIAMETER", &mut cfg.diameter),
        ("DIGBOT_HEIGHT", &mut cfg.height),
        ("DIGBOT_WHEEL_RADIUS", &mut cfg.wheel_radius),
        ("DIGBOT_WHEEL_SPAN", &mut cfg.wheel_span),
    ];
    for (var, slot) in overrides {
        if let Ok(v) = std::env::var(var)
            && let Ok(parsed) = v.parse::<f64>()
        {
            *slot = parsed;
        }
    }
}
