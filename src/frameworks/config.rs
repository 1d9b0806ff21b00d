use crate::domain::appearance::{HandAppearance, parse_rgb};
use crate::domain::tuning::SceneTuning;
use std::{env, path::Path, time::Duration};
use tracing::{info, warn};

// Runtime/server constants (not gameplay tuning).

pub fn http_port() -> u16 {
    env::var("SCENE_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3010)
}

/// Scene frame rate in Hz, clamped to 1..=240.
pub fn frame_rate_hz() -> u32 {
    env::var("FRAME_RATE_HZ")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(DEFAULT_FRAME_RATE_HZ)
        .clamp(1, 240)
}

pub fn tick_interval() -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(frame_rate_hz()))
}

pub const DEFAULT_FRAME_RATE_HZ: u32 = 72;
pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const UPDATE_BROADCAST_CAPACITY: usize = 128;

#[derive(Debug)]
pub enum ConfigError {
    #[allow(dead_code)]
    Io(std::io::Error),
    #[allow(dead_code)]
    Parse(toml::de::Error),
}

/// Reads gameplay tuning from a TOML file; missing keys keep their defaults.
pub fn load_tuning(path: &Path) -> Result<SceneTuning, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&text).map_err(ConfigError::Parse)
}

/// Tuning from `SCENE_TUNING_PATH` when set, defaults otherwise.
pub fn scene_tuning() -> SceneTuning {
    let Ok(path) = env::var("SCENE_TUNING_PATH") else {
        return SceneTuning::default();
    };

    match load_tuning(Path::new(&path)) {
        Ok(tuning) => {
            info!(%path, "loaded scene tuning");
            tuning
        }
        Err(e) => {
            warn!(%path, error = ?e, "failed to load scene tuning; using defaults");
            SceneTuning::default()
        }
    }
}

/// Hand colours from `HAND_*_COLOR`, each in `rgb(r, g, b)` form.
pub fn hand_appearance() -> HandAppearance {
    let defaults = HandAppearance::default();
    let color = |key: &str, fallback| env::var(key).map(|v| parse_rgb(&v)).unwrap_or(fallback);

    HandAppearance {
        base_color: color("HAND_BASE_COLOR", defaults.base_color),
        finger_color: color("HAND_FINGER_COLOR", defaults.finger_color),
        outline_color: color("HAND_OUTLINE_COLOR", defaults.outline_color),
    }
}
