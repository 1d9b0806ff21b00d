// Cosmetic hand colours, parsed from `rgb(r, g, b)` strings.

use serde::Serialize;
use tracing::warn;

/// Linear colour channels in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
        }
    }
}

/// Parses the first three integers of an `rgb(r, g, b)` string.
///
/// Malformed input is not an error: it logs a warning and yields black.
pub fn parse_rgb(value: &str) -> Rgb {
    let channels: Vec<u8> = value
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .take(3)
        .filter_map(|part| part.parse::<u16>().ok())
        .map(|n| n.min(255) as u8)
        .collect();

    match channels[..] {
        [r, g, b] => Rgb::from_bytes(r, g, b),
        _ => {
            warn!(value, "invalid RGB format, expected \"rgb(r, g, b)\"; using black");
            Rgb::BLACK
        }
    }
}

/// Colours the client applies to its hand meshes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HandAppearance {
    pub base_color: Rgb,
    pub finger_color: Rgb,
    pub outline_color: Rgb,
}

impl Default for HandAppearance {
    fn default() -> Self {
        Self {
            base_color: Rgb::from_bytes(30, 29, 31),
            finger_color: Rgb::from_bytes(49, 50, 55),
            outline_color: Rgb::from_bytes(159, 141, 248),
        }
    }
}
