use glam::Vec3;
use serde::Deserialize;

/// Size of the walled room the ball lives in.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    /// Inner side length of the square room in meters; walls sit at +/- half of it.
    pub room_size: f32,
    pub wall_height: f32,
    pub floor_y: f32,
    pub gravity: Vec3,
}

impl ArenaTuning {
    pub fn half_size(&self) -> f32 {
        self.room_size / 2.0
    }
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            room_size: 10.0,
            wall_height: 3.0,
            floor_y: 0.0,
            gravity: Vec3::new(0.0, -9.82, 0.0),
        }
    }
}
