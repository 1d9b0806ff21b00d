use glam::Vec3;
use serde::Deserialize;

/// Gameplay tuning for the throwable ball.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct BallTuning {
    /// Collider radius in meters.
    pub radius: f32,

    /// Bounciness of the ball itself; combined with the fixed colliders on contact.
    pub restitution: f32,

    pub friction: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,

    /// Where the ball rests when the scene starts.
    pub spawn: Vec3,
}

impl Default for BallTuning {
    fn default() -> Self {
        Self {
            radius: 0.1,
            restitution: 1.2,
            friction: 0.7,
            linear_damping: 0.15,
            angular_damping: 0.1,
            spawn: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}
