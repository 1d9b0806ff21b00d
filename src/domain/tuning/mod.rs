// Gameplay tuning, kept apart from runtime configuration (ports, tick rates, buffers).

pub mod arena;
pub mod ball;
pub mod gesture;

use serde::Deserialize;

pub use arena::ArenaTuning;
pub use ball::BallTuning;
pub use gesture::GestureTuning;

/// All tuning groups, as loaded from an optional TOML file.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct SceneTuning {
    pub gesture: GestureTuning,
    pub ball: BallTuning,
    pub arena: ArenaTuning,
}
