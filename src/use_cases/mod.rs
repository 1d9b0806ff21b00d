// Use cases layer: the frame-driven hand scene.

pub mod effects;
pub mod scene;
pub mod types;

pub use scene::{Scene, SceneSettings, scene_task};
pub use types::{CueSnapshot, FrameUpdate, GrabPhase, SceneInput, SceneUpdate};
