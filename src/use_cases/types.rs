// Use-case level inputs/outputs for the scene loop.

use crate::domain::{BodySnapshot, GestureKind, GrabMode, HandleDelta, HandlePose, Handedness, JointSnapshot};
use glam::Vec3;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabPhase {
    Begin,
    Move,
    End,
}

/// Inputs queued for the scene, stamped with their arrival time.
#[derive(Debug, Clone)]
pub enum SceneInput {
    HandFrame {
        hand: Handedness,
        joints: JointSnapshot,
        at: Instant,
    },
    HandLost {
        hand: Handedness,
    },
    Grab {
        phase: GrabPhase,
        pose: HandlePose,
        delta: Option<HandleDelta>,
        at: Instant,
    },
    // The driving client disconnected.
    DriverLeft,
}

#[derive(Debug, Clone)]
pub enum SceneUpdate {
    Gesture {
        hand: Handedness,
        gesture: GestureKind,
        active: bool,
        // Time since the scene started.
        elapsed: Duration,
    },
    Frame(FrameUpdate),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueSnapshot {
    pub hand: Handedness,
    pub visible: bool,
    pub position: Vec3,
    pub spin: f32,
    pub emissive_intensity: f32,
}

#[derive(Debug, Clone)]
pub struct FrameUpdate {
    pub tick: u64,
    pub ball: BodySnapshot,
    pub grab: GrabMode,
    pub cues: [CueSnapshot; 2],
}
