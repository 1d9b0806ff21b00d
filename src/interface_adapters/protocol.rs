// Wire protocol DTOs and conversions between JSON messages and scene inputs/updates.

use crate::domain::appearance::HandAppearance;
use crate::domain::{
    BodySnapshot, BodyType, GrabMode, HandJoint, HandleDelta, HandlePose, Handedness,
    JointSnapshot,
};
use crate::use_cases::{CueSnapshot, FrameUpdate, GrabPhase, SceneInput, SceneUpdate};
use crate::use_cases::effects::CUE_LABEL;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // First message on every connection.
    Welcome {
        conn_id: String,
        driver: bool,
        appearance: HandAppearance,
    },
    Gesture {
        hand: Handedness,
        gesture: &'static str,
        active: bool,
        timestamp_ms: u64,
    },
    Frame(FrameDto),
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    HandFrame(HandFramePayload),
    HandLost { hand: Handedness },
    Grab(GrabPayload),
}

#[derive(Debug, Clone, Deserialize)]
pub struct HandFramePayload {
    pub hand: Handedness,
    // Keyed by WebXR joint name, e.g. "index-finger-tip".
    #[serde(default)]
    pub joints: HashMap<String, [f32; 3]>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrabPhaseDto {
    Begin,
    Move,
    End,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrabPayload {
    pub phase: GrabPhaseDto,
    pub position: [f32; 3],
    /// Quaternion as `[x, y, z, w]`.
    pub rotation: [f32; 4],
    #[serde(default)]
    pub delta: Option<HandleDeltaDto>,
    /// Client capture time in milliseconds on any monotonic clock.
    #[serde(default)]
    pub sample_time_ms: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HandleDeltaDto {
    pub position: [f32; 3],
    /// Euler angles in radians.
    pub rotation: [f32; 3],
    /// Seconds.
    pub time: f32,
}

impl From<GrabPhaseDto> for GrabPhase {
    fn from(phase: GrabPhaseDto) -> Self {
        match phase {
            GrabPhaseDto::Begin => GrabPhase::Begin,
            GrabPhaseDto::Move => GrabPhase::Move,
            GrabPhaseDto::End => GrabPhase::End,
        }
    }
}

impl From<HandleDeltaDto> for HandleDelta {
    fn from(delta: HandleDeltaDto) -> Self {
        Self {
            position: Vec3::from_array(delta.position),
            rotation: Vec3::from_array(delta.rotation),
            time: delta.time,
        }
    }
}

impl ClientMessage {
    /// Client capture time carried by the message, if any.
    pub fn sample_time_ms(&self) -> Option<f64> {
        match self {
            ClientMessage::Grab(payload) => payload.sample_time_ms,
            ClientMessage::HandFrame(_) | ClientMessage::HandLost { .. } => None,
        }
    }

    /// Converts a parsed message into a scene input stamped with `at`.
    ///
    /// Returns `None` when the message carries nothing the scene can use.
    pub fn into_input(self, at: Instant) -> Option<SceneInput> {
        match self {
            ClientMessage::HandFrame(payload) => Some(SceneInput::HandFrame {
                hand: payload.hand,
                joints: joints_from_wire(&payload.joints),
                at,
            }),
            ClientMessage::HandLost { hand } => Some(SceneInput::HandLost { hand }),
            ClientMessage::Grab(payload) => {
                let pose = sanitize_pose(payload.position, payload.rotation)?;
                Some(SceneInput::Grab {
                    phase: payload.phase.into(),
                    pose,
                    delta: payload.delta.and_then(sanitize_delta),
                    at,
                })
            }
        }
    }
}

fn joints_from_wire(joints: &HashMap<String, [f32; 3]>) -> JointSnapshot {
    let mut snapshot = JointSnapshot::new();
    for (name, position) in joints {
        let Some(joint) = HandJoint::from_name(name) else {
            debug!(joint = %name, "unknown joint name ignored");
            continue;
        };
        let position = Vec3::from_array(*position);
        // A joint with a non-finite position counts as untracked.
        if position.is_finite() {
            snapshot.insert(joint, position);
        }
    }
    snapshot
}

fn sanitize_pose(position: [f32; 3], rotation: [f32; 4]) -> Option<HandlePose> {
    let position = Vec3::from_array(position);
    let rotation = Quat::from_array(rotation);
    if !position.is_finite() || !rotation.is_finite() || rotation.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(HandlePose {
        position,
        rotation: rotation.normalize(),
    })
}

fn sanitize_delta(delta: HandleDeltaDto) -> Option<HandleDelta> {
    let delta = HandleDelta::from(delta);
    // The interval itself is validated at release time.
    (delta.position.is_finite() && delta.rotation.is_finite()).then_some(delta)
}

/// Snapshot of the scene sent to clients on each frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameDto {
    pub tick: u64,
    pub grab: &'static str,
    pub ball: BallDto,
    pub cues: Vec<CueDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BallDto {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub linear_velocity: [f32; 3],
    pub body_type: BodyType,
}

#[derive(Debug, Clone, Serialize)]
pub struct CueDto {
    pub hand: Handedness,
    pub visible: bool,
    pub label: &'static str,
    pub position: [f32; 3],
    pub spin: f32,
    pub emissive_intensity: f32,
}

impl From<&BodySnapshot> for BallDto {
    fn from(ball: &BodySnapshot) -> Self {
        Self {
            position: ball.translation.to_array(),
            rotation: ball.rotation.to_array(),
            linear_velocity: ball.linear_velocity.to_array(),
            body_type: ball.body_type,
        }
    }
}

impl From<&CueSnapshot> for CueDto {
    fn from(cue: &CueSnapshot) -> Self {
        Self {
            hand: cue.hand,
            visible: cue.visible,
            label: CUE_LABEL,
            position: cue.position.to_array(),
            spin: cue.spin,
            emissive_intensity: cue.emissive_intensity,
        }
    }
}

impl From<FrameUpdate> for FrameDto {
    fn from(frame: FrameUpdate) -> Self {
        Self {
            tick: frame.tick,
            grab: match frame.grab {
                GrabMode::Held => "held",
                GrabMode::Free => "free",
            },
            ball: BallDto::from(&frame.ball),
            cues: frame.cues.iter().map(CueDto::from).collect(),
        }
    }
}

impl From<SceneUpdate> for ServerMessage {
    fn from(update: SceneUpdate) -> Self {
        match update {
            SceneUpdate::Gesture {
                hand,
                gesture,
                active,
                elapsed,
            } => ServerMessage::Gesture {
                hand,
                gesture: gesture.as_str(),
                active,
                timestamp_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            },
            SceneUpdate::Frame(frame) => ServerMessage::Frame(frame.into()),
        }
    }
}
