// Presentation-side cue shown while a hand holds the rock-horns gesture.
// Cues only consume tracker events; nothing flows back into the trackers.

use crate::domain::{GestureEvent, GestureKind, GestureTracker, Handedness, SubscriptionId};
use crate::use_cases::types::CueSnapshot;
use glam::Vec3;
use std::sync::{Arc, Mutex};

pub const CUE_LABEL: &str = "ROCK ON!";

// Cue group origin in the scene; each hand's cue is offset from it.
const GROUP_ORIGIN: Vec3 = Vec3::new(0.0, 1.5, -0.5);
const SPIN_RATE: f32 = 2.0; // rad/s
const PULSE_RATE: f32 = 5.0;
const BASE_EMISSIVE: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct EffectCue {
    hand: Handedness,
    visible: bool,
    spin: f32,
    emissive_intensity: f32,
}

pub type SharedCue = Arc<Mutex<EffectCue>>;

impl EffectCue {
    pub fn new(hand: Handedness) -> Self {
        Self {
            hand,
            visible: false,
            spin: 0.0,
            emissive_intensity: 1.0,
        }
    }

    pub fn shared(hand: Handedness) -> SharedCue {
        Arc::new(Mutex::new(Self::new(hand)))
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn apply(&mut self, event: &GestureEvent) {
        if event.gesture == GestureKind::RockHorns {
            self.visible = event.active;
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Animates the cue; `elapsed` is scene time in seconds.
    pub fn advance(&mut self, dt: f32, elapsed: f32) {
        if !self.visible {
            return;
        }
        self.spin = (self.spin + dt * SPIN_RATE) % std::f32::consts::TAU;
        let pulse = (elapsed * PULSE_RATE).sin() * 0.5 + 0.5;
        self.emissive_intensity = BASE_EMISSIVE + pulse;
    }

    pub fn position(&self) -> Vec3 {
        let x = match self.hand {
            Handedness::Right => 0.2,
            Handedness::Left => -0.2,
        };
        GROUP_ORIGIN + Vec3::new(x, 0.1, -0.3)
    }

    pub fn snapshot(&self) -> CueSnapshot {
        CueSnapshot {
            hand: self.hand,
            visible: self.visible,
            position: self.position(),
            spin: self.spin,
            emissive_intensity: self.emissive_intensity,
        }
    }
}

/// Subscribes a cue to a hand's tracker.
pub fn subscribe_cue(tracker: &mut GestureTracker, cue: SharedCue) -> SubscriptionId {
    tracker.on_gesture(move |event| {
        // A poisoned cue only affects visuals; recover the inner value.
        let mut cue = cue.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        cue.apply(event);
    })
}
