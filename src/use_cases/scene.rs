// Scene orchestration: one gesture tracker per hand, one grabbable ball, one frame loop.

use super::effects::{EffectCue, SharedCue, subscribe_cue};
use super::types::{FrameUpdate, GrabPhase, SceneInput, SceneUpdate};
use crate::domain::systems::ball::{self, BallConfig};
use crate::domain::tuning::SceneTuning;
use crate::domain::{GestureTracker, GrabController, GrabMode, Handedness, SimBody};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Notify, broadcast, mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Shared configuration for spawning the scene loop.
#[derive(Debug, Clone)]
pub struct SceneSettings {
    /// Fixed frame interval for the scene loop.
    pub tick_interval: Duration,
    pub tuning: SceneTuning,
}

pub struct Scene {
    tuning: SceneTuning,
    epoch: Instant,
    update_tx: broadcast::Sender<SceneUpdate>,
    trackers: [GestureTracker; 2],
    cues: [SharedCue; 2],
    grab: GrabController,
    ball: SimBody,
    tick: u64,
}

impl Scene {
    pub fn new(tuning: SceneTuning, update_tx: broadcast::Sender<SceneUpdate>, epoch: Instant) -> Self {
        let cues = Handedness::BOTH.map(EffectCue::shared);
        let trackers = Handedness::BOTH
            .map(|hand| wire_tracker(hand, &tuning, epoch, &update_tx, &cues[hand.index()]));

        Self {
            tuning,
            epoch,
            update_tx,
            trackers,
            cues,
            grab: GrabController::new(),
            ball: SimBody::dynamic_at(tuning.ball.spawn),
            tick: 0,
        }
    }

    pub fn ball(&self) -> &SimBody {
        &self.ball
    }

    pub fn grab_mode(&self) -> GrabMode {
        self.grab.mode()
    }

    pub fn tracker(&self, hand: Handedness) -> &GestureTracker {
        &self.trackers[hand.index()]
    }

    pub fn apply(&mut self, input: SceneInput) {
        match input {
            SceneInput::HandFrame { hand, joints, at } => {
                self.trackers[hand.index()].update_at(&joints, at);
            }
            SceneInput::HandLost { hand } => self.discard_hand(hand),
            SceneInput::Grab {
                phase,
                pose,
                delta,
                at,
            } => match phase {
                GrabPhase::Begin => self.grab.begin(&mut self.ball, pose, at),
                GrabPhase::Move => self.grab.update(&mut self.ball, pose, delta, at),
                GrabPhase::End => {
                    if let Some(outcome) = self.grab.end(&mut self.ball, delta) {
                        info!(?outcome, "ball released");
                    }
                }
            },
            SceneInput::DriverLeft => {
                for hand in Handedness::BOTH {
                    self.discard_hand(hand);
                }
                if self.grab.cancel(&mut self.ball).is_some() {
                    info!("driver left mid-grab; ball dropped");
                }
            }
        }
    }

    /// Advances the simulation by one frame and returns the snapshot to publish.
    pub fn step(&mut self, dt: f32, now: Instant) -> FrameUpdate {
        let cfg = self.ball_config();
        ball::tick_ball(&mut self.ball, dt, cfg);

        let elapsed = now.saturating_duration_since(self.epoch).as_secs_f32();
        let cues = self.cues.each_ref().map(|cue| {
            let mut cue = cue.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            cue.advance(dt, elapsed);
            cue.snapshot()
        });

        self.tick += 1;
        FrameUpdate {
            tick: self.tick,
            ball: (&self.ball).into(),
            grab: self.grab.mode(),
            cues,
        }
    }

    // Tracking for this hand is gone: drop its state and start over.
    fn discard_hand(&mut self, hand: Handedness) {
        let cue = &self.cues[hand.index()];
        cue.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .hide();
        self.trackers[hand.index()] = wire_tracker(hand, &self.tuning, self.epoch, &self.update_tx, cue);
        debug!(hand = hand.as_str(), "hand tracking discarded");
    }

    fn ball_config(&self) -> BallConfig {
        let ball = &self.tuning.ball;
        let arena = &self.tuning.arena;
        BallConfig {
            radius: ball.radius,
            restitution: ball.restitution,
            friction: ball.friction,
            linear_damping: ball.linear_damping,
            angular_damping: ball.angular_damping,
            gravity: arena.gravity,
            floor_y: arena.floor_y,
            half_size: arena.half_size(),
            wall_height: arena.wall_height,
        }
    }
}

fn wire_tracker(
    hand: Handedness,
    tuning: &SceneTuning,
    epoch: Instant,
    update_tx: &broadcast::Sender<SceneUpdate>,
    cue: &SharedCue,
) -> GestureTracker {
    let mut tracker = GestureTracker::new(tuning.gesture);

    let update_tx = update_tx.clone();
    tracker.on_gesture(move |event| {
        // No receivers just means nobody is watching yet.
        let _ = update_tx.send(SceneUpdate::Gesture {
            hand,
            gesture: event.gesture,
            active: event.active,
            elapsed: event.timestamp.saturating_duration_since(epoch),
        });
    });
    subscribe_cue(&mut tracker, Arc::clone(cue));
    tracker
}

pub async fn scene_task(
    mut input_rx: mpsc::Receiver<SceneInput>,
    update_tx: broadcast::Sender<SceneUpdate>,
    tick_tx: watch::Sender<u64>,
    settings: SceneSettings,
    shutdown: Arc<Notify>,
) {
    let mut scene = Scene::new(settings.tuning, update_tx.clone(), Instant::now());
    let dt = settings.tick_interval.as_secs_f32();

    // Drive the fixed-step frame loop at the configured rate.
    let mut interval = tokio::time::interval(settings.tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                break;
            }
            _ = interval.tick() => {}
        }

        // Inputs are applied in arrival order so no gesture transition is skipped.
        while let Ok(input) = input_rx.try_recv() {
            scene.apply(input);
        }

        let frame = scene.step(dt, Instant::now());
        tick_tx.send_replace(frame.tick);
        let _ = update_tx.send(SceneUpdate::Frame(frame));
    }

    info!("scene loop stopped");
}
