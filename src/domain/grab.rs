//! Grab and throw: switches a body between hand-driven and physics-driven control.
//!
//! While held the body is kinematic and teleported to the hand pose each frame.
//! On release it turns dynamic and is launched with the velocity implied by the
//! last recorded motion delta.

use crate::domain::ports::{BodyType, PhysicsBody};
use glam::{EulerRot, Quat, Vec3};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Shortest gap between two poses that a derived delta is computed over.
///
/// Poses closer together than this were bunched up in delivery, so their
/// arrival gap says nothing about hand speed.
pub const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabMode {
    /// Hand-driven; body is kinematic-position-based.
    Held,
    /// Physics-driven; body is dynamic.
    Free,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandlePose {
    pub position: Vec3,
    pub rotation: Quat,
}

/// Motion over one interval. Rotation is per-axis Euler angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleDelta {
    pub position: Vec3,
    pub rotation: Vec3,
    /// Seconds.
    pub time: f32,
}

impl HandleDelta {
    /// Delta between two consecutive poses `elapsed` seconds apart.
    pub fn between(previous: &HandlePose, current: &HandlePose, elapsed: f32) -> Self {
        let (x, y, z) = (current.rotation * previous.rotation.inverse()).to_euler(EulerRot::XYZ);
        Self {
            position: current.position - previous.position,
            rotation: Vec3::new(x, y, z),
            time: elapsed,
        }
    }
}

/// Drag bookkeeping for one hold; dropped at release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleDragState {
    pub last_pose: HandlePose,
    pub last_sample: Instant,
    /// Most recent motion delta (overwritten every frame, never merged).
    pub accumulated_delta: Option<HandleDelta>,
    pub is_released: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseOutcome {
    Thrown { linear: Vec3, angular: Vec3 },
    /// No motion was recorded; the body keeps whatever velocity it had.
    Dropped,
    /// The interval was zero, negative or not finite; velocity was not touched.
    SkippedZeroInterval,
}

/// Launch velocities for a delta, or `None` when they cannot be computed safely.
pub fn launch_velocity(delta: &HandleDelta) -> Option<(Vec3, Vec3)> {
    if !(delta.time.is_finite() && delta.time > 0.0) {
        return None;
    }
    let linear = delta.position / delta.time;
    let angular = Vec3::new(
        delta.rotation.x / delta.time,
        delta.rotation.y / delta.time,
        delta.rotation.z / delta.time,
    );
    (linear.is_finite() && angular.is_finite()).then_some((linear, angular))
}

/// Per-body grab state machine.
///
/// The mode is driven only by begin/end signals; nothing is read back from
/// the physics engine.
#[derive(Debug)]
pub struct GrabController {
    mode: GrabMode,
    drag: Option<HandleDragState>,
}

impl Default for GrabController {
    fn default() -> Self {
        Self::new()
    }
}

impl GrabController {
    pub fn new() -> Self {
        Self {
            mode: GrabMode::Free,
            drag: None,
        }
    }

    pub fn mode(&self) -> GrabMode {
        self.mode
    }

    pub fn is_held(&self) -> bool {
        self.mode == GrabMode::Held
    }

    pub fn drag_state(&self) -> Option<&HandleDragState> {
        self.drag.as_ref()
    }

    pub fn begin<B: PhysicsBody>(&mut self, body: &mut B, pose: HandlePose, now: Instant) {
        if self.is_held() {
            debug!("grab begin while already held; ignoring");
            return;
        }

        body.set_body_type(BodyType::KinematicPositionBased);
        pin(body, &pose);
        self.mode = GrabMode::Held;
        self.drag = Some(HandleDragState {
            last_pose: pose,
            last_sample: now,
            accumulated_delta: None,
            is_released: false,
        });
        debug!(position = ?pose.position, "grab started");
    }

    /// Per-frame pose while held.
    ///
    /// Without a supplied delta, one is derived from the previous sampled pose once at
    /// least [`MIN_SAMPLE_INTERVAL`] has passed. The recorded delta is only replaced by
    /// one with a usable interval.
    pub fn update<B: PhysicsBody>(
        &mut self,
        body: &mut B,
        pose: HandlePose,
        delta: Option<HandleDelta>,
        now: Instant,
    ) {
        if !self.is_held() {
            return;
        }
        let Some(drag) = self.drag.as_mut() else {
            return;
        };

        pin(body, &pose);

        let elapsed = now.saturating_duration_since(drag.last_sample);
        let delta = match delta {
            Some(delta) => delta,
            // Keep the older sample as the reference until the gap is wide enough.
            None if elapsed < MIN_SAMPLE_INTERVAL => return,
            None => HandleDelta::between(&drag.last_pose, &pose, elapsed.as_secs_f32()),
        };
        drag.last_pose = pose;
        drag.last_sample = now;

        if launch_velocity(&delta).is_some() {
            drag.accumulated_delta = Some(delta);
        } else {
            debug!(delta_time = delta.time, "motion delta unusable; keeping the previous one");
        }
    }

    /// Releases the body. Returns `None` when nothing was held.
    pub fn end<B: PhysicsBody>(
        &mut self,
        body: &mut B,
        final_delta: Option<HandleDelta>,
    ) -> Option<ReleaseOutcome> {
        if !self.is_held() {
            debug!("grab end while free; ignoring");
            return None;
        }

        let recorded = self.drag.take().and_then(|mut drag| {
            drag.is_released = true;
            drag.accumulated_delta
        });
        self.mode = GrabMode::Free;
        body.set_body_type(BodyType::Dynamic);

        let Some(delta) = final_delta.or(recorded) else {
            debug!("released without motion");
            return Some(ReleaseOutcome::Dropped);
        };

        let Some((linear, angular)) = launch_velocity(&delta) else {
            warn!(delta_time = delta.time, "release interval unusable; velocity left unset");
            return Some(ReleaseOutcome::SkippedZeroInterval);
        };

        body.set_linear_velocity(linear);
        body.set_angular_velocity(angular);
        debug!(?linear, ?angular, "released with launch velocity");
        Some(ReleaseOutcome::Thrown { linear, angular })
    }

    /// Tracking was lost mid-hold: release without launching.
    pub fn cancel<B: PhysicsBody>(&mut self, body: &mut B) -> Option<ReleaseOutcome> {
        if !self.is_held() {
            return None;
        }
        self.drag = None;
        self.end(body, None)
    }
}

fn pin<B: PhysicsBody>(body: &mut B, pose: &HandlePose) {
    body.set_rotation(pose.rotation);
    body.set_translation(pose.position);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{BodyCall, RecordingBody};
    use std::time::Duration;

    fn pose(x: f32) -> HandlePose {
        HandlePose {
            position: Vec3::new(x, 1.0, 0.0),
            rotation: Quat::IDENTITY,
        }
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn when_delta_is_known_then_launch_velocity_divides_by_elapsed_time() {
        let delta = HandleDelta {
            position: Vec3::new(0.2, 0.0, 0.0),
            rotation: Vec3::new(0.0, 0.5, -0.1),
            time: 0.1,
        };

        let (linear, angular) = launch_velocity(&delta).expect("velocity");
        assert!(approx(linear, Vec3::new(2.0, 0.0, 0.0)));
        assert!(approx(angular, Vec3::new(0.0, 5.0, -1.0)));
    }

    #[test]
    fn when_interval_is_zero_or_invalid_then_launch_velocity_is_none() {
        for time in [0.0, -0.1, f32::NAN, f32::INFINITY] {
            let delta = HandleDelta {
                position: Vec3::new(0.2, 0.0, 0.0),
                rotation: Vec3::ZERO,
                time,
            };
            assert!(launch_velocity(&delta).is_none(), "time {time}");
        }
    }

    #[test]
    fn when_grab_begins_then_body_becomes_kinematic_and_is_pinned_to_the_hand() {
        let mut body = RecordingBody::default();
        let mut grab = GrabController::new();

        grab.begin(&mut body, pose(0.5), Instant::now());

        assert_eq!(grab.mode(), GrabMode::Held);
        assert_eq!(
            body.calls,
            vec![
                BodyCall::BodyType(BodyType::KinematicPositionBased),
                BodyCall::Rotation(Quat::IDENTITY),
                BodyCall::Translation(Vec3::new(0.5, 1.0, 0.0)),
            ]
        );
    }

    #[test]
    fn when_held_over_many_frames_then_body_type_is_set_once_per_transition() {
        let mut body = RecordingBody::default();
        let mut grab = GrabController::new();
        let start = Instant::now();

        grab.begin(&mut body, pose(0.0), start);
        for frame in 1..=10 {
            grab.update(&mut body, pose(frame as f32 * 0.01), None, start + Duration::from_millis(frame * 10));
            assert_eq!(grab.mode(), GrabMode::Held);
        }
        assert_eq!(body.body_type_calls(), 1);

        grab.end(&mut body, None);
        assert_eq!(grab.mode(), GrabMode::Free);
        assert_eq!(body.body_type_calls(), 2);
        assert_eq!(body.calls.last().map(|c| matches!(c, BodyCall::AngularVelocity(_))), Some(true));
    }

    #[test]
    fn when_released_with_a_final_delta_then_that_velocity_is_applied() {
        let mut body = RecordingBody::default();
        let mut grab = GrabController::new();
        grab.begin(&mut body, pose(0.0), Instant::now());

        let outcome = grab.end(
            &mut body,
            Some(HandleDelta {
                position: Vec3::new(0.2, 0.0, 0.0),
                rotation: Vec3::ZERO,
                time: 0.1,
            }),
        );

        let Some(ReleaseOutcome::Thrown { linear, angular }) = outcome else {
            panic!("expected a throw, got {outcome:?}");
        };
        assert!(approx(linear, Vec3::new(2.0, 0.0, 0.0)));
        assert!(approx(angular, Vec3::ZERO));
        assert!(body.calls.contains(&BodyCall::BodyType(BodyType::Dynamic)));
        assert_eq!(body.velocity_calls().len(), 2);
    }

    #[test]
    fn when_released_with_zero_interval_then_no_velocity_is_set() {
        let mut body = RecordingBody::default();
        let mut grab = GrabController::new();
        grab.begin(&mut body, pose(0.0), Instant::now());

        let outcome = grab.end(
            &mut body,
            Some(HandleDelta {
                position: Vec3::new(0.2, 0.0, 0.0),
                rotation: Vec3::ZERO,
                time: 0.0,
            }),
        );

        assert_eq!(outcome, Some(ReleaseOutcome::SkippedZeroInterval));
        assert!(body.velocity_calls().is_empty());
        assert_eq!(grab.mode(), GrabMode::Free);
    }

    #[test]
    fn when_released_without_any_motion_then_body_is_dropped() {
        let mut body = RecordingBody::default();
        let mut grab = GrabController::new();
        grab.begin(&mut body, pose(0.0), Instant::now());

        assert_eq!(grab.end(&mut body, None), Some(ReleaseOutcome::Dropped));
        assert!(body.velocity_calls().is_empty());
        assert!(grab.drag_state().is_none());
    }

    #[test]
    fn when_no_delta_is_supplied_then_release_uses_the_last_frame_only() {
        let mut body = RecordingBody::default();
        let mut grab = GrabController::new();
        let start = Instant::now();

        grab.begin(&mut body, pose(0.0), start);
        // Slow drift, then a fast final frame.
        grab.update(&mut body, pose(0.01), None, start + Duration::from_millis(100));
        grab.update(&mut body, pose(0.11), None, start + Duration::from_millis(150));

        let Some(ReleaseOutcome::Thrown { linear, .. }) = grab.end(&mut body, None) else {
            panic!("expected a throw");
        };
        assert!(approx(linear, Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn when_pose_rotates_between_frames_then_angular_velocity_follows() {
        let mut body = RecordingBody::default();
        let mut grab = GrabController::new();
        let start = Instant::now();

        grab.begin(&mut body, pose(0.0), start);
        grab.update(
            &mut body,
            HandlePose {
                position: Vec3::new(0.0, 1.0, 0.0),
                rotation: Quat::from_rotation_y(0.1),
            },
            None,
            start + Duration::from_millis(100),
        );

        let Some(ReleaseOutcome::Thrown { angular, linear }) = grab.end(&mut body, None) else {
            panic!("expected a throw");
        };
        assert!(approx(angular, Vec3::new(0.0, 1.0, 0.0)));
        assert!(approx(linear, Vec3::ZERO));
    }

    #[test]
    fn when_updates_arrive_while_free_then_body_is_untouched() {
        let mut body = RecordingBody::default();
        let mut grab = GrabController::new();

        grab.update(&mut body, pose(1.0), None, Instant::now());
        assert_eq!(grab.end(&mut body, None), None);
        assert!(body.calls.is_empty());
        assert_eq!(grab.mode(), GrabMode::Free);
    }

    #[test]
    fn when_grab_begins_twice_then_the_second_begin_is_ignored() {
        let mut body = RecordingBody::default();
        let mut grab = GrabController::new();
        let now = Instant::now();

        grab.begin(&mut body, pose(0.0), now);
        grab.begin(&mut body, pose(1.0), now);

        assert_eq!(body.body_type_calls(), 1);
        assert_eq!(grab.drag_state().map(|d| d.last_pose), Some(pose(0.0)));
    }

    #[test]
    fn when_tracking_is_lost_mid_hold_then_cancel_releases_without_launch() {
        let mut body = RecordingBody::default();
        let mut grab = GrabController::new();
        let start = Instant::now();

        grab.begin(&mut body, pose(0.0), start);
        grab.update(&mut body, pose(0.5), None, start + Duration::from_millis(10));

        assert_eq!(grab.cancel(&mut body), Some(ReleaseOutcome::Dropped));
        assert!(body.velocity_calls().is_empty());
        assert_eq!(grab.cancel(&mut body), None);
    }

    #[test]
    fn when_poses_arrive_bunched_together_then_release_uses_the_spaced_sample() {
        let mut body = RecordingBody::default();
        let mut grab = GrabController::new();
        let start = Instant::now();

        // Hand moves at 1 m/s; the last two poses were delivered 50us apart.
        grab.begin(&mut body, pose(0.0), start);
        grab.update(&mut body, pose(0.014), None, start + Duration::from_millis(14));
        grab.update(&mut body, pose(0.028), None, start + Duration::from_micros(14_050));

        assert_eq!(body.calls.last(), Some(&BodyCall::Translation(Vec3::new(0.028, 1.0, 0.0))));
        let Some(ReleaseOutcome::Thrown { linear, .. }) = grab.end(&mut body, None) else {
            panic!("expected a throw");
        };
        assert!(approx(linear, Vec3::new(1.0, 0.0, 0.0)), "linear {linear}");
    }

    #[test]
    fn when_a_move_repeats_at_the_same_instant_then_the_recorded_motion_survives() {
        let mut body = RecordingBody::default();
        let mut grab = GrabController::new();
        let start = Instant::now();
        let at = start + Duration::from_millis(50);

        grab.begin(&mut body, pose(0.0), start);
        grab.update(&mut body, pose(0.1), None, at);
        grab.update(&mut body, pose(0.1), None, at);

        let Some(ReleaseOutcome::Thrown { linear, .. }) = grab.end(&mut body, None) else {
            panic!("expected a throw");
        };
        assert!(approx(linear, Vec3::new(2.0, 0.0, 0.0)), "linear {linear}");
    }

    #[test]
    fn when_a_supplied_delta_has_no_interval_then_the_previous_one_is_kept() {
        let mut body = RecordingBody::default();
        let mut grab = GrabController::new();
        let start = Instant::now();
        let delta = |time| HandleDelta {
            position: Vec3::new(0.2, 0.0, 0.0),
            rotation: Vec3::ZERO,
            time,
        };

        grab.begin(&mut body, pose(0.0), start);
        grab.update(&mut body, pose(0.2), Some(delta(0.1)), start + Duration::from_millis(100));
        grab.update(&mut body, pose(0.2), Some(delta(0.0)), start + Duration::from_millis(100));

        let recorded = grab.drag_state().and_then(|drag| drag.accumulated_delta);
        assert_eq!(recorded.map(|d| d.time), Some(0.1));
    }
}
