//! Edge-triggered gesture tracking.
//!
//! A [`GestureTracker`] wraps the per-frame classifier and turns its noisy
//! boolean into Start/End [`GestureEvent`]s. One tracker exists per hand; it
//! is created at scene setup and discarded when the hand goes away.

use crate::domain::gesture::{GestureEvent, GestureKind, classify};
use crate::domain::hand::JointSnapshot;
use crate::domain::tuning::GestureTuning;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;
use tracing::{debug, warn};

/// Handle returned by [`GestureTracker::on_gesture`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&GestureEvent) + Send>;

pub struct GestureTracker {
    kind: GestureKind,
    tuning: GestureTuning,
    previous_active: bool,
    current_gesture: Option<GestureKind>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl GestureTracker {
    pub fn new(tuning: GestureTuning) -> Self {
        Self::for_kind(GestureKind::RockHorns, tuning)
    }

    pub fn for_kind(kind: GestureKind, tuning: GestureTuning) -> Self {
        Self {
            kind,
            tuning,
            previous_active: false,
            current_gesture: None,
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    pub fn is_active(&self) -> bool {
        self.previous_active
    }

    pub fn current_gesture(&self) -> Option<GestureKind> {
        self.current_gesture
    }

    /// Registers a listener. Listeners run synchronously, in registration order.
    pub fn on_gesture<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&GestureEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns false if the id was not registered.
    pub fn off_gesture(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn update(&mut self, snapshot: &JointSnapshot) -> Option<GestureEvent> {
        self.update_at(snapshot, Instant::now())
    }

    /// Classifies one frame and emits an event only when the result changed.
    pub fn update_at(&mut self, snapshot: &JointSnapshot, now: Instant) -> Option<GestureEvent> {
        let is_active = classify(self.kind, snapshot, &self.tuning);
        if is_active == self.previous_active {
            return None;
        }
        self.previous_active = is_active;

        let event = if is_active {
            self.current_gesture = Some(self.kind);
            GestureEvent {
                gesture: self.kind,
                active: true,
                timestamp: now,
            }
        } else if self.current_gesture == Some(self.kind) {
            self.current_gesture = None;
            GestureEvent {
                gesture: self.kind,
                active: false,
                timestamp: now,
            }
        } else {
            return None;
        };

        debug!(gesture = event.gesture.as_str(), active = event.active, "gesture transition");
        self.emit(&event);
        Some(event)
    }

    fn emit(&mut self, event: &GestureEvent) {
        for (id, listener) in self.listeners.iter_mut() {
            // A failing listener must not starve the ones after it.
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                warn!(
                    subscription = id.0,
                    gesture = event.gesture.as_str(),
                    active = event.active,
                    "gesture listener panicked"
                );
            }
        }
    }
}
