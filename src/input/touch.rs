//! Touch input
//!
//! Touches are recorded so a swing mapping can be added later, but they do
//! not move any saber yet. The bridge suppresses the browser's default
//! scroll/zoom for every touch the tracker consumes.

use serde::Serialize;

/// Touch points tracked at once; the oldest is dropped beyond this
pub const MAX_ACTIVE_TOUCHES: usize = 10;

/// Touch event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TouchPhase {
    Start,
    Move,
    /// Lifted or cancelled
    End,
}

impl TouchPhase {
    /// Map a DOM event type
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type {
            "touchstart" => Some(TouchPhase::Start),
            "touchmove" => Some(TouchPhase::Move),
            "touchend" | "touchcancel" => Some(TouchPhase::End),
            _ => None,
        }
    }
}

/// One touch point in client pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TouchSample {
    pub id: i32,
    pub x: f32,
    pub y: f32,
    pub phase: TouchPhase,
}

/// What the caller should do with the platform event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchResponse {
    /// Suppress the default action
    Consumed,
}

/// Latest sample per active touch
#[derive(Debug, Clone, Default, Serialize)]
pub struct TouchTracker {
    active: Vec<TouchSample>,
    pub samples_seen: u64,
}

impl TouchTracker {
    pub fn record(&mut self, sample: TouchSample) -> TouchResponse {
        self.samples_seen += 1;
        if !sample.x.is_finite() || !sample.y.is_finite() {
            return TouchResponse::Consumed;
        }
        let existing = self.active.iter().position(|t| t.id == sample.id);
        match (sample.phase, existing) {
            (TouchPhase::End, Some(index)) => {
                self.active.remove(index);
            }
            (TouchPhase::End, None) => {}
            (_, Some(index)) => self.active[index] = sample,
            (phase, None) => {
                if phase == TouchPhase::Move {
                    log::debug!("Touch {} moved without a start", sample.id);
                }
                if self.active.len() >= MAX_ACTIVE_TOUCHES {
                    self.active.remove(0);
                }
                self.active.push(sample);
            }
        }
        TouchResponse::Consumed
    }

    pub fn active(&self) -> &[TouchSample] {
        &self.active
    }
}
