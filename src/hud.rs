//! HUD placement and onboarding text
//!
//! The score label itself is drawn by the presentation layer; this module
//! only decides where it goes and how long the help text stays up.

use glam::Vec3;
use serde::Serialize;

use crate::sim::{Pose, SessionMode};

/// Score label position in the flat-screen modes (world-anchored)
pub const SCORE_LABEL_WORLD: Vec3 = Vec3::new(0.0, 2.6, -3.0);
/// Score label offset from the head in an immersive session
pub const SCORE_LABEL_HEAD_OFFSET: Vec3 = Vec3::new(0.0, 0.35, -1.5);

/// Where the score label should sit this frame
pub fn score_label_anchor(mode: SessionMode, head: &Pose) -> Vec3 {
    match mode {
        SessionMode::Desktop | SessionMode::Mobile => SCORE_LABEL_WORLD,
        SessionMode::Immersive => head.transform_point(SCORE_LABEL_HEAD_OFFSET),
    }
}

/// Onboarding text: held, then faded out, then gone
#[derive(Debug, Clone, Serialize)]
pub struct HelpText {
    pub opacity: f32,
    hold_remaining: f32,
    fade_remaining: f32,
    fade_total: f32,
}

impl HelpText {
    pub fn new(hold_secs: f32, fade_secs: f32) -> Self {
        Self {
            opacity: 1.0,
            hold_remaining: hold_secs.max(0.0),
            fade_remaining: fade_secs.max(0.0),
            fade_total: fade_secs.max(0.0),
        }
    }

    /// Advance the fade. Returns false once fully transparent.
    pub fn step(&mut self, dt: f32) -> bool {
        if self.hold_remaining > 0.0 {
            self.hold_remaining -= dt;
            return true;
        }
        self.fade_remaining -= dt;
        if self.fade_remaining <= 0.0 || self.fade_total <= 0.0 {
            self.opacity = 0.0;
            return false;
        }
        self.opacity = (self.fade_remaining / self.fade_total).clamp(0.0, 1.0);
        true
    }
}
