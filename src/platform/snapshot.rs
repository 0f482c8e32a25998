//! Per-frame render view
//!
//! The presentation layer owns meshes, text and lights. Each frame it reads a
//! snapshot and places its objects at the poses found here.

use glam::Vec3;
use serde::Serialize;

use crate::hud::score_label_anchor;
use crate::sim::{Block, FallingBlock, GameState, ParticleBurst, Pose, Saber, SessionMode};

/// Borrowed view of the game for one frame
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub tick: u64,
    pub mode: SessionMode,
    pub score: i64,
    pub score_anchor: Vec3,
    /// None once the help text is gone
    pub help_opacity: Option<f32>,
    pub sabers: &'a [Saber],
    pub blocks: &'a [Block],
    pub falling: &'a [FallingBlock],
    pub effects: &'a [ParticleBurst],
}

impl<'a> Snapshot<'a> {
    pub fn capture(state: &'a GameState, head: &Pose) -> Self {
        Self {
            tick: state.time_ticks,
            mode: state.mode,
            score: state.score,
            score_anchor: score_label_anchor(state.mode, head),
            help_opacity: state.help_text.as_ref().map(|h| h.opacity),
            sabers: &state.sabers,
            blocks: &state.blocks,
            falling: &state.falling,
            effects: &state.effects,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            log::warn!("Snapshot serialization failed: {e}");
            String::from("{}")
        })
    }
}
