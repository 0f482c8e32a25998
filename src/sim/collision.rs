//! Swept saber vs block collision
//!
//! The core correctness problem: a saber can move further in one tick than a
//! block is wide. Each pair of neighbouring blade samples is swept from its
//! previous-tick position to its current one and the resulting quad is
//! tested against the block, so fast swings cannot tunnel through.

use glam::Vec3;

use super::block::{Block, BlockId};
use super::effect::EffectKind;
use super::geometry::{Aabb, SweptPair};
use super::saber::{Saber, SaberId};

/// A resolved saber/block contact
#[derive(Debug, Clone)]
pub struct SaberHit {
    pub saber_id: SaberId,
    pub block_id: BlockId,
    /// Contact point in world space
    pub point: Vec3,
    /// Normalized tip motion of the saber this tick
    pub swing: Vec3,
    /// Saber color equals block color
    pub matched: bool,
}

impl SaberHit {
    /// +1 for a color match, -1 otherwise
    pub fn score_delta(&self) -> i64 {
        if self.matched { 1 } else { -1 }
    }

    pub fn effect_kind(&self) -> EffectKind {
        if self.matched {
            EffectKind::Match
        } else {
            EffectKind::Mismatch
        }
    }
}

/// Sweep a sampled blade against a box
///
/// `prev` and `curr` are the same blade samples at the previous and current
/// tick. Sample pairs are tried base to tip; the first contact wins.
pub fn sweep_blade(prev: &[Vec3], curr: &[Vec3], aabb: &Aabb) -> Option<Vec3> {
    prev.windows(2)
        .zip(curr.windows(2))
        .find_map(|(p, c)| SweptPair::new(p[0], p[1], c[0], c[1]).hit_aabb(aabb))
}

/// Test one saber against the live blocks
///
/// Blocks are visited in list order. Blocks already `claimed` by an earlier
/// hit this tick are skipped, and every new hit claims its block.
pub fn resolve_saber(saber: &Saber, blocks: &[Block], claimed: &mut [bool], hits: &mut Vec<SaberHit>) {
    if !saber.visible || !saber.is_observed() {
        return;
    }

    let prev = saber.previous_world_samples();
    let curr = saber.world_samples();
    let swing = saber.swing_direction();

    for (block, taken) in blocks.iter().zip(claimed.iter_mut()) {
        if *taken || !block.is_active() {
            continue;
        }
        let Some(point) = sweep_blade(&prev, &curr, &block.aabb()) else {
            continue;
        };
        *taken = true;
        let matched = block.color == saber.color;
        log::debug!(
            "Saber {} hit block {} ({})",
            saber.id,
            block.id,
            if matched { "match" } else { "mismatch" }
        );
        hits.push(SaberHit {
            saber_id: saber.id,
            block_id: block.id,
            point,
            swing,
            matched,
        });
    }
}

/// Collision pass for one tick: every saber against every live block
///
/// Each block is hit at most once. Nothing is removed here; the caller
/// removes the hit blocks from the live set.
pub fn resolve_hits(sabers: &[Saber], blocks: &[Block]) -> Vec<SaberHit> {
    let mut hits = Vec::new();
    let mut claimed = vec![false; blocks.len()];
    for saber in sabers {
        resolve_saber(saber, blocks, &mut claimed, &mut hits);
    }
    hits
}
