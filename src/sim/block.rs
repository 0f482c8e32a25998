//! Approaching blocks: spawning, movement and the fall-away after a miss

use glam::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::Aabb;
use super::saber::SaberColor;
use crate::settings::Settings;

pub type BlockId = u32;

/// Block lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockState {
    /// Approaching, can be hit
    Active,
    /// Passed the player, no longer collidable
    Missed,
}

/// A block entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub color: SaberColor,
    pub position: Vec3,
    /// Edge length of the bounding cube
    pub size: f32,
    pub state: BlockState,
}

impl Block {
    pub fn new(id: BlockId, color: SaberColor, position: Vec3, size: f32) -> Self {
        Self {
            id,
            color,
            position,
            size,
            state: BlockState::Active,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_size(self.position, self.size)
    }

    pub fn is_active(&self) -> bool {
        self.state == BlockState::Active
    }

    /// Move toward the player (+Z)
    pub fn advance(&mut self, distance: f32) {
        self.position.z += distance;
    }

    /// Active -> Missed. Returns false if already missed.
    pub fn mark_missed(&mut self) -> bool {
        if self.state == BlockState::Missed {
            return false;
        }
        self.state = BlockState::Missed;
        true
    }
}

/// Visual-only tumble of a missed block
///
/// Advanced once per tick by the main loop and dropped once it has travelled
/// past the dispose depth or run out of time.
#[derive(Debug, Clone, Serialize)]
pub struct FallingBlock {
    pub id: BlockId,
    pub color: SaberColor,
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Quat,
    pub spin_axis: Vec3,
    pub elapsed: f32,
}

impl FallingBlock {
    pub fn from_missed(block: &Block, forward_speed: f32, spin_axis: Vec3) -> Self {
        Self {
            id: block.id,
            color: block.color,
            position: block.position,
            velocity: Vec3::new(0.0, 0.0, forward_speed),
            rotation: Quat::IDENTITY,
            spin_axis: spin_axis.try_normalize().unwrap_or(Vec3::X),
            elapsed: 0.0,
        }
    }

    /// Gravity + continuous rotation
    pub fn step(&mut self, dt: f32, gravity: f32, spin: f32) {
        self.velocity.y -= gravity * dt;
        self.position += self.velocity * dt;
        self.rotation = (Quat::from_axis_angle(self.spin_axis, spin * dt) * self.rotation).normalize();
        self.elapsed += dt;
    }

    pub fn is_finished(&self, dispose_z: f32, max_secs: f32) -> bool {
        self.position.z > dispose_z || self.elapsed >= max_secs
    }
}

/// Move every live block forward and mark the ones that passed `miss_z`
///
/// Returns the ids of newly missed blocks in list order. The caller removes
/// them from the live set.
pub fn advance_blocks(blocks: &mut [Block], distance: f32, miss_z: f32) -> Vec<BlockId> {
    blocks
        .iter_mut()
        .filter(|block| block.is_active())
        .filter_map(|block| {
            block.advance(distance);
            (block.position.z > miss_z && block.mark_missed()).then_some(block.id)
        })
        .collect()
}

/// Roll this tick's spawn: at most one block, with probability
/// `settings.spawn_probability`
pub fn roll_spawn<R: Rng + ?Sized>(rng: &mut R, settings: &Settings) -> Option<(SaberColor, Vec3)> {
    if rng.random::<f32>() >= settings.spawn_probability {
        return None;
    }
    let color = if rng.random_bool(0.5) {
        SaberColor::Red
    } else {
        SaberColor::Blue
    };
    let x = -settings.spawn_half_width + 2.0 * settings.spawn_half_width * rng.random::<f32>();
    let y = settings.spawn_min_y + (settings.spawn_max_y - settings.spawn_min_y) * rng.random::<f32>();
    Some((color, Vec3::new(x, y, settings.spawn_z)))
}

/// Random tumble axis for a missed block
pub fn random_spin_axis<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(
        rng.random::<f32>() - 0.5,
        rng.random::<f32>() - 0.5,
        rng.random::<f32>() - 0.5,
    )
    .try_normalize()
    .unwrap_or(Vec3::X)
}
