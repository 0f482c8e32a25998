//! Saber Slash - A browser saber-slashing game for desktop, mobile and WebXR
//!
//! Core modules:
//! - `sim`: Simulation core (sabers, blocks, swept collisions, scoring, effects)
//! - `input`: Desktop key table, VR controller binding, touch stub
//! - `settings`: Data-driven tuning loaded from JSON
//! - `hud`: Score label placement per session mode
//! - `platform`: Render snapshot and the browser bridge

pub mod hud;
pub mod input;
pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::{QualityPreset, Settings, SettingsError};

use glam::{Quat, Vec3};

/// Game configuration constants
///
/// World space: the player stands at the origin looking down -Z, +Y is up.
pub mod consts {
    /// One simulation tick per displayed frame
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Longest frame time a single tick will simulate
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Depth at which new blocks appear
    pub const SPAWN_Z: f32 = -20.0;
    /// Blocks crossing this depth have passed the player
    pub const MISS_Z: f32 = 1.0;
    /// Missed blocks are disposed once they fall past this depth
    pub const DISPOSE_Z: f32 = 8.0;

    /// Block approach speed (units/s)
    pub const BLOCK_SPEED: f32 = 4.0;
    /// Edge length of the cubic block bounding volume
    pub const BLOCK_SIZE: f32 = 0.4;
    /// Chance of spawning one block on any given tick
    pub const SPAWN_PROBABILITY: f32 = 0.02;
    /// Lateral spawn range (±x)
    pub const SPAWN_HALF_WIDTH: f32 = 1.2;
    /// Vertical spawn range
    pub const SPAWN_MIN_Y: f32 = 0.6;
    pub const SPAWN_MAX_Y: f32 = 1.8;

    /// Downward acceleration of a missed block (units/s²)
    pub const FALL_GRAVITY: f32 = 9.8;
    /// Tumble rate of a missed block (radians/s)
    pub const FALL_SPIN: f32 = 4.0;
    /// Upper bound on the fall-away animation
    pub const FALL_MAX_SECS: f32 = 3.0;

    /// Hit effect lifetime
    pub const EFFECT_DURATION: f32 = 0.6;
    /// Offset of the hit effect along the swing direction
    pub const EFFECT_SWING_OFFSET: f32 = 0.1;
    /// Live effect cap; extra requests are dropped
    pub const MAX_EFFECTS: usize = 32;

    /// Desktop key step sizes (per key event, not per second)
    pub const KEY_MOVE_STEP: f32 = 0.1;
    pub const KEY_ROTATE_STEP: f32 = 0.1;

    /// Onboarding help text timing
    pub const HELP_TEXT_HOLD_SECS: f32 = 6.0;
    pub const HELP_TEXT_FADE_SECS: f32 = 1.5;

    /// Sabers
    pub const HANDLE_LENGTH: f32 = 0.2;
    pub const BLADE_LENGTH: f32 = 1.0;
    pub const BLADE_SAMPLES: usize = 5;
}

/// Rotate an orientation about its own forward (-Z) axis
#[inline]
pub fn roll_about_forward(rotation: Quat, angle: f32) -> Quat {
    (rotation * Quat::from_rotation_z(angle)).normalize()
}

/// Component-wise finiteness check for poses coming from outside
#[inline]
pub fn is_finite_vec3(v: Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}
