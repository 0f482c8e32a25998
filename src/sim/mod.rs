//! Simulation module
//!
//! All gameplay logic lives here. This module stays free of rendering and
//! platform dependencies:
//! - One tick per displayed frame, never overlapping
//! - Seeded RNG only
//! - Stable iteration order (list order)

pub mod block;
pub mod collision;
pub mod effect;
pub mod geometry;
pub mod saber;
pub mod state;
pub mod tick;

pub use block::{Block, BlockId, BlockState, FallingBlock};
pub use collision::{SaberHit, resolve_hits, sweep_blade};
pub use effect::{EffectKind, ParticleBurst, ParticleInstance, instance_bytes};
pub use geometry::{Aabb, SweptPair, ray_aabb, segment_aabb};
pub use saber::{ControlSource, Handedness, Modality, Pose, Saber, SaberColor, SaberId, SaberIndex};
pub use state::{EntityRef, GameEvent, GameState, SessionEvent, SessionMode, Stats};
pub use tick::{TickInput, frame_dt, tick};
