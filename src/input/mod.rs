//! Input controllers
//!
//! Each control scheme turns raw platform events into saber pose changes:
//! - `desktop`: discrete key steps from a fixed binding table
//! - `xr`: tracked controller poses applied directly
//! - `touch`: tracked and consumed, not yet mapped to swings

pub mod desktop;
pub mod touch;
pub mod xr;

pub use desktop::{Key, SaberAction, apply_key};
pub use touch::{TouchPhase, TouchResponse, TouchSample, TouchTracker};
pub use xr::{apply_controller_pose, pose_from_components};
