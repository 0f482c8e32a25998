//! Platform layer
//!
//! Handles the hand-off to the page:
//! - `snapshot`: per-frame view of everything the renderer draws
//! - `web`: wasm-bindgen bridge driven by the page's render loop (wasm32 only)

pub mod snapshot;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use snapshot::Snapshot;
