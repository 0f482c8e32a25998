//! Game settings and tuning
//!
//! Every gameplay constant can be overridden from a JSON document supplied by
//! the page. Missing fields fall back to `crate::consts`.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::Pose;

/// Settings loading failures
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Particles emitted by one hit burst
    pub fn particles_per_burst(&self) -> usize {
        match self {
            QualityPreset::Low => 6,
            QualityPreset::Medium => 12,
            QualityPreset::High => 24,
        }
    }
}

/// Where a saber's blade sits in the saber's local space
///
/// Tracked controllers point the blade down local -Z, keyboard sabers stand
/// upright along +Y.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BladeConfig {
    /// Direction from the grip toward the tip
    pub axis: Vec3,
    pub handle_length: f32,
    pub blade_length: f32,
    /// Number of collision samples from blade base to tip (>= 2)
    pub samples: usize,
}

impl BladeConfig {
    pub fn along(axis: Vec3) -> Self {
        Self {
            axis,
            handle_length: HANDLE_LENGTH,
            blade_length: BLADE_LENGTH,
            samples: BLADE_SAMPLES,
        }
    }

    /// Local-space sample points, base first, tip last
    pub fn sample_points(&self) -> Vec<Vec3> {
        let axis = self.axis.normalize_or_zero();
        let base = axis * self.handle_length;
        let steps = self.samples.max(2) - 1;
        (0..=steps)
            .map(|i| base + axis * (self.blade_length * i as f32 / steps as f32))
            .collect()
    }
}

/// Game settings/tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Particle quality preset
    pub quality: QualityPreset,
    /// Hit/miss particle bursts
    pub particles: bool,

    // === Spawning ===
    pub spawn_probability: f32,
    pub spawn_z: f32,
    pub spawn_half_width: f32,
    pub spawn_min_y: f32,
    pub spawn_max_y: f32,

    // === Blocks ===
    pub block_speed: f32,
    pub block_size: f32,
    pub miss_z: f32,
    pub dispose_z: f32,
    pub fall_gravity: f32,
    pub fall_spin: f32,
    pub fall_max_secs: f32,

    // === Effects ===
    pub effect_duration: f32,

    // === Sabers ===
    pub key_move_step: f32,
    pub key_rotate_step: f32,
    pub desktop_blade: BladeConfig,
    pub vr_blade: BladeConfig,
    /// Canonical keyboard saber poses restored by the reset key
    pub desktop_left_pose: Pose,
    pub desktop_right_pose: Pose,

    // === Onboarding ===
    pub help_hold_secs: f32,
    pub help_fade_secs: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,

            spawn_probability: SPAWN_PROBABILITY,
            spawn_z: SPAWN_Z,
            spawn_half_width: SPAWN_HALF_WIDTH,
            spawn_min_y: SPAWN_MIN_Y,
            spawn_max_y: SPAWN_MAX_Y,

            block_speed: BLOCK_SPEED,
            block_size: BLOCK_SIZE,
            miss_z: MISS_Z,
            dispose_z: DISPOSE_Z,
            fall_gravity: FALL_GRAVITY,
            fall_spin: FALL_SPIN,
            fall_max_secs: FALL_MAX_SECS,

            effect_duration: EFFECT_DURATION,

            key_move_step: KEY_MOVE_STEP,
            key_rotate_step: KEY_ROTATE_STEP,
            desktop_blade: BladeConfig::along(Vec3::Y),
            vr_blade: BladeConfig::along(Vec3::NEG_Z),
            desktop_left_pose: Pose::new(Vec3::new(-0.4, 0.8, -1.0), Quat::IDENTITY),
            desktop_right_pose: Pose::new(Vec3::new(0.4, 0.8, -1.0), Quat::IDENTITY),

            help_hold_secs: HELP_TEXT_HOLD_SECS,
            help_fade_secs: HELP_TEXT_FADE_SECS,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings, falling back to defaults on any error
    pub fn from_json_or_default(json: Option<&str>) -> Self {
        match json.map(Self::from_json) {
            Some(Ok(settings)) => {
                log::info!("Loaded settings (quality {})", settings.quality.as_str());
                settings
            }
            Some(Err(e)) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
            None => Self::default(),
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), SettingsError> {
            Err(SettingsError::Invalid { field, reason })
        }

        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return invalid("spawn_probability", "must be within 0..=1");
        }
        if self.block_speed <= 0.0 || !self.block_speed.is_finite() {
            return invalid("block_speed", "must be positive");
        }
        if self.block_size <= 0.0 || !self.block_size.is_finite() {
            return invalid("block_size", "must be positive");
        }
        if self.spawn_half_width < 0.0 {
            return invalid("spawn_half_width", "must not be negative");
        }
        if self.spawn_min_y > self.spawn_max_y {
            return invalid("spawn_min_y", "must not exceed spawn_max_y");
        }
        if self.spawn_z >= self.miss_z {
            return invalid("spawn_z", "must lie in front of miss_z");
        }
        if self.miss_z >= self.dispose_z {
            return invalid("dispose_z", "must lie behind miss_z");
        }
        for (field, blade) in [("desktop_blade", &self.desktop_blade), ("vr_blade", &self.vr_blade)] {
            if blade.samples < 2 {
                return invalid(field, "needs at least two samples");
            }
            if blade.axis.length_squared() < 1e-6 {
                return invalid(field, "axis must be non-zero");
            }
        }
        Ok(())
    }

    /// Effective particle count per burst
    pub fn particles_per_burst(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.particles_per_burst()
        }
    }
}
