//! Saber entities
//!
//! A saber keeps its pose at the end of the previous tick alongside the
//! current one so the collision pass can sweep the blade between them.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::roll_about_forward;
use crate::settings::BladeConfig;

pub type SaberId = u32;

/// World-space position + orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Local point to world space
    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    pub fn is_finite(&self) -> bool {
        crate::is_finite_vec3(self.position) && self.rotation.is_finite()
    }
}

/// Team color shared by sabers and blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaberColor {
    Red,
    Blue,
}

/// Controller handedness as reported by the XR runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Parse the `handedness` field of an input source ("none" is rejected)
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Handedness::Left),
            "right" => Some(Handedness::Right),
            _ => None,
        }
    }

    /// Left hand holds red, right hand holds blue
    pub fn color(&self) -> SaberColor {
        match self {
            Handedness::Left => SaberColor::Red,
            Handedness::Right => SaberColor::Blue,
        }
    }
}

/// Input modality a saber belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modality {
    Desktop,
    Vr,
}

/// What drives a saber's pose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlSource {
    DesktopLeft,
    DesktopRight,
    VrLeft,
    VrRight,
}

impl ControlSource {
    pub fn vr(hand: Handedness) -> Self {
        match hand {
            Handedness::Left => ControlSource::VrLeft,
            Handedness::Right => ControlSource::VrRight,
        }
    }

    pub fn handedness(&self) -> Handedness {
        match self {
            ControlSource::DesktopLeft | ControlSource::VrLeft => Handedness::Left,
            ControlSource::DesktopRight | ControlSource::VrRight => Handedness::Right,
        }
    }

    pub fn modality(&self) -> Modality {
        match self {
            ControlSource::DesktopLeft | ControlSource::DesktopRight => Modality::Desktop,
            ControlSource::VrLeft | ControlSource::VrRight => Modality::Vr,
        }
    }

    pub fn color(&self) -> SaberColor {
        self.handedness().color()
    }
}

/// A player-controlled saber
#[derive(Debug, Clone, Serialize)]
pub struct Saber {
    pub id: SaberId,
    pub color: SaberColor,
    pub source: ControlSource,
    /// Pose this tick
    pub pose: Pose,
    /// Pose at the end of the previous tick
    pub previous_pose: Pose,
    /// Handle/blade layout for the presentation layer
    pub blade: BladeConfig,
    /// Hidden sabers neither render nor collide
    pub visible: bool,
    /// Local blade samples, base to tip
    #[serde(skip)]
    samples: Vec<Vec3>,
    /// False until the first pose has been seen (tracked sabers)
    observed: bool,
}

impl Saber {
    /// Create a saber for `source`
    ///
    /// With an initial pose the saber is observed immediately; without one
    /// (a freshly connected controller) the first `set_pose` seeds both
    /// current and previous pose.
    pub fn new(id: SaberId, source: ControlSource, blade: &BladeConfig, initial: Option<Pose>) -> Self {
        let pose = initial.unwrap_or_default();
        Self {
            id,
            color: source.color(),
            source,
            pose,
            previous_pose: pose,
            blade: blade.clone(),
            visible: true,
            samples: blade.sample_points(),
            observed: initial.is_some(),
        }
    }

    pub fn is_observed(&self) -> bool {
        self.observed
    }

    pub fn modality(&self) -> Modality {
        self.source.modality()
    }

    /// Move the saber; the collision pass sweeps from the previous pose
    pub fn set_pose(&mut self, pose: Pose) {
        if !pose.is_finite() {
            log::debug!("Saber {} ignored non-finite pose", self.id);
            return;
        }
        if !self.observed {
            self.previous_pose = pose;
            self.observed = true;
        }
        self.pose = pose;
    }

    /// Jump to a pose without sweeping through the space in between
    pub fn teleport(&mut self, pose: Pose) {
        self.pose = pose;
        self.previous_pose = pose;
        self.observed = true;
    }

    /// Translate in world space
    pub fn translate(&mut self, delta: Vec3) {
        let pose = Pose::new(self.pose.position + delta, self.pose.rotation);
        self.set_pose(pose);
    }

    /// Rotate about the saber's own forward axis
    pub fn roll(&mut self, angle: f32) {
        let pose = Pose::new(self.pose.position, roll_about_forward(self.pose.rotation, angle));
        self.set_pose(pose);
    }

    /// End of tick: the current pose becomes the sweep origin
    pub fn commit_frame(&mut self) {
        self.previous_pose = self.pose;
    }

    /// Show/hide. A revealed saber starts a fresh sweep from where it is.
    pub fn set_visible(&mut self, visible: bool) {
        if visible && !self.visible {
            self.previous_pose = self.pose;
        }
        self.visible = visible;
    }

    /// Local blade samples, base to tip
    pub fn samples(&self) -> &[Vec3] {
        &self.samples
    }

    pub fn world_samples(&self) -> Vec<Vec3> {
        self.samples.iter().map(|&p| self.pose.transform_point(p)).collect()
    }

    pub fn previous_world_samples(&self) -> Vec<Vec3> {
        self.samples
            .iter()
            .map(|&p| self.previous_pose.transform_point(p))
            .collect()
    }

    fn local_tip(&self) -> Vec3 {
        self.samples.last().copied().unwrap_or(Vec3::ZERO)
    }

    /// Normalized tip motion since the previous tick (zero when still)
    pub fn swing_direction(&self) -> Vec3 {
        let tip = self.local_tip();
        (self.pose.transform_point(tip) - self.previous_pose.transform_point(tip)).normalize_or_zero()
    }
}

/// Non-owning partition of saber ids by modality, for visibility toggling
#[derive(Debug, Clone, Default)]
pub struct SaberIndex {
    desktop: Vec<SaberId>,
    vr: Vec<SaberId>,
}

impl SaberIndex {
    pub fn insert(&mut self, saber: &Saber) {
        let ids = self.ids_mut(saber.modality());
        if !ids.contains(&saber.id) {
            ids.push(saber.id);
        }
    }

    pub fn remove(&mut self, id: SaberId) {
        self.desktop.retain(|&i| i != id);
        self.vr.retain(|&i| i != id);
    }

    pub fn ids(&self, modality: Modality) -> &[SaberId] {
        match modality {
            Modality::Desktop => &self.desktop,
            Modality::Vr => &self.vr,
        }
    }

    fn ids_mut(&mut self, modality: Modality) -> &mut Vec<SaberId> {
        match modality {
            Modality::Desktop => &mut self.desktop,
            Modality::Vr => &mut self.vr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop_saber() -> Saber {
        let blade = BladeConfig::along(Vec3::Y);
        Saber::new(1, ControlSource::DesktopLeft, &blade, Some(Pose::new(Vec3::new(0.0, 1.0, -1.0), Quat::IDENTITY)))
    }

    #[test]
    fn test_new_saber_previous_equals_current() {
        let saber = desktop_saber();
        assert_eq!(saber.pose, saber.previous_pose);
        assert!(saber.is_observed());
        assert_eq!(saber.color, SaberColor::Red);
        assert_eq!(saber.swing_direction(), Vec3::ZERO);
    }

    #[test]
    fn test_first_tracked_pose_seeds_previous() {
        let blade = BladeConfig::along(Vec3::NEG_Z);
        let mut saber = Saber::new(7, ControlSource::VrRight, &blade, None);
        assert!(!saber.is_observed());
        assert_eq!(saber.color, SaberColor::Blue);

        let tracked = Pose::new(Vec3::new(0.3, 1.2, -0.4), Quat::from_rotation_y(0.5));
        saber.set_pose(tracked);
        assert_eq!(saber.pose, tracked);
        assert_eq!(saber.previous_pose, tracked);

        // Subsequent poses sweep
        saber.set_pose(Pose::new(Vec3::new(0.5, 1.2, -0.4), Quat::IDENTITY));
        assert_eq!(saber.previous_pose, tracked);
    }

    #[test]
    fn test_commit_frame() {
        let mut saber = desktop_saber();
        saber.translate(Vec3::X * 0.5);
        assert_ne!(saber.pose, saber.previous_pose);
        assert!((saber.swing_direction() - Vec3::X).length() < 1e-5);
        saber.commit_frame();
        assert_eq!(saber.pose, saber.previous_pose);
    }

    #[test]
    fn test_teleport_does_not_sweep() {
        let mut saber = desktop_saber();
        saber.teleport(Pose::new(Vec3::new(5.0, 0.0, 0.0), Quat::IDENTITY));
        assert_eq!(saber.pose, saber.previous_pose);
    }

    #[test]
    fn test_non_finite_pose_ignored() {
        let mut saber = desktop_saber();
        let before = saber.pose;
        saber.set_pose(Pose::new(Vec3::new(f32::NAN, 0.0, 0.0), Quat::IDENTITY));
        assert_eq!(saber.pose, before);
    }

    #[test]
    fn test_reveal_resyncs_previous_pose() {
        let mut saber = desktop_saber();
        saber.set_visible(false);
        saber.translate(Vec3::Y);
        saber.set_visible(true);
        assert_eq!(saber.pose, saber.previous_pose);
    }

    #[test]
    fn test_world_samples_follow_rotation() {
        let mut saber = desktop_saber();
        // Roll a quarter turn: upright blade now points along -X
        saber.teleport(Pose::new(Vec3::ZERO, Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)));
        let tip = saber.world_samples()[saber.samples().len() - 1];
        assert!(tip.x < -1.0);
        assert!(tip.y.abs() < 1e-5);
    }

    #[test]
    fn test_index_partitions_by_modality() {
        let mut index = SaberIndex::default();
        let blade = BladeConfig::along(Vec3::Y);
        let a = Saber::new(1, ControlSource::DesktopLeft, &blade, None);
        let b = Saber::new(2, ControlSource::VrLeft, &blade, None);
        index.insert(&a);
        index.insert(&a);
        index.insert(&b);
        assert_eq!(index.ids(Modality::Desktop), &[1]);
        assert_eq!(index.ids(Modality::Vr), &[2]);
        index.remove(2);
        index.remove(99);
        assert!(index.ids(Modality::Vr).is_empty());
    }
}
