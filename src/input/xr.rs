//! Tracked controller binding
//!
//! The XR runtime reports one grip pose per controller per frame. The pose is
//! applied to the matching saber as-is; connect/disconnect is handled by the
//! session state machine in `sim::state`.

use glam::{Quat, Vec3};

use crate::sim::{ControlSource, GameState, Handedness, Pose};

/// Apply a tracked pose to the saber held in `hand`
///
/// Does nothing if that controller has no saber (yet).
pub fn apply_controller_pose(state: &mut GameState, hand: Handedness, pose: Pose) {
    if let Some(saber) = state.saber_for_source_mut(ControlSource::vr(hand)) {
        saber.set_pose(pose);
    }
}

/// Build a pose from raw position + quaternion components
///
/// Returns `None` for non-finite input or a degenerate quaternion.
pub fn pose_from_components(position: [f32; 3], rotation: [f32; 4]) -> Option<Pose> {
    let position = Vec3::from_array(position);
    let rotation = Quat::from_array(rotation);
    if !crate::is_finite_vec3(position) || !rotation.is_finite() {
        return None;
    }
    if rotation.length_squared() < 1e-6 {
        return None;
    }
    Some(Pose::new(position, rotation.normalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::{SessionEvent, SessionMode};

    #[test]
    fn test_pose_drives_vr_saber() {
        let mut state = GameState::new(9, Settings::default(), SessionMode::Desktop);
        state.handle_session_event(SessionEvent::ImmersiveStarted);
        state.handle_session_event(SessionEvent::ControllerConnected(Handedness::Right));

        let pose = Pose::new(Vec3::new(0.2, 1.3, -0.3), Quat::from_rotation_x(-0.4));
        apply_controller_pose(&mut state, Handedness::Right, pose);

        let saber = state.saber_for_source(ControlSource::VrRight);
        assert_eq!(saber.map(|s| s.pose), Some(pose));
        // First observation: no sweep from the default pose
        assert_eq!(saber.map(|s| s.previous_pose), Some(pose));
    }

    #[test]
    fn test_pose_without_saber_is_noop() {
        let mut state = GameState::new(9, Settings::default(), SessionMode::Desktop);
        apply_controller_pose(&mut state, Handedness::Left, Pose::IDENTITY);
        assert!(state.saber_for_source(ControlSource::VrLeft).is_none());
    }

    #[test]
    fn test_pose_from_components() {
        let pose = pose_from_components([1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 2.0]);
        assert_eq!(pose, Some(Pose::new(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY)));
        assert!(pose_from_components([f32::NAN, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0]).is_none());
        assert!(pose_from_components([0.0; 3], [0.0; 4]).is_none());
    }
}
