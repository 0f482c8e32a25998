//! Keyboard saber control
//!
//! Left saber: W/S/A/D move, Q/E roll. Right saber: arrow keys move, `[`/`]`
//! roll. R resets both. Every key press is one fixed step; holding a key
//! relies on the browser's key repeat.

use glam::Vec3;

use crate::sim::{ControlSource, GameState, SessionMode};

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    BracketLeft,
    BracketRight,
    Reset,
}

impl Key {
    /// Map a `KeyboardEvent.key` value
    pub fn from_web_key(key: &str) -> Option<Self> {
        match key {
            "w" | "W" => Some(Key::W),
            "a" | "A" => Some(Key::A),
            "s" | "S" => Some(Key::S),
            "d" | "D" => Some(Key::D),
            "q" | "Q" => Some(Key::Q),
            "e" | "E" => Some(Key::E),
            "ArrowUp" => Some(Key::ArrowUp),
            "ArrowDown" => Some(Key::ArrowDown),
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            "[" => Some(Key::BracketLeft),
            "]" => Some(Key::BracketRight),
            "r" | "R" => Some(Key::Reset),
            _ => None,
        }
    }
}

/// What a bound key does to its saber, in unit steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SaberAction {
    /// World-space direction, scaled by the move step
    Translate(Vec3),
    /// Roll sign about the saber's forward axis, scaled by the rotate step
    Roll(f32),
}

/// Fixed key -> (saber, action) table
pub const KEY_BINDINGS: &[(Key, ControlSource, SaberAction)] = &[
    (Key::W, ControlSource::DesktopLeft, SaberAction::Translate(Vec3::Y)),
    (Key::S, ControlSource::DesktopLeft, SaberAction::Translate(Vec3::NEG_Y)),
    (Key::A, ControlSource::DesktopLeft, SaberAction::Translate(Vec3::NEG_X)),
    (Key::D, ControlSource::DesktopLeft, SaberAction::Translate(Vec3::X)),
    (Key::Q, ControlSource::DesktopLeft, SaberAction::Roll(1.0)),
    (Key::E, ControlSource::DesktopLeft, SaberAction::Roll(-1.0)),
    (Key::ArrowUp, ControlSource::DesktopRight, SaberAction::Translate(Vec3::Y)),
    (Key::ArrowDown, ControlSource::DesktopRight, SaberAction::Translate(Vec3::NEG_Y)),
    (Key::ArrowLeft, ControlSource::DesktopRight, SaberAction::Translate(Vec3::NEG_X)),
    (Key::ArrowRight, ControlSource::DesktopRight, SaberAction::Translate(Vec3::X)),
    (Key::BracketLeft, ControlSource::DesktopRight, SaberAction::Roll(1.0)),
    (Key::BracketRight, ControlSource::DesktopRight, SaberAction::Roll(-1.0)),
];

/// Binding for a key, if any
pub fn binding(key: Key) -> Option<(ControlSource, SaberAction)> {
    KEY_BINDINGS
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|&(_, source, action)| (source, action))
}

/// Apply one key press
///
/// Keys are ignored during an immersive session, and a key whose saber does
/// not exist is a no-op.
pub fn apply_key(state: &mut GameState, key: Key) {
    if state.mode == SessionMode::Immersive {
        return;
    }
    if key == Key::Reset {
        state.reset_desktop_sabers();
        return;
    }
    let Some((source, action)) = binding(key) else {
        return;
    };
    let move_step = state.settings.key_move_step;
    let rotate_step = state.settings.key_rotate_step;
    let Some(saber) = state.saber_for_source_mut(source) else {
        return;
    };
    match action {
        SaberAction::Translate(dir) => saber.translate(dir * move_step),
        SaberAction::Roll(sign) => saber.roll(sign * rotate_step),
    }
}
