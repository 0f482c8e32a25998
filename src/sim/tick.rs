//! Per-frame simulation tick
//!
//! One tick is one full update pass: session events, input, collisions,
//! block movement/spawning, then the short-lived animations.

use super::block::{FallingBlock, advance_blocks, random_spin_axis, roll_spawn};
use super::collision::resolve_hits;
use super::saber::{Handedness, Pose};
use super::state::{EntityRef, GameEvent, GameState, SessionEvent};
use crate::consts::{EFFECT_SWING_OFFSET, MAX_FRAME_DT, SIM_DT};
use crate::input::{Key, apply_controller_pose, apply_key};

/// Everything that arrived since the previous tick, in arrival order
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub session_events: Vec<SessionEvent>,
    pub keys: Vec<Key>,
    /// Latest tracked grip pose per controller
    pub controller_poses: Vec<(Handedness, Pose)>,
}

/// Measured frame time to a usable tick step
///
/// Garbage falls back to `SIM_DT`; long stalls (tab switch, breakpoint) are
/// clamped to `MAX_FRAME_DT`.
pub fn frame_dt(measured_secs: f32) -> f32 {
    if !measured_secs.is_finite() {
        return SIM_DT;
    }
    measured_secs.clamp(0.0, MAX_FRAME_DT)
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;

    for &event in &input.session_events {
        state.handle_session_event(event);
    }

    // Input mutates saber poses
    for &key in &input.keys {
        apply_key(state, key);
    }
    for &(hand, pose) in &input.controller_poses {
        apply_controller_pose(state, hand, pose);
    }

    resolve_collisions(state);
    move_blocks(state, dt);
    spawn_blocks(state);
    step_animations(state, dt);

    // This tick's poses become next tick's sweep origin
    for saber in &mut state.sabers {
        saber.commit_frame();
    }
}

/// Swept saber/block test, scoring and hit feedback
fn resolve_collisions(state: &mut GameState) {
    let hits = resolve_hits(&state.sabers, &state.blocks);
    for hit in hits {
        if state.remove_block(hit.block_id).is_none() {
            continue;
        }
        state.stats.hits += 1;
        if !hit.matched {
            state.stats.mismatches += 1;
        }
        state.push_event(GameEvent::BlockHit {
            block: hit.block_id,
            saber: hit.saber_id,
            matched: hit.matched,
            point: hit.point,
            swing: hit.swing,
        });
        state.apply_score(hit.score_delta());

        let effect_pos = hit.point + hit.swing * EFFECT_SWING_OFFSET;
        state.spawn_effect(hit.effect_kind(), effect_pos, hit.swing);
    }
}

/// Advance live blocks; blocks past the player turn into falling blocks
fn move_blocks(state: &mut GameState, dt: f32) {
    let distance = state.settings.block_speed * dt;
    let missed = advance_blocks(&mut state.blocks, distance, state.settings.miss_z);

    for id in missed {
        let Some(block) = state.remove_block(id) else {
            continue;
        };
        log::debug!("Block {} missed", block.id);
        state.stats.misses += 1;
        state.push_event(GameEvent::BlockMissed { block: block.id });

        let axis = random_spin_axis(&mut state.rng);
        let falling = FallingBlock::from_missed(&block, state.settings.block_speed, axis);
        state.push_event(GameEvent::Spawned {
            entity: EntityRef::FallingBlock(falling.id),
        });
        state.falling.push(falling);
    }
}

fn spawn_blocks(state: &mut GameState) {
    if let Some((color, position)) = roll_spawn(&mut state.rng, &state.settings) {
        state.spawn_block(color, position);
    }
}

/// Falling blocks, particle bursts and the help text each run down on
/// their own and are dropped when done
fn step_animations(state: &mut GameState, dt: f32) {
    let gravity = state.settings.fall_gravity;
    let spin = state.settings.fall_spin;
    let dispose_z = state.settings.dispose_z;
    let max_secs = state.settings.fall_max_secs;

    let mut finished = Vec::new();
    state.falling.retain_mut(|falling| {
        falling.step(dt, gravity, spin);
        let done = falling.is_finished(dispose_z, max_secs);
        if done {
            finished.push(EntityRef::FallingBlock(falling.id));
        }
        !done
    });

    state.effects.retain_mut(|burst| {
        burst.step(dt);
        let done = burst.is_finished();
        if done {
            finished.push(EntityRef::Effect(burst.id));
        }
        !done
    });

    let help_done = state.help_text.as_mut().is_some_and(|help| !help.step(dt));
    if help_done {
        state.remove_help_text();
    }

    for entity in finished {
        state.push_event(GameEvent::Despawned { entity });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::Settings;
    use crate::sim::block::BlockState;
    use crate::sim::saber::{ControlSource, SaberColor};
    use crate::sim::state::SessionMode;
    use glam::{Quat, Vec3};

    fn quiet_settings() -> Settings {
        Settings {
            spawn_probability: 0.0,
            ..Default::default()
        }
    }

    fn quiet_state() -> GameState {
        GameState::new(12345, quiet_settings(), SessionMode::Desktop)
    }

    #[test]
    fn test_unhit_block_is_missed_without_score_change() {
        let mut state = quiet_state();
        let id = state.spawn_block(SaberColor::Blue, Vec3::new(0.0, 1.0, -10.0));
        state.drain_events();

        let input = TickInput::default();
        let mut ticks = 0;
        while state.blocks.iter().any(|b| b.id == id) {
            let z = state.blocks[0].position.z;
            assert!(z <= state.settings.miss_z);
            tick(&mut state, &input, SIM_DT);
            ticks += 1;
            assert!(ticks < 1000, "block never passed the player");
        }

        assert_eq!(state.score, 0);
        assert_eq!(state.stats.misses, 1);
        assert_eq!(state.stats.hits, 0);
        assert_eq!(state.falling.len(), 1);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::BlockMissed { block: id }));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::ScoreChanged { .. })));

        // Never re-enters the live set
        for _ in 0..600 {
            tick(&mut state, &input, SIM_DT);
            assert!(state.blocks.iter().all(|b| b.id != id));
        }
        assert!(state.falling.is_empty());
        assert!(state
            .drain_events()
            .contains(&GameEvent::Despawned { entity: EntityRef::FallingBlock(id) }));
    }

    #[test]
    fn test_swing_through_block_scores_and_spawns_effect() {
        let mut state = quiet_state();
        // Block right where the left (red) saber is about to sweep
        let left = state.settings.desktop_left_pose.position;
        let id = state.spawn_block(SaberColor::Red, Vec3::new(left.x + 0.5, left.y + 0.6, left.z));
        state.drain_events();

        let input = TickInput {
            keys: vec![Key::D; 10],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);

        assert_eq!(state.score, 1);
        assert!(state.blocks.is_empty());
        assert_eq!(state.effects.len(), 1);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::ScoreChanged { score: 1, delta: 1 }));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::BlockHit { block, matched: true, .. } if *block == id
        )));
        assert!(events.iter().any(|e| matches!(e, GameEvent::EffectSpawned { .. })));
    }

    #[test]
    fn test_wrong_color_hit_scores_minus_one() {
        let mut state = quiet_state();
        let left = state.settings.desktop_left_pose.position;
        state.spawn_block(SaberColor::Blue, Vec3::new(left.x, left.y + 0.6, left.z));
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.score, -1);
        assert_eq!(state.stats.mismatches, 1);
    }

    #[test]
    fn test_first_tick_after_vr_connect_has_no_spurious_sweep() {
        let mut state = quiet_state();
        state.handle_session_event(SessionEvent::ImmersiveStarted);
        state.handle_session_event(SessionEvent::ControllerConnected(Handedness::Left));
        // Block between the default (origin) pose and the first tracked pose
        state.spawn_block(SaberColor::Red, Vec3::new(0.0, 0.5, -0.6));

        let tracked = Pose::new(Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY);
        let input = TickInput {
            controller_poses: vec![(Handedness::Left, tracked)],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.score, 0);
        assert_eq!(state.blocks.len(), 1);
    }

    #[test]
    fn test_hidden_desktop_sabers_do_not_score() {
        let mut state = quiet_state();
        state.handle_session_event(SessionEvent::ImmersiveStarted);
        let left = state.settings.desktop_left_pose.position;
        state.spawn_block(SaberColor::Red, Vec3::new(left.x, left.y + 0.6, left.z));
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.score, 0);
        assert_eq!(state.blocks.len(), 1);
    }

    #[test]
    fn test_session_events_apply_in_tick() {
        let mut state = quiet_state();
        let input = TickInput {
            session_events: vec![
                SessionEvent::ImmersiveStarted,
                SessionEvent::ControllerConnected(Handedness::Right),
            ],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.mode, SessionMode::Immersive);
        assert!(state.saber_for_source(ControlSource::VrRight).is_some());
    }

    #[test]
    fn test_spawn_rate_matches_probability() {
        let settings = Settings {
            spawn_probability: 0.1,
            ..Default::default()
        };
        let mut state = GameState::new(2024, settings, SessionMode::Desktop);
        // Keep the sabers out of the lane so nothing interferes
        for saber in &mut state.sabers {
            saber.teleport(Pose::new(Vec3::new(0.0, -50.0, 0.0), Quat::IDENTITY));
        }
        let input = TickInput::default();
        let n = 10_000;
        for _ in 0..n {
            tick(&mut state, &input, SIM_DT);
            state.drain_events();
        }
        // Expected 1000, sd ~30
        let spawned = state.stats.spawned;
        assert!((850..=1150).contains(&spawned), "spawned = {spawned}");
    }

    #[test]
    fn test_missed_blocks_are_not_active() {
        let mut state = quiet_state();
        let near = state.spawn_block(SaberColor::Red, Vec3::new(0.0, 1.0, state.settings.miss_z - 0.01));
        let far = state.spawn_block(SaberColor::Blue, Vec3::new(0.0, 1.0, -15.0));
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.blocks.len(), 1);
        assert_eq!(state.blocks[0].id, far);
        assert!(state.blocks.iter().all(|b| b.state == BlockState::Active));
        assert_eq!(state.falling.iter().map(|f| f.id).collect::<Vec<_>>(), vec![near]);
        assert_eq!(state.stats.misses, 1);
    }

    #[test]
    fn test_help_text_fades_out() {
        let settings = Settings {
            help_hold_secs: 0.1,
            help_fade_secs: 0.1,
            ..quiet_settings()
        };
        let mut state = GameState::new(1, settings, SessionMode::Desktop);
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(state.help_text.is_none());
    }

    #[test]
    fn test_vr_saber_swing_scores() {
        let mut state = quiet_state();
        state.handle_session_event(SessionEvent::ImmersiveStarted);
        state.handle_session_event(SessionEvent::ControllerConnected(Handedness::Right));
        // Blue block in reach of a blade pointing down -Z
        let id = state.spawn_block(SaberColor::Blue, Vec3::new(0.0, 1.0, -0.7));
        state.drain_events();

        let pose_at = |x: f32| TickInput {
            controller_poses: vec![(Handedness::Right, Pose::new(Vec3::new(x, 1.0, 0.0), Quat::IDENTITY))],
            ..Default::default()
        };
        tick(&mut state, &pose_at(-1.0), SIM_DT);
        assert_eq!(state.score, 0);
        tick(&mut state, &pose_at(1.0), SIM_DT);

        assert_eq!(state.score, 1);
        assert!(state.blocks.is_empty());
        let events = state.drain_events();
        let despawns = events
            .iter()
            .filter(|e| **e == GameEvent::Despawned { entity: EntityRef::Block(id) })
            .count();
        assert_eq!(despawns, 1);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::BlockHit { block, matched: true, point, .. } if *block == id && point.z < 0.0
        )));
    }

    #[test]
    fn test_frame_dt_sanitized() {
        assert_eq!(frame_dt(1.0 / 90.0), 1.0 / 90.0);
        assert_eq!(frame_dt(2.5), MAX_FRAME_DT);
        assert_eq!(frame_dt(-0.01), 0.0);
        assert_eq!(frame_dt(f32::NAN), SIM_DT);
        assert_eq!(frame_dt(f32::INFINITY), SIM_DT);
    }

    #[test]
    fn test_block_speed_independent_of_frame_rate() {
        let mut at_60 = quiet_state();
        let mut at_90 = quiet_state();
        at_60.spawn_block(SaberColor::Blue, Vec3::new(5.0, 1.0, -15.0));
        at_90.spawn_block(SaberColor::Blue, Vec3::new(5.0, 1.0, -15.0));

        // One second of real time at each refresh rate
        for _ in 0..60 {
            tick(&mut at_60, &TickInput::default(), frame_dt(1.0 / 60.0));
        }
        for _ in 0..90 {
            tick(&mut at_90, &TickInput::default(), frame_dt(1.0 / 90.0));
        }

        let z60 = at_60.blocks[0].position.z;
        let z90 = at_90.blocks[0].position.z;
        let expected = -15.0 + at_60.settings.block_speed;
        assert!((z60 - expected).abs() < 1e-3, "z60 = {z60}");
        assert!((z90 - expected).abs() < 1e-3, "z90 = {z90}");
    }

    #[test]
    fn test_determinism() {
        let settings = Settings {
            spawn_probability: 0.2,
            ..Default::default()
        };
        let mut state1 = GameState::new(99999, settings.clone(), SessionMode::Desktop);
        let mut state2 = GameState::new(99999, settings, SessionMode::Desktop);

        let inputs = [
            TickInput {
                keys: vec![Key::D, Key::W],
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                keys: vec![Key::ArrowLeft, Key::BracketLeft],
                ..Default::default()
            },
        ];

        for i in 0..600 {
            let input = &inputs[i % inputs.len()];
            tick(&mut state1, input, SIM_DT);
            tick(&mut state2, input, SIM_DT);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.stats, state2.stats);
        assert_eq!(state1.blocks.len(), state2.blocks.len());
    }
}
