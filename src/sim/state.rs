//! Game state and session handling
//!
//! All mutable game data lives in one `GameState` owned by the caller and
//! passed to `tick`. Nothing here is global.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::block::{Block, BlockId, FallingBlock};
use super::effect::{EffectId, EffectKind, ParticleBurst};
use super::saber::{
    ControlSource, Handedness, Modality, Pose, Saber, SaberColor, SaberId, SaberIndex,
};
use crate::consts::MAX_EFFECTS;
use crate::hud::HelpText;
use crate::input::TouchTracker;
use crate::settings::Settings;

/// Active play mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    /// Flat screen with keyboard sabers
    Desktop,
    /// Touch device, keyboard sabers shown but not mapped to touch
    Mobile,
    /// Head-mounted display with tracked controllers
    Immersive,
}

/// Notifications from the XR runtime / presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    ImmersiveStarted,
    ImmersiveEnded,
    ControllerConnected(Handedness),
    ControllerDisconnected(Handedness),
}

/// Anything the presentation layer may be asked to create or remove
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityRef {
    Saber(SaberId),
    Block(BlockId),
    FallingBlock(BlockId),
    Effect(EffectId),
    HelpText,
    ScoreLabel,
}

/// Outgoing notifications, drained by the presentation layer each frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    ScoreChanged {
        score: i64,
        delta: i64,
    },
    BlockHit {
        block: BlockId,
        saber: SaberId,
        matched: bool,
        point: Vec3,
        swing: Vec3,
    },
    BlockMissed {
        block: BlockId,
    },
    EffectSpawned {
        effect: EffectId,
        kind: EffectKind,
        position: Vec3,
    },
    Spawned {
        entity: EntityRef,
    },
    Despawned {
        entity: EntityRef,
    },
    SaberVisibility {
        saber: SaberId,
        visible: bool,
    },
    SessionChanged {
        mode: SessionMode,
    },
}

/// Running counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub spawned: u64,
    pub hits: u64,
    pub mismatches: u64,
    pub misses: u64,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub settings: Settings,
    pub mode: SessionMode,
    /// Mode to return to when an immersive session ends
    resume_mode: SessionMode,
    /// May go negative
    pub score: i64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// All sabers, owned here
    pub sabers: Vec<Saber>,
    /// Desktop/VR partition of `sabers`
    pub saber_index: SaberIndex,
    /// Live, collidable blocks
    pub blocks: Vec<Block>,
    /// Missed blocks tumbling away
    pub falling: Vec<FallingBlock>,
    pub effects: Vec<ParticleBurst>,
    pub help_text: Option<HelpText>,
    pub touch: TouchTracker,
    pub stats: Stats,
    pub(crate) rng: Pcg32,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new game; keyboard sabers exist from the start
    pub fn new(seed: u64, settings: Settings, mode: SessionMode) -> Self {
        let start_mode = if mode == SessionMode::Immersive {
            log::warn!("Cannot start inside an immersive session, starting on desktop");
            SessionMode::Desktop
        } else {
            mode
        };
        let help_text = HelpText::new(settings.help_hold_secs, settings.help_fade_secs);

        let mut state = Self {
            seed,
            settings,
            mode: start_mode,
            resume_mode: start_mode,
            score: 0,
            time_ticks: 0,
            sabers: Vec::new(),
            saber_index: SaberIndex::default(),
            blocks: Vec::new(),
            falling: Vec::new(),
            effects: Vec::new(),
            help_text: Some(help_text),
            touch: TouchTracker::default(),
            stats: Stats::default(),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            next_id: 1,
        };

        let left = state.settings.desktop_left_pose;
        let right = state.settings.desktop_right_pose;
        state.create_saber(ControlSource::DesktopLeft, Some(left));
        state.create_saber(ControlSource::DesktopRight, Some(right));
        state.push_event(GameEvent::Spawned {
            entity: EntityRef::HelpText,
        });
        state.push_event(GameEvent::Spawned {
            entity: EntityRef::ScoreLabel,
        });

        log::info!("Game created (seed {seed}, mode {start_mode:?})");
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Pending events, oldest first
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // === Sabers ===

    pub fn saber(&self, id: SaberId) -> Option<&Saber> {
        self.sabers.iter().find(|s| s.id == id)
    }

    pub fn saber_for_source(&self, source: ControlSource) -> Option<&Saber> {
        self.sabers.iter().find(|s| s.source == source)
    }

    pub fn saber_for_source_mut(&mut self, source: ControlSource) -> Option<&mut Saber> {
        self.sabers.iter_mut().find(|s| s.source == source)
    }

    /// Create a saber for `source`, or return the existing one's id
    pub fn create_saber(&mut self, source: ControlSource, initial: Option<Pose>) -> SaberId {
        if let Some(existing) = self.saber_for_source(source) {
            return existing.id;
        }
        let id = self.next_entity_id();
        let blade = match source.modality() {
            Modality::Desktop => &self.settings.desktop_blade,
            Modality::Vr => &self.settings.vr_blade,
        };
        let saber = Saber::new(id, source, blade, initial);
        self.saber_index.insert(&saber);
        self.sabers.push(saber);
        self.push_event(GameEvent::Spawned {
            entity: EntityRef::Saber(id),
        });
        id
    }

    /// Destroy the saber driven by `source`; no-op if there is none
    pub fn destroy_saber(&mut self, source: ControlSource) -> Option<Saber> {
        let index = self.sabers.iter().position(|s| s.source == source)?;
        let saber = self.sabers.remove(index);
        self.saber_index.remove(saber.id);
        self.push_event(GameEvent::Despawned {
            entity: EntityRef::Saber(saber.id),
        });
        Some(saber)
    }

    fn set_modality_visible(&mut self, modality: Modality, visible: bool) {
        let ids = self.saber_index.ids(modality).to_vec();
        for id in ids {
            let Some(saber) = self.sabers.iter_mut().find(|s| s.id == id) else {
                continue;
            };
            if saber.visible != visible {
                saber.set_visible(visible);
                self.events.push(GameEvent::SaberVisibility { saber: id, visible });
            }
        }
    }

    /// Put both keyboard sabers back to their canonical poses
    pub fn reset_desktop_sabers(&mut self) {
        let left = self.settings.desktop_left_pose;
        let right = self.settings.desktop_right_pose;
        if let Some(saber) = self.saber_for_source_mut(ControlSource::DesktopLeft) {
            saber.teleport(left);
        }
        if let Some(saber) = self.saber_for_source_mut(ControlSource::DesktopRight) {
            saber.teleport(right);
        }
    }

    // === Blocks ===

    pub fn spawn_block(&mut self, color: SaberColor, position: Vec3) -> BlockId {
        let id = self.next_entity_id();
        self.blocks.push(Block::new(id, color, position, self.settings.block_size));
        self.stats.spawned += 1;
        self.push_event(GameEvent::Spawned {
            entity: EntityRef::Block(id),
        });
        id
    }

    /// Remove a live block by id; unknown ids are ignored
    pub fn remove_block(&mut self, id: BlockId) -> Option<Block> {
        let index = self.blocks.iter().position(|b| b.id == id)?;
        self.remove_block_at(index)
    }

    /// Remove a live block by list index; out-of-range indices are ignored
    pub fn remove_block_at(&mut self, index: usize) -> Option<Block> {
        if index >= self.blocks.len() {
            return None;
        }
        let block = self.blocks.remove(index);
        self.push_event(GameEvent::Despawned {
            entity: EntityRef::Block(block.id),
        });
        Some(block)
    }

    // === Score & effects ===

    pub fn apply_score(&mut self, delta: i64) {
        self.score += delta;
        self.push_event(GameEvent::ScoreChanged {
            score: self.score,
            delta,
        });
    }

    /// Start a particle burst; dropped when effects are off or over the cap
    pub fn spawn_effect(&mut self, kind: EffectKind, position: Vec3, swing: Vec3) -> Option<EffectId> {
        let count = self.settings.particles_per_burst();
        if count == 0 {
            return None;
        }
        if self.effects.len() >= MAX_EFFECTS || !crate::is_finite_vec3(position) {
            log::debug!("Effect request dropped ({} live)", self.effects.len());
            return None;
        }
        let id = self.next_entity_id();
        let duration = self.settings.effect_duration;
        let burst = ParticleBurst::new(id, kind, position, swing, count, duration, &mut self.rng);
        self.effects.push(burst);
        self.push_event(GameEvent::EffectSpawned {
            effect: id,
            kind,
            position,
        });
        Some(id)
    }

    // === Onboarding ===

    /// Drop the help text immediately; no-op if already gone
    pub fn remove_help_text(&mut self) {
        if self.help_text.take().is_some() {
            self.push_event(GameEvent::Despawned {
                entity: EntityRef::HelpText,
            });
        }
    }

    // === Session state machine ===

    pub fn handle_session_event(&mut self, event: SessionEvent) {
        match (self.mode, event) {
            (SessionMode::Immersive, SessionEvent::ImmersiveStarted) => {
                log::debug!("Immersive session already active");
            }
            (_, SessionEvent::ImmersiveStarted) => self.enter_immersive(),
            (SessionMode::Immersive, SessionEvent::ImmersiveEnded) => self.exit_immersive(),
            (_, SessionEvent::ImmersiveEnded) => {
                log::debug!("Immersive end outside a session ignored");
            }
            (SessionMode::Immersive, SessionEvent::ControllerConnected(hand)) => {
                let id = self.create_saber(ControlSource::vr(hand), None);
                log::info!("Controller connected ({hand:?}), saber {id}");
            }
            (_, SessionEvent::ControllerConnected(hand)) => {
                log::debug!("Controller {hand:?} connected outside immersive session ignored");
            }
            (_, SessionEvent::ControllerDisconnected(hand)) => {
                match self.destroy_saber(ControlSource::vr(hand)) {
                    Some(saber) => log::info!("Controller disconnected ({hand:?}), saber {} removed", saber.id),
                    None => log::debug!("Controller {hand:?} disconnected without a saber"),
                }
            }
        }
    }

    fn enter_immersive(&mut self) {
        self.resume_mode = self.mode;
        self.mode = SessionMode::Immersive;
        self.set_modality_visible(Modality::Desktop, false);
        self.remove_help_text();
        self.push_event(GameEvent::SessionChanged { mode: self.mode });
        log::info!("Immersive session started");
    }

    fn exit_immersive(&mut self) {
        for source in [ControlSource::VrLeft, ControlSource::VrRight] {
            self.destroy_saber(source);
        }
        self.mode = self.resume_mode;
        self.set_modality_visible(Modality::Desktop, true);
        self.push_event(GameEvent::SessionChanged { mode: self.mode });
        log::info!("Immersive session ended, back to {:?}", self.mode);
    }
}
