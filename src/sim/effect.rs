//! Hit feedback particle bursts
//!
//! Bursts are fire-and-forget: the tick advances them and drops them once
//! their duration runs out. Nothing else holds a reference to one.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub type EffectId = u32;

/// Burst color selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Saber and block colors agreed
    Match,
    /// Wrong saber for the block
    Mismatch,
}

impl EffectKind {
    pub fn color(&self) -> [f32; 3] {
        match self {
            EffectKind::Match => [0.2, 1.0, 0.3],
            EffectKind::Mismatch => [1.0, 0.1, 0.1],
        }
    }
}

/// One particle of a burst
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Particle {
    pub pos: Vec3,
    pub vel: Vec3,
    pub size: f32,
}

/// Per-particle instance record handed to the renderer
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
}

/// A transient burst of particles
#[derive(Debug, Clone, Serialize)]
pub struct ParticleBurst {
    pub id: EffectId,
    pub kind: EffectKind,
    pub origin: Vec3,
    pub particles: Vec<Particle>,
    pub age: f32,
    pub duration: f32,
}

/// Particle drag per tick
const DRAG: f32 = 0.94;
/// Spread speed of burst particles (units/s)
const BURST_SPEED: f32 = 2.5;

impl ParticleBurst {
    /// Spawn `count` particles at `origin`, biased along `swing`
    pub fn new<R: Rng + ?Sized>(
        id: EffectId,
        kind: EffectKind,
        origin: Vec3,
        swing: Vec3,
        count: usize,
        duration: f32,
        rng: &mut R,
    ) -> Self {
        let particles = (0..count)
            .map(|_| {
                let scatter = Vec3::new(
                    rng.random::<f32>() * 2.0 - 1.0,
                    rng.random::<f32>() * 2.0 - 1.0,
                    rng.random::<f32>() * 2.0 - 1.0,
                );
                let dir = (scatter + swing).normalize_or_zero();
                let speed = BURST_SPEED * (0.5 + rng.random::<f32>());
                Particle {
                    pos: origin,
                    vel: dir * speed,
                    size: 0.02 + rng.random::<f32>() * 0.03,
                }
            })
            .collect();

        Self {
            id,
            kind,
            origin,
            particles,
            age: 0.0,
            duration,
        }
    }

    pub fn step(&mut self, dt: f32) {
        for p in &mut self.particles {
            p.pos += p.vel * dt;
            p.vel *= DRAG;
        }
        self.age += dt;
    }

    pub fn is_finished(&self) -> bool {
        self.age >= self.duration
    }

    /// Remaining life in 0..=1
    pub fn life(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age / self.duration).clamp(0.0, 1.0)
    }

    /// Instance data for this frame, alpha fading with remaining life
    pub fn instances(&self) -> Vec<ParticleInstance> {
        let [r, g, b] = self.kind.color();
        let alpha = self.life();
        self.particles
            .iter()
            .map(|p| ParticleInstance {
                position: p.pos.to_array(),
                size: p.size * (0.5 + 0.5 * alpha),
                color: [r, g, b, alpha],
            })
            .collect()
    }
}

/// Gather instance data of all bursts into one upload-ready byte buffer
pub fn instance_bytes(bursts: &[ParticleBurst]) -> Vec<u8> {
    let instances: Vec<ParticleInstance> = bursts.iter().flat_map(|b| b.instances()).collect();
    bytemuck::cast_slice(&instances).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn burst(kind: EffectKind) -> ParticleBurst {
        let mut rng = Pcg32::seed_from_u64(3);
        ParticleBurst::new(1, kind, Vec3::ZERO, Vec3::X, 8, 0.5, &mut rng)
    }

    #[test]
    fn test_burst_expires_after_duration() {
        let mut b = burst(EffectKind::Match);
        let mut ticks = 0;
        while !b.is_finished() {
            b.step(1.0 / 60.0);
            ticks += 1;
        }
        // 0.5 s at 60 Hz, allowing for float accumulation
        assert!((30..=31).contains(&ticks), "ticks = {ticks}");
        assert_eq!(b.life(), 0.0);
    }

    #[test]
    fn test_particles_drift_along_swing() {
        let mut b = burst(EffectKind::Match);
        for _ in 0..10 {
            b.step(1.0 / 60.0);
        }
        let mean_x: f32 = b.particles.iter().map(|p| p.pos.x).sum::<f32>() / b.particles.len() as f32;
        assert!(mean_x > 0.0);
    }

    #[test]
    fn test_instance_colors() {
        let m = burst(EffectKind::Match).instances();
        let x = burst(EffectKind::Mismatch).instances();
        assert_eq!(m.len(), 8);
        assert!(m[0].color[1] > m[0].color[0]);
        assert!(x[0].color[0] > x[0].color[1]);
        assert_eq!(m[0].color[3], 1.0);
    }

    #[test]
    fn test_instance_bytes_layout() {
        let bursts = vec![burst(EffectKind::Match), burst(EffectKind::Mismatch)];
        let bytes = instance_bytes(&bursts);
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 32);
        assert_eq!(bytes.len(), 16 * 32);
    }
}
