use chargefire_common::ProjectileId;
use chargefire_runtime::{AudioSink, ProjectileHandle, SoundCue, TipAnchor};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// What happened when a projectile was launched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireReport {
    pub projectile: ProjectileId,
    /// Unit impulse direction: the tip's down axis at the moment of fire.
    pub direction: Vec3,
    pub magnitude: f32,
}

/// Releases a charged projectile into the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireController {
    fire_force: f32,
}

impl FireController {
    pub fn new(fire_force: f32) -> Self {
        Self { fire_force }
    }

    pub fn fire_force(&self) -> f32 {
        self.fire_force
    }

    /// Detach the projectile, make sure it has a body, play the fire cue and
    /// push it along the tip's negative up axis.
    ///
    /// Takes the projectile out of `slot`; ownership passes to the scene when
    /// the handle drops. An empty slot is a no-op and returns `None`.
    pub fn fire(
        &self,
        slot: &mut Option<Box<dyn ProjectileHandle>>,
        tip: &dyn TipAnchor,
        audio: &mut dyn AudioSink,
    ) -> Option<FireReport> {
        let Some(mut projectile) = slot.take() else {
            tracing::debug!("fire requested with no projectile; ignoring");
            return None;
        };

        projectile.detach_from_parent();
        let mut body = projectile.ensure_physics_body();

        audio.set_clip(SoundCue::Fire);
        audio.set_volume(1.0);
        audio.play();

        let direction = -tip.pose().up().normalize_or_zero();
        body.apply_impulse(direction, self.fire_force);

        let report = FireReport {
            projectile: projectile.id(),
            direction,
            magnitude: self.fire_force,
        };
        tracing::info!(
            projectile = ?report.projectile,
            direction = ?report.direction,
            magnitude = report.magnitude,
            "projectile fired"
        );
        Some(report)
    }
}
