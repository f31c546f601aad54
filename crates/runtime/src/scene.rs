use chargefire_common::{AnchorId, ProjectileId, Transform};
use glam::{Quat, Vec3};

/// Creates projectile objects in the host scene.
pub trait ProjectileFactory {
    /// Spawn a projectile at `position`, parented to `parent`.
    ///
    /// The object keeps its authored scale; callers zero it themselves after
    /// reading [`ProjectileHandle::full_size`].
    fn spawn(
        &mut self,
        position: Vec3,
        orientation: Quat,
        parent: AnchorId,
    ) -> Box<dyn ProjectileHandle>;
}

/// A spawned projectile, owned by the charge session until fire.
pub trait ProjectileHandle {
    fn id(&self) -> ProjectileId;
    /// Uniform authored size, captured before the scale is zeroed.
    fn full_size(&self) -> f32;
    fn set_scale(&mut self, scale: Vec3);
    /// Unparent from the anchor, keeping the current world pose.
    fn detach_from_parent(&mut self);
    /// Return the attached physics body, attaching one first if absent.
    fn ensure_physics_body(&mut self) -> Box<dyn BodyHandle>;
}

/// A rigid body attached to a projectile.
pub trait BodyHandle {
    /// Apply an instantaneous impulse of `magnitude` along `direction`.
    fn apply_impulse(&mut self, direction: Vec3, magnitude: f32);
}

/// The stylus tip the projectile grows on.
pub trait TipAnchor {
    fn id(&self) -> AnchorId;
    /// Current world pose of the tip.
    fn pose(&self) -> Transform;
}
