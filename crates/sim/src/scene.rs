use chargefire_common::{AnchorId, ProjectileId, Transform};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A record of every mutation applied to the simulated scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    Spawned {
        id: ProjectileId,
        transform: Transform,
        parent: AnchorId,
    },
    Scaled {
        id: ProjectileId,
        scale: Vec3,
    },
    Detached {
        id: ProjectileId,
        transform: Transform,
    },
    BodyAttached {
        id: ProjectileId,
        mass: f32,
    },
    Impulse {
        id: ProjectileId,
        direction: Vec3,
        magnitude: f32,
    },
    /// Simulation advanced one tick.
    Stepped { tick: u64, dt: f32 },
}

/// Minimal rigid body: mass and linear velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub mass: f32,
    pub velocity: Vec3,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            mass: 1.0,
            velocity: Vec3::ZERO,
        }
    }
}

/// Per-projectile data stored in the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimProjectile {
    /// Local transform while parented, world transform once detached.
    pub transform: Transform,
    pub parent: Option<AnchorId>,
    pub full_size: f32,
    pub body: Option<RigidBody>,
}

/// In-memory scene holding anchors and projectiles.
///
/// Parented projectiles sit at their anchor's origin. Detached projectiles
/// with a body move by their velocity on every [`SimScene::step`].
#[derive(Debug, Clone, Default)]
pub struct SimScene {
    anchors: BTreeMap<AnchorId, Transform>,
    projectiles: BTreeMap<ProjectileId, SimProjectile>,
    tick: u64,
    event_log: Vec<SceneEvent>,
}

impl SimScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    pub fn projectiles(&self) -> &BTreeMap<ProjectileId, SimProjectile> {
        &self.projectiles
    }

    pub fn get(&self, id: ProjectileId) -> Option<&SimProjectile> {
        self.projectiles.get(&id)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Create or move an anchor.
    pub fn set_anchor(&mut self, id: AnchorId, pose: Transform) {
        self.anchors.insert(id, pose);
    }

    pub fn anchor(&self, id: AnchorId) -> Option<Transform> {
        self.anchors.get(&id).copied()
    }

    /// World-space transform of a projectile, resolving its parent anchor.
    pub fn world_transform(&self, id: ProjectileId) -> Option<Transform> {
        let p = self.projectiles.get(&id)?;
        match p.parent.and_then(|a| self.anchors.get(&a)) {
            Some(anchor) => Some(Transform {
                position: anchor.position + anchor.rotation * p.transform.position,
                rotation: anchor.rotation * p.transform.rotation,
                scale: p.transform.scale,
            }),
            None => Some(p.transform),
        }
    }

    /// Spawn a projectile parented to `parent`. `world` is its world pose at spawn.
    pub fn spawn(&mut self, world: Transform, parent: AnchorId, full_size: f32) -> ProjectileId {
        let id = ProjectileId::new();
        let anchor = self.anchors.get(&parent).copied().unwrap_or_default();
        let inverse = anchor.rotation.inverse();
        let local = Transform {
            position: inverse * (world.position - anchor.position),
            rotation: inverse * world.rotation,
            scale: world.scale,
        };
        self.projectiles.insert(
            id,
            SimProjectile {
                transform: local,
                parent: Some(parent),
                full_size,
                body: None,
            },
        );
        self.event_log.push(SceneEvent::Spawned {
            id,
            transform: world,
            parent,
        });
        tracing::trace!(?id, "projectile spawned");
        id
    }

    pub fn set_scale(&mut self, id: ProjectileId, scale: Vec3) -> bool {
        let Some(p) = self.projectiles.get_mut(&id) else {
            return false;
        };
        p.transform.scale = scale;
        self.event_log.push(SceneEvent::Scaled { id, scale });
        true
    }

    /// Unparent a projectile, baking its current world pose. No-op if already detached.
    pub fn detach(&mut self, id: ProjectileId) -> bool {
        let Some(world) = self.world_transform(id) else {
            return false;
        };
        let Some(p) = self.projectiles.get_mut(&id) else {
            return false;
        };
        if p.parent.take().is_none() {
            return false;
        }
        p.transform = world;
        self.event_log.push(SceneEvent::Detached {
            id,
            transform: world,
        });
        true
    }

    /// Attach a body with `mass` unless one exists. Returns true if one was attached.
    pub fn ensure_body(&mut self, id: ProjectileId, mass: f32) -> bool {
        let Some(p) = self.projectiles.get_mut(&id) else {
            return false;
        };
        if p.body.is_some() {
            return false;
        }
        p.body = Some(RigidBody {
            mass,
            ..RigidBody::default()
        });
        self.event_log.push(SceneEvent::BodyAttached { id, mass });
        true
    }

    /// Add `direction * magnitude / mass` to the body's velocity.
    ///
    /// `direction` is normalized first. Returns false if the projectile has no body.
    pub fn apply_impulse(&mut self, id: ProjectileId, direction: Vec3, magnitude: f32) -> bool {
        let Some(body) = self.projectiles.get_mut(&id).and_then(|p| p.body.as_mut()) else {
            return false;
        };
        let direction = direction.normalize_or_zero();
        body.velocity += direction * magnitude / body.mass.max(f32::EPSILON);
        self.event_log.push(SceneEvent::Impulse {
            id,
            direction,
            magnitude,
        });
        true
    }

    /// Advance the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.tick += 1;
        for p in self.projectiles.values_mut() {
            if p.parent.is_some() {
                continue;
            }
            if let Some(body) = p.body {
                p.transform.position += body.velocity * dt;
            }
        }
        self.event_log.push(SceneEvent::Stepped {
            tick: self.tick,
            dt,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with_anchor(position: Vec3) -> (SimScene, AnchorId) {
        let mut scene = SimScene::new();
        let anchor = AnchorId(1);
        scene.set_anchor(anchor, Transform::from_position(position));
        (scene, anchor)
    }

    #[test]
    fn scene_starts_empty() {
        let scene = SimScene::new();
        assert_eq!(scene.tick(), 0);
        assert_eq!(scene.projectile_count(), 0);
    }

    #[test]
    fn parented_projectile_follows_anchor() {
        let (mut scene, anchor) = scene_with_anchor(Vec3::new(1.0, 2.0, 3.0));
        let id = scene.spawn(Transform::from_position(Vec3::new(1.0, 2.0, 3.0)), anchor, 0.1);
        scene.set_anchor(anchor, Transform::from_position(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(
            scene.world_transform(id).unwrap().position,
            Vec3::new(5.0, 0.0, 0.0)
        );
    }

    #[test]
    fn detach_bakes_world_pose_once() {
        let (mut scene, anchor) = scene_with_anchor(Vec3::ZERO);
        let id = scene.spawn(Transform::default(), anchor, 0.1);
        scene.set_anchor(anchor, Transform::from_position(Vec3::X));

        assert!(scene.detach(id));
        assert!(!scene.detach(id));
        scene.set_anchor(anchor, Transform::from_position(Vec3::Y));

        let p = scene.get(id).unwrap();
        assert!(p.parent.is_none());
        assert_eq!(p.transform.position, Vec3::X);
    }

    #[test]
    fn ensure_body_is_idempotent() {
        let (mut scene, anchor) = scene_with_anchor(Vec3::ZERO);
        let id = scene.spawn(Transform::default(), anchor, 0.1);
        assert!(scene.ensure_body(id, 1.0));
        assert!(!scene.ensure_body(id, 1.0));
        let attached = scene
            .events()
            .iter()
            .filter(|e| matches!(e, SceneEvent::BodyAttached { .. }))
            .count();
        assert_eq!(attached, 1);
    }

    #[test]
    fn impulse_requires_body() {
        let (mut scene, anchor) = scene_with_anchor(Vec3::ZERO);
        let id = scene.spawn(Transform::default(), anchor, 0.1);
        assert!(!scene.apply_impulse(id, Vec3::NEG_Y, 10.0));
    }

    #[test]
    fn impulse_moves_detached_body() {
        let (mut scene, anchor) = scene_with_anchor(Vec3::ZERO);
        let id = scene.spawn(Transform::default(), anchor, 0.1);
        scene.detach(id);
        scene.ensure_body(id, 2.0);
        assert!(scene.apply_impulse(id, Vec3::new(0.0, -3.0, 0.0), 10.0));

        let body = scene.get(id).unwrap().body.unwrap();
        assert_eq!(body.velocity, Vec3::new(0.0, -5.0, 0.0));

        scene.step(0.5);
        scene.step(0.5);
        assert_eq!(scene.tick(), 2);
        assert_eq!(scene.get(id).unwrap().transform.position, Vec3::new(0.0, -5.0, 0.0));
    }

    #[test]
    fn parented_body_does_not_move() {
        let (mut scene, anchor) = scene_with_anchor(Vec3::ZERO);
        let id = scene.spawn(Transform::default(), anchor, 0.1);
        scene.ensure_body(id, 1.0);
        scene.apply_impulse(id, Vec3::X, 1.0);
        scene.step(1.0);
        assert_eq!(scene.get(id).unwrap().transform.position, Vec3::ZERO);
    }

    #[test]
    fn drain_events_clears_log() {
        let (mut scene, anchor) = scene_with_anchor(Vec3::ZERO);
        scene.spawn(Transform::default(), anchor, 0.1);
        scene.step(0.1);
        let events = scene.drain_events();
        assert_eq!(events.len(), 2);
        assert!(scene.events().is_empty());
    }
}
