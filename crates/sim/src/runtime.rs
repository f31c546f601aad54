use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use chargefire_common::{AnchorId, ProjectileId, Transform};
use chargefire_runtime::{
    AudioSink, BodyHandle, HapticSink, HapticTarget, ProjectileFactory, ProjectileHandle,
    SoundCue, TipAnchor,
};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Mass given to bodies attached by the simulated runtime.
const DEFAULT_BODY_MASS: f32 = 1.0;

/// One haptic pulse as received by the simulated haptic sink.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pulse {
    pub target: HapticTarget,
    pub amplitude: f32,
    pub duration: f32,
}

/// A call made on the simulated audio source, in order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AudioCall {
    SetClip(SoundCue),
    SetVolume(f32),
    Play,
}

/// Current state of the simulated audio source.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioState {
    pub clip: Option<SoundCue>,
    pub volume: f32,
    pub playing: bool,
    /// Number of `play` calls so far.
    pub plays: u32,
}

/// Everything the simulated collaborators received.
#[derive(Debug, Clone, Default)]
pub struct OutputLog {
    pub pulses: Vec<Pulse>,
    pub audio: AudioState,
    pub audio_calls: Vec<AudioCall>,
}

impl OutputLog {
    /// Pulses sent to one target, in order.
    pub fn pulses_for(&self, target: HapticTarget) -> Vec<Pulse> {
        self.pulses
            .iter()
            .filter(|p| p.target == target)
            .copied()
            .collect()
    }
}

/// Shared handle to a simulated scene and its recorded outputs.
///
/// Cloning is cheap; every clone and every collaborator handed out sees the
/// same state. Not thread-safe, matching the single-threaded controller.
#[derive(Debug, Clone, Default)]
pub struct SimRuntime {
    scene: Rc<RefCell<crate::SimScene>>,
    output: Rc<RefCell<OutputLog>>,
}

impl SimRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> Ref<'_, crate::SimScene> {
        self.scene.borrow()
    }

    pub fn scene_mut(&self) -> RefMut<'_, crate::SimScene> {
        self.scene.borrow_mut()
    }

    pub fn output(&self) -> Ref<'_, OutputLog> {
        self.output.borrow()
    }

    /// Advance the simulated physics by `dt` seconds.
    pub fn step(&self, dt: f32) {
        self.scene.borrow_mut().step(dt);
    }

    /// Simulate the current clip running out.
    pub fn finish_clip(&self) {
        self.output.borrow_mut().audio.playing = false;
    }

    pub fn set_tip_pose(&self, anchor: AnchorId, pose: Transform) {
        self.scene.borrow_mut().set_anchor(anchor, pose);
    }

    pub fn haptics(&self) -> Box<dyn HapticSink> {
        Box::new(SimHaptics {
            output: Rc::clone(&self.output),
        })
    }

    pub fn audio(&self) -> Box<dyn AudioSink> {
        Box::new(SimAudio {
            output: Rc::clone(&self.output),
        })
    }

    /// Factory whose projectiles have the given authored size.
    pub fn projectile_factory(&self, full_size: f32) -> Box<dyn ProjectileFactory> {
        Box::new(SimFactory {
            scene: Rc::clone(&self.scene),
            full_size,
        })
    }

    /// Register an anchor at `pose` and return it as a tip collaborator.
    pub fn tip(&self, anchor: AnchorId, pose: Transform) -> Box<dyn TipAnchor> {
        self.set_tip_pose(anchor, pose);
        Box::new(SimTip {
            scene: Rc::clone(&self.scene),
            anchor,
        })
    }
}

struct SimHaptics {
    output: Rc<RefCell<OutputLog>>,
}

impl HapticSink for SimHaptics {
    fn send_pulse(&mut self, target: HapticTarget, amplitude: f32, duration: f32) {
        self.output.borrow_mut().pulses.push(Pulse {
            target,
            amplitude,
            duration,
        });
    }
}

struct SimAudio {
    output: Rc<RefCell<OutputLog>>,
}

impl AudioSink for SimAudio {
    fn set_clip(&mut self, cue: SoundCue) {
        let mut out = self.output.borrow_mut();
        // Swapping the clip stops whatever was playing.
        if out.audio.clip != Some(cue) {
            out.audio.playing = false;
        }
        out.audio.clip = Some(cue);
        out.audio_calls.push(AudioCall::SetClip(cue));
    }

    fn set_volume(&mut self, volume: f32) {
        let mut out = self.output.borrow_mut();
        out.audio.volume = volume;
        out.audio_calls.push(AudioCall::SetVolume(volume));
    }

    fn play(&mut self) {
        let mut out = self.output.borrow_mut();
        out.audio.playing = out.audio.clip.is_some();
        out.audio.plays += 1;
        out.audio_calls.push(AudioCall::Play);
    }

    fn is_playing(&self) -> bool {
        self.output.borrow().audio.playing
    }
}

struct SimFactory {
    scene: Rc<RefCell<crate::SimScene>>,
    full_size: f32,
}

impl ProjectileFactory for SimFactory {
    fn spawn(
        &mut self,
        position: Vec3,
        orientation: Quat,
        parent: AnchorId,
    ) -> Box<dyn ProjectileHandle> {
        let world = Transform {
            position,
            rotation: orientation,
            scale: Vec3::splat(self.full_size),
        };
        let id = self.scene.borrow_mut().spawn(world, parent, self.full_size);
        Box::new(SimProjectileHandle {
            scene: Rc::clone(&self.scene),
            id,
            full_size: self.full_size,
        })
    }
}

struct SimProjectileHandle {
    scene: Rc<RefCell<crate::SimScene>>,
    id: ProjectileId,
    full_size: f32,
}

impl ProjectileHandle for SimProjectileHandle {
    fn id(&self) -> ProjectileId {
        self.id
    }

    fn full_size(&self) -> f32 {
        self.full_size
    }

    fn set_scale(&mut self, scale: Vec3) {
        self.scene.borrow_mut().set_scale(self.id, scale);
    }

    fn detach_from_parent(&mut self) {
        self.scene.borrow_mut().detach(self.id);
    }

    fn ensure_physics_body(&mut self) -> Box<dyn BodyHandle> {
        self.scene.borrow_mut().ensure_body(self.id, DEFAULT_BODY_MASS);
        Box::new(SimBody {
            scene: Rc::clone(&self.scene),
            id: self.id,
        })
    }
}

struct SimBody {
    scene: Rc<RefCell<crate::SimScene>>,
    id: ProjectileId,
}

impl BodyHandle for SimBody {
    fn apply_impulse(&mut self, direction: Vec3, magnitude: f32) {
        if !self.scene.borrow_mut().apply_impulse(self.id, direction, magnitude) {
            tracing::warn!(id = ?self.id, "impulse on projectile without body");
        }
    }
}

struct SimTip {
    scene: Rc<RefCell<crate::SimScene>>,
    anchor: AnchorId,
}

impl TipAnchor for SimTip {
    fn id(&self) -> AnchorId {
        self.anchor
    }

    fn pose(&self) -> Transform {
        self.scene.borrow().anchor(self.anchor).unwrap_or_default()
    }
}
