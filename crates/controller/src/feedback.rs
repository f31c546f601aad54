use chargefire_charge::ChargeSample;
use chargefire_input::StylusBinding;
use chargefire_runtime::{AudioSink, HapticSink, HapticTarget, ProjectileHandle, SoundCue};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Quietest the charge tone gets, so the start of a charge is still audible.
pub const MIN_CHARGE_VOLUME: f32 = 0.1;

/// A haptic destination resolved against the current device binding on every sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticRoute {
    /// The general controller impulse player. Always available.
    Controller,
    /// Whatever device is bound as the stylus. Skipped while none is bound.
    Stylus,
}

impl HapticRoute {
    pub fn default_routes() -> Vec<Self> {
        vec![Self::Controller, Self::Stylus]
    }

    fn resolve(self, stylus: &StylusBinding) -> Option<HapticTarget> {
        match self {
            Self::Controller => Some(HapticTarget::Controller),
            Self::Stylus => stylus.current().map(|h| HapticTarget::Device(h.id)),
        }
    }
}

/// Collaborators one sample is applied to.
pub struct FeedbackTargets<'a> {
    pub haptics: &'a mut dyn HapticSink,
    pub audio: &'a mut dyn AudioSink,
    pub projectile: Option<&'a mut dyn ProjectileHandle>,
    pub stylus: &'a StylusBinding,
}

/// Turns charge samples into haptic, audio and scale side effects.
#[derive(Debug, Clone)]
pub struct FeedbackSink {
    routes: Vec<HapticRoute>,
    tone_started: bool,
}

impl Default for FeedbackSink {
    fn default() -> Self {
        Self::new(HapticRoute::default_routes())
    }
}

impl FeedbackSink {
    pub fn new(routes: Vec<HapticRoute>) -> Self {
        Self {
            routes,
            tone_started: false,
        }
    }

    pub fn routes(&self) -> &[HapticRoute] {
        &self.routes
    }

    /// Reset per-session state. The next sample (re)starts the charge tone.
    pub fn begin_session(&mut self) {
        self.tone_started = false;
    }

    /// Volume of the charge tone for a given progress.
    pub fn charge_volume(progress: f32) -> f32 {
        progress.clamp(MIN_CHARGE_VOLUME, 1.0)
    }

    /// Apply one sample: pulse every route, rescale the projectile, update the tone.
    pub fn apply(&mut self, sample: &ChargeSample, full_size: f32, targets: FeedbackTargets<'_>) {
        let FeedbackTargets {
            haptics,
            audio,
            projectile,
            stylus,
        } = targets;

        let amplitude = sample.amplitude.clamp(0.0, 1.0);
        for route in &self.routes {
            match route.resolve(stylus) {
                Some(target) => haptics.send_pulse(target, amplitude, sample.duration),
                None => tracing::trace!(?route, "no device bound; skipping pulse"),
            }
        }

        if let Some(projectile) = projectile {
            projectile.set_scale(Vec3::splat(full_size * sample.progress));
        }

        // Only (re)start the tone when it is not already running, so it never
        // restarts mid-charge.
        let start_tone = !self.tone_started || !audio.is_playing();
        if start_tone {
            audio.set_clip(SoundCue::Charge);
        }
        audio.set_volume(Self::charge_volume(sample.progress));
        if start_tone {
            audio.play();
            self.tone_started = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chargefire_common::{AnchorId, DeviceId, Transform};
    use chargefire_input::{DeviceDescriptor, DeviceEvent};
    use chargefire_sim::{AudioCall, SceneEvent, SimRuntime};
    use glam::Quat;

    fn sample(index: u32, amplitude: f32, progress: f32) -> ChargeSample {
        ChargeSample {
            index,
            amplitude,
            duration: 0.1,
            progress,
            is_final: false,
        }
    }

    fn bound_stylus() -> StylusBinding {
        let mut binding = StylusBinding::default();
        binding.handle_event(&DeviceEvent::Connected(DeviceDescriptor::new(
            DeviceId(5),
            "Logitech Stylus Pro",
        )));
        binding
    }

    #[test]
    fn pulses_every_route_in_order() {
        let rt = SimRuntime::new();
        let (mut haptics, mut audio) = (rt.haptics(), rt.audio());
        let stylus = bound_stylus();
        let mut sink = FeedbackSink::default();

        sink.apply(
            &sample(0, 0.4, 0.4),
            1.0,
            FeedbackTargets {
                haptics: haptics.as_mut(),
                audio: audio.as_mut(),
                projectile: None,
                stylus: &stylus,
            },
        );

        let out = rt.output();
        let targets: Vec<HapticTarget> = out.pulses.iter().map(|p| p.target).collect();
        assert_eq!(
            targets,
            vec![HapticTarget::Controller, HapticTarget::Device(DeviceId(5))]
        );
        assert!(out.pulses.iter().all(|p| p.amplitude == 0.4 && p.duration == 0.1));
    }

    #[test]
    fn unbound_stylus_is_skipped() {
        let rt = SimRuntime::new();
        let (mut haptics, mut audio) = (rt.haptics(), rt.audio());
        let stylus = StylusBinding::default();
        let mut sink = FeedbackSink::default();

        sink.apply(
            &sample(0, 0.4, 0.4),
            1.0,
            FeedbackTargets {
                haptics: haptics.as_mut(),
                audio: audio.as_mut(),
                projectile: None,
                stylus: &stylus,
            },
        );

        let out = rt.output();
        assert_eq!(out.pulses.len(), 1);
        assert_eq!(out.pulses[0].target, HapticTarget::Controller);
    }

    #[test]
    fn scale_follows_progress() {
        let rt = SimRuntime::new();
        let (mut haptics, mut audio) = (rt.haptics(), rt.audio());
        let tip = rt.tip(AnchorId(1), Transform::default());
        let mut projectile = rt
            .projectile_factory(2.0)
            .spawn(tip.pose().position, Quat::IDENTITY, tip.id());
        let stylus = StylusBinding::default();
        let mut sink = FeedbackSink::default();

        sink.apply(
            &sample(3, 0.5, 0.25),
            2.0,
            FeedbackTargets {
                haptics: haptics.as_mut(),
                audio: audio.as_mut(),
                projectile: Some(projectile.as_mut()),
                stylus: &stylus,
            },
        );

        let scene = rt.scene();
        assert_eq!(
            scene.events().last(),
            Some(&SceneEvent::Scaled {
                id: projectile.id(),
                scale: Vec3::splat(0.5),
            })
        );
    }

    #[test]
    fn volume_is_clamped() {
        assert_eq!(FeedbackSink::charge_volume(0.0), MIN_CHARGE_VOLUME);
        assert_eq!(FeedbackSink::charge_volume(0.5), 0.5);
        assert_eq!(FeedbackSink::charge_volume(1.0), 1.0);
    }

    #[test]
    fn tone_starts_once_and_restarts_after_ending() {
        let rt = SimRuntime::new();
        let (mut haptics, mut audio) = (rt.haptics(), rt.audio());
        let stylus = StylusBinding::default();
        let mut sink = FeedbackSink::default();

        for (i, progress) in [0.0, 0.3, 0.6].into_iter().enumerate() {
            sink.apply(
                &sample(i as u32, progress, progress),
                1.0,
                FeedbackTargets {
                    haptics: haptics.as_mut(),
                    audio: audio.as_mut(),
                    projectile: None,
                    stylus: &stylus,
                },
            );
        }
        assert_eq!(rt.output().audio.plays, 1);
        assert_eq!(rt.output().audio.volume, 0.6);
        assert_eq!(
            rt.output().audio_calls[..3],
            [
                AudioCall::SetClip(SoundCue::Charge),
                AudioCall::SetVolume(MIN_CHARGE_VOLUME),
                AudioCall::Play,
            ]
        );

        rt.finish_clip();
        sink.apply(
            &sample(3, 0.9, 0.9),
            1.0,
            FeedbackTargets {
                haptics: haptics.as_mut(),
                audio: audio.as_mut(),
                projectile: None,
                stylus: &stylus,
            },
        );
        assert_eq!(rt.output().audio.plays, 2);
        assert!(rt.output().audio.playing);
    }

    #[test]
    fn amplitude_above_one_is_clamped_for_haptics() {
        let rt = SimRuntime::new();
        let (mut haptics, mut audio) = (rt.haptics(), rt.audio());
        let stylus = StylusBinding::default();
        let mut sink = FeedbackSink::new(vec![HapticRoute::Controller]);

        sink.apply(
            &sample(0, 2.5, 1.0),
            1.0,
            FeedbackTargets {
                haptics: haptics.as_mut(),
                audio: audio.as_mut(),
                projectile: None,
                stylus: &stylus,
            },
        );
        assert_eq!(rt.output().pulses[0].amplitude, 1.0);
    }
}
