use chargefire_charge::{ChargeError, ChargeEvent, ChargeMode, ChargeProfile, ChargeSample, ChargeScheduler};
use chargefire_common::SessionId;
use chargefire_input::{Action, BindingChange, DeviceEvent, StylusBinding};
use chargefire_runtime::{AudioSink, HapticSink, ProjectileFactory, ProjectileHandle, TipAnchor};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::ControllerConfig;
use crate::error::SessionError;
use crate::feedback::{FeedbackSink, FeedbackTargets};
use crate::fire::{FireController, FireReport};

/// Something that happened during a controller tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A sample was produced and applied to the collaborators.
    Sample(ChargeSample),
    /// The session ended. `fire` is `None` if there was nothing to launch.
    Finished {
        session: SessionId,
        fire: Option<FireReport>,
    },
}

/// The one in-flight charge.
struct ChargeSession {
    id: SessionId,
    scheduler: ChargeScheduler,
    /// Owned until fire, then handed to the scene.
    projectile: Option<Box<dyn ProjectileHandle>>,
    full_size: f32,
    fire: FireController,
}

/// Owns the charge session and the collaborators it drives.
///
/// The host raises [`Action`]s (or calls [`ChargeController::start_charge`]
/// directly), forwards device notifications, and calls
/// [`ChargeController::advance`] once per frame. Nothing runs between calls.
pub struct ChargeController {
    profile: ChargeProfile,
    mode: ChargeMode,
    stylus: StylusBinding,
    feedback: FeedbackSink,
    haptics: Option<Box<dyn HapticSink>>,
    audio: Option<Box<dyn AudioSink>>,
    projectiles: Option<Box<dyn ProjectileFactory>>,
    tip: Option<Box<dyn TipAnchor>>,
    session: Option<ChargeSession>,
    sessions_finished: u64,
}

impl ChargeController {
    /// Create a controller with no collaborators attached yet.
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            profile: config.profile,
            mode: config.mode,
            stylus: StylusBinding::new(&config.stylus_token),
            feedback: FeedbackSink::new(config.haptic_routes),
            haptics: None,
            audio: None,
            projectiles: None,
            tip: None,
            session: None,
            sessions_finished: 0,
        }
    }

    pub fn with_haptics(mut self, haptics: Box<dyn HapticSink>) -> Self {
        self.haptics = Some(haptics);
        self
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn with_projectiles(mut self, factory: Box<dyn ProjectileFactory>) -> Self {
        self.projectiles = Some(factory);
        self
    }

    pub fn with_tip(mut self, tip: Box<dyn TipAnchor>) -> Self {
        self.tip = Some(tip);
        self
    }

    /// Replace the stylus binding, e.g. to share one resolved elsewhere.
    pub fn set_stylus_binding(&mut self, binding: StylusBinding) {
        self.stylus = binding;
    }

    pub fn stylus(&self) -> &StylusBinding {
        &self.stylus
    }

    pub fn mode(&self) -> ChargeMode {
        self.mode
    }

    pub fn profile(&self) -> &ChargeProfile {
        &self.profile
    }

    /// Replace the profile used by later sessions.
    pub fn set_profile(&mut self, profile: ChargeProfile) -> Result<(), ChargeError> {
        profile.validate()?;
        self.profile = profile;
        Ok(())
    }

    /// Flip between stepped and linear charging. Returns the new mode.
    ///
    /// A session already running keeps the mode it started with.
    pub fn switch_charging(&mut self) -> ChargeMode {
        self.mode = self.mode.toggled();
        tracing::debug!(mode = %self.mode, charging = self.is_charging(), "charge mode switched");
        self.mode
    }

    pub fn is_charging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Progress of the active session's latest sample.
    pub fn progress(&self) -> Option<f32> {
        self.session.as_ref().map(|s| s.scheduler.progress())
    }

    /// Number of sessions that ran to completion.
    pub fn sessions_finished(&self) -> u64 {
        self.sessions_finished
    }

    /// Forward a device registry notification to the stylus binding.
    pub fn on_device_event(&mut self, event: &DeviceEvent) -> BindingChange {
        self.stylus.handle_event(event)
    }

    /// Dispatch a host action. Returns the new session id for `StartCharge`.
    pub fn handle_action(&mut self, action: Action) -> Result<Option<SessionId>, SessionError> {
        match action {
            Action::StartCharge => self.start_charge().map(Some),
            Action::SwitchCharging => {
                self.switch_charging();
                Ok(None)
            }
            Action::Noop => Ok(None),
        }
    }

    /// Start a charge session with the current profile and mode.
    ///
    /// Spawns the projectile at the tip with zero scale. The first sample is
    /// produced by the next [`ChargeController::advance`].
    pub fn start_charge(&mut self) -> Result<SessionId, SessionError> {
        if self.session.is_some() {
            tracing::warn!("charge requested while a session is active");
            return Err(SessionError::Busy);
        }

        let missing = [
            ("haptic sink", self.haptics.is_none()),
            ("audio sink", self.audio.is_none()),
            ("projectile factory", self.projectiles.is_none()),
            ("tip anchor", self.tip.is_none()),
        ]
        .into_iter()
        .find_map(|(name, absent)| absent.then_some(name));
        if let Some(name) = missing {
            tracing::error!(collaborator = name, "cannot start charge: collaborator not assigned");
            return Err(SessionError::MissingCollaborator(name));
        }

        let scheduler = ChargeScheduler::new(self.profile, self.mode).inspect_err(|e| {
            tracing::error!(error = %e, "cannot start charge");
        })?;

        let (Some(factory), Some(tip)) = (self.projectiles.as_mut(), self.tip.as_ref()) else {
            return Err(SessionError::MissingCollaborator("projectile factory"));
        };
        let pose = tip.pose();
        let mut projectile = factory.spawn(pose.position, Quat::IDENTITY, tip.id());
        let full_size = projectile.full_size();
        projectile.set_scale(Vec3::ZERO);

        let id = SessionId::new();
        self.feedback.begin_session();
        self.session = Some(ChargeSession {
            id,
            scheduler,
            projectile: Some(projectile),
            full_size,
            fire: FireController::new(self.profile.fire_force),
        });
        tracing::debug!(session = %id, mode = %self.mode, full_size, "charge started");
        Ok(id)
    }

    /// Advance the active session by one frame of `dt` seconds.
    ///
    /// Applies every due sample to the collaborators and fires on completion.
    /// Returns nothing while idle.
    pub fn advance(&mut self, dt: f32) -> Vec<SessionEvent> {
        let _span = tracing::info_span!("charge_advance").entered();

        let Self {
            stylus,
            feedback,
            haptics,
            audio,
            tip,
            session,
            ..
        } = &mut *self;
        let Some(active) = session.as_mut() else {
            return Vec::new();
        };

        let mut out = Vec::new();
        let mut finished = false;
        for event in active.scheduler.advance(dt) {
            match event {
                ChargeEvent::Sample(sample) => {
                    match (haptics.as_deref_mut(), audio.as_deref_mut()) {
                        (Some(haptics), Some(audio)) => {
                            let projectile: Option<&mut dyn ProjectileHandle> =
                                match active.projectile.as_mut() {
                                    Some(p) => Some(p.as_mut()),
                                    None => None,
                                };
                            feedback.apply(
                                &sample,
                                active.full_size,
                                FeedbackTargets {
                                    haptics,
                                    audio,
                                    projectile,
                                    stylus,
                                },
                            )
                        }
                        _ => tracing::warn!(index = sample.index, "feedback collaborators missing; sample dropped"),
                    }
                    out.push(SessionEvent::Sample(sample));
                }
                ChargeEvent::Completed => {
                    let fire = match (tip.as_deref(), audio.as_deref_mut()) {
                        (Some(tip), Some(audio)) => active.fire.fire(&mut active.projectile, tip, audio),
                        _ => {
                            tracing::warn!("fire collaborators missing; projectile not launched");
                            None
                        }
                    };
                    out.push(SessionEvent::Finished {
                        session: active.id,
                        fire,
                    });
                    finished = true;
                }
            }
        }

        if finished {
            if let Some(done) = session.take() {
                tracing::debug!(
                    session = %done.id,
                    samples = done.scheduler.samples_emitted(),
                    "charge session finished"
                );
            }
            self.sessions_finished += 1;
        }
        out
    }
}
