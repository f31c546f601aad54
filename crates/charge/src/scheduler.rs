use serde::{Deserialize, Serialize};

use crate::error::ChargeError;
use crate::profile::{ChargeMode, ChargeProfile};

/// Waits shorter than this count as elapsed, absorbing float drift from
/// repeated frame subtraction.
const WAIT_EPSILON: f32 = 1e-6;

/// One output of the charge progression, consumed by the feedback layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeSample {
    /// Position of this sample within its session, starting at 0.
    pub index: u32,
    /// Haptic amplitude in `[0, max_amplitude]`.
    pub amplitude: f32,
    /// Haptic pulse length in seconds (the frame delta in linear mode).
    pub duration: f32,
    /// Normalized charge in `[0, 1]`, drives scale and volume.
    pub progress: f32,
    /// Last sample of the session.
    pub is_final: bool,
}

/// Something the scheduler produced during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChargeEvent {
    Sample(ChargeSample),
    /// The charge is over; the projectile should fire. Emitted once.
    Completed,
}

#[derive(Debug, Clone)]
enum Phase {
    Stepped(SteppedState),
    Linear(LinearState),
    Done,
}

#[derive(Debug, Clone, Default)]
struct SteppedState {
    next_step: u32,
    /// Seconds left before the next pulse is due.
    wait: f32,
    started: bool,
}

impl SteppedState {
    /// Returns true once the final wait has elapsed.
    fn advance(&mut self, profile: &ChargeProfile, dt: f32, events: &mut Vec<ChargeEvent>) -> bool {
        // The first tick opens the session; its delta predates the first pulse.
        if self.started {
            self.wait -= dt;
        } else {
            self.started = true;
        }

        while self.wait <= WAIT_EPSILON {
            if self.next_step > profile.step_count {
                events.push(ChargeEvent::Completed);
                return true;
            }
            let i = self.next_step;
            let amplitude = profile.stepped_amplitude(i);
            let progress = if profile.max_amplitude > 0.0 {
                (amplitude / profile.max_amplitude).clamp(0.0, 1.0)
            } else {
                i as f32 / profile.step_count as f32
            };
            let duration = profile.stepped_duration(i);
            events.push(ChargeEvent::Sample(ChargeSample {
                index: i,
                amplitude,
                duration,
                progress,
                is_final: i == profile.step_count,
            }));
            // Overshoot from a long frame carries into the next wait.
            self.wait += duration;
            self.next_step += 1;
        }
        false
    }
}

#[derive(Debug, Clone, Default)]
struct LinearState {
    /// Accumulated in f64 so long charges at high frame rates do not drift.
    elapsed: f64,
    next_index: u32,
}

impl LinearState {
    fn advance(&mut self, profile: &ChargeProfile, dt: f32, events: &mut Vec<ChargeEvent>) -> bool {
        let total = f64::from(profile.linear_charge_time);
        let index = self.next_index;
        self.next_index += 1;

        if self.elapsed + 1e-9 >= total {
            events.push(ChargeEvent::Sample(ChargeSample {
                index,
                amplitude: profile.max_amplitude,
                duration: dt,
                progress: 1.0,
                is_final: true,
            }));
            events.push(ChargeEvent::Completed);
            return true;
        }

        let progress = ((self.elapsed / total) as f32).clamp(0.0, 1.0);
        events.push(ChargeEvent::Sample(ChargeSample {
            index,
            amplitude: progress * profile.max_amplitude,
            duration: dt,
            progress,
            is_final: false,
        }));
        self.elapsed += f64::from(dt);
        false
    }
}

/// Tick-driven charge state machine.
///
/// Each call to [`ChargeScheduler::advance`] stands for one frame of the
/// external driver. The scheduler never blocks and holds no clock of its own,
/// so a session replays identically for the same sequence of deltas.
#[derive(Debug, Clone)]
pub struct ChargeScheduler {
    profile: ChargeProfile,
    mode: ChargeMode,
    phase: Phase,
    samples_emitted: u32,
    progress: f32,
}

impl ChargeScheduler {
    /// Create a scheduler for a validated profile.
    pub fn new(profile: ChargeProfile, mode: ChargeMode) -> Result<Self, ChargeError> {
        profile.validate()?;
        let phase = match mode {
            ChargeMode::Stepped => Phase::Stepped(SteppedState::default()),
            ChargeMode::Linear => Phase::Linear(LinearState::default()),
        };
        tracing::debug!(%mode, ?profile, "charge scheduler created");
        Ok(Self {
            profile,
            mode,
            phase,
            samples_emitted: 0,
            progress: 0.0,
        })
    }

    pub fn mode(&self) -> ChargeMode {
        self.mode
    }

    pub fn profile(&self) -> &ChargeProfile {
        &self.profile
    }

    /// Whether `Completed` has been emitted.
    pub fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    pub fn samples_emitted(&self) -> u32 {
        self.samples_emitted
    }

    /// Progress of the most recent sample.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Advance by one frame of `dt` seconds.
    ///
    /// Returns the samples due during this frame in order, followed by
    /// `Completed` on the frame the charge finishes. Returns nothing once
    /// complete.
    pub fn advance(&mut self, dt: f32) -> Vec<ChargeEvent> {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            tracing::warn!(dt, "ignoring invalid frame delta");
            0.0
        };

        let mut events = Vec::new();
        let finished = match &mut self.phase {
            Phase::Stepped(state) => state.advance(&self.profile, dt, &mut events),
            Phase::Linear(state) => state.advance(&self.profile, dt, &mut events),
            Phase::Done => return events,
        };

        for event in &events {
            if let ChargeEvent::Sample(sample) = event {
                self.samples_emitted += 1;
                self.progress = sample.progress;
                tracing::trace!(
                    index = sample.index,
                    amplitude = sample.amplitude,
                    duration = sample.duration,
                    progress = sample.progress,
                    "charge sample"
                );
            }
        }

        if finished {
            tracing::debug!(
                mode = %self.mode,
                samples = self.samples_emitted,
                "charge complete"
            );
            self.phase = Phase::Done;
        }
        events
    }

    /// Drive the scheduler to completion with a constant frame delta.
    ///
    /// Returns every sample in order. Stops after `max_frames` ticks if the
    /// charge has not completed by then (e.g. a zero delta in linear mode).
    pub fn run_to_completion(&mut self, dt: f32, max_frames: usize) -> Vec<ChargeSample> {
        let mut samples = Vec::new();
        for _ in 0..max_frames {
            for event in self.advance(dt) {
                if let ChargeEvent::Sample(sample) = event {
                    samples.push(sample);
                }
            }
            if self.is_complete() {
                break;
            }
        }
        samples
    }
}
