//! Stepped volume fades
//!
//! A fade moves a handle's volume from its current level to a target in a
//! fixed number of timer ticks. Each running fade is a tokio task paired with
//! a cancellation token; whoever starts a new fade cancels the previous one
//! first, so two fades never race on the same handle.
//!
//! Curves:
//! - Linear: even steps (default)
//! - SquareRoot: faster rise at the start
//! - S-Curve: slow start and end
//! - Equal Power: sine-shaped, constant perceived loudness

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Fade curve type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FadeCurve {
    /// Linear fade: simple and predictable
    #[default]
    Linear,

    /// Square root fade: rises quickly, then slows down
    SquareRoot,

    /// S-Curve fade: slow start, fast middle, slow end
    SCurve,

    /// Equal power fade: sine-shaped, keeps perceived loudness steady
    EqualPower,
}

impl FadeCurve {
    /// Calculate the fade gain at a given position
    ///
    /// # Arguments
    /// * `position` - Normalized position in the fade (0.0 to 1.0)
    /// * `fade_out` - If true, calculates fade-out gain; if false, fade-in gain
    ///
    /// # Returns
    /// Gain multiplier (0.0 to 1.0)
    #[inline]
    pub fn calculate_gain(&self, position: f32, fade_out: bool) -> f32 {
        let position = position.clamp(0.0, 1.0);
        let t = if fade_out { 1.0 - position } else { position };

        match self {
            FadeCurve::Linear => t,
            FadeCurve::SquareRoot => {
                if t <= 0.0 {
                    0.0
                } else {
                    t.sqrt()
                }
            }
            FadeCurve::SCurve => (1.0 - (PI * t).cos()) * 0.5,
            FadeCurve::EqualPower => (t * PI * 0.5).sin(),
        }
    }

    /// Get a human-readable name for the curve
    pub fn display_name(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "Linear",
            FadeCurve::SquareRoot => "Square Root",
            FadeCurve::SCurve => "S-Curve",
            FadeCurve::EqualPower => "Equal Power",
        }
    }
}

/// Precomputed description of one fade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadePlan {
    from: f32,
    to: f32,
    steps: u32,
    duration: Duration,
    curve: FadeCurve,
}

impl FadePlan {
    /// Plan a fade from `from` to `to`
    ///
    /// Levels are clamped to [0.0, 1.0] and at least one step is taken.
    pub fn new(from: f32, to: f32, duration: Duration, steps: u32, curve: FadeCurve) -> Self {
        Self {
            from: from.clamp(0.0, 1.0),
            to: to.clamp(0.0, 1.0),
            steps: steps.max(1),
            duration,
            curve,
        }
    }

    pub fn from(&self) -> f32 {
        self.from
    }

    pub fn to(&self) -> f32 {
        self.to
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Time between two volume writes
    pub fn step_interval(&self) -> Duration {
        self.duration / self.steps
    }

    /// Volume written at `step` (1-based; the last step lands exactly on the target)
    pub fn volume_at(&self, step: u32) -> f32 {
        if step >= self.steps {
            return self.to;
        }

        let progress = step as f32 / self.steps as f32;
        let gain = self.curve.calculate_gain(progress, false);
        let (low, high) = if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        };

        (self.from + (self.to - self.from) * gain).clamp(low, high)
    }

    /// Every volume the fade writes, in order
    pub fn volumes(&self) -> impl Iterator<Item = f32> + '_ {
        (1..=self.steps).map(move |step| self.volume_at(step))
    }
}

/// How a fade ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeOutcome {
    /// Every step was written; the handle sits at the target volume
    Completed,

    /// A newer operation took over before the last step
    Cancelled,
}

/// A running fade task
///
/// Dropping the handle does not stop the fade; call [`FadeHandle::cancel`]
/// or cancel a token obtained from [`FadeHandle::canceller`].
pub struct FadeHandle {
    token: CancellationToken,
    task: JoinHandle<FadeOutcome>,
}

impl FadeHandle {
    /// Spawn a fade on the current tokio runtime
    ///
    /// `apply` is called once per tick with the fade's token and the volume
    /// to write. It returns `false` when the write was refused (the token was
    /// cancelled), which ends the fade.
    pub fn spawn<W>(plan: FadePlan, mut apply: W) -> Self
    where
        W: FnMut(&CancellationToken, f32) -> bool + Send + 'static,
    {
        let token = CancellationToken::new();
        let task_token = token.clone();

        let task = tokio::spawn(async move {
            let interval = plan.step_interval();

            for volume in plan.volumes() {
                tokio::select! {
                    biased;
                    () = task_token.cancelled() => return FadeOutcome::Cancelled,
                    () = tokio::time::sleep(interval) => {}
                }

                if !apply(&task_token, volume) {
                    return FadeOutcome::Cancelled;
                }
            }

            FadeOutcome::Completed
        });

        Self { token, task }
    }

    /// Token that cancels this fade
    pub fn canceller(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Stop the fade before its next write
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the fade to complete or be cancelled
    pub async fn finished(self) -> FadeOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Fade task ended abnormally: {}", e);
                FadeOutcome::Cancelled
            }
        }
    }
}
