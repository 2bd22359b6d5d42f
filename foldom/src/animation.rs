use std::time::Duration;

use crate::transition::{Easing, TransitionConfig};

/// A running height transition, timed against the document clock.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HeightTransition {
    pub from: u32,
    pub to: u32,
    pub start: Duration,
    pub delay: Duration,
    pub duration: Duration,
    pub easing: Easing,
}

impl HeightTransition {
    pub fn new(from: u32, to: u32, start: Duration, config: &TransitionConfig) -> Self {
        Self {
            from,
            to,
            start,
            delay: config.delay,
            duration: config.duration,
            easing: config.easing,
        }
    }

    /// Clock value at which the transition ends.
    pub fn end(&self) -> Duration {
        self.start + self.delay + self.duration
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        now >= self.end()
    }

    /// Interpolated height at `now`.
    pub fn value_at(&self, now: Duration) -> u32 {
        let begin = self.start + self.delay;
        if now <= begin {
            return self.from;
        }
        if self.is_finished(now) {
            return self.to;
        }
        let elapsed = now - begin;
        let progress = (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0);
        lerp_u32(self.from, self.to, self.easing.apply(progress))
    }
}

/// Linear interpolation for u32 values.
fn lerp_u32(from: u32, to: u32, t: f32) -> u32 {
    let from = from as f32;
    let to = to as f32;
    (from + (to - from) * t).round().max(0.0) as u32
}
