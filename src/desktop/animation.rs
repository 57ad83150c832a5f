//! Animated window values
//!
//! The window model only writes goals and reads the current value. How the
//! value travels from `begun` to `goal` belongs to whoever drives the
//! animation: either an external engine writing [`AnimatedVar::set_value`]
//! or the linear [`AnimatedVar::tick`] used by the replay binary.

use std::time::Duration;

use crate::shared::Vec2;

pub trait Lerp: Copy {
    fn lerp(from: Self, to: Self, t: f64) -> Self;
}

impl Lerp for f32 {
    fn lerp(from: Self, to: Self, t: f64) -> Self {
        from + (to - from) * t as f32
    }
}

impl Lerp for f64 {
    fn lerp(from: Self, to: Self, t: f64) -> Self {
        from + (to - from) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(from: Self, to: Self, t: f64) -> Self {
        from + (to - from) * t
    }
}

#[derive(Debug, Clone)]
pub struct AnimatedVar<T> {
    begun: T,
    value: T,
    goal: T,
    elapsed: Duration,
    duration: Duration,
}

impl<T: Copy + PartialEq> AnimatedVar<T> {
    pub fn new(value: T, duration: Duration) -> Self {
        Self {
            begun: value,
            value,
            goal: value,
            elapsed: Duration::ZERO,
            duration,
        }
    }

    pub fn value(&self) -> T {
        self.value
    }

    pub fn goal(&self) -> T {
        self.goal
    }

    pub fn begun(&self) -> T {
        self.begun
    }

    /// Start animating from the current value towards `goal`
    pub fn set_goal(&mut self, goal: T) {
        if goal == self.goal {
            return;
        }
        self.begun = self.value;
        self.goal = goal;
        self.elapsed = Duration::ZERO;
    }

    /// Jump straight to `value` with no animation
    pub fn set_value_and_warp(&mut self, value: T) {
        self.begun = value;
        self.value = value;
        self.goal = value;
        self.elapsed = Duration::ZERO;
    }

    /// Finish the running animation immediately
    pub fn warp(&mut self) {
        self.value = self.goal;
        self.begun = self.goal;
    }

    /// Written by an external animation engine
    pub fn set_value(&mut self, value: T) {
        self.value = value;
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn is_being_animated(&self) -> bool {
        self.value != self.goal
    }
}

impl<T: Lerp + PartialEq> AnimatedVar<T> {
    /// Advance linearly by `dt`. Returns true when the goal was reached
    /// on this tick.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if !self.is_being_animated() {
            return false;
        }
        self.elapsed += dt;
        if self.duration.is_zero() || self.elapsed >= self.duration {
            self.warp();
            return true;
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.value = T::lerp(self.begun, self.goal, t);
        false
    }
}
