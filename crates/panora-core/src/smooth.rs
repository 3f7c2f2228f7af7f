//! Linear gain ramps for click-free parameter changes.
//!
//! Every gain command carries its own ramp time, so a [`SmoothedValue`] keeps
//! the sample rate and converts seconds to samples per command.
//!
//! # Example
//!
//! ```
//! use panora_core::SmoothedValue;
//!
//! let mut gain = SmoothedValue::new(1.0, 48000.0);
//!
//! // Fade to silence over one second
//! gain.set_target(0.0, 1.0);
//!
//! # let mut buffer = [1.0f32; 512];
//! for sample in buffer.iter_mut() {
//!     *sample *= gain.next_sample();
//! }
//! ```

/// A value that moves linearly towards its target, one step per sample.
#[derive(Debug, Clone)]
pub struct SmoothedValue {
    current: f32,
    target: f32,
    step: f32,
    samples_remaining: u32,
    sample_rate: f32,
}

impl SmoothedValue {
    pub fn new(initial: f32, sample_rate: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            samples_remaining: 0,
            sample_rate: sample_rate.max(1.0),
        }
    }

    /// Start a ramp from the current value to `target` lasting `ramp_secs`.
    ///
    /// A zero (or negative) ramp jumps immediately. Retargeting mid-ramp starts
    /// the new ramp from wherever the value currently is.
    #[inline]
    pub fn set_target(&mut self, target: f32, ramp_secs: f32) {
        let samples = (ramp_secs * self.sample_rate).max(0.0) as u32;
        self.target = target;

        if samples == 0 {
            self.current = target;
            self.step = 0.0;
            self.samples_remaining = 0;
            return;
        }

        self.samples_remaining = samples;
        self.step = (self.target - self.current) / samples as f32;
    }

    /// Call once per sample in the audio callback.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.samples_remaining > 0 {
            self.current += self.step;
            self.samples_remaining -= 1;

            // Snap to target when done to avoid floating point drift
            if self.samples_remaining == 0 {
                self.current = self.target;
            }
        }

        self.current
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.samples_remaining > 0
    }

    #[inline]
    pub fn samples_remaining(&self) -> u32 {
        self.samples_remaining
    }
}
