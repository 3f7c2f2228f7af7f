//! Boundary traits between the panning core and whatever plays the audio.

/// Per-voice output stage: one smoothed gain per output channel plus a master gain.
///
/// Commands are fire-and-forget; the sink ramps from its current value to the
/// target over `ramp_secs` and the caller never waits for the ramp to finish.
pub trait OutputSink: Send {
    /// Physical output channel count.
    fn channels(&self) -> usize;

    fn set_channel_gain(&mut self, channel: usize, gain: f32, ramp_secs: f32);

    fn set_master_gain(&mut self, gain: f32, ramp_secs: f32);
}

/// The playable media behind a voice. Opaque to the core apart from transport.
pub trait MediaSource: Send {
    fn play(&mut self);

    fn pause(&mut self);
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn channels(&self) -> usize {
        (**self).channels()
    }

    fn set_channel_gain(&mut self, channel: usize, gain: f32, ramp_secs: f32) {
        (**self).set_channel_gain(channel, gain, ramp_secs)
    }

    fn set_master_gain(&mut self, gain: f32, ramp_secs: f32) {
        (**self).set_master_gain(gain, ramp_secs)
    }
}

impl<M: MediaSource + ?Sized> MediaSource for Box<M> {
    fn play(&mut self) {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }
}
