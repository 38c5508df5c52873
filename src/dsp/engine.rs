//! # Delay Engine
//!
//! Drives the per-block delay algorithm on top of a [`DelayLineStore`].
//!
//! ## The Algorithm
//!
//! Once per `process()` call the delay time is converted to a whole number
//! of samples:
//!
//! ```text
//! delay_samples = floor(delay_ms / 1000 * sample_rate)
//! ```
//!
//! Then, for every channel and every sample in the block:
//!
//! 1. **Take** the write position `w` (and step the cursor past it)
//! 2. **Locate** the read position `r = w - delay_samples`, plus
//!    `capacity` if that went negative
//! 3. **Read** the delayed sample at `r` and scale it by the wet gain
//! 4. **Write** the dry input into slot `w`
//! 5. **Mix**: output = dry + delayed
//!
//! The mix is a plain sum. There is no limiter; a loud input with a high
//! wet gain can exceed 0 dBFS.
//!
//! ## Bypass
//!
//! When the delay rounds down to zero samples the block is left exactly as
//! the host handed it over and the rings are not touched.

use std::num::NonZeroUsize;

use nih_plug::nih_log;

use super::delay_line::DelayLineStore;

/// Longest delay the rings can hold, in seconds.
pub const MAX_DELAY_SECONDS: f32 = 3.0;

/// Parameter values the engine reads once per processing call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayParameters {
    /// Delay time in milliseconds, nominally within [1, 3000].
    pub delay_time_ms: f32,
    /// Scale applied to the delayed tap, nominally within [0, 1].
    pub wet_gain: f32,
}

/// Reasons a session can't be set up.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PrepareError {
    /// The sample rate is zero, negative, NaN or infinite.
    #[error("cannot prepare delay for a sample rate of {0} Hz")]
    InvalidSampleRate(f32),
    /// The host asked for zero audio channels.
    #[error("cannot prepare delay without any audio channels")]
    NoChannels,
}

/// Converts a delay time to a whole number of samples.
///
/// This truncates rather than rounds: 22.7 samples becomes 22. The math is
/// done in `f64` so exact cases like 5 ms at 1000 Hz land on 5 and not 4.
/// Negative and NaN inputs give 0, which the engine treats as bypass.
pub fn delay_samples(delay_time_ms: f32, sample_rate: f32) -> usize {
    // `as` truncates toward zero and saturates
    ((f64::from(delay_time_ms) / 1000.0) * f64::from(sample_rate)) as usize
}

/// Number of ring slots needed to hold [`MAX_DELAY_SECONDS`] of audio.
pub fn ring_capacity(sample_rate: f32) -> usize {
    (f64::from(MAX_DELAY_SECONDS) * f64::from(sample_rate)).ceil() as usize
}

/// Single-tap, per-channel delay with in-place processing.
#[derive(Debug, Default)]
pub struct DelayEngine {
    store: DelayLineStore,

    /// Session sample rate in Hz, fixed between `prepare()` calls.
    sample_rate: f32,

    /// Delay length used by the most recent `process()` call.
    delay_samples: usize,
}

impl DelayEngine {
    /// Allocate the rings for a new session.
    ///
    /// Must run before the first `process()` and again whenever the host
    /// changes the sample rate or channel count. Any audio left in the
    /// rings from the previous session is dropped.
    pub fn prepare(
        &mut self,
        sample_rate: f32,
        max_block_size: usize,
        channel_count: usize,
    ) -> Result<(), PrepareError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(PrepareError::InvalidSampleRate(sample_rate));
        }
        if channel_count == 0 {
            return Err(PrepareError::NoChannels);
        }
        let capacity = NonZeroUsize::new(ring_capacity(sample_rate))
            .ok_or(PrepareError::InvalidSampleRate(sample_rate))?;

        self.store.prepare(channel_count, capacity);
        self.sample_rate = sample_rate;
        self.delay_samples = 0;

        nih_log!(
            "prepared delay: {channel_count} channel(s) at {sample_rate} Hz, \
             ring capacity {capacity} samples, max block {max_block_size}"
        );

        Ok(())
    }

    /// Free the rings. Until the next `prepare()` every block passes
    /// through untouched.
    pub fn release(&mut self) {
        self.store.release();
        self.delay_samples = 0;
    }

    /// Silence the rings and rewind the cursors, keeping the allocation.
    pub fn reset(&mut self) {
        self.store.clear();
    }

    /// Process one block in place. `channels` holds one slice per channel.
    ///
    /// Channels beyond the prepared channel count are left untouched.
    pub fn process(&mut self, channels: &mut [&mut [f32]], params: DelayParameters) {
        let capacity = self.store.capacity();

        // out-of-range delays use the whole ring
        let delay = delay_samples(params.delay_time_ms, self.sample_rate).min(capacity);
        self.delay_samples = delay;

        if delay < 1 {
            return;
        }

        let wet_gain = params.wet_gain;
        let channel_count = self.store.channel_count();

        for (channel, samples) in channels.iter_mut().take(channel_count).enumerate() {
            for sample in samples.iter_mut() {
                let write_pos = self.store.advance_cursor(channel);

                // delay <= capacity, so one correction is always enough
                let read_pos = if write_pos >= delay {
                    write_pos - delay
                } else {
                    write_pos + capacity - delay
                };

                let delayed = self.store.read_at(channel, read_pos) * wet_gain;
                let dry = *sample;

                self.store.write(channel, write_pos, dry);
                *sample = dry + delayed;
            }
        }
    }

    /// How many samples of echo remain after the input stops, based on the
    /// delay used by the last `process()` call.
    pub fn tail_samples(&self) -> u32 {
        u32::try_from(self.delay_samples).unwrap_or(u32::MAX)
    }

    #[cfg(test)]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    #[cfg(test)]
    pub fn channel_count(&self) -> usize {
        self.store.channel_count()
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
