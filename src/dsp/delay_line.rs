//! # Delay Line Store (Per-Channel Ring Buffers)
//!
//! The store owns one ring buffer and one write cursor per audio channel.
//! It knows nothing about delay times or gain; it only hands out indexed
//! access to the stored samples and moves the cursors.
//!
//! ## How a Ring Buffer Works
//!
//! Picture a tape loop with a write head. Each processed sample is
//! recorded at the write cursor, then the cursor steps forward by one
//! slot. When it reaches the end of the buffer it jumps back to slot 0
//! and starts overwriting the oldest audio:
//!
//! ```text
//!  capacity = 8, cursor = 5
//!
//!   0   1   2   3   4   5   6   7
//! ┌───┬───┬───┬───┬───┬───┬───┬───┐
//! │ n │ n │ n │ n │ n │ ▼ │ o │ o │   n = newer, o = older
//! └───┴───┴───┴───┴───┴───┴───┴───┘
//!                       cursor (next write, holds the oldest sample)
//! ```
//!
//! Reading "N samples ago" means reading slot `cursor - N`, wrapped back
//! into `[0, capacity)`. That arithmetic lives in the engine; the store
//! trusts the indices it is given.
//!
//! ## Real-Time Rules
//!
//! Every buffer is allocated in [`prepare()`](DelayLineStore::prepare),
//! which the plugin calls from `initialize()`. Nothing on the per-sample
//! path allocates, locks or validates beyond debug assertions.

use std::num::NonZeroUsize;

use nih_plug::nih_debug_assert;

/// Fixed-capacity ring buffers, one per channel, each with its own
/// write cursor.
///
/// An unprepared (or released) store has zero channels and zero capacity.
#[derive(Debug, Default)]
pub struct DelayLineStore {
    /// One buffer per channel. Every buffer has exactly `capacity` slots.
    buffers: Vec<Vec<f32>>,

    /// One write cursor per channel. Invariant: `cursor < capacity`.
    cursors: Vec<usize>,

    /// Shared length of every buffer, fixed until the next `prepare()`.
    capacity: usize,
}

impl DelayLineStore {
    /// Allocate `channel_count` zeroed buffers of `capacity` samples and
    /// reset every cursor to 0.
    ///
    /// Calling this again throws away all previous state. `NonZeroUsize`
    /// keeps a zero-length ring out, which would make the cursor wrap
    /// arithmetic meaningless.
    pub fn prepare(&mut self, channel_count: usize, capacity: NonZeroUsize) {
        let capacity = capacity.get();

        self.buffers = (0..channel_count).map(|_| vec![0.0; capacity]).collect();
        self.cursors = vec![0; channel_count];
        self.capacity = capacity;
    }

    /// Drop every buffer. Used when the host ends the session.
    pub fn release(&mut self) {
        self.buffers = Vec::new();
        self.cursors = Vec::new();
        self.capacity = 0;
    }

    /// Zero all samples and rewind all cursors without reallocating.
    pub fn clear(&mut self) {
        for buffer in &mut self.buffers {
            buffer.fill(0.0);
        }
        self.cursors.fill(0);
    }

    /// Number of slots in each channel's ring.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of prepared channels.
    pub fn channel_count(&self) -> usize {
        self.buffers.len()
    }

    /// Current write cursor of `channel`.
    #[cfg(test)]
    pub fn cursor(&self, channel: usize) -> usize {
        self.cursors[channel]
    }

    /// Sample stored at `index` in `channel`'s ring.
    ///
    /// The caller wraps `index` into `[0, capacity)`.
    #[inline]
    pub fn read_at(&self, channel: usize, index: usize) -> f32 {
        nih_debug_assert!(index < self.capacity);
        self.buffers[channel][index]
    }

    /// Overwrite the sample at `index` in `channel`'s ring.
    #[inline]
    pub fn write(&mut self, channel: usize, index: usize, value: f32) {
        nih_debug_assert!(index < self.capacity);
        self.buffers[channel][index] = value;
    }

    /// Step `channel`'s cursor forward by one slot, wrapping to 0 at the
    /// end of the ring.
    ///
    /// Returns the cursor as it was *before* the step, which is the slot
    /// the current sample belongs in.
    #[inline]
    pub fn advance_cursor(&mut self, channel: usize) -> usize {
        let cursor = &mut self.cursors[channel];
        let position = *cursor;

        *cursor += 1;
        if *cursor >= self.capacity {
            *cursor = 0;
        }

        position
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn store(channels: usize, capacity: usize) -> DelayLineStore {
        let mut store = DelayLineStore::default();
        store.prepare(channels, NonZeroUsize::new(capacity).unwrap());
        store
    }

    #[test]
    fn test_prepare_allocates_silence() {
        let store = store(2, 16);

        assert_eq!(store.channel_count(), 2);
        assert_eq!(store.capacity(), 16);
        for channel in 0..2 {
            assert_eq!(store.cursor(channel), 0);
            for index in 0..16 {
                assert_eq!(store.read_at(channel, index), 0.0);
            }
        }
    }

    #[test]
    fn test_write_then_read_same_slot() {
        let mut store = store(1, 8);

        store.write(0, 3, 0.75);

        assert_eq!(store.read_at(0, 3), 0.75);
        assert_eq!(store.read_at(0, 2), 0.0);
        assert_eq!(store.read_at(0, 4), 0.0);
    }

    #[test]
    fn test_advance_returns_pre_advance_position() {
        let mut store = store(1, 4);

        assert_eq!(store.advance_cursor(0), 0);
        assert_eq!(store.advance_cursor(0), 1);
        assert_eq!(store.cursor(0), 2);
    }

    /// After exactly `capacity` steps the cursor is back where it started.
    #[test]
    fn test_cursor_wraps_after_capacity_steps() {
        let capacity = 5;
        let mut store = store(1, capacity);

        let visited: Vec<usize> = (0..capacity).map(|_| store.advance_cursor(0)).collect();

        assert_eq!(visited, vec![0, 1, 2, 3, 4]);
        assert_eq!(store.cursor(0), 0);
    }

    #[test]
    fn test_channels_have_independent_cursors_and_buffers() {
        let mut store = store(2, 4);

        let position = store.advance_cursor(0);
        store.write(0, position, 1.0);
        store.advance_cursor(0);

        assert_eq!(store.cursor(0), 2);
        assert_eq!(store.cursor(1), 0);
        assert_eq!(store.read_at(0, 0), 1.0);
        assert_eq!(store.read_at(1, 0), 0.0);
    }

    #[test]
    fn test_capacity_one_always_writes_slot_zero() {
        let mut store = store(1, 1);

        for _ in 0..3 {
            assert_eq!(store.advance_cursor(0), 0);
        }
    }

    #[test]
    fn test_clear_zeroes_and_rewinds() {
        let mut store = store(2, 8);
        for channel in 0..2 {
            for _ in 0..3 {
                let position = store.advance_cursor(channel);
                store.write(channel, position, 0.5);
            }
        }

        store.clear();

        assert_eq!(store.capacity(), 8);
        for channel in 0..2 {
            assert_eq!(store.cursor(channel), 0);
            assert!((0..8).all(|index| store.read_at(channel, index) == 0.0));
        }
    }

    /// Re-preparing resets state even when the shape is unchanged.
    #[test]
    fn test_prepare_again_reinitializes() {
        let mut store = store(1, 8);
        store.write(0, 0, 1.0);
        store.advance_cursor(0);

        store.prepare(3, NonZeroUsize::new(6).unwrap());

        assert_eq!(store.channel_count(), 3);
        assert_eq!(store.capacity(), 6);
        assert_eq!(store.cursor(0), 0);
        assert_eq!(store.read_at(0, 0), 0.0);
    }

    #[test]
    fn test_release_drops_everything() {
        let mut store = store(2, 8);

        store.release();

        assert_eq!(store.channel_count(), 0);
        assert_eq!(store.capacity(), 0);
    }
}
