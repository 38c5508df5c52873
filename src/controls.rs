//! # Delay Controls
//!
//! The engine's parameter slot, shared between the controller (host
//! automation, a GUI, a test harness) and the audio thread.
//!
//! ## Lock-Free Scalars
//!
//! Each parameter is an [`AtomicF32`]. The controller writes with a single
//! `store`, the audio thread reads with a single `load`. Neither side can
//! ever wait on the other, and a read always sees a whole value, never half
//! of an update.
//!
//! The two parameters are independent, so `Ordering::Relaxed` is used. A
//! block may pick up a new delay time together with the previous gain.
//!
//! ## Clamping
//!
//! Values are clamped to their domains when they are *written*, so the
//! audio thread never has to check them. NaN is ignored and the previous
//! value stays in place.

use std::sync::atomic::Ordering;

use atomic_float::AtomicF32;

use crate::dsp::engine::DelayParameters;

pub const MIN_DELAY_TIME_MS: f32 = 1.0;
pub const MAX_DELAY_TIME_MS: f32 = 3000.0;
pub const DEFAULT_DELAY_TIME_MS: f32 = 1000.0;

pub const MIN_WET_GAIN: f32 = 0.0;
pub const MAX_WET_GAIN: f32 = 1.0;
pub const DEFAULT_WET_GAIN: f32 = 1.0;

/// Change notifications from a parameter editor.
///
/// Any UI toolkit (or the host's own parameter callbacks) can drive the
/// delay by calling these two methods.
pub trait DelayParamListener: Send + Sync {
    fn on_delay_time_changed(&self, delay_time_ms: f32);
    fn on_wet_gain_changed(&self, wet_gain: f32);
}

/// Atomically readable delay time and wet gain.
#[derive(Debug)]
pub struct DelayControls {
    delay_time_ms: AtomicF32,
    wet_gain: AtomicF32,
}

impl Default for DelayControls {
    fn default() -> Self {
        Self {
            delay_time_ms: AtomicF32::new(DEFAULT_DELAY_TIME_MS),
            wet_gain: AtomicF32::new(DEFAULT_WET_GAIN),
        }
    }
}

impl DelayControls {
    /// Set the delay time, clamped to 1-3000 ms.
    pub fn set_delay_time_ms(&self, delay_time_ms: f32) {
        if delay_time_ms.is_nan() {
            return;
        }
        let clamped = delay_time_ms.clamp(MIN_DELAY_TIME_MS, MAX_DELAY_TIME_MS);
        self.delay_time_ms.store(clamped, Ordering::Relaxed);
    }

    /// Set the wet gain, clamped to 0-1.
    pub fn set_wet_gain(&self, wet_gain: f32) {
        if wet_gain.is_nan() {
            return;
        }
        let clamped = wet_gain.clamp(MIN_WET_GAIN, MAX_WET_GAIN);
        self.wet_gain.store(clamped, Ordering::Relaxed);
    }

    pub fn delay_time_ms(&self) -> f32 {
        self.delay_time_ms.load(Ordering::Relaxed)
    }

    pub fn wet_gain(&self) -> f32 {
        self.wet_gain.load(Ordering::Relaxed)
    }

    /// Read both parameters for one processing call.
    pub fn snapshot(&self) -> DelayParameters {
        DelayParameters {
            delay_time_ms: self.delay_time_ms(),
            wet_gain: self.wet_gain(),
        }
    }
}

impl DelayParamListener for DelayControls {
    fn on_delay_time_changed(&self, delay_time_ms: f32) {
        self.set_delay_time_ms(delay_time_ms);
    }

    fn on_wet_gain_changed(&self, wet_gain: f32) {
        self.set_wet_gain(wet_gain);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_defaults() {
        let controls = DelayControls::default();

        assert_eq!(controls.delay_time_ms(), 1000.0);
        assert_eq!(controls.wet_gain(), 1.0);
    }

    #[test]
    fn test_setters_store_in_range_values() {
        let controls = DelayControls::default();

        controls.set_delay_time_ms(250.5);
        controls.set_wet_gain(0.3);

        assert_eq!(
            controls.snapshot(),
            DelayParameters {
                delay_time_ms: 250.5,
                wet_gain: 0.3,
            }
        );
    }

    #[test]
    fn test_setters_clamp_to_domain() {
        let controls = DelayControls::default();

        controls.set_delay_time_ms(0.0);
        controls.set_wet_gain(-0.5);
        assert_eq!(controls.delay_time_ms(), MIN_DELAY_TIME_MS);
        assert_eq!(controls.wet_gain(), MIN_WET_GAIN);

        controls.set_delay_time_ms(10_000.0);
        controls.set_wet_gain(4.0);
        assert_eq!(controls.delay_time_ms(), MAX_DELAY_TIME_MS);
        assert_eq!(controls.wet_gain(), MAX_WET_GAIN);

        controls.set_delay_time_ms(f32::INFINITY);
        assert_eq!(controls.delay_time_ms(), MAX_DELAY_TIME_MS);
    }

    #[test]
    fn test_nan_keeps_previous_value() {
        let controls = DelayControls::default();
        controls.set_delay_time_ms(42.0);
        controls.set_wet_gain(0.25);

        controls.set_delay_time_ms(f32::NAN);
        controls.set_wet_gain(f32::NAN);

        assert_eq!(controls.delay_time_ms(), 42.0);
        assert_eq!(controls.wet_gain(), 0.25);
    }

    #[test]
    fn test_listener_forwards_to_setters() {
        let controls = DelayControls::default();
        let listener: &dyn DelayParamListener = &controls;

        listener.on_delay_time_changed(5000.0);
        listener.on_wet_gain_changed(0.5);

        assert_eq!(controls.delay_time_ms(), MAX_DELAY_TIME_MS);
        assert_eq!(controls.wet_gain(), 0.5);
    }

    /// Values set from a controller thread are what the audio side reads
    /// once that thread is done.
    #[test]
    fn test_values_set_on_another_thread_are_visible() {
        let controls = Arc::new(DelayControls::default());

        let controller = {
            let controls = controls.clone();
            thread::spawn(move || {
                controls.set_delay_time_ms(2500.0);
                controls.set_wet_gain(0.75);
            })
        };
        controller.join().unwrap();

        assert_eq!(
            controls.snapshot(),
            DelayParameters {
                delay_time_ms: 2500.0,
                wet_gain: 0.75,
            }
        );
    }
}
