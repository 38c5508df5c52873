//! # Plugin Parameters
//!
//! The two knobs the host sees. Each parameter has:
//!
//! - A **unique string ID** (`#[id = "..."]`) that the host uses to save
//!   and recall presets. Once published, never change these IDs.
//! - A **human-readable name** shown in the DAW's UI.
//! - A **range** and a **default value**.
//!
//! There is no smoother: a new delay time or gain takes
//! effect at the start of the next block.
//!
//! ## Wiring to the Engine
//!
//! nih-plug stores parameter values atomically already, but the engine
//! reads from its own [`DelayControls`] so it does not depend on the
//! plugin framework. Every parameter gets a callback that forwards the
//! new value through [`DelayParamListener`], the same entry point a
//! custom editor would use.

use std::sync::Arc;

use nih_plug::prelude::*;

use crate::controls::{
    DelayControls, DelayParamListener, DEFAULT_DELAY_TIME_MS, DEFAULT_WET_GAIN,
    MAX_DELAY_TIME_MS, MAX_WET_GAIN, MIN_DELAY_TIME_MS, MIN_WET_GAIN,
};

#[derive(Params)]
pub struct PluginParams {
    /// **Delay Time**: how long after the dry signal the echo arrives.
    ///
    /// Short settings (under ~30 ms) blur into a doubling or comb-filter
    /// effect. Around 80-150 ms gives a slapback. Longer times give a
    /// clearly separated repeat.
    ///
    /// Range: 1 ms to 3000 ms, the full length of the ring buffer.
    /// Default: 1000 ms.
    ///
    /// The engine converts this to whole samples by truncation, so at
    /// 44100 Hz 1 ms becomes 44 samples rather than 44.1. The linear range
    /// keeps the value shown in the DAW equal to what the engine uses.
    #[id = "time"]
    pub delay_time: FloatParam,

    /// **Delay Gain**: level of the echo relative to the dry signal.
    ///
    /// The output is `dry + gain * delayed`, so the dry signal always passes
    /// at full level:
    ///
    /// - 0% = dry only, no echo
    /// - 50% = echo about 6 dB quieter than the original
    /// - 100% = echo as loud as the original (the default)
    ///
    /// Unlike a dry/wet crossfade this never turns the dry signal down, so
    /// loud material with a loud echo can exceed 0 dBFS.
    #[id = "gain"]
    pub wet_gain: FloatParam,
}

impl PluginParams {
    pub fn new(controls: Arc<DelayControls>) -> Self {
        Self {
            delay_time: FloatParam::new(
                "Delay Time",
                DEFAULT_DELAY_TIME_MS,
                FloatRange::Linear {
                    min: MIN_DELAY_TIME_MS,
                    max: MAX_DELAY_TIME_MS,
                },
            )
            .with_unit(" ms")
            .with_step_size(0.1)
            .with_callback({
                let controls = controls.clone();
                Arc::new(move |ms: f32| controls.on_delay_time_changed(ms))
            }),

            wet_gain: FloatParam::new(
                "Delay Gain",
                DEFAULT_WET_GAIN,
                FloatRange::Linear {
                    min: MIN_WET_GAIN,
                    max: MAX_WET_GAIN,
                },
            )
            .with_unit("%")
            .with_value_to_string(formatters::v2s_f32_percentage(1))
            .with_string_to_value(formatters::s2v_f32_percentage())
            .with_callback(Arc::new(move |gain: f32| controls.on_wet_gain_changed(gain))),
        }
    }

    /// Push the current host values into `controls`.
    ///
    /// Callbacks only fire on changes, so this covers the values the
    /// host restored before the engine was listening.
    pub fn sync_to(&self, listener: &dyn DelayParamListener) {
        listener.on_delay_time_changed(self.delay_time.value());
        listener.on_wet_gain_changed(self.wet_gain.value());
    }
}
