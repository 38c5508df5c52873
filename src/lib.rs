//! # Circular Delay: A Single-Tap AU/VST3/CLAP Delay
//!
//! A per-channel echo built on a fixed-size ring buffer, packaged with
//! [nih-plug](https://github.com/robbert-vdh/nih-plug) as CLAP, VST3 and
//! (through clap-wrapper) AUv2.
//!
//! ## Signal Flow
//!
//! ```text
//! Input ──┬────────────────────────────────────────────────►(+)──► Output
//!         │                                                  ▲
//!         │                                                  │
//!         └──► [Ring Buffer] ──► delayed by N samples ──► × wet gain
//!              (one per channel,
//!               3 s capacity)
//! ```
//!
//! There is no feedback path: every input sample is heard once dry and
//! once as an echo, `N = floor(delay_ms * sample_rate / 1000)` samples
//! later.
//!
//! ## Threads
//!
//! Two threads touch this plugin:
//!
//! - The **audio thread** calls `process()` at a fixed block cadence. It
//!   owns the engine and its ring buffers outright and must never block or
//!   allocate, or the host drops audio.
//! - The **controller** (host automation, the DAW's generic editor, a
//!   custom UI) changes parameters whenever it likes. Its writes land in
//!   [`DelayControls`], two lock-free floats the audio thread reads once
//!   per block.
//!
//! ## Module Map
//!
//! - `dsp::delay_line`: ring buffers and write cursors, one per channel
//! - `dsp::engine`: delay-time conversion and the per-sample loop
//! - `controls`: the lock-free parameter slot and listener trait
//! - `params`: the host-facing parameters that feed `controls`

mod controls;
mod dsp;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use controls::DelayControls;
use dsp::engine::DelayEngine;
use nih_plug::prelude::*;
use params::PluginParams;

/// The main plugin struct.
///
/// Parameters live in two places. `params` is the host-facing side that
/// nih-plug serializes and automates; `controls` is the lock-free slot the
/// engine reads once per block. The parameter callbacks keep them in step.
/// The engine and its ring buffers are owned by the audio thread alone.
struct CircularDelay {
    params: Arc<PluginParams>,
    controls: Arc<DelayControls>,
    engine: DelayEngine,
}

impl Default for CircularDelay {
    fn default() -> Self {
        let controls = Arc::new(DelayControls::default());

        Self {
            params: Arc::new(PluginParams::new(controls.clone())),
            controls,
            // Empty until initialize() tells us the sample rate and
            // channel count.
            engine: DelayEngine::default(),
        }
    }
}

impl Plugin for CircularDelay {
    const NAME: &'static str = "Circular Delay";
    const VENDOR: &'static str = "Circular Delay";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo first since most DAW tracks are stereo. Input and output
    // channel counts always match.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Parameters are read once per block, so splitting blocks at
    // automation points would only add overhead.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Called when the plugin is loaded or the audio configuration
    /// changes. Allocates the ring buffers for the new sample rate and
    /// channel count.
    ///
    /// Returning `false` tells the host this configuration can't be used.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let num_channels = audio_io_layout
            .main_input_channels
            .map(|c| c.get() as usize)
            .unwrap_or(2);

        if let Err(err) = self.engine.prepare(
            buffer_config.sample_rate,
            buffer_config.max_buffer_size as usize,
            num_channels,
        ) {
            nih_error!("Failed to initialize Circular Delay: {err}");
            return false;
        }

        // Values restored from a preset may have arrived before any
        // callback could forward them.
        self.params.sync_to(self.controls.as_ref());

        true
    }

    /// Called when playback stops. Old echoes must not leak into the
    /// next play session.
    fn reset(&mut self) {
        self.engine.reset();
    }

    /// Called when the host stops using the plugin. Frees the rings;
    /// `initialize()` allocates them again on reactivation.
    fn deactivate(&mut self) {
        self.engine.release();
    }

    /// The audio callback: runs the delay over the host buffer in place.
    ///
    /// The host calls this hundreds of times per second with a small block
    /// of audio (typically 64-1024 samples per channel). A 256-sample block
    /// at 44100 Hz means roughly 172 calls per second.
    ///
    /// # Arguments
    ///
    /// * `buffer` - One slice of samples per channel. We read the dry input
    ///   from it and write the mixed output back into the same slots.
    /// * `_aux` - Sidechain buffers. Unused.
    /// * `_context` - Transport info. Unused; the delay is not tempo synced.
    ///
    /// # The Delay Algorithm
    ///
    /// 1. **Snapshot** the delay time and wet gain. They are read exactly
    ///    once, so every sample in the block uses the same values.
    /// 2. **Convert** the delay time to samples, truncating:
    ///
    ///    ```text
    ///    delay_samples = floor(delay_ms / 1000 * sample_rate)
    ///
    ///    5 ms    at 1000 Hz  =     5 samples
    ///    1 ms    at 44100 Hz =    44 samples (44.1 truncated)
    ///    3000 ms at 48000 Hz = 144000 samples (the whole ring)
    ///    ```
    ///
    ///    Below one sample the block is left untouched (bypass).
    /// 3. For each channel, for each sample in order:
    ///    - **Read** the sample written `delay_samples` ago. The read slot
    ///      is `write_pos - delay_samples`, plus the ring length if that
    ///      went negative.
    ///    - **Scale** it by the wet gain.
    ///    - **Write** the dry input into the ring at the write position,
    ///      overwriting the oldest sample.
    ///    - **Advance** the write position, wrapping to 0 at the end.
    ///    - **Mix**: `output = dry + wet_gain * delayed`. No clipping; a
    ///      full-scale input plus a full-gain echo can reach 2.0.
    ///
    /// Worked example at 1000 Hz, 5 ms, gain 0.5:
    ///
    /// ```text
    /// input  [1, 0, 0, 0, 0, 0,   0, 0]
    /// output [1, 0, 0, 0, 0, 0.5, 0, 0]
    ///                        ▲ the impulse, five samples later, at half level
    /// ```
    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let params = self.controls.snapshot();
        self.engine.process(buffer.as_slice(), params);

        // Without feedback there is exactly one echo, so the tail is one
        // delay period. Keep the host calling process() that long after
        // the input goes silent.
        match self.engine.tail_samples() {
            0 => ProcessStatus::Normal,
            tail => ProcessStatus::Tail(tail),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Plugin format trait implementations
// ─────────────────────────────────────────────────────────────────────

impl ClapPlugin for CircularDelay {
    const CLAP_ID: &'static str = "com.circular-delay.circular-delay";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A single-tap circular buffer delay");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for CircularDelay {
    const VST3_CLASS_ID: [u8; 16] = *b"CircBufDelay_v01";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay];
}

// ─────────────────────────────────────────────────────────────────────
// Export macros
// ─────────────────────────────────────────────────────────────────────
//
// nih_export_clap! exports `clap_entry` for CLAP hosts and
// nih_export_vst3! exports `GetPluginFactory` for VST3 hosts. The
// clap-wrapper macro adds the AUv2 entry point on top of the CLAP one.

nih_export_clap!(CircularDelay);
nih_export_vst3!(CircularDelay);

clap_wrapper::export_auv2!();

#[cfg(test)]
mod tests {
    use super::*;

    /// The host-facing defaults and the engine slot start out identical,
    /// so the very first block already uses the documented defaults.
    #[test]
    fn test_default_plugin_parameters_reach_engine_slot() {
        let plugin = CircularDelay::default();

        let snapshot = plugin.controls.snapshot();
        assert_eq!(snapshot.delay_time_ms, plugin.params.delay_time.value());
        assert_eq!(snapshot.wet_gain, plugin.params.wet_gain.value());
        assert_eq!(plugin.engine.channel_count(), 0);
    }

    #[test]
    fn test_layouts_are_symmetric() {
        for layout in CircularDelay::AUDIO_IO_LAYOUTS {
            assert_eq!(layout.main_input_channels, layout.main_output_channels);
        }
    }
}
