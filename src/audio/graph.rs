use std::sync::Arc;

use crate::pipeline::TrackKind;

use super::effect::ReverbPreset;
use super::sample_buffer::{OutputFormat, SampleBuffer};

/// Control-side operations on the audio graph.
///
/// Topology is fixed when the graph is built; everything here is a
/// scheduling or parameter write that is safe to issue while the render
/// thread is pulling samples.
pub trait AudioGraph {
    fn output_format(&self) -> OutputFormat;

    fn is_playing(&self, track: TrackKind) -> bool;
    /// Schedule `buffer` on the track's player as a seamless loop, from the
    /// first frame, and start the player.
    fn play_looping(&mut self, track: TrackKind, buffer: Arc<SampleBuffer>);
    fn stop(&mut self, track: TrackKind);

    fn set_mixer_volume(&mut self, volume: f32);
    fn load_reverb_preset(&mut self, preset: ReverbPreset);
    /// Wet/dry mix in percent, 0 = dry.
    fn set_reverb_mix(&mut self, wet_dry: f32);

    /// Pitch shift in cents.
    fn pitch(&self) -> f32;
    fn set_pitch(&mut self, cents: f32);
    fn rate(&self) -> f32;
    fn set_rate(&mut self, rate: f32);
    /// Clear the time/pitch unit's internal state. Its pitch goes back to 0
    /// as a side effect; the rate is kept.
    fn reset_time_pitch(&mut self);
}

/// What the control side last told each node, mirrored so queries don't have
/// to cross into the render thread.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeState {
    pub playing: [bool; TrackKind::COUNT],
    pub volume: f32,
    pub reverb_preset: ReverbPreset,
    pub reverb_mix: f32,
    pub pitch: f32,
    pub rate: f32,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            playing: [false; TrackKind::COUNT],
            volume: 1.0,
            reverb_preset: ReverbPreset::default(),
            reverb_mix: 0.0,
            pitch: 0.0,
            rate: 1.0,
        }
    }
}
