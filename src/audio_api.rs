use std::sync::Arc;

use crate::audio::{ReverbPreset, SampleBuffer};
use crate::pipeline::TrackKind;

// Everything the control domain may ask of the render thread. Topology never
// changes after start-up; these are only scheduling and parameter writes.
#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The engine can't load files (that would stall the callback), so buffers
    // arrive fully decoded and already in the graph format.
    PlayLoop { track: TrackKind, buffer: Arc<SampleBuffer> },
    Stop(TrackKind),

    SetVolume(f32),
    LoadReverbPreset(ReverbPreset),
    SetReverbMix(f32),
    SetPitch(f32),
    SetRate(f32),
    ResetTimePitch,
}
