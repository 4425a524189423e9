// Purely for testing: an in-memory graph that records every control write, and
// helpers for writing little WAV assets into a temp directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::audio::{AudioGraph, NodeState, OutputFormat, ReverbPreset, SampleBuffer};
use crate::loader::AudioBufferCache;

use super::catalog::TrackKind;
use super::controller::GraphController;
use super::effects::EffectParams;

pub const FIXTURE_RATE: u32 = 44100;

#[derive(Clone, Debug, PartialEq)]
pub enum GraphOp {
    PlayLooping(TrackKind),
    Stop(TrackKind),
    SetVolume(f32),
    LoadReverbPreset(ReverbPreset),
    SetReverbMix(f32),
    SetPitch(f32),
    SetRate(f32),
    ResetTimePitch,
}

#[derive(Debug)]
pub struct FakeGraph {
    pub nodes: NodeState,
    pub ops: Vec<GraphOp>,
    buffers: [Option<Arc<SampleBuffer>>; TrackKind::COUNT],
}

impl Default for FakeGraph {
    fn default() -> Self {
        Self {
            nodes: NodeState::default(),
            ops: Vec::new(),
            buffers: std::array::from_fn(|_| None),
        }
    }
}

impl FakeGraph {
    pub fn with_state(f: impl FnOnce(&mut NodeState)) -> Self {
        let mut graph = Self::default();
        f(&mut graph.nodes);
        graph
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    pub fn count(&self, pred: impl Fn(&GraphOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    pub fn last_buffer(&self, track: TrackKind) -> Option<&Arc<SampleBuffer>> {
        self.buffers[track.index()].as_ref()
    }
}

impl AudioGraph for FakeGraph {
    fn output_format(&self) -> OutputFormat {
        OutputFormat::new(FIXTURE_RATE)
    }

    fn is_playing(&self, track: TrackKind) -> bool {
        self.nodes.playing[track.index()]
    }

    fn play_looping(&mut self, track: TrackKind, buffer: Arc<SampleBuffer>) {
        self.ops.push(GraphOp::PlayLooping(track));
        self.buffers[track.index()] = Some(buffer);
        self.nodes.playing[track.index()] = true;
    }

    fn stop(&mut self, track: TrackKind) {
        self.ops.push(GraphOp::Stop(track));
        self.nodes.playing[track.index()] = false;
    }

    fn set_mixer_volume(&mut self, volume: f32) {
        self.ops.push(GraphOp::SetVolume(volume));
        self.nodes.volume = volume;
    }

    fn load_reverb_preset(&mut self, preset: ReverbPreset) {
        self.ops.push(GraphOp::LoadReverbPreset(preset));
        self.nodes.reverb_preset = preset;
    }

    fn set_reverb_mix(&mut self, wet_dry: f32) {
        self.ops.push(GraphOp::SetReverbMix(wet_dry));
        self.nodes.reverb_mix = wet_dry;
    }

    fn pitch(&self) -> f32 {
        self.nodes.pitch
    }

    fn set_pitch(&mut self, cents: f32) {
        self.ops.push(GraphOp::SetPitch(cents));
        self.nodes.pitch = cents;
    }

    fn rate(&self) -> f32 {
        self.nodes.rate
    }

    fn set_rate(&mut self, rate: f32) {
        self.ops.push(GraphOp::SetRate(rate));
        self.nodes.rate = rate;
    }

    fn reset_time_pitch(&mut self) {
        self.ops.push(GraphOp::ResetTimePitch);
        self.nodes.pitch = 0.0;
    }
}

// Write interleaved samples as a 16-bit WAV named `<name>.wav`
pub fn write_wav(dir: &Path, name: &str, sample_rate: u32, channels: u16, samples: &[f32]) -> PathBuf {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    write_wav_spec(dir, name, spec, samples)
}

pub fn write_wav_spec(dir: &Path, name: &str, spec: hound::WavSpec, samples: &[f32]) -> PathBuf {
    let path = dir.join(format!("{name}.wav"));
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for &s in samples {
        match spec.sample_format {
            hound::SampleFormat::Float => writer.write_sample(s).unwrap(),
            hound::SampleFormat::Int => writer.write_sample((s * i16::MAX as f32) as i16).unwrap(),
        }
    }
    writer.finalize().unwrap();
    path
}

/// Temp asset dir holding the three bundled stems, and a controller over a
/// fake graph reading from it. Keep the dir alive for the test's duration.
pub fn fixture_controller() -> (tempfile::TempDir, GraphController<FakeGraph>) {
    let dir = tempfile::tempdir().unwrap();
    for name in ["01_Groove", "01_Melody", "01_Harmony"] {
        write_wav(dir.path(), name, FIXTURE_RATE, 2, &[0.1; 256]);
    }
    let cache = AudioBufferCache::new(dir.path(), OutputFormat::new(FIXTURE_RATE));
    let ctl = GraphController::new(FakeGraph::default(), cache, EffectParams::default());
    (dir, ctl)
}
