use serde::{Deserialize, Serialize};
use signalsmith_stretch::Stretch;

use super::frame::{StereoFrame, as_interleaved, as_interleaved_mut};
use super::sample_buffer::GRAPH_CHANNELS;

pub trait Effect: Send {
    fn process(&mut self, buf: &mut [StereoFrame]);
    fn reset(&mut self);
}

// ── Reverb ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReverbPreset {
    SmallRoom,
    LargeRoom,
    #[default]
    Cathedral,
    LargeHall,
}

impl ReverbPreset {
    #[cfg(test)]
    pub const ALL: [ReverbPreset; 4] = [
        ReverbPreset::SmallRoom,
        ReverbPreset::LargeRoom,
        ReverbPreset::Cathedral,
        ReverbPreset::LargeHall,
    ];

    pub fn next(self) -> Self {
        match self {
            ReverbPreset::SmallRoom => ReverbPreset::LargeRoom,
            ReverbPreset::LargeRoom => ReverbPreset::Cathedral,
            ReverbPreset::Cathedral => ReverbPreset::LargeHall,
            ReverbPreset::LargeHall => ReverbPreset::SmallRoom,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReverbPreset::SmallRoom => "Small Room",
            ReverbPreset::LargeRoom => "Large Room",
            ReverbPreset::Cathedral => "Cathedral",
            ReverbPreset::LargeHall => "Large Hall",
        }
    }

    // (room size, damping, width), all 0..1
    fn shape(self) -> (f32, f32, f32) {
        match self {
            ReverbPreset::SmallRoom => (0.2, 0.7, 0.5),
            ReverbPreset::LargeRoom => (0.55, 0.5, 0.8),
            ReverbPreset::Cathedral => (0.95, 0.25, 1.0),
            ReverbPreset::LargeHall => (0.8, 0.4, 1.0),
        }
    }
}

// Comb filter delay line lengths (in samples at 44.1kHz)
const COMB_LENGTHS: [usize; 8] = [1557, 1617, 1491, 1422, 1277, 1356, 1188, 1116];
const ALLPASS_LENGTHS: [usize; 4] = [225, 556, 441, 341];
const STEREO_SPREAD: usize = 23;
const ALLPASS_FEEDBACK: f32 = 0.5;
const COMB_GAIN: f32 = 0.2;

struct CombFilter {
    buffer: Vec<f32>,
    pos: usize,
    filter_state: f32,
}

impl CombFilter {
    fn new(length: usize) -> Self {
        Self { buffer: vec![0.0; length.max(1)], pos: 0, filter_state: 0.0 }
    }

    #[inline]
    fn process(&mut self, input: f32, feedback: f32, damp: f32) -> f32 {
        let output = self.buffer[self.pos];
        // one-pole lowpass on the feedback path
        self.filter_state = output * (1.0 - damp) + self.filter_state * damp;
        self.buffer[self.pos] = input + self.filter_state * feedback;
        self.pos = (self.pos + 1) % self.buffer.len();
        output
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.filter_state = 0.0;
    }
}

struct AllpassFilter {
    buffer: Vec<f32>,
    pos: usize,
}

impl AllpassFilter {
    fn new(length: usize) -> Self {
        Self { buffer: vec![0.0; length.max(1)], pos: 0 }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let buffered = self.buffer[self.pos];
        let output = -input + buffered;
        self.buffer[self.pos] = input + buffered * ALLPASS_FEEDBACK;
        self.pos = (self.pos + 1) % self.buffer.len();
        output
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
    }
}

/// Freeverb-style stereo reverb with a wet/dry mix in percent (0 = dry).
pub struct Reverb {
    combs_l: Vec<CombFilter>,
    combs_r: Vec<CombFilter>,
    allpass_l: Vec<AllpassFilter>,
    allpass_r: Vec<AllpassFilter>,
    feedback: f32,
    damping: f32,
    width: f32,
    wet_dry: f32,
}

impl Reverb {
    pub fn new(sample_rate: u32) -> Self {
        let scale = sample_rate as f32 / 44100.0;
        let scaled = |len: usize| (len as f32 * scale) as usize;
        let mut reverb = Self {
            combs_l: COMB_LENGTHS.iter().map(|&l| CombFilter::new(scaled(l))).collect(),
            combs_r: COMB_LENGTHS
                .iter()
                .map(|&l| CombFilter::new(scaled(l + STEREO_SPREAD)))
                .collect(),
            allpass_l: ALLPASS_LENGTHS.iter().map(|&l| AllpassFilter::new(scaled(l))).collect(),
            allpass_r: ALLPASS_LENGTHS
                .iter()
                .map(|&l| AllpassFilter::new(scaled(l + STEREO_SPREAD)))
                .collect(),
            feedback: 0.0,
            damping: 0.0,
            width: 1.0,
            wet_dry: 0.0,
        };
        reverb.load_preset(ReverbPreset::default());
        reverb
    }

    pub fn load_preset(&mut self, preset: ReverbPreset) {
        let (room, damping, width) = preset.shape();
        self.feedback = 0.7 + room * 0.28; // keep the tail finite
        self.damping = damping;
        self.width = width;
    }

    pub fn set_wet_dry(&mut self, percent: f32) {
        self.wet_dry = percent.clamp(0.0, 100.0);
    }

    #[cfg(test)]
    pub fn wet_dry(&self) -> f32 {
        self.wet_dry
    }
}

impl Effect for Reverb {
    fn process(&mut self, buf: &mut [StereoFrame]) {
        if self.wet_dry <= 0.0 {
            return; // fully dry, nothing to add
        }
        let wet = self.wet_dry / 100.0;
        let dry = 1.0 - wet;
        let wet1 = wet * (self.width / 2.0 + 0.5);
        let wet2 = wet * ((1.0 - self.width) / 2.0);

        for f in buf.iter_mut() {
            let input = (f.left + f.right) * 0.5;
            let mut out_l = 0.0f32;
            let mut out_r = 0.0f32;
            for comb in &mut self.combs_l {
                out_l += comb.process(input, self.feedback, self.damping);
            }
            for comb in &mut self.combs_r {
                out_r += comb.process(input, self.feedback, self.damping);
            }
            out_l *= COMB_GAIN;
            out_r *= COMB_GAIN;
            for ap in &mut self.allpass_l {
                out_l = ap.process(out_l);
            }
            for ap in &mut self.allpass_r {
                out_r = ap.process(out_r);
            }
            let left = out_l * wet1 + out_r * wet2 + f.left * dry;
            let right = out_r * wet1 + out_l * wet2 + f.right * dry;
            f.left = left;
            f.right = right;
        }
    }

    fn reset(&mut self) {
        self.combs_l.iter_mut().chain(self.combs_r.iter_mut()).for_each(CombFilter::reset);
        self.allpass_l.iter_mut().chain(self.allpass_r.iter_mut()).for_each(AllpassFilter::reset);
    }
}

// ── Time / pitch ──────────────────────────────────────────────────

pub const MIN_RATE: f32 = 0.25;
pub const MAX_RATE: f32 = 4.0;
pub const MAX_PITCH_CENTS: f32 = 2400.0;

/// Combined rate and pitch unit. Pitch is in cents, rate is the playback
/// speed factor (0.7 = slower). Neutral settings bypass the stretcher.
pub struct TimePitch {
    stretcher: Stretch,
    pitch_cents: f32,
    rate: f32,
}

impl TimePitch {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            stretcher: Stretch::preset_default(GRAPH_CHANNELS as u32, sample_rate),
            pitch_cents: 0.0,
            rate: 1.0,
        }
    }

    pub fn set_pitch(&mut self, cents: f32) {
        self.pitch_cents = cents.clamp(-MAX_PITCH_CENTS, MAX_PITCH_CENTS);
        self.stretcher
            .set_transpose_factor_semitones(self.pitch_cents / 100.0, None);
    }

    #[cfg(test)]
    pub fn pitch(&self) -> f32 {
        self.pitch_cents
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate.clamp(MIN_RATE, MAX_RATE);
    }

    #[cfg(test)]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn is_neutral(&self) -> bool {
        self.rate == 1.0 && self.pitch_cents == 0.0
    }

    /// How many input frames are consumed to produce `output_frames`.
    pub fn input_frames_for(&self, output_frames: usize) -> usize {
        ((output_frames as f32 * self.rate).round() as usize).max(1)
    }

    /// Stretch `input` into `output`; the length ratio sets the rate.
    pub fn process(&mut self, input: &[StereoFrame], output: &mut [StereoFrame]) {
        let out = as_interleaved_mut(output);
        out.fill(0.0);
        self.stretcher.process(as_interleaved(input), out);
    }

    // Clears the stretcher history and the pitch setting with it.
    pub fn reset(&mut self) {
        self.stretcher.reset();
        self.set_pitch(0.0);
    }
}
