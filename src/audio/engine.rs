use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::audio_api::AudioCommand;
use crate::pipeline::TrackKind;

use super::effect::{Effect, MAX_RATE, Reverb, TimePitch};
use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::voice::LoopPlayer;

// Blocks are rendered in chunks of at most this many frames so the scratch
// buffers can be allocated once, up front.
pub const MAX_BLOCK_FRAMES: usize = 4096;

// retired buffers the queue had no room for, held until it drains
const RETIRED_BACKLOG: usize = 256;

/// Render-side graph: players → mixer → time/pitch → reverb → output.
pub struct Engine {
    players: [LoopPlayer; TrackKind::COUNT],
    volume: f32,
    time_pitch: TimePitch,
    reverb: Reverb,
    mix_scratch: Vec<StereoFrame>, // mixer output, sized for the fastest rate
    out_scratch: Vec<StereoFrame>,
    retired_tx: Option<Sender<Arc<SampleBuffer>>>,
    retired_backlog: Vec<Arc<SampleBuffer>>,
}

impl Engine {
    pub fn new(sample_rate: u32) -> Self {
        let mix_capacity = (MAX_BLOCK_FRAMES as f32 * MAX_RATE).ceil() as usize;
        let mut reverb = Reverb::new(sample_rate);
        reverb.set_wet_dry(0.0);
        Self {
            players: std::array::from_fn(|_| LoopPlayer::default()),
            volume: 1.0,
            time_pitch: TimePitch::new(sample_rate),
            reverb,
            mix_scratch: vec![StereoFrame::zero(); mix_capacity],
            out_scratch: vec![StereoFrame::zero(); MAX_BLOCK_FRAMES],
            retired_tx: None,
            retired_backlog: Vec::with_capacity(RETIRED_BACKLOG),
        }
    }

    // Buffers leaving the graph are sent back so the control thread frees them
    pub fn set_retired_tx(&mut self, tx: Sender<Arc<SampleBuffer>>) {
        self.retired_tx = Some(tx);
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::PlayLoop { track, buffer } => {
                let old = self.players[track.index()].start(buffer);
                self.retire(old);
            }
            AudioCommand::Stop(track) => {
                let old = self.players[track.index()].stop();
                self.retire(old);
            }
            AudioCommand::SetVolume(v) => self.volume = v.max(0.0),
            AudioCommand::LoadReverbPreset(p) => self.reverb.load_preset(p),
            AudioCommand::SetReverbMix(m) => {
                self.reverb.set_wet_dry(m);
                if m <= 0.0 {
                    self.reverb.reset(); // no stale tail when it comes back
                }
            }
            AudioCommand::SetPitch(c) => self.time_pitch.set_pitch(c),
            AudioCommand::SetRate(r) => self.time_pitch.set_rate(r),
            AudioCommand::ResetTimePitch => self.time_pitch.reset(),
        }
    }

    fn retire(&mut self, buffer: Option<Arc<SampleBuffer>>) {
        let (Some(buffer), Some(tx)) = (buffer, &self.retired_tx) else {
            return;
        };
        if let Err(e) = tx.try_send(buffer) {
            // never free on this thread while there is room to hold on
            if self.retired_backlog.len() < self.retired_backlog.capacity() {
                self.retired_backlog.push(e.into_inner());
            }
        }
    }

    /// Retry sending held buffers. Called at the top of every callback.
    pub fn flush_retired(&mut self) {
        let Some(tx) = &self.retired_tx else {
            return;
        };
        while let Some(buffer) = self.retired_backlog.pop() {
            if let Err(e) = tx.try_send(buffer) {
                self.retired_backlog.push(e.into_inner());
                break;
            }
        }
    }

    #[cfg(test)]
    pub fn is_playing(&self, track: TrackKind) -> bool {
        self.players[track.index()].is_playing()
    }

    /// Fill a block of stereo frames.
    #[cfg(test)]
    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        for chunk in out.chunks_mut(MAX_BLOCK_FRAMES) {
            self.render_chunk(chunk);
        }
    }

    /// Fill an interleaved device buffer with any channel count.
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        let mut out = std::mem::take(&mut self.out_scratch);
        for device_chunk in data.chunks_mut(MAX_BLOCK_FRAMES * channels) {
            let n_frames = device_chunk.len() / channels;
            let frames = &mut out[..n_frames];
            self.render_chunk(frames);
            for (dst, f) in device_chunk.chunks_exact_mut(channels).zip(frames.iter()) {
                if channels == 1 {
                    dst[0] = (f.left + f.right) * 0.5;
                } else {
                    dst[0] = f.left;
                    dst[1] = f.right;
                    dst[2..].fill(0.0);
                }
            }
        }
        self.out_scratch = out;
    }

    fn render_chunk(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::zero());
        if self.time_pitch.is_neutral() {
            self.mix_players(out);
        } else {
            let n_in = self.time_pitch.input_frames_for(out.len()).min(self.mix_scratch.len());
            let mut input = std::mem::take(&mut self.mix_scratch);
            input[..n_in].fill(StereoFrame::zero());
            self.mix_players(&mut input[..n_in]);
            self.time_pitch.process(&input[..n_in], out);
            self.mix_scratch = input;
        }
        self.reverb.process(out);
    }

    // sum of all players, scaled by the mixer volume
    fn mix_players(&mut self, out: &mut [StereoFrame]) {
        for player in &mut self.players {
            player.render_into(out);
        }
        if self.volume != 1.0 {
            for f in out.iter_mut() {
                *f = f.scale(self.volume);
            }
        }
    }
}
