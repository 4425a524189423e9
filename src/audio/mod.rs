use std::sync::Arc;

use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::audio_api::AudioCommand;
use crate::pipeline::TrackKind;

mod effect;
mod engine;
mod frame;
mod graph;
mod sample_buffer;
mod voice;

pub use effect::ReverbPreset;
pub use frame::StereoFrame;
pub use graph::{AudioGraph, NodeState};
pub use sample_buffer::{OutputFormat, SampleBuffer};

use engine::Engine;

const COMMAND_QUEUE: usize = 1024;
// each command retires at most one buffer
const RETIRED_QUEUE: usize = COMMAND_QUEUE;

/// Control-side handle to the running output stream. Implements
/// [`AudioGraph`] by queueing commands for the render thread.
pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    retired_rx: Receiver<Arc<SampleBuffer>>,
    format: OutputFormat,
    nodes: NodeState,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    fn send(&self, cmd: AudioCommand) -> bool {
        match self.tx.try_send(cmd) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("audio command dropped: {e}");
                false
            }
        }
    }

    /// Drop buffers the render thread has let go of. Call from the control loop.
    pub fn collect_garbage(&self) -> usize {
        self.retired_rx.try_iter().count()
    }
}

impl AudioGraph for AudioHandle {
    fn output_format(&self) -> OutputFormat {
        self.format
    }

    fn is_playing(&self, track: TrackKind) -> bool {
        self.nodes.playing[track.index()]
    }

    fn play_looping(&mut self, track: TrackKind, buffer: Arc<SampleBuffer>) {
        if self.send(AudioCommand::PlayLoop { track, buffer }) {
            self.nodes.playing[track.index()] = true;
        }
    }

    fn stop(&mut self, track: TrackKind) {
        if self.send(AudioCommand::Stop(track)) {
            self.nodes.playing[track.index()] = false;
        }
    }

    fn set_mixer_volume(&mut self, volume: f32) {
        if self.send(AudioCommand::SetVolume(volume)) {
            self.nodes.volume = volume;
        }
    }

    fn load_reverb_preset(&mut self, preset: ReverbPreset) {
        if self.send(AudioCommand::LoadReverbPreset(preset)) {
            self.nodes.reverb_preset = preset;
        }
    }

    fn set_reverb_mix(&mut self, wet_dry: f32) {
        if self.send(AudioCommand::SetReverbMix(wet_dry)) {
            self.nodes.reverb_mix = wet_dry;
        }
    }

    fn pitch(&self) -> f32 {
        self.nodes.pitch
    }

    fn set_pitch(&mut self, cents: f32) {
        if self.send(AudioCommand::SetPitch(cents)) {
            self.nodes.pitch = cents;
        }
    }

    fn rate(&self) -> f32 {
        self.nodes.rate
    }

    fn set_rate(&mut self, rate: f32) {
        if self.send(AudioCommand::SetRate(rate)) {
            self.nodes.rate = rate;
        }
    }

    fn reset_time_pitch(&mut self) {
        if self.send(AudioCommand::ResetTimePitch) {
            self.nodes.pitch = 0.0;
        }
    }
}

/// Open the default output device at the requested graph format. If the
/// device refuses that rate its default rate is used instead; the handle
/// reports the format actually in use.
pub fn start_audio(requested: OutputFormat) -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(COMMAND_QUEUE);
    let (retired_tx, retired_rx) = crossbeam_channel::bounded::<Arc<SampleBuffer>>(RETIRED_QUEUE);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    if config.sample_format() != cpal::SampleFormat::F32 {
        anyhow::bail!("unsupported sample format (only f32 supported for now)");
    }

    let device_rate = config.sample_rate();
    let mut stream_config: cpal::StreamConfig = config.into();
    stream_config.sample_rate = requested.sample_rate;

    let (output_stream, format) = match build_output_stream_f32(
        &device, &stream_config, rx.clone(), retired_tx.clone(), requested,
    ) {
        Ok(stream) => (stream, requested),
        Err(e) => {
            log::warn!(
                "device refused {} Hz ({e}), falling back to {} Hz",
                requested.sample_rate, device_rate
            );
            stream_config.sample_rate = device_rate;
            let fallback = OutputFormat::new(device_rate);
            let stream = build_output_stream_f32(&device, &stream_config, rx, retired_tx, fallback)?;
            (stream, fallback)
        }
    };
    output_stream.play().context("failed to play output stream")?;
    log::info!(
        "audio output running at {} Hz, {} channels",
        format.sample_rate, stream_config.channels
    );

    Ok(AudioHandle {
        tx,
        retired_rx,
        format,
        nodes: NodeState::default(),
        _output_stream: output_stream,
    })
}

// ── Output stream ─────────────────────────────────────────────────

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    retired_tx: Sender<Arc<SampleBuffer>>,
    format: OutputFormat,
) -> anyhow::Result<cpal::Stream> {
    let channels = config.channels as usize;
    let mut engine = Engine::new(format.sample_rate);
    engine.set_retired_tx(retired_tx);

    let err_fn = |err| log::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            engine.flush_retired();
            while let Ok(cmd) = rx.try_recv() { // apply queued control writes first
                engine.handle_cmd(cmd);
            }
            engine.render_interleaved(data, channels);
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
