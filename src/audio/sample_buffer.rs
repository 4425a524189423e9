use std::path::Path;

use crate::error::{AssetError, Result};
use super::frame::StereoFrame;

pub const GRAPH_CHANNELS: u16 = 2; // every node in the graph is stereo

/// The sample format shared by every node of the graph. Chosen once at
/// start-up and never changed while the stream runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputFormat {
    pub sample_rate: u32,
}

impl OutputFormat {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    // Read just the header of a representative asset
    pub fn probe_wav(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(AssetError::NotFound(path.to_path_buf()));
        }
        let reader = hound::WavReader::open(path)?;
        Ok(Self { sample_rate: reader.spec().sample_rate })
    }
}

#[derive(Clone, Debug)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>, // the audio data array
}

impl SampleBuffer {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Load a WAV file from disk fully into memory, converted to the graph format
    pub fn load_wav(path: &Path, format: OutputFormat) -> Result<Self> {
        if !path.is_file() {
            return Err(AssetError::NotFound(path.to_path_buf()));
        }
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let file_rate = spec.sample_rate;
        let file_channels = spec.channels as usize;
        if file_channels == 0 || file_rate == 0 {
            return Err(AssetError::Conversion(format!(
                "{} channels at {} Hz",
                file_channels, file_rate
            )));
        }

        // Read the samples from the WAV file
        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader // float, just pass it through
                .samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => { // int, convert to float
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            },
        };

        let mut frames: Vec<StereoFrame> = if file_channels == 1 {
            samples
                .into_iter()
                .map(|x| StereoFrame { // mono, duplicate
                    left: x,
                    right: x,
                })
                .collect()
        } else {
            // first two channels of each frame, anything past stereo is dropped
            samples
                .chunks_exact(file_channels)
                .map(|c| StereoFrame {
                    left: c[0],
                    right: c[1],
                })
                .collect()
        };

        if frames.is_empty() {
            return Err(AssetError::Empty(path.to_path_buf()));
        }

        if file_rate != format.sample_rate {
            frames = resample_linear(&frames, file_rate, format.sample_rate);
        }

        Ok(Self { data: frames })
    }
}

fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    if source_rate == target_rate {
        return frames.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        // fractional position in the source buffer
        let src_pos = i as f64 / ratio; // ex. 3.7
        let idx = src_pos.floor() as usize; // ex. 3
        let frac = (src_pos - idx as f64) as f32; // ex. 0.7
        if idx >= frames.len().saturating_sub(1) { // edge case
            out.push(*frames.last().unwrap_or(&StereoFrame::zero()));
        } else {
            let a = frames[idx]; // ex. frame 3
            let b = frames[idx + 1]; // ex. frame 4
            out.push(StereoFrame { // blend via frac and linear interpolation
                left: a.left * (1.0 - frac) + b.left * frac,
                right: a.right * (1.0 - frac) + b.right * frac,
            });
        }
    }
    out
}
