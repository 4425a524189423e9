use bytemuck::{Pod, Zeroable};

// The smallest unit of audio; one stereo frame
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    pub fn zero() -> Self { // just giving `default` a better name for clarity
        Self::default()
    }

    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    pub fn scale(self, gain: f32) -> Self {
        Self { left: self.left * gain, right: self.right * gain }
    }
}

// Reinterpret stereo frames as interleaved L/R floats, no copying.
pub fn as_interleaved(frames: &[StereoFrame]) -> &[f32] {
    bytemuck::cast_slice(frames)
}

pub fn as_interleaved_mut(frames: &mut [StereoFrame]) -> &mut [f32] {
    bytemuck::cast_slice_mut(frames)
}
