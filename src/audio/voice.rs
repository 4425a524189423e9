use std::sync::Arc;

use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;

/// One track's player node: loops a scheduled buffer seamlessly until stopped.
#[derive(Clone, Debug, Default)]
pub struct LoopPlayer {
    buffer: Option<Arc<SampleBuffer>>,
    pos: usize,
}

impl LoopPlayer {
    pub fn is_playing(&self) -> bool {
        self.buffer.is_some()
    }

    #[cfg(test)]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Schedule a buffer from its first frame. Hands back whatever was playing
    /// so the caller decides where it gets dropped.
    pub fn start(&mut self, buffer: Arc<SampleBuffer>) -> Option<Arc<SampleBuffer>> {
        self.pos = 0;
        if buffer.is_empty() {
            return self.buffer.take();
        }
        self.buffer.replace(buffer)
    }

    pub fn stop(&mut self) -> Option<Arc<SampleBuffer>> {
        self.pos = 0;
        self.buffer.take()
    }

    // mix this player into the output block, wrapping at the loop end
    pub fn render_into(&mut self, out: &mut [StereoFrame]) {
        let Some(buffer) = &self.buffer else {
            return;
        };
        let data = &buffer.data;
        let len = data.len();
        let mut written = 0;
        while written < out.len() {
            let n = (len - self.pos).min(out.len() - written);
            for (o, s) in out[written..written + n].iter_mut().zip(&data[self.pos..self.pos + n]) {
                o.left += s.left;
                o.right += s.right;
            }
            written += n;
            self.pos += n;
            if self.pos == len {
                self.pos = 0; // seamless wrap
            }
        }
    }
}
