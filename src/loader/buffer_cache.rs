use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::audio::{OutputFormat, SampleBuffer};
use crate::error::Result;

use super::sample_loader;

/// Decoded bundled assets, keyed by asset name. Filled lazily, never evicted:
/// the catalog only names a handful of distinct assets.
pub struct AudioBufferCache {
    assets_dir: PathBuf,
    format: OutputFormat,
    buffers: HashMap<String, Arc<SampleBuffer>>,
}

impl AudioBufferCache {
    pub fn new(assets_dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            format,
            buffers: HashMap::new(),
        }
    }

    #[cfg(test)]
    pub fn assets_dir(&self) -> &std::path::Path {
        &self.assets_dir
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Cached buffer for `name`, loading and decoding it on first use.
    /// Failures are not cached; a later call tries the disk again.
    pub fn get(&mut self, name: &str) -> Result<Arc<SampleBuffer>> {
        if let Some(buffer) = self.buffers.get(name) {
            return Ok(Arc::clone(buffer));
        }
        let path = sample_loader::asset_path(&self.assets_dir, name);
        let buffer = Arc::new(sample_loader::load(&path, self.format)?);
        log::debug!("cached {name} ({} frames)", buffer.len());
        self.buffers.insert(name.to_owned(), Arc::clone(&buffer));
        Ok(buffer)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}
