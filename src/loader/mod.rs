pub mod buffer_cache;
pub mod sample_loader;

pub use buffer_cache::AudioBufferCache;
