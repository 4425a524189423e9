use std::path::{Path, PathBuf};

use crate::audio::{OutputFormat, SampleBuffer};
use crate::error::Result;

pub const ASSET_EXTENSION: &str = "wav";

// <assets_dir>/<name>.wav
pub fn asset_path(assets_dir: &Path, name: &str) -> PathBuf {
    assets_dir.join(format!("{name}.{ASSET_EXTENSION}"))
}

// Decode any WAV on disk into the graph format (used for personal recordings,
// which are never cached because the user can swap them at any time)
pub fn load(path: &Path, format: OutputFormat) -> Result<SampleBuffer> {
    SampleBuffer::load_wav(path, format)
}

// All .wav files in a directory, sorted by name so picks are stable
pub fn index_wav_in_dir(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(ASSET_EXTENSION))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_fixture::write_wav;

    #[test]
    fn indexes_only_wav_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_wav(dir.path(), "b", 44100, 1, &[0.0]);
        write_wav(dir.path(), "a", 44100, 1, &[0.0]);
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("sub.wav")).unwrap();

        let found = index_wav_in_dir(dir.path()).unwrap();
        let names: Vec<_> = found.iter().map(|p| p.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(names, vec!["a.wav", "b.wav"]);
    }

    #[test]
    fn missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(index_wav_in_dir(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn asset_names_map_to_wav_files() {
        assert_eq!(asset_path(Path::new("/a"), "01_Groove"), PathBuf::from("/a/01_Groove.wav"));
    }
}
