/*!
 * Voice audio clips.
 *
 * Only the length of a clip matters to the engine: when a clip exists for a
 * line, its measured duration replaces any estimate. Clips live in a directory
 * as `<index>.wav`, one per caption line.
 */

use anyhow::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::AppError;
use crate::file_utils::FileManager;

/// Synthesized speech for one caption line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    /// Measured length in seconds
    pub duration: f64,

    /// Where the clip was loaded from, if it came from disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl AudioClip {
    /// Create an in-memory clip of a known length
    pub fn new(duration: f64) -> Self {
        Self { duration, path: None }
    }

    /// Open a WAV file and measure its length
    pub fn from_wav<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let duration = wav_duration_seconds(path)?;
        Ok(Self {
            duration,
            path: Some(path.to_path_buf()),
        })
    }

    /// Whether the clip has a positive, finite length that can time a line
    pub fn is_usable(&self) -> bool {
        self.duration.is_finite() && self.duration > 0.0
    }
}

/// Read the length of a WAV file in seconds
pub fn wav_duration_seconds<P: AsRef<Path>>(path: P) -> Result<f64, AppError> {
    let path = path.as_ref();
    let reader = hound::WavReader::open(path)
        .map_err(|e| AppError::Audio(format!("{}: {}", path.display(), e)))?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(AppError::Audio(format!("{}: zero sample rate", path.display())));
    }
    // duration() is counted in frames, i.e. samples per channel
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}

/// Lookup of the audio clip belonging to a caption line
pub trait AudioSource {
    /// Return the clip for line `index`, or `None` if the line has no audio
    fn clip_for(&self, index: usize) -> Result<Option<AudioClip>>;

    /// Collect clips for lines `0..count`
    fn clips(&self, count: usize) -> Result<Vec<Option<AudioClip>>> {
        (0..count).map(|index| self.clip_for(index)).collect()
    }
}

/// No audio at all; every duration is estimated
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAudio;

impl AudioSource for NoAudio {
    fn clip_for(&self, _index: usize) -> Result<Option<AudioClip>> {
        Ok(None)
    }
}

/// Clips stored as `<dir>/<index>.wav`
#[derive(Debug, Clone)]
pub struct WavDirectory {
    dir: PathBuf,
}

impl WavDirectory {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Path where the clip for line `index` is expected
    pub fn clip_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.wav", index))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl AudioSource for WavDirectory {
    fn clip_for(&self, index: usize) -> Result<Option<AudioClip>> {
        if !FileManager::dir_exists(&self.dir) {
            return Ok(None);
        }
        let path = self.clip_path(index);
        if !FileManager::file_exists(&path) {
            return Ok(None);
        }
        let clip = AudioClip::from_wav(&path)?;
        if !clip.is_usable() {
            warn!("Audio clip {:?} is empty; line {} will be estimated", path, index);
            return Ok(None);
        }
        debug!("Audio clip {}: {:.3}s", index, clip.duration);
        Ok(Some(clip))
    }
}

impl AudioSource for Vec<Option<AudioClip>> {
    fn clip_for(&self, index: usize) -> Result<Option<AudioClip>> {
        Ok(self.get(index).cloned().flatten())
    }
}
