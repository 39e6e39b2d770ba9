/*!
 * Duration estimation for caption lines.
 *
 * A line's duration comes from its audio clip when there is one, otherwise it
 * is estimated from the word count at a configured speaking rate. The origin
 * of every duration is kept in `DurationSource` so later stages can tell a
 * measured length from a guess.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::app_config::SegmentationConfig;
use crate::audio::AudioClip;
use crate::errors::SegmentationError;

// @const: Word regex, runs of word characters
static WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Where a line's duration came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "seconds", rename_all = "lowercase")]
pub enum DurationSource {
    /// Measured from the line's audio clip
    Authoritative(f64),
    /// Estimated from the word count
    Estimated(f64),
    /// Read from a `[duration]` tag in a script file
    Annotated(f64),
}

impl DurationSource {
    /// The duration in seconds, regardless of origin
    pub fn seconds(&self) -> f64 {
        match *self {
            Self::Authoritative(s) | Self::Estimated(s) | Self::Annotated(s) => s,
        }
    }

    pub fn is_authoritative(&self) -> bool {
        matches!(self, Self::Authoritative(_))
    }
}

/// Count runs of word characters
///
/// Any non-empty text counts as at least one word so its duration stays positive.
pub fn count_words(text: &str) -> usize {
    let words = WORD_REGEX.find_iter(text).count();
    if words == 0 && !text.trim().is_empty() {
        1
    } else {
        words
    }
}

/// Seconds needed to speak `text` at `words_per_minute`
pub fn estimate_duration(text: &str, words_per_minute: u32) -> Result<f64, SegmentationError> {
    if words_per_minute == 0 {
        return Err(SegmentationError::InvalidConfig(
            "words_per_minute must be greater than zero".to_string(),
        ));
    }
    Ok(count_words(text) as f64 / words_per_minute as f64 * 60.0)
}

/// Resolve one line's duration, preferring its audio clip
///
/// An empty or unreadable-length clip does not count; the line is estimated instead.
pub fn resolve_duration(
    text: &str,
    clip: Option<&AudioClip>,
    words_per_minute: u32,
) -> Result<DurationSource, SegmentationError> {
    match clip {
        Some(clip) if clip.is_usable() => Ok(DurationSource::Authoritative(clip.duration)),
        _ => Ok(DurationSource::Estimated(estimate_duration(text, words_per_minute)?)),
    }
}

/// Resolve durations for every line; `clips` is aligned by index and may be shorter
pub fn resolve_durations<S: AsRef<str>>(
    lines: &[S],
    clips: &[Option<AudioClip>],
    config: &SegmentationConfig,
) -> Result<Vec<DurationSource>, SegmentationError> {
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let clip = clips.get(index).and_then(Option::as_ref);
            resolve_duration(line.as_ref(), clip, config.words_per_minute)
        })
        .collect()
}
