/*!
 * Timeline synthesis.
 *
 * Turns the final annotated script into the layers the compositor needs:
 * - an image track where every image holds until the next marker and then
 *   crossfades into its successor,
 * - a gapless subtitle track carrying each line's text and audio clip.
 *
 * Images are laid out inside the subtitle track's total duration; the fade
 * window of an image overlaps the start of the next one instead of extending
 * the program.
 */

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::app_config::{Config, RenderConfig};
use crate::audio::AudioClip;
use crate::duration::DurationSource;
use crate::errors::SegmentationError;
use crate::script::AnnotatedLine;

/// Annotated and measured durations closer than this are considered equal.
/// Duration tags are written with two decimals, so one tag step is tolerated.
const DIVERGENCE_TOLERANCE_SECS: f64 = 0.01;

/// Extension assumed for image markers that carry none
const DEFAULT_IMAGE_EXTENSION: &str = ".png";

/// One image layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Image identifier from the script marker
    pub image_id: String,
    /// File the compositor loads from the image directory
    pub image_file: String,
    /// Seconds from program start
    pub start_time: f64,
    /// Seconds the image is the primary picture
    pub visible_duration: f64,
    /// Tail during which the next image dissolves in
    pub fade_duration: f64,
    /// Whether this image dissolves in over its predecessor
    pub crossfade_in: bool,
}

impl TimelineEntry {
    /// Visible time plus the crossfade tail
    pub fn rendered_duration(&self) -> f64 {
        self.visible_duration + self.fade_duration
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.rendered_duration()
    }

    /// Checks if this image is on screen at `t`
    pub fn is_active(&self, t: f64) -> bool {
        t >= self.start_time && t < self.end_time()
    }
}

/// One caption on the subtitle and audio track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    /// Position of the line in the script
    pub index: usize,
    pub text: String,
    /// Sum of the durations of all earlier lines
    pub start_time: f64,
    pub duration: f64,
    /// Where `duration` came from
    pub source: DurationSource,
    /// Voice clip played with this caption
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioClip>,
}

impl SubtitleEntry {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Format seconds as an SRT timestamp (HH:MM:SS,mmm)
    pub fn format_timestamp(seconds: f64) -> String {
        let ms = (seconds.max(0.0) * 1000.0).round() as u64;
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let secs = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index + 1)?;
        writeln!(
            f,
            "{} --> {}",
            Self::format_timestamp(self.start_time),
            Self::format_timestamp(self.end_time())
        )?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// A script duration tag that disagrees with the measured audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationDivergence {
    pub index: usize,
    /// Value of the `[duration]` tag
    pub annotated: f64,
    /// Length of the audio clip, which is used
    pub authoritative: f64,
}

/// Complete layout of a program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub images: Vec<TimelineEntry>,
    pub subtitles: Vec<SubtitleEntry>,
    pub total_duration: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub divergences: Vec<DurationDivergence>,
}

impl Timeline {
    /// Images on screen at `t`; two during a crossfade, none outside the program
    pub fn images_at(&self, t: f64) -> Vec<&TimelineEntry> {
        if t < 0.0 || t >= self.total_duration {
            return Vec::new();
        }
        self.images.iter().filter(|image| image.is_active(t)).collect()
    }

    /// Caption shown at `t`
    pub fn subtitle_at(&self, t: f64) -> Option<&SubtitleEntry> {
        if t < 0.0 || t >= self.total_duration {
            return None;
        }
        let after = self.subtitles.partition_point(|entry| entry.start_time <= t);
        after.checked_sub(1).map(|i| &self.subtitles[i])
    }

    /// Render the subtitle track as SRT, wrapping captions at `characters_per_line`
    pub fn to_srt(&self, characters_per_line: usize) -> String {
        let mut output = String::new();
        for entry in &self.subtitles {
            let wrapped = SubtitleEntry {
                text: wrap_caption(&entry.text, characters_per_line),
                ..entry.clone()
            };
            output.push_str(&wrapped.to_string());
        }
        output
    }
}

/// Background track mixed under the voice clips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundAudio {
    pub path: PathBuf,
    /// Played from the start and cut here, which is the program length
    pub duration: f64,
}

/// Everything the external compositor needs to produce the video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub settings: RenderConfig,
    pub timeline: Timeline,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_audio: Option<BackgroundAudio>,
}

impl RenderPlan {
    pub fn new(settings: RenderConfig, timeline: Timeline) -> Self {
        Self {
            settings,
            timeline,
            background_audio: None,
        }
    }

    /// Mix a background track, truncated to the program length
    pub fn with_background_audio<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.background_audio = Some(BackgroundAudio {
            path: path.into(),
            duration: self.timeline.total_duration,
        });
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Image file for a marker; names without a `.png` suffix get one appended
pub fn image_file_name(image_id: &str) -> String {
    if image_id.ends_with(DEFAULT_IMAGE_EXTENSION) {
        image_id.to_string()
    } else {
        format!("{}{}", image_id, DEFAULT_IMAGE_EXTENSION)
    }
}

/// Word-wrap a caption to lines of at most `width` characters
///
/// Words longer than `width` get a line of their own.
pub fn wrap_caption(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        } else {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}

/// Lay out image and subtitle tracks for a finished script
///
/// `clips` is aligned with `lines` by index and may be shorter. A clip always
/// overrides the line's own duration; a differing `[duration]` tag is recorded
/// in `Timeline::divergences`. Empty clips are ignored and the line keeps its
/// own duration.
pub fn build_timeline(
    lines: &[AnnotatedLine],
    clips: &[Option<AudioClip>],
    config: &Config,
) -> Result<Timeline, SegmentationError> {
    if lines.is_empty() {
        return Err(SegmentationError::EmptyInput);
    }
    if !lines[0].starts_segment() {
        return Err(SegmentationError::MissingImageMarker { index: 0 });
    }

    let fade = config.render.crossfade_duration;
    if !(fade.is_finite() && fade >= 0.0) {
        return Err(SegmentationError::InvalidConfig(format!(
            "crossfade duration must be zero or more seconds, got {}",
            fade
        )));
    }
    let words_per_minute = config.segmentation.words_per_minute;

    let mut subtitles = Vec::with_capacity(lines.len());
    let mut images: Vec<TimelineEntry> = Vec::new();
    let mut divergences = Vec::new();
    let mut elapsed = 0.0;

    for (index, line) in lines.iter().enumerate() {
        let clip = match clips.get(index).and_then(Option::as_ref) {
            Some(clip) if !clip.is_usable() => {
                warn!("Line {}: audio clip has no usable length ({}s); ignoring it", index, clip.duration);
                None
            }
            other => other,
        };
        let source = match clip {
            Some(clip) => {
                if let Some(DurationSource::Annotated(annotated)) = line.duration {
                    if (annotated - clip.duration).abs() > DIVERGENCE_TOLERANCE_SECS {
                        warn!(
                            "Line {}: script says {:.2}s but audio clip is {:.2}s; using the audio",
                            index, annotated, clip.duration
                        );
                        divergences.push(DurationDivergence {
                            index,
                            annotated,
                            authoritative: clip.duration,
                        });
                    }
                }
                DurationSource::Authoritative(clip.duration)
            }
            None => line.resolved_duration(words_per_minute)?,
        };
        let duration = source.seconds();

        if let Some(marker) = &line.image_marker {
            images.push(TimelineEntry {
                image_id: marker.clone(),
                image_file: image_file_name(marker),
                start_time: elapsed,
                visible_duration: 0.0,
                fade_duration: fade,
                crossfade_in: !images.is_empty(),
            });
        }
        // Line 0 carries a marker, so there is always a current image
        if let Some(current) = images.last_mut() {
            current.visible_duration += duration;
        }

        subtitles.push(SubtitleEntry {
            index,
            text: line.text.clone(),
            start_time: elapsed,
            duration,
            source,
            audio: clip.cloned(),
        });
        elapsed += duration;
    }

    debug!(
        "Timeline: {} image(s), {} caption(s), {:.2}s total",
        images.len(),
        subtitles.len(),
        elapsed
    );

    Ok(Timeline {
        images,
        subtitles,
        total_duration: elapsed,
        divergences,
    })
}
