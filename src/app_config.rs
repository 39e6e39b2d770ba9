use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Caption splitting and image segmentation settings
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Settings handed to the video compositor
    #[serde(default)]
    pub render: RenderConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Settings for the segmenter, duration estimator and partitioner
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SegmentationConfig {
    /// Maximum characters in one caption; a single longer sentence is kept whole
    #[serde(default = "default_max_characters")]
    pub max_characters: usize,

    /// Desired seconds of screen time per image
    #[serde(default = "default_target_segment_duration")]
    pub target_segment_duration: f64,

    /// Speaking rate used when a line has no audio clip
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_characters: default_max_characters(),
            target_segment_duration: default_target_segment_duration(),
            words_per_minute: default_words_per_minute(),
        }
    }
}

/// Settings for the image and subtitle layers of the final video
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RenderConfig {
    /// Crossfade between consecutive images in seconds
    #[serde(default = "default_crossfade_duration")]
    pub crossfade_duration: f64,

    /// Output width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Output height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Rendered frames per second
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    /// Fraction of the frame height reserved for captions
    #[serde(default = "default_subtitle_ratio")]
    pub subtitle_ratio: f64,

    /// Column at which captions are wrapped on screen
    #[serde(default = "default_characters_per_line")]
    pub characters_per_line: usize,

    /// Caption font family
    #[serde(default = "default_font")]
    pub font: String,

    /// Caption font size in points
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Caption text colour
    #[serde(default = "default_text_color")]
    pub text_color: String,

    /// Colour of the caption band behind the text
    #[serde(default = "default_background_color")]
    pub background_color: String,

    /// Video codec for the encoded output
    #[serde(default = "default_codec")]
    pub codec: String,

    /// Audio codec for the encoded output
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Write numbered PNG frames instead of encoding a video file
    #[serde(default)]
    pub generate_frames: bool,

    /// Directory, next to the script, holding the image files
    #[serde(default = "default_image_directory")]
    pub image_directory: String,

    /// Background track looked up next to the script; `null` disables it
    #[serde(default = "default_background_audio")]
    pub background_audio: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            crossfade_duration: default_crossfade_duration(),
            width: default_width(),
            height: default_height(),
            frame_rate: default_frame_rate(),
            subtitle_ratio: default_subtitle_ratio(),
            characters_per_line: default_characters_per_line(),
            font: default_font(),
            font_size: default_font_size(),
            text_color: default_text_color(),
            background_color: default_background_color(),
            codec: default_codec(),
            audio_codec: default_audio_codec(),
            generate_frames: false,
            image_directory: default_image_directory(),
            background_audio: default_background_audio(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching log filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_max_characters() -> usize {
    300
}

fn default_target_segment_duration() -> f64 {
    15.0
}

fn default_words_per_minute() -> u32 {
    183
}

fn default_crossfade_duration() -> f64 {
    1.0
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

fn default_frame_rate() -> u32 {
    4
}

fn default_subtitle_ratio() -> f64 {
    0.3
}

fn default_characters_per_line() -> usize {
    75
}

fn default_font() -> String {
    "Arial".to_string()
}

fn default_font_size() -> u32 {
    32
}

fn default_text_color() -> String {
    "white".to_string()
}

fn default_background_color() -> String {
    "rgb(185,128,71)".to_string()
}

fn default_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_image_directory() -> String {
    "images".to_string()
}

fn default_background_audio() -> Option<String> {
    Some("audio.mp3".to_string())
}

impl Config {
    /// Load configuration from a JSON file, creating it with defaults when missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Save configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let seg = &self.segmentation;
        if seg.max_characters == 0 {
            return Err(anyhow!("max_characters must be greater than zero"));
        }
        if !(seg.target_segment_duration.is_finite() && seg.target_segment_duration > 0.0) {
            return Err(anyhow!(
                "target_segment_duration must be a positive number of seconds, got {}",
                seg.target_segment_duration
            ));
        }
        if seg.words_per_minute == 0 {
            return Err(anyhow!("words_per_minute must be greater than zero"));
        }

        let render = &self.render;
        if !(render.crossfade_duration.is_finite() && render.crossfade_duration >= 0.0) {
            return Err(anyhow!(
                "crossfade_duration must be zero or more seconds, got {}",
                render.crossfade_duration
            ));
        }
        if render.width == 0 || render.height == 0 {
            return Err(anyhow!("Render dimensions must be non-zero, got {}x{}", render.width, render.height));
        }
        if render.frame_rate == 0 {
            return Err(anyhow!("frame_rate must be greater than zero"));
        }
        if !(render.subtitle_ratio > 0.0 && render.subtitle_ratio < 1.0) {
            return Err(anyhow!("subtitle_ratio must be between 0 and 1, got {}", render.subtitle_ratio));
        }
        if render.characters_per_line == 0 {
            return Err(anyhow!("characters_per_line must be greater than zero"));
        }
        if render.font_size == 0 {
            return Err(anyhow!("font_size must be greater than zero"));
        }
        if render.font.trim().is_empty() {
            return Err(anyhow!("font must not be empty"));
        }
        if !render.generate_frames && render.codec.trim().is_empty() {
            return Err(anyhow!("codec must be set unless frames are generated"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            segmentation: SegmentationConfig::default(),
            render: RenderConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
