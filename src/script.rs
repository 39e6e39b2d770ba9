use std::fmt;

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::duration::{estimate_duration, DurationSource};
use crate::errors::SegmentationError;

// @module: Script line records

// @const: Bracketed tag regex
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]").unwrap());

/// Marker that ends a script early; it and everything after it are ignored
pub const END_DELIMITER: &str = "<end>";

// @struct: One caption line with its duration and optional image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedLine {
    // @field: Caption text, trimmed and non-empty
    pub text: String,

    // @field: Duration, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<DurationSource>,

    // @field: Image shown from this line on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_marker: Option<String>,
}

impl AnnotatedLine {
    /// Creates a plain line with no tags
    pub fn new(text: String) -> Self {
        Self {
            text,
            duration: None,
            image_marker: None,
        }
    }

    /// Builder-style duration setter
    pub fn with_duration(mut self, duration: DurationSource) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Builder-style image marker setter
    pub fn with_image(mut self, marker: impl Into<String>) -> Self {
        self.image_marker = Some(marker.into());
        self
    }

    /// Parse one record such as `[3.png][4.20] Caption text`
    ///
    /// Tags may appear in any order. A tag that parses as a number is a duration,
    /// anything else is an image marker. Numeric tags that are not positive and
    /// finite are dropped with a warning so the duration falls back to estimation.
    /// Returns `None` for a record with no caption text.
    pub fn parse(record: &str) -> Option<Self> {
        let mut duration = None;
        let mut image_marker = None;

        for capture in TAG_REGEX.captures_iter(record) {
            let tag = capture[1].trim();
            match parse_duration_tag(tag) {
                Ok(Some(seconds)) => duration = Some(DurationSource::Annotated(seconds)),
                Ok(None) => image_marker = Some(tag.to_string()),
                Err(e) => warn!("{}; estimating from text instead", e),
            }
        }

        let text = TAG_REGEX.replace_all(record, "").trim().to_string();
        if text.is_empty() {
            return None;
        }

        Some(Self {
            text,
            duration,
            image_marker,
        })
    }

    /// Duration to use for layout, estimating when no tag was present
    pub fn resolved_duration(&self, words_per_minute: u32) -> Result<DurationSource, SegmentationError> {
        match self.duration {
            Some(duration) => Ok(duration),
            None => Ok(DurationSource::Estimated(estimate_duration(&self.text, words_per_minute)?)),
        }
    }

    /// Whether this line starts a new image segment
    pub fn starts_segment(&self) -> bool {
        self.image_marker.is_some()
    }
}

impl fmt::Display for AnnotatedLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut tagged = false;
        if let Some(marker) = &self.image_marker {
            write!(f, "[{}]", marker)?;
            tagged = true;
        }
        if let Some(duration) = &self.duration {
            write!(f, "[{:.2}]", duration.seconds())?;
            tagged = true;
        }
        if tagged {
            write!(f, " ")?;
        }
        write!(f, "{}", self.text)
    }
}

/// Classify a tag: `Ok(Some(seconds))` for a duration, `Ok(None)` for an image name
fn parse_duration_tag(tag: &str) -> Result<Option<f64>, SegmentationError> {
    match tag.parse::<f64>() {
        Ok(seconds) if seconds.is_finite() && seconds > 0.0 => Ok(Some(seconds)),
        Ok(_) => Err(SegmentationError::InvalidDurationTag { tag: tag.to_string() }),
        Err(_) => Ok(None),
    }
}

/// Non-blank, trimmed lines of a record file
pub fn records(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Parse a whole script, stopping at the end delimiter
pub fn parse_script(text: &str) -> Vec<AnnotatedLine> {
    let mut lines = Vec::new();
    for record in records(text) {
        if record.contains(END_DELIMITER) {
            break;
        }
        if let Some(line) = AnnotatedLine::parse(record) {
            lines.push(line);
        }
    }
    lines
}

/// Render records separated by blank lines
pub fn format_records<T: fmt::Display>(items: &[T]) -> String {
    let mut output = String::new();
    for item in items {
        output.push_str(&item.to_string());
        output.push_str("\n\n");
    }
    output
}
