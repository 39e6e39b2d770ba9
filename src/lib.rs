/*!
 * # storyreel - story to narrated slideshow timelines
 *
 * A Rust library that turns a long-form narrative into timed scenes for a
 * narrated, illustrated video.
 *
 * ## Features
 *
 * - Split a story into caption lines without breaking sentences
 * - Time each caption from its voice clip or from a speaking-rate estimate
 * - Group captions into image segments whose length is as close as possible
 *   to a target duration (exact dynamic-programming partition)
 * - Lay out crossfading image layers and a gapless subtitle/audio track
 * - Export a JSON render plan and SRT subtitles for the compositor
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `tokenizer`: Sentence tokenization seam and the built-in rule tokenizer
 * - `segmenter`: Caption splitting
 * - `duration`: Duration estimation and provenance
 * - `partition`: Optimal image segmentation and marker assignment
 * - `script`: The `[image][duration] text` record format
 * - `audio`: Voice clip durations
 * - `timeline`: Image and subtitle track layout
 * - `file_utils`: File system operations
 * - `app_controller`: Stage orchestration over files
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod tokenizer;
pub mod segmenter;
pub mod duration;
pub mod partition;
pub mod script;
pub mod audio;
pub mod timeline;
pub mod file_utils;
pub mod app_controller;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, StageOutcome};
pub use audio::{AudioClip, AudioSource, NoAudio, WavDirectory};
pub use duration::DurationSource;
pub use errors::{AppError, SegmentationError};
pub use partition::{partition, partition_with, AbsoluteDeviation, SegmentCost};
pub use script::AnnotatedLine;
pub use segmenter::split_captions;
pub use timeline::{build_timeline, BackgroundAudio, RenderPlan, SubtitleEntry, Timeline, TimelineEntry};
pub use tokenizer::{RuleTokenizer, SentenceTokenizer};
