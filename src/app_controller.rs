use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::audio::{AudioClip, AudioSource};
use crate::duration::resolve_durations;
use crate::file_utils::FileManager;
use crate::partition::{assign_image_markers, partition};
use crate::script::{self, AnnotatedLine};
use crate::segmenter::split_captions;
use crate::timeline::{build_timeline, RenderPlan, Timeline};
use crate::tokenizer::{RuleTokenizer, SentenceTokenizer};

// @module: Application controller for the story-to-video stages

/// Result of running one stage against the filesystem
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// The stage produced this file
    Written(PathBuf),
    /// The output already existed and overwriting was not requested
    Skipped(PathBuf),
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Sentence splitter used by the caption stage
    tokenizer: Box<dyn SentenceTokenizer>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self {
            config,
            tokenizer: Box::new(RuleTokenizer::new()),
        })
    }

    /// Replace the built-in sentence tokenizer
    pub fn with_tokenizer(mut self, tokenizer: Box<dyn SentenceTokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Split a story into caption lines
    pub fn caption_lines(&self, story: &str) -> Result<Vec<String>> {
        let captions = split_captions(
            story,
            self.config.segmentation.max_characters,
            self.tokenizer.as_ref(),
        )?;
        Ok(captions)
    }

    /// Give caption lines image markers, and durations where a voice clip measured them
    ///
    /// Estimated durations drive the partition but are not stored on the line, so
    /// the timeline stage re-estimates them at its own speaking rate.
    pub fn annotate_lines(&self, captions: &[String], clips: &[Option<AudioClip>]) -> Result<Vec<AnnotatedLine>> {
        let segmentation = &self.config.segmentation;
        let sources = resolve_durations(captions, clips, segmentation)?;
        let durations: Vec<f64> = sources.iter().map(|s| s.seconds()).collect();
        let starts = partition(&durations, segmentation.target_segment_duration)?;

        let mut lines: Vec<AnnotatedLine> = captions
            .iter()
            .zip(sources)
            .map(|(text, source)| {
                let line = AnnotatedLine::new(text.clone());
                if source.is_authoritative() {
                    line.with_duration(source)
                } else {
                    line
                }
            })
            .collect();
        let images = assign_image_markers(&mut lines, &starts);
        debug!("Assigned {} image marker(s) to {} line(s)", images, lines.len());

        Ok(lines)
    }

    /// Lay out the final script
    pub fn timeline(&self, lines: &[AnnotatedLine], clips: &[Option<AudioClip>]) -> Result<Timeline> {
        let timeline = build_timeline(lines, clips, &self.config)?;
        Ok(timeline)
    }

    /// Caption stage over files
    pub fn run_split(&self, story_path: &Path, output_path: &Path, force_overwrite: bool) -> Result<StageOutcome> {
        if let Some(skipped) = Self::skip_existing(output_path, force_overwrite) {
            return Ok(skipped);
        }

        let story = FileManager::read_to_string(story_path)?;
        let captions = self.caption_lines(&story)
            .with_context(|| format!("Failed to split story: {}", story_path.display()))?;
        if captions.is_empty() {
            warn!("Story {:?} contains no text", story_path);
        }

        FileManager::write_to_file(output_path, &script::format_records(&captions))?;
        info!("Wrote {} caption(s) to {:?}", captions.len(), output_path);
        Ok(StageOutcome::Written(output_path.to_path_buf()))
    }

    /// Annotation stage over files
    pub fn run_annotate(
        &self,
        captions_path: &Path,
        audio: &dyn AudioSource,
        output_path: &Path,
        force_overwrite: bool,
    ) -> Result<StageOutcome> {
        if let Some(skipped) = Self::skip_existing(output_path, force_overwrite) {
            return Ok(skipped);
        }

        let content = FileManager::read_to_string(captions_path)?;
        let captions: Vec<String> = script::records(&content).map(str::to_string).collect();
        let clips = Self::load_clips(audio, captions.len())?;
        let lines = self.annotate_lines(&captions, &clips)?;

        FileManager::write_to_file(output_path, &script::format_records(&lines))?;
        info!(
            "Wrote script with {} line(s) and {} image(s) to {:?}",
            lines.len(),
            lines.iter().filter(|l| l.starts_segment()).count(),
            output_path
        );
        Ok(StageOutcome::Written(output_path.to_path_buf()))
    }

    /// Timeline stage over files; writes the JSON render plan and optionally an SRT track
    pub fn run_timeline(
        &self,
        script_path: &Path,
        audio: &dyn AudioSource,
        plan_path: &Path,
        srt_path: Option<&Path>,
        force_overwrite: bool,
    ) -> Result<StageOutcome> {
        if let Some(skipped) = Self::skip_existing(plan_path, force_overwrite) {
            return Ok(skipped);
        }

        let content = FileManager::read_to_string(script_path)?;
        let lines = script::parse_script(&content);
        let clips = Self::load_clips(audio, lines.len())?;
        let timeline = self.timeline(&lines, &clips)
            .with_context(|| format!("Failed to build timeline for {}", script_path.display()))?;

        if let Some(srt_path) = srt_path {
            let srt = timeline.to_srt(self.config.render.characters_per_line);
            FileManager::write_to_file(srt_path, &srt)?;
            info!("Wrote subtitles to {:?}", srt_path);
        }

        let total = timeline.total_duration;
        let mut plan = RenderPlan::new(self.config.render.clone(), timeline);
        if let Some(background) = self.background_audio_path(script_path) {
            info!("Mixing background audio {:?}", background);
            plan = plan.with_background_audio(background);
        }
        let json = plan.to_json().context("Failed to serialize render plan")?;
        FileManager::write_to_file(plan_path, &json)?;
        info!("Wrote render plan ({:.1}s) to {:?}", total, plan_path);

        Ok(StageOutcome::Written(plan_path.to_path_buf()))
    }

    /// Background track configured for the story the script belongs to, if present
    fn background_audio_path(&self, script_path: &Path) -> Option<PathBuf> {
        let name = self.config.render.background_audio.as_deref()?;
        let path = FileManager::sibling_path(script_path, name);
        if FileManager::file_exists(&path) {
            Some(path)
        } else {
            debug!("No background audio at {:?}", path);
            None
        }
    }

    fn skip_existing(output_path: &Path, force_overwrite: bool) -> Option<StageOutcome> {
        if FileManager::file_exists(output_path) && !force_overwrite {
            warn!("Output file already exists: {:?}. Use -f to force overwrite.", output_path);
            return Some(StageOutcome::Skipped(output_path.to_path_buf()));
        }
        None
    }

    fn load_clips(audio: &dyn AudioSource, count: usize) -> Result<Vec<Option<AudioClip>>> {
        let progress = if count == 0 { ProgressBar::hidden() } else { ProgressBar::new(count as u64) };
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} audio clips {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("█▓▒░"),
        );

        let mut clips = Vec::with_capacity(count);
        for index in 0..count {
            clips.push(audio.clip_for(index)?);
            progress.inc(1);
        }
        progress.finish_and_clear();

        let found = clips.iter().filter(|c| c.is_some()).count();
        debug!("Found audio for {}/{} line(s)", found, count);
        Ok(clips)
    }
}
