// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use storyreel::app_config::{Config, LogLevel};
use storyreel::audio::{AudioSource, NoAudio, WavDirectory};
use storyreel::file_utils::FileManager;
use storyreel::{Controller, StageOutcome};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split a story into caption lines
    Split {
        /// Story text file; paragraphs are separated by line breaks
        #[arg(value_name = "STORY")]
        story: PathBuf,

        /// Caption file to write (defaults to captions.txt next to the story)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Time captions and assign image markers
    Annotate {
        /// Caption file produced by `split`
        #[arg(value_name = "CAPTIONS")]
        captions: PathBuf,

        /// Directory holding <index>.wav voice clips
        #[arg(short, long)]
        audio_dir: Option<PathBuf>,

        /// Script file to write (defaults to script.txt next to the captions)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the image and subtitle timeline for a finished script
    Timeline {
        /// Script file with [image][duration] tags
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Directory holding <index>.wav voice clips
        #[arg(short, long)]
        audio_dir: Option<PathBuf>,

        /// Render plan to write (defaults to plan.json next to the script)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the subtitle track as SRT
        #[arg(long)]
        srt: Option<PathBuf>,
    },

    /// Generate shell completions for storyreel
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// storyreel - turn a story into a narrated slideshow timeline
///
/// Splits a story into captions, groups them into image segments of a target
/// length and lays out crossfading images with a gapless subtitle track.
#[derive(Parser, Debug)]
#[command(name = "storyreel")]
#[command(version)]
#[command(about = "Story to narrated slideshow timeline")]
#[command(long_about = "storyreel prepares a narrated, illustrated video from a story.

EXAMPLES:
    storyreel split story.txt                         # Write captions.txt
    storyreel annotate captions.txt -a audio/         # Write script.txt using voice clips
    storyreel --target-duration 10 annotate captions.txt
    storyreel timeline script.txt -a audio/ --srt subs.srt
    storyreel completions bash > storyreel.bash

CONFIGURATION:
    Configuration is stored in storyreel.json by default. If the file doesn't
    exist, a default one will be created automatically. Command line flags
    override the file for a single run.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Force overwrite of existing output files
    #[arg(short, long, global = true)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "storyreel.json", global = true)]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Maximum characters per caption
    #[arg(long, global = true)]
    max_characters: Option<usize>,

    /// Target seconds per image
    #[arg(long, global = true)]
    target_duration: Option<f64>,

    /// Speaking rate used when a line has no voice clip
    #[arg(long, global = true)]
    wpm: Option<u32>,

    /// Crossfade between images in seconds
    #[arg(long, global = true)]
    crossfade: Option<f64>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() {
    // Initialize the logger once with info level by default
    // The level is updated after loading the config
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();
    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: CommandLineOptions) -> Result<()> {
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "storyreel", &mut std::io::stdout());
        return Ok(());
    }

    // If log level is set via command line, apply it immediately
    if let Some(level) = &cli.log_level {
        let level: LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = load_config(&cli)?;
    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?;
    let force = cli.force_overwrite;

    let outcome = match &cli.command {
        Commands::Split { story, output } => {
            let output = output.clone().unwrap_or_else(|| FileManager::sibling_path(story, "captions.txt"));
            controller.run_split(story, &output, force)?
        }
        Commands::Annotate { captions, audio_dir, output } => {
            let output = output.clone().unwrap_or_else(|| FileManager::sibling_path(captions, "script.txt"));
            let audio = audio_source(audio_dir.as_deref());
            controller.run_annotate(captions, audio.as_ref(), &output, force)?
        }
        Commands::Timeline { script, audio_dir, output, srt } => {
            let output = output.clone().unwrap_or_else(|| FileManager::sibling_path(script, "plan.json"));
            let audio = audio_source(audio_dir.as_deref());
            controller.run_timeline(script, audio.as_ref(), &output, srt.as_deref(), force)?
        }
        Commands::Completions { .. } => return Ok(()),
    };

    match outcome {
        StageOutcome::Written(path) => info!("Success: {:?}", path),
        StageOutcome::Skipped(path) => info!("Skipped, output exists: {:?}", path),
    }

    Ok(())
}

/// Load or create the configuration file, then apply command line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&cli.config_path)?;

    if let Some(max_characters) = cli.max_characters {
        config.segmentation.max_characters = max_characters;
    }
    if let Some(target) = cli.target_duration {
        config.segmentation.target_segment_duration = target;
    }
    if let Some(wpm) = cli.wpm {
        config.segmentation.words_per_minute = wpm;
    }
    if let Some(crossfade) = cli.crossfade {
        config.render.crossfade_duration = crossfade;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

fn audio_source(audio_dir: Option<&Path>) -> Box<dyn AudioSource> {
    match audio_dir {
        Some(dir) => Box::new(WavDirectory::new(dir)),
        None => Box::new(NoAudio),
    }
}
