/*!
 * Common test utilities for the storyreel test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Routes library log output through the test harness
pub fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Writes a silent mono 16-bit WAV of the given length
pub fn create_test_wav(dir: &Path, filename: &str, seconds: f64, sample_rate: u32) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&file_path, spec)?;
    let frames = (seconds * sample_rate as f64).round() as u64;
    for _ in 0..frames {
        writer.write_sample(0i16)?;
    }
    writer.finalize()?;
    Ok(file_path)
}

/// A short story with three paragraphs
pub fn sample_story() -> &'static str {
    "The lighthouse keeper woke before dawn. He climbed the stairs. The lamp was cold.\n\n\
     Out on the water a small boat drifted toward the rocks. Nobody aboard was awake. \
     The keeper struck a match.\n\n\
     Light swept across the bay.\n"
}

/// Asserts two floats are equal within a small tolerance
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {} but got {}",
        expected,
        actual
    );
}
