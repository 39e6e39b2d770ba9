/*!
 * Tests for audio clip loading
 */

use anyhow::Result;
use storyreel::audio::{wav_duration_seconds, AudioClip, AudioSource, NoAudio, WavDirectory};
use crate::common::{self, assert_close};

#[test]
fn test_wav_duration_seconds_withKnownLength_shouldMeasure() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_wav(temp_dir.path(), "clip.wav", 1.5, 8000)?;
    assert_close(wav_duration_seconds(&path)?, 1.5);
    Ok(())
}

#[test]
fn test_wav_duration_seconds_withGarbageFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "clip.wav", "not a wav file")?;
    assert!(wav_duration_seconds(&path).is_err());
    Ok(())
}

#[test]
fn test_wav_directory_withSparseClips_shouldReturnNoneForGaps() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_wav(temp_dir.path(), "0.wav", 0.5, 8000)?;
    common::create_test_wav(temp_dir.path(), "2.wav", 2.0, 8000)?;

    let source = WavDirectory::new(temp_dir.path());
    let clips = source.clips(4)?;

    assert_eq!(clips.len(), 4);
    assert_close(clips[0].as_ref().map(|c| c.duration).unwrap_or_default(), 0.5);
    assert!(clips[1].is_none());
    assert_close(clips[2].as_ref().map(|c| c.duration).unwrap_or_default(), 2.0);
    assert!(clips[3].is_none());
    assert_eq!(clips[2].as_ref().and_then(|c| c.path.clone()), Some(source.clip_path(2)));
    Ok(())
}

#[test]
fn test_wav_directory_withEmptyClip_shouldTreatItAsMissing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_wav(temp_dir.path(), "0.wav", 0.0, 8000)?;
    assert_eq!(wav_duration_seconds(&path)?, 0.0);

    let source = WavDirectory::new(temp_dir.path());
    assert_eq!(source.clip_for(0)?, None);
    Ok(())
}

#[test]
fn test_audio_clip_isUsable_shouldRequirePositiveLength() {
    assert!(AudioClip::new(0.25).is_usable());
    assert!(!AudioClip::new(0.0).is_usable());
    assert!(!AudioClip::new(f64::INFINITY).is_usable());
}

#[test]
fn test_wav_directory_withMissingDirectory_shouldHaveNoClips() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = WavDirectory::new(temp_dir.path().join("does-not-exist"));
    assert!(source.clips(3)?.iter().all(Option::is_none));
    Ok(())
}

#[test]
fn test_in_memory_sources_shouldServeByIndex() -> Result<()> {
    let clips = vec![None, Some(AudioClip::new(3.0))];
    assert_eq!(clips.clip_for(1)?, Some(AudioClip::new(3.0)));
    assert_eq!(clips.clip_for(5)?, None);
    assert_eq!(NoAudio.clip_for(0)?, None);
    Ok(())
}
