/*!
 * Tests for duration estimation
 */

use storyreel::app_config::SegmentationConfig;
use storyreel::audio::AudioClip;
use storyreel::errors::SegmentationError;
use storyreel::duration::{count_words, estimate_duration, resolve_duration, resolve_durations, DurationSource};
use crate::common::assert_close;

#[test]
fn test_estimate_duration_withDefaultRate_shouldMatchFormula() {
    // 6 words at 183 wpm
    let duration = estimate_duration("The keeper struck a match quickly.", 183).unwrap();
    assert_close(duration, 6.0 / 183.0 * 60.0);
}

#[test]
fn test_estimate_duration_withNonEmptyText_shouldBePositive() {
    for text in ["a", "!", "42", "Ünïcödé wörds"] {
        assert!(estimate_duration(text, 183).unwrap() > 0.0, "{:?}", text);
    }
}

#[test]
fn test_count_words_withUnderscoresAndDigits_shouldTreatAsWordCharacters() {
    assert_eq!(count_words("snake_case and v2 rocks"), 4);
    assert_eq!(count_words("well-known"), 2);
}

#[test]
fn test_resolve_duration_withClip_shouldBeAuthoritative() {
    let clip = AudioClip::new(4.25);
    let source = resolve_duration("many words in this line here", Some(&clip), 183).unwrap();
    assert_eq!(source, DurationSource::Authoritative(4.25));
    assert!(source.is_authoritative());
    assert_eq!(source.seconds(), 4.25);
}

#[test]
fn test_resolve_durations_withShortClipList_shouldEstimateTheRest() {
    let config = SegmentationConfig {
        words_per_minute: 120,
        ..SegmentationConfig::default()
    };
    let lines = vec!["one two".to_string(), "three four five six".to_string()];
    let durations = resolve_durations(&lines, &[Some(AudioClip::new(9.0))], &config).unwrap();

    assert_eq!(durations, vec![DurationSource::Authoritative(9.0), DurationSource::Estimated(2.0)]);
}

#[test]
fn test_durationSource_serialization_shouldKeepTag() {
    let json = serde_json::to_string(&DurationSource::Estimated(1.5)).unwrap();
    assert_eq!(json, r#"{"source":"estimated","seconds":1.5}"#);
}

#[test]
fn test_resolve_duration_withEmptyClip_shouldFallBackToEstimate() {
    let clip = AudioClip::new(0.0);
    let source = resolve_duration("one two", Some(&clip), 60).unwrap();
    assert_eq!(source, DurationSource::Estimated(2.0));
}

#[test]
fn test_resolve_durations_withZeroRate_shouldFail() {
    let config = SegmentationConfig {
        words_per_minute: 0,
        ..SegmentationConfig::default()
    };
    let lines = ["unvoiced line"];
    assert!(matches!(
        resolve_durations(&lines, &[], &config),
        Err(SegmentationError::InvalidConfig(_))
    ));
}
