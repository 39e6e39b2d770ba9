/*!
 * Tests for image and subtitle timeline layout
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use storyreel::app_config::Config;
use storyreel::audio::AudioClip;
use storyreel::duration::DurationSource;
use storyreel::errors::SegmentationError;
use storyreel::script::{parse_script, AnnotatedLine};
use storyreel::timeline::{build_timeline, image_file_name, wrap_caption, RenderPlan, Timeline};
use crate::common::assert_close;

fn random_script(rng: &mut StdRng, n: usize) -> Vec<AnnotatedLine> {
    let mut image = 0;
    (0..n)
        .map(|i| {
            let line = AnnotatedLine::new(format!("line {}", i))
                .with_duration(DurationSource::Annotated(rng.random_range(0.5..6.0)));
            if i == 0 || rng.random_bool(0.3) {
                image += 1;
                line.with_image(format!("{}.png", image - 1))
            } else {
                line
            }
        })
        .collect()
}

fn assert_tracks_consistent(timeline: &Timeline) {
    // Subtitles are gapless and sum to the total
    let mut expected_start = 0.0;
    for entry in &timeline.subtitles {
        assert_close(entry.start_time, expected_start);
        expected_start += entry.duration;
    }
    assert_close(expected_start, timeline.total_duration);

    // Images start at zero, hand over exactly at the next start, end at the total
    let images = &timeline.images;
    assert_close(images[0].start_time, 0.0);
    for pair in images.windows(2) {
        assert_close(pair[0].start_time + pair[0].visible_duration, pair[1].start_time);
        assert!(pair[1].crossfade_in);
        assert_close(pair[0].end_time() - pair[1].start_time, pair[0].fade_duration);
    }
    let last = images.last().unwrap();
    assert_close(last.start_time + last.visible_duration, timeline.total_duration);
    let visible: f64 = images.iter().map(|i| i.visible_duration).sum();
    assert_close(visible, timeline.total_duration);
}

#[test]
fn test_build_timeline_withWorkedExample_shouldMatchLayout() {
    let mut lines = parse_script("[0.png] A\n\nB\n\n[1.png] C\n");
    for (line, seconds) in lines.iter_mut().zip([2.0, 3.0, 2.0]) {
        line.duration = Some(DurationSource::Annotated(seconds));
    }
    let timeline = build_timeline(&lines, &[], &Config::default()).unwrap();

    assert_eq!(timeline.images[0].image_id, "0.png");
    assert_eq!(timeline.images[0].start_time, 0.0);
    assert_eq!(timeline.images[0].visible_duration, 5.0);
    assert_eq!(timeline.images[0].rendered_duration(), 6.0);
    assert_eq!(timeline.images[1].image_id, "1.png");
    assert_eq!(timeline.images[1].start_time, 5.0);
    assert_eq!(timeline.images[1].visible_duration, 2.0);
    assert!(timeline.images[1].crossfade_in);
    assert_eq!(timeline.total_duration, 7.0);

    let starts: Vec<f64> = timeline.subtitles.iter().map(|s| s.start_time).collect();
    assert_eq!(starts, vec![0.0, 2.0, 5.0]);
}

#[test]
fn test_build_timeline_withRandomScripts_shouldCoverProgramWithoutGaps() {
    let mut rng = StdRng::seed_from_u64(7);
    let config = Config::default();

    for _ in 0..100 {
        let n = rng.random_range(1..40);
        let lines = random_script(&mut rng, n);
        let timeline = build_timeline(&lines, &[], &config).unwrap();
        assert_tracks_consistent(&timeline);

        // Every instant inside the program shows at least one image and one caption
        for step in 0..50 {
            let t = timeline.total_duration * step as f64 / 50.0;
            assert!(!timeline.images_at(t).is_empty(), "no image at {}", t);
            assert!(timeline.subtitle_at(t).is_some(), "no caption at {}", t);
        }
    }
}

#[test]
fn test_build_timeline_withZeroCrossfade_shouldHardCut() {
    let mut config = Config::default();
    config.render.crossfade_duration = 0.0;
    let lines = vec![
        AnnotatedLine::new("A".to_string()).with_image("0.png").with_duration(DurationSource::Annotated(1.0)),
        AnnotatedLine::new("B".to_string()).with_image("1.png").with_duration(DurationSource::Annotated(1.0)),
    ];
    let timeline = build_timeline(&lines, &[], &config).unwrap();

    assert_eq!(timeline.images_at(1.0).len(), 1);
    assert_eq!(timeline.images_at(1.0)[0].image_id, "1.png");
}

#[test]
fn test_build_timeline_withNegativeCrossfade_shouldRejectConfig() {
    let mut config = Config::default();
    config.render.crossfade_duration = -1.0;
    let lines = parse_script("[0.png] Hello");
    assert!(matches!(
        build_timeline(&lines, &[], &config),
        Err(SegmentationError::InvalidConfig(_))
    ));
}

#[test]
fn test_build_timeline_withAudio_shouldAttachClipsAndOverrideEstimates() {
    let lines = parse_script("[0.png] one two three\n\nfour five\n");
    let clips = vec![None, Some(AudioClip::new(0.75))];
    let timeline = build_timeline(&lines, &clips, &Config::default()).unwrap();

    assert!(matches!(timeline.subtitles[0].source, DurationSource::Estimated(_)));
    assert!(timeline.subtitles[0].audio.is_none());
    assert_eq!(timeline.subtitles[1].source, DurationSource::Authoritative(0.75));
    assert_eq!(timeline.subtitles[1].audio, Some(AudioClip::new(0.75)));
    // No duration tags, so nothing diverged
    assert!(timeline.divergences.is_empty());
    assert_tracks_consistent(&timeline);
}

#[test]
fn test_build_timeline_withMarkerlessOpening_shouldFail() {
    let lines = parse_script("Opening line\n\n[0.png] Second\n");
    assert_eq!(
        build_timeline(&lines, &[], &Config::default()).unwrap_err(),
        SegmentationError::MissingImageMarker { index: 0 }
    );
}

#[test]
fn test_to_srt_shouldNumberAndWrapCaptions() {
    let lines = vec![
        AnnotatedLine::new("The keeper climbed the long stairs".to_string())
            .with_image("0.png")
            .with_duration(DurationSource::Annotated(1.5)),
        AnnotatedLine::new("Light".to_string()).with_duration(DurationSource::Annotated(2.25)),
    ];
    let timeline = build_timeline(&lines, &[], &Config::default()).unwrap();
    let srt = timeline.to_srt(20);

    let expected = "1\n00:00:00,000 --> 00:00:01,500\nThe keeper climbed\nthe long stairs\n\n\
                    2\n00:00:01,500 --> 00:00:03,750\nLight\n\n";
    assert_eq!(srt, expected);
}

#[test]
fn test_render_plan_shouldRoundTripThroughJson() {
    let lines = parse_script("[0.png][1.0] A\n\n[2.0] B\n");
    let timeline = build_timeline(&lines, &[], &Config::default()).unwrap();
    let plan = RenderPlan::new(Config::default().render, timeline);

    let json = plan.to_json().unwrap();
    assert!(json.contains("\"image_id\": \"0.png\""));
    let restored: RenderPlan = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, plan);
}

#[test]
fn test_wrap_caption_withShortText_shouldNotWrap() {
    assert_eq!(wrap_caption("short caption", 75), "short caption");
}

#[test]
fn test_build_timeline_withEmptyVoiceClip_shouldEstimateInstead() {
    let lines = parse_script("[0.png] one two three\n");
    let timeline = build_timeline(&lines, &[Some(AudioClip::new(0.0))], &Config::default()).unwrap();

    assert!(matches!(timeline.subtitles[0].source, DurationSource::Estimated(_)));
    assert!(timeline.subtitles[0].duration > 0.0);
    assert!(timeline.images[0].visible_duration > 0.0);
    assert!(timeline.subtitles[0].audio.is_none());
}

#[test]
fn test_build_timeline_withMarkerWithoutExtension_shouldResolvePngFile() {
    let lines = parse_script("[cover][1.0] A\n\n[1.png][1.0] B\n");
    let timeline = build_timeline(&lines, &[], &Config::default()).unwrap();

    assert_eq!(timeline.images[0].image_id, "cover");
    assert_eq!(timeline.images[0].image_file, "cover.png");
    assert_eq!(timeline.images[1].image_file, "1.png");
    assert_eq!(image_file_name("cover"), "cover.png");
}

#[test]
fn test_render_plan_withBackgroundAudio_shouldTruncateToProgram() {
    let lines = parse_script("[0.png][1.25] A\n\n[2.5] B\n");
    let timeline = build_timeline(&lines, &[], &Config::default()).unwrap();
    let plan = RenderPlan::new(Config::default().render, timeline).with_background_audio("story/audio.mp3");

    let background = plan.background_audio.as_ref().unwrap();
    assert_eq!(background.path, std::path::PathBuf::from("story/audio.mp3"));
    assert_close(background.duration, 3.75);
    assert!(plan.to_json().unwrap().contains("\"background_audio\""));
}

#[test]
fn test_build_timeline_withZeroRateAndUntimedLine_shouldRejectConfig() {
    let mut config = Config::default();
    config.segmentation.words_per_minute = 0;
    let lines = parse_script("[0.png] untimed words\n");
    assert!(matches!(
        build_timeline(&lines, &[], &config),
        Err(SegmentationError::InvalidConfig(_))
    ));
}
