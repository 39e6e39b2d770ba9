/*!
 * Segment partitioning.
 *
 * Groups the ordered caption durations into contiguous segments, one image per
 * segment, so that the summed deviation of each segment from the target
 * duration is minimal. Solved exactly by dynamic programming over prefix sums
 * in O(n²), which is fine for the few hundred captions of one story.
 */

use log::debug;

use crate::errors::SegmentationError;
use crate::script::AnnotatedLine;

/// Penalty for one segment given its duration and the target
pub trait SegmentCost {
    fn cost(&self, segment_duration: f64, target: f64) -> f64;
}

/// `|segment_duration - target|`
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteDeviation;

impl SegmentCost for AbsoluteDeviation {
    fn cost(&self, segment_duration: f64, target: f64) -> f64 {
        (segment_duration - target).abs()
    }
}

impl<F> SegmentCost for F
where
    F: Fn(f64, f64) -> f64,
{
    fn cost(&self, segment_duration: f64, target: f64) -> f64 {
        self(segment_duration, target)
    }
}

/// Optimal segment start indices using absolute deviation from `target`
pub fn partition(durations: &[f64], target: f64) -> Result<Vec<usize>, SegmentationError> {
    partition_with(durations, target, &AbsoluteDeviation)
}

/// Optimal segment start indices under a custom cost
///
/// The first index is always 0 for non-empty input. On equal cost the earliest
/// split point found by the ascending scan wins, so output is deterministic.
pub fn partition_with<C: SegmentCost + ?Sized>(
    durations: &[f64],
    target: f64,
    cost: &C,
) -> Result<Vec<usize>, SegmentationError> {
    if !(target.is_finite() && target > 0.0) {
        return Err(SegmentationError::InvalidConfig(format!(
            "target segment duration must be positive, got {}",
            target
        )));
    }
    if let Some(index) = durations.iter().position(|d| !(d.is_finite() && *d > 0.0)) {
        return Err(SegmentationError::InvalidConfig(format!(
            "duration of line {} must be a positive number of seconds, got {}",
            index, durations[index]
        )));
    }

    let n = durations.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut prefix = vec![0.0; n + 1];
    for (i, d) in durations.iter().enumerate() {
        prefix[i + 1] = prefix[i] + d;
    }

    // best[i]: minimal cost of covering durations[..i]; split[i]: start of its last segment
    let mut best = vec![f64::INFINITY; n + 1];
    let mut split = vec![0usize; n + 1];
    best[0] = 0.0;

    for i in 1..=n {
        for j in 0..i {
            let candidate = best[j] + cost.cost(prefix[i] - prefix[j], target);
            if candidate < best[i] {
                best[i] = candidate;
                split[i] = j;
            }
        }
    }

    let mut starts = Vec::new();
    let mut i = n;
    while i > 0 {
        let j = split[i];
        starts.push(j);
        i = j;
    }
    starts.reverse();

    debug!(
        "Partitioned {} line(s) into {} segment(s), total cost {:.3}",
        n,
        starts.len(),
        best[n]
    );

    Ok(starts)
}

/// Summed duration of every segment described by `starts`
pub fn segment_durations(durations: &[f64], starts: &[usize]) -> Vec<f64> {
    starts
        .iter()
        .enumerate()
        .map(|(k, &start)| {
            let end = starts.get(k + 1).copied().unwrap_or(durations.len());
            durations[start..end].iter().sum()
        })
        .collect()
}

/// Total absolute deviation of a partition from `target`
pub fn total_deviation(durations: &[f64], starts: &[usize], target: f64) -> f64 {
    segment_durations(durations, starts)
        .into_iter()
        .map(|d| AbsoluteDeviation.cost(d, target))
        .sum()
}

/// Name of the `k`-th generated image
pub fn image_name(k: usize) -> String {
    format!("{}.png", k)
}

/// Tag segment-start lines with sequential image names and clear all others
///
/// Returns the number of images assigned.
pub fn assign_image_markers(lines: &mut [AnnotatedLine], starts: &[usize]) -> usize {
    let mut next_image = 0;
    let mut starts = starts.iter().peekable();
    for (index, line) in lines.iter_mut().enumerate() {
        while starts.next_if(|&&s| s < index).is_some() {}
        if starts.next_if(|&&s| s == index).is_some() {
            line.image_marker = Some(image_name(next_image));
            next_image += 1;
        } else {
            line.image_marker = None;
        }
    }
    next_image
}
