//! Cross-resolution synthesis.
//!
//! Derives samples at one resolution from a complete range of another
//! resolution's store:
//! - downsampling (finer to coarser) averages the present values of each
//!   coarse slot's fine slots
//! - upsampling (coarser to finer) repeats each coarse value across the
//!   fine slots it contains
//!
//! An incomplete source range yields `Ok(None)` so callers can try the next
//! store.

use chart_core::error::CacheError;
use chart_core::types::{Resolution, Sample};

use crate::store::ResolutionStore;

/// Mean of the present samples in `chunk`, or absence if there are none.
pub fn mean_present(chunk: &[Sample]) -> Sample {
    let (sum, count) = chunk
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Collapse every `ratio` consecutive samples into their mean.
pub fn aggregate(samples: &[Sample], ratio: usize) -> Vec<Sample> {
    samples.chunks(ratio).map(mean_present).collect()
}

/// Repeat every sample `ratio` times.
pub fn replicate(samples: &[Sample], ratio: usize) -> Vec<Sample> {
    samples
        .iter()
        .flat_map(|s| std::iter::repeat(*s).take(ratio))
        .collect()
}

fn check_target_range(start: i64, end: i64, target: Resolution) -> Result<(), CacheError> {
    if start > end {
        return Err(CacheError::InvalidRange {
            start,
            end,
            resolution: target,
            expected: 0,
            actual: 0,
        });
    }
    if !target.is_aligned(start) || !target.is_aligned(end) {
        return Err(CacheError::MisalignedRange {
            start,
            end,
            granularity: target,
        });
    }
    Ok(())
}

/// Build `target` samples for `[start, end)` from a finer `source` store.
pub fn downsample(
    source: &ResolutionStore,
    start: i64,
    end: i64,
    target: Resolution,
) -> Result<Option<Vec<Sample>>, CacheError> {
    let ratio = target
        .ratio(source.resolution())
        .ok_or(CacheError::InvalidConversion {
            from: source.resolution(),
            to: target,
        })?;
    check_target_range(start, end, target)?;

    // A target-aligned range is always aligned to the finer source.
    Ok(source
        .read(start, end)?
        .map(|fine| aggregate(&fine, ratio)))
}

/// Build `target` samples for `[start, end)` from a coarser `source` store.
///
/// The source is read over the smallest range of whole source slots that
/// contains `[start, end)`, and the result is cut back to the request.
pub fn upsample(
    source: &ResolutionStore,
    start: i64,
    end: i64,
    target: Resolution,
) -> Result<Option<Vec<Sample>>, CacheError> {
    let coarse = source.resolution();
    let ratio = coarse.ratio(target).ok_or(CacheError::InvalidConversion {
        from: coarse,
        to: target,
    })?;
    check_target_range(start, end, target)?;

    let source_start = coarse.align_down(start);
    let source_end = coarse.align_up(end);
    let Some(values) = source.read(source_start, source_end)? else {
        return Ok(None);
    };

    let offset = target.slot_count(source_start, start);
    let len = target.slot_count(start, end);
    let fine = replicate(&values, ratio);
    Ok(Some(fine[offset..offset + len].to_vec()))
}

/// Build `target` samples from any store, choosing the conversion direction.
pub fn synthesize(
    source: &ResolutionStore,
    start: i64,
    end: i64,
    target: Resolution,
) -> Result<Option<Vec<Sample>>, CacheError> {
    match source.resolution().cmp(&target) {
        std::cmp::Ordering::Less => downsample(source, start, end, target),
        std::cmp::Ordering::Greater => upsample(source, start, end, target),
        std::cmp::Ordering::Equal => source.read(start, end),
    }
}
