//! Sequential back-end of the event loop

use super::Merge;

use eyre::Result;

use std::ops::Range;

/// Process event batches in sequential mode
///
/// We use batched logic even in sequential mode, in order to achieve
/// reproducibility with respect to multi-threaded runs.
///
pub fn run_batches_impl<R: Merge>(
    batches: Vec<Range<usize>>,
    process_batch: impl Fn(Range<usize>) -> Result<R>,
) -> Result<R> {
    let mut batches = batches.into_iter();

    // Initialize the accumulator with the first batch of events
    let first_batch = batches.next().unwrap_or(0..0);
    let mut accumulator = process_batch(first_batch)?;

    // Integrate the remaining batches
    for batch in batches {
        accumulator.merge(process_batch(batch)?);
    }
    Ok(accumulator)
}
