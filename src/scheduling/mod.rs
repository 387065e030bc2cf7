//! This module takes care of scheduling the event loop, encapsulating use of
//! multiple threads and anything else that will come in the future

#[cfg(not(feature = "multi-threading"))]
mod sequential;
#[cfg(feature = "multi-threading")]
mod multi_threading;

use eyre::Result;

use std::ops::Range;

/// Size of the event batches
///
/// Events are grouped in batches of a certain size, whose results are merged
/// in batch order. This makes the final results of sequential and parallel
/// runs identical, including floating-point sums.
///
pub const EVENT_BATCH_SIZE: usize = 10_000;

/// Partial results which can be combined with those of later events
pub trait Merge {
    /// Integrate the results of events which come after those of `self`
    fn merge(&mut self, other: Self);
}

/// Split a number of events into consecutive batches
///
/// There is always at least one (possibly empty) batch, so that every run
/// produces results.
pub fn batches(num_events: usize) -> Vec<Range<usize>> {
    if num_events == 0 {
        return vec![0..0];
    }
    (0..num_events)
        .step_by(EVENT_BATCH_SIZE)
        .map(|start| start..(start + EVENT_BATCH_SIZE).min(num_events))
        .collect()
}

/// Run the event loop in the manner that was configured at build time
///
/// Takes as parameters the total number of events, and a kernel that
/// processes a range of event indices into partial results. The first error
/// in event order, if any, is returned.
pub fn run_batches<R: Merge + Send>(
    num_events: usize,
    process_batch: impl Send + Sync + Fn(Range<usize>) -> Result<R>,
) -> Result<R> {
    let batches = batches(num_events);

    // ...in sequential mode
    #[cfg(not(feature = "multi-threading"))]
    {
        sequential::run_batches_impl(batches, process_batch)
    }

    // ...in multi-threaded mode
    #[cfg(feature = "multi-threading")]
    {
        multi_threading::run_batches_impl(batches, process_batch)
    }
}
