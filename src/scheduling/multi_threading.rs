//! Multi-threaded back-end of the event loop

use super::Merge;

use eyre::{eyre, Result};

use std::{ops::Range, sync::Mutex};

/// Process event batches in multi-threaded mode
///
/// Every batch is a rayon task. Results are merged in batch order once all
/// tasks are done, so the output does not depend on thread scheduling.
///
pub fn run_batches_impl<R: Merge + Send>(
    batches: Vec<Range<usize>>,
    process_batch: impl Send + Sync + Fn(Range<usize>) -> Result<R>,
) -> Result<R> {
    let accumulator = ReproducibleAccumulator::new(batches.len());

    // This function is a synchronization scope: it will only return
    // once all inner tasks have been executed
    rayon::scope(|scope| {
        for (batch_id, batch) in batches.into_iter().enumerate() {
            let accumulator_ref = &accumulator;
            let process_batch_ref = &process_batch;
            scope.spawn(move |_| {
                accumulator_ref.set_task_result(batch_id, process_batch_ref(batch));
            });
        }
    });

    accumulator.get_merged_result()
}

/// Reproducibility-optimized results accumulation mechanism
struct ReproducibleAccumulator<R> {
    /// Storage for the intermediary results of parallel tasks
    results: Box<[Mutex<Option<Result<R>>>]>,
}
//
impl<R: Merge> ReproducibleAccumulator<R> {
    /// Set up results storage for N parallel tasks
    fn new(num_tasks: usize) -> Self {
        Self {
            results: (0..num_tasks)
                .map(|_| Mutex::new(None))
                .collect::<Vec<_>>()
                .into_boxed_slice(),
        }
    }

    /// Record the results of the n-th task
    fn set_task_result(&self, task_id: usize, result: Result<R>) {
        // A poisoned slot can only come from a panicking task, which aborts
        // the run anyway
        if let Ok(mut slot) = self.results[task_id].lock() {
            *slot = Some(result);
        }
    }

    /// Aggregate the results in batch order
    fn get_merged_result(self) -> Result<R> {
        let mut merged: Option<R> = None;
        for (task_id, slot) in self.results.into_vec().into_iter().enumerate() {
            let result = slot
                .into_inner()
                .map_err(|_| eyre!("Results of batch {} were poisoned", task_id))?
                .ok_or_else(|| eyre!("Batch {} did not report results", task_id))??;
            match &mut merged {
                None => merged = Some(result),
                Some(acc) => acc.merge(result),
            }
        }
        merged.ok_or_else(|| eyre!("There should be at least one batch"))
    }
}
