use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// What a single step did with its item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome<O> {
    Done(O),
    /// Nothing to do for this item; the run continues.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacedSummary<O> {
    /// One entry per item, in input order.
    pub outcomes: Vec<StepOutcome<O>>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PacedError<E> {
    /// A step failed; items after `index` were never started.
    Step { index: usize, error: E },
    /// Cancellation was observed before the item at `completed` started.
    Cancelled { completed: usize },
}

/// Runs one async step per item, strictly in order, with a fixed pause
/// between consecutive items.
///
/// The pause is unconditional: it follows skipped items as well as completed
/// ones, but not the last item. Cancellation is only observed between steps,
/// never while a step is in flight.
#[derive(Debug, Clone, Copy)]
pub struct PacedExecutor {
    interval: Duration,
}

impl PacedExecutor {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub async fn run<'a, T, O, E, F, Fut>(
        &self,
        items: &'a [T],
        cancel: &CancellationToken,
        mut step: F,
    ) -> Result<PacedSummary<O>, PacedError<E>>
    where
        F: FnMut(usize, &'a T) -> Fut,
        Fut: Future<Output = Result<StepOutcome<O>, E>>,
    {
        let mut outcomes = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                tokio::select! {
                    _ = tokio::time::sleep(self.interval) => {}
                    _ = cancel.cancelled() => {}
                }
            }

            if cancel.is_cancelled() {
                tracing::info!(completed = index, "Paced run cancelled");
                return Err(PacedError::Cancelled { completed: index });
            }

            match step(index, item).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(error) => return Err(PacedError::Step { index, error }),
            }
        }

        Ok(PacedSummary { outcomes })
    }
}
