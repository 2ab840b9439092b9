//! Quicksort with a Lomuto partition around the last element.

use futures::future::{BoxFuture, FutureExt};

use crate::element::DisplayState;
use crate::error::Result;
use crate::stepper::Stepper;

pub(super) async fn sort(s: &mut Stepper) -> Result<()> {
    let n = s.len();
    if n < 2 {
        return Ok(());
    }
    quick_sort(s, 0, n - 1).await
}

fn quick_sort(s: &mut Stepper, low: usize, high: usize) -> BoxFuture<'_, Result<()>> {
    async move {
        if low < high {
            let pivot = partition(s, low, high).await?;
            if pivot > low {
                quick_sort(s, low, pivot - 1).await?;
            }
            quick_sort(s, pivot + 1, high).await?;
        }
        Ok(())
    }
    .boxed()
}

/// Partition `low..=high`, returning the pivot's resting index.
async fn partition(s: &mut Stepper, low: usize, high: usize) -> Result<usize> {
    let pivot = s.value(high)?;
    s.mark(high, DisplayState::Pivot)?;
    s.step().await?;

    // Next slot for an element smaller than the pivot
    let mut boundary = low;
    for j in low..high {
        s.mark(j, DisplayState::Comparing)?;
        s.step().await?;
        s.record_comparison()?;

        if s.value(j)? < pivot {
            if boundary != j {
                s.swap(boundary, j).await?;
            }
            s.mark(boundary, DisplayState::Unsorted)?;
            boundary += 1;
        }
        s.mark(j, DisplayState::Unsorted)?;
    }

    // Always performed, even when the pivot is already in place
    s.swap(boundary, high).await?;
    s.mark(boundary, DisplayState::Sorted)?;
    Ok(boundary)
}
