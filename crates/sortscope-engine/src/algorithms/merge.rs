//! Top-down merge sort.
//!
//! Each merge snapshots both halves and decides the output order from the
//! copies. Write-back rotates the chosen element into place so the live
//! sequence stays a permutation of its values at every suspension point.

use futures::future::{BoxFuture, FutureExt};

use crate::element::DisplayState;
use crate::error::Result;
use crate::stepper::Stepper;

pub(super) async fn sort(s: &mut Stepper) -> Result<()> {
    let n = s.len();
    if n < 2 {
        return Ok(());
    }
    merge_sort(s, 0, n - 1).await
}

fn merge_sort(s: &mut Stepper, left: usize, right: usize) -> BoxFuture<'_, Result<()>> {
    async move {
        if left < right {
            let mid = left + (right - left) / 2;
            merge_sort(s, left, mid).await?;
            merge_sort(s, mid + 1, right).await?;
            merge(s, left, mid, right).await?;
        }
        Ok(())
    }
    .boxed()
}

async fn merge(s: &mut Stepper, left: usize, mid: usize, right: usize) -> Result<()> {
    let lower = s.elements(left..=mid)?;
    let upper = s.elements(mid + 1..=right)?;
    let (mut i, mut j, mut k) = (0, 0, left);

    while i < lower.len() && j < upper.len() {
        s.mark_range(left..=right, DisplayState::Comparing)?;
        s.step().await?;
        s.record_comparison()?;

        // Ties take from the lower half, keeping the sort stable
        if lower[i].value <= upper[j].value {
            i += 1;
        } else {
            // Untaken lower elements sit at k.., the next upper one after them
            s.rotate_into(k, k + (lower.len() - i))?;
            j += 1;
        }

        s.mark(k, DisplayState::Swapping)?;
        s.record_swap()?;
        s.step().await?;
        k += 1;
    }

    // Whichever half remains is already in order at k..=right
    while k <= right {
        s.mark(k, DisplayState::Swapping)?;
        s.record_swap()?;
        s.step().await?;
        k += 1;
    }

    // Only the outermost merge is highlighted as sorted
    let state = if left == 0 && right + 1 == s.len() {
        DisplayState::Sorted
    } else {
        DisplayState::Unsorted
    };
    s.mark_range(left..=right, state)
}
