//! Bubble sort: adjacent-pair sweeps with a shrinking bound.

use crate::element::DisplayState;
use crate::error::Result;
use crate::stepper::Stepper;

pub(super) async fn sort(s: &mut Stepper) -> Result<()> {
    let n = s.len();
    if n == 0 {
        return Ok(());
    }

    for pass in 0..n - 1 {
        for j in 0..n - pass - 1 {
            if s.compare(j, j + 1).await? {
                s.swap(j, j + 1).await?;
            }
            s.mark(j, DisplayState::Unsorted)?;
            s.mark(j + 1, DisplayState::Unsorted)?;
        }
        // Largest remaining value has bubbled to the end of the pass
        s.mark(n - pass - 1, DisplayState::Sorted)?;
    }
    s.mark(0, DisplayState::Sorted)
}

#[cfg(test)]
mod tests {
    use crate::algorithms::Algorithm;
    use crate::test_support::run_to_end;

    #[tokio::test(start_paused = true)]
    async fn sorts_small_reverse_run() {
        let (values, stats) = run_to_end(Algorithm::Bubble, &[5, 3, 4, 1, 2]).await;
        assert_eq!(values, vec![1, 2, 3, 4, 5]);
        assert_eq!(stats.comparisons, 10);
        // One swap per inversion
        assert_eq!(stats.swaps, 8);
    }

    #[tokio::test(start_paused = true)]
    async fn sorted_input_needs_no_swaps() {
        let (values, stats) = run_to_end(Algorithm::Bubble, &[1, 2, 3, 4]).await;
        assert_eq!(values, vec![1, 2, 3, 4]);
        assert_eq!(stats.comparisons, 6);
        assert_eq!(stats.swaps, 0);
    }
}
