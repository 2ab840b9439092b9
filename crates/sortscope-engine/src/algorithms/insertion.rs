//! Insertion sort: walk each key left past larger predecessors.
//!
//! The key travels by adjacent exchanges rather than being held aside, so
//! an interrupted run still holds every original value exactly once.

use crate::element::DisplayState;
use crate::error::Result;
use crate::stepper::Stepper;

pub(super) async fn sort(s: &mut Stepper) -> Result<()> {
    let n = s.len();
    if n == 0 {
        return Ok(());
    }
    s.mark(0, DisplayState::Sorted)?;

    for i in 1..n {
        let key = s.value(i)?;
        s.mark(i, DisplayState::Comparing)?;
        s.step().await?;

        // Slot currently holding the key
        let mut gap = i;
        while gap > 0 {
            let j = gap - 1;
            s.mark(j, DisplayState::Comparing)?;
            s.step().await?;
            s.record_comparison()?;

            if s.value(j)? <= key {
                s.mark(j, DisplayState::Sorted)?;
                break;
            }

            s.exchange(j, gap)?;
            s.mark(j, DisplayState::Swapping)?;
            s.mark(gap, DisplayState::Swapping)?;
            s.record_swap()?;
            s.step().await?;
            s.mark(gap, DisplayState::Sorted)?;
            gap = j;
        }

        s.mark(gap, DisplayState::Sorted)?;
        s.step().await?;
    }
    Ok(())
}
