//! Selection sort: scan for the minimum, swap it into place.

use crate::element::DisplayState;
use crate::error::Result;
use crate::stepper::Stepper;

pub(super) async fn sort(s: &mut Stepper) -> Result<()> {
    let n = s.len();
    if n == 0 {
        return Ok(());
    }

    for i in 0..n - 1 {
        let mut min = i;
        s.mark(i, DisplayState::Comparing)?;

        for j in i + 1..n {
            s.mark(j, DisplayState::Comparing)?;
            s.step().await?;
            s.record_comparison()?;

            if s.value(j)? < s.value(min)? {
                if min != i {
                    s.mark(min, DisplayState::Unsorted)?;
                }
                min = j;
            } else {
                s.mark(j, DisplayState::Unsorted)?;
            }
        }

        if min != i {
            s.swap(i, min).await?;
        }
        s.mark(i, DisplayState::Sorted)?;
        if min != i {
            s.mark(min, DisplayState::Unsorted)?;
        }
    }
    s.mark(n - 1, DisplayState::Sorted)
}
