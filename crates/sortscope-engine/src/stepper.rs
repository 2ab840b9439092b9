//! Engine primitives handed to the sort routines.
//!
//! A [`Stepper`] is created for one run. Every method that mutates the
//! sequence first checks that the run is still live, and every suspension
//! point races the tempo delay against the run-state channel so that
//! `stop()` wakes a pending delay immediately.

use std::ops::RangeInclusive;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::trace;

use crate::element::{DisplayState, Element};
use crate::error::{Error, Result};
use crate::visualizer::{Board, RunState, RunStatus, Shared};

/// Per-run handle to the shared sequence.
pub(crate) struct Stepper {
    shared: Arc<Shared>,
    rx: watch::Receiver<RunStatus>,
    epoch: u64,
}

impl Stepper {
    pub(crate) fn new(shared: Arc<Shared>, epoch: u64) -> Self {
        let rx = shared.subscribe();
        Self { shared, rx, epoch }
    }

    /// Generation of the run this stepper belongs to.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Length of the sequence, fixed for the run.
    pub fn len(&self) -> usize {
        self.shared.board().elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `index`.
    pub fn value(&self, index: usize) -> Result<u32> {
        self.element(index).map(|e| e.value)
    }

    /// Copy of the element at `index`.
    pub fn element(&self, index: usize) -> Result<Element> {
        let board = self.shared.board();
        checked(&board, index).map(|i| board.elements[i])
    }

    /// Copies of the elements in `range`.
    pub fn elements(&self, range: RangeInclusive<usize>) -> Result<Vec<Element>> {
        let board = self.shared.board();
        checked(&board, *range.end())?;
        Ok(board.elements[range].to_vec())
    }

    /// Set the display state of one element.
    pub fn mark(&self, index: usize, state: DisplayState) -> Result<()> {
        self.with_board(|board| {
            let i = checked(board, index)?;
            board.elements[i].state = state;
            Ok(())
        })
    }

    /// Set the display state of every element in `range`.
    pub fn mark_range(&self, range: RangeInclusive<usize>, state: DisplayState) -> Result<()> {
        self.with_board(|board| {
            checked(board, *range.end())?;
            for element in &mut board.elements[range] {
                element.state = state;
            }
            Ok(())
        })
    }

    /// Exchange two elements without suspending.
    pub fn exchange(&self, i: usize, j: usize) -> Result<()> {
        self.with_board(|board| {
            checked(board, i)?;
            checked(board, j)?;
            board.elements.swap(i, j);
            Ok(())
        })
    }

    /// Move the element at `from` down to `to`, shifting `to..from` up by
    /// one slot. The sequence stays a permutation throughout.
    pub fn rotate_into(&self, to: usize, from: usize) -> Result<()> {
        self.with_board(|board| {
            checked(board, from)?;
            if to > from {
                return Err(Error::IndexOutOfBounds {
                    index: to,
                    len: from + 1,
                });
            }
            board.elements[to..=from].rotate_right(1);
            Ok(())
        })
    }

    /// Count a comparison made without [`compare`](Self::compare).
    pub fn record_comparison(&self) -> Result<()> {
        self.with_board(|board| {
            board.stats.record_comparison();
            Ok(())
        })
    }

    /// Count a swap made without [`swap`](Self::swap).
    pub fn record_swap(&self) -> Result<()> {
        self.with_board(|board| {
            board.stats.record_swap();
            Ok(())
        })
    }

    /// Render the current state and suspend for one tempo delay.
    pub async fn step(&mut self) -> Result<()> {
        self.ready().await?;
        self.shared.render();
        self.suspend().await
    }

    /// Compare two elements, returning `value[i] > value[j]`.
    pub async fn compare(&mut self, i: usize, j: usize) -> Result<bool> {
        self.ready().await?;
        let (a, b) = self.with_board(|board| {
            checked(board, i)?;
            checked(board, j)?;
            board.stats.record_comparison();
            board.elements[i].state = DisplayState::Comparing;
            board.elements[j].state = DisplayState::Comparing;
            Ok((board.elements[i].value, board.elements[j].value))
        })?;
        trace!(i, j, "compare");
        self.shared.render();
        self.suspend().await?;
        Ok(a > b)
    }

    /// Swap two elements, rendering and suspending before and after.
    pub async fn swap(&mut self, i: usize, j: usize) -> Result<()> {
        self.ready().await?;
        self.with_board(|board| {
            checked(board, i)?;
            checked(board, j)?;
            board.stats.record_swap();
            board.elements[i].state = DisplayState::Swapping;
            board.elements[j].state = DisplayState::Swapping;
            Ok(())
        })?;
        trace!(i, j, "swap");
        self.shared.render();
        self.suspend().await?;

        self.exchange(i, j)?;
        self.shared.render();
        self.suspend().await
    }

    /// Run `f` against the board if the run is still live.
    ///
    /// The channel stays borrowed while the board is locked, so a stop or
    /// a new run cannot slip in between the check and the mutation. Lock
    /// order is channel then board, as everywhere else.
    fn with_board<T>(&self, f: impl FnOnce(&mut Board) -> Result<T>) -> Result<T> {
        let status = self.rx.borrow();
        if !status.is_live(self.epoch) {
            return Err(Error::Interrupted);
        }
        let mut board = self.shared.board();
        f(&mut board)
    }

    /// Wait out a pause. Fails once the run is stopped or superseded.
    async fn ready(&mut self) -> Result<()> {
        loop {
            let status = *self.rx.borrow_and_update();
            if status.epoch != self.epoch {
                return Err(Error::Interrupted);
            }
            match status.state {
                RunState::Running => return Ok(()),
                RunState::Paused => {
                    if self.rx.changed().await.is_err() {
                        return Err(Error::Interrupted);
                    }
                }
                RunState::Idle | RunState::Stopped => return Err(Error::Interrupted),
            }
        }
    }

    /// Sleep for the current tempo delay, waking early on cancellation.
    async fn suspend(&mut self) -> Result<()> {
        let delay = self.shared.delay();
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancelled(&mut self.rx, self.epoch) => return Err(Error::Interrupted),
        }
        self.ready().await
    }
}

/// Resolves once the run identified by `epoch` stops being live.
async fn cancelled(rx: &mut watch::Receiver<RunStatus>, epoch: u64) {
    loop {
        if rx.changed().await.is_err() {
            return;
        }
        if !rx.borrow_and_update().is_live(epoch) {
            return;
        }
    }
}

fn checked(board: &Board, index: usize) -> Result<usize> {
    let len = board.elements.len();
    if index < len {
        Ok(index)
    } else {
        Err(Error::IndexOutOfBounds { index, len })
    }
}
