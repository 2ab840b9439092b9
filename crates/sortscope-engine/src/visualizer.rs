//! Playback controller: owns the sequence and the run state.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::algorithms::Algorithm;
use crate::config::{delay_for_tempo, VisualizerConfig};
use crate::element::{DisplayState, Element};
use crate::error::{Error, Result};
use crate::render::{Frame, Renderer};
use crate::stats::{Statistics, StatsSnapshot};
use crate::stepper::Stepper;

/// Whether engine primitives may make progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// No run in progress
    #[default]
    Idle,
    /// A run is stepping
    Running,
    /// A run is held at its next suspension point
    Paused,
    /// A run was cancelled and is unwinding
    Stopped,
}

impl RunState {
    /// Running or paused.
    pub fn is_active(&self) -> bool {
        matches!(self, RunState::Running | RunState::Paused)
    }
}

/// How a call to [`Visualizer::start`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The algorithm ran to the end; every element is sorted
    Completed,
    /// The run was stopped or superseded
    Interrupted,
    /// Another run was already active; nothing happened
    AlreadyRunning,
}

/// Run state plus the generation it applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RunStatus {
    pub state: RunState,
    pub epoch: u64,
}

impl RunStatus {
    pub fn is_live(&self, epoch: u64) -> bool {
        self.epoch == epoch && self.state.is_active()
    }
}

/// Sequence and counters, guarded together.
#[derive(Debug)]
pub(crate) struct Board {
    pub elements: Vec<Element>,
    pub stats: Statistics,
    pub algorithm: Option<Algorithm>,
}

pub(crate) struct Shared {
    config: VisualizerConfig,
    board: Mutex<Board>,
    run: watch::Sender<RunStatus>,
    tempo: AtomicU32,
    rng: Mutex<StdRng>,
    renderer: Box<dyn Renderer>,
}

impl Shared {
    pub fn board(&self) -> MutexGuard<'_, Board> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> watch::Receiver<RunStatus> {
        self.run.subscribe()
    }

    pub fn delay(&self) -> Duration {
        delay_for_tempo(self.tempo.load(Ordering::Relaxed))
    }

    pub fn frame(&self) -> Frame {
        // Read the run state before taking the board lock; writers of the
        // run state take the board lock while holding the channel.
        let state = self.run.borrow().state;
        let board = self.board();
        Frame {
            elements: board.elements.clone(),
            stats: board.stats.snapshot(),
            state,
            algorithm: board.algorithm,
        }
    }

    pub fn render(&self) {
        let frame = self.frame();
        self.renderer.render(&frame);
    }

    fn random_values(&self, size: usize) -> Vec<u32> {
        let range = self.config.value_range.clone();
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        (0..size)
            .map(|_| {
                if range.is_empty() {
                    range.start
                } else {
                    rng.gen_range(range.clone())
                }
            })
            .collect()
    }

    /// Replace the sequence unless a run is active.
    fn replace(&self, values: &[u32]) -> Result<()> {
        let status = self.run.borrow();
        if status.state.is_active() {
            return Err(Error::Busy);
        }
        let mut board = self.board();
        board.elements = Element::sequence(values);
        board.stats = Statistics::new();
        Ok(())
    }

    /// Close out run `epoch`. Returns false if a newer run owns the state.
    fn release(&self, epoch: u64, completed: bool) -> bool {
        let mut owned = false;
        self.run.send_if_modified(|status| {
            if status.epoch != epoch || status.state == RunState::Idle {
                return false;
            }
            owned = true;
            let mut board = self.board();
            if completed {
                for element in &mut board.elements {
                    element.state = DisplayState::Sorted;
                }
            }
            board.stats.finish();
            status.state = RunState::Idle;
            true
        });
        owned
    }
}

/// A run that owns the run state but has not finished stepping.
///
/// Returned by [`Visualizer::claim`]. The state is already `Running` when
/// this exists, so a `stop` issued before [`drive`](Run::drive) is polled
/// still cancels it. Dropping it early returns the state to idle.
#[must_use = "a claimed run holds the run state until it is driven or dropped"]
pub struct Run {
    vis: Visualizer,
    stepper: Stepper,
    algorithm: Algorithm,
    finished: bool,
}

impl Run {
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Generation of the run state this run owns.
    pub fn epoch(&self) -> u64 {
        self.stepper.epoch()
    }

    /// Step the algorithm to completion or interruption.
    ///
    /// Interruption is not an error; any other failure is logged and
    /// returned.
    pub async fn drive(mut self) -> Result<RunOutcome> {
        let result = self.algorithm.run(&mut self.stepper).await;
        self.finished = true;
        self.vis.finish(self.algorithm, self.stepper.epoch(), result)
    }
}

impl Drop for Run {
    fn drop(&mut self) {
        let epoch = self.stepper.epoch();
        if !self.finished && self.vis.shared.release(epoch, false) {
            debug!(algorithm = %self.algorithm, epoch, "run dropped before completion");
            self.vis.shared.render();
        }
    }
}

impl std::fmt::Debug for Run {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Run")
            .field("algorithm", &self.algorithm)
            .field("epoch", &self.epoch())
            .finish()
    }
}

/// Drives the sort routines at a configurable tempo.
///
/// Cheap to clone; clones share the same sequence and run state, so one
/// task can `start` while another calls `stop`, `pause` or reads frames.
#[derive(Clone)]
pub struct Visualizer {
    shared: Arc<Shared>,
}

impl Visualizer {
    /// Create a visualizer with a random sequence of `config.size` bars.
    pub fn new(config: VisualizerConfig, renderer: impl Renderer + 'static) -> Result<Self> {
        let size = config.check_size(config.size)?;
        let tempo = config.check_tempo(config.tempo)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (run, _) = watch::channel(RunStatus::default());

        let shared = Arc::new(Shared {
            config,
            board: Mutex::new(Board {
                elements: Vec::new(),
                stats: Statistics::new(),
                algorithm: None,
            }),
            run,
            tempo: AtomicU32::new(tempo),
            rng: Mutex::new(rng),
            renderer: Box::new(renderer),
        });

        let values = shared.random_values(size);
        shared.replace(&values)?;
        Ok(Self { shared })
    }

    /// Run `algorithm` over the current sequence.
    ///
    /// Resolves when the run completes or is interrupted. Shorthand for
    /// [`claim`](Self::claim) followed by [`Run::drive`].
    pub async fn start(&self, algorithm: Algorithm) -> Result<RunOutcome> {
        match self.claim(algorithm) {
            Some(run) => run.drive().await,
            None => Ok(RunOutcome::AlreadyRunning),
        }
    }

    /// Claim the run state and reset the board for a new run.
    ///
    /// Returns `None` if a run is already active. The state is `Running`
    /// as soon as this returns, before any step has been taken.
    pub fn claim(&self, algorithm: Algorithm) -> Option<Run> {
        let mut epoch = None;
        self.shared.run.send_if_modified(|status| {
            if status.state.is_active() {
                return false;
            }
            status.epoch += 1;
            status.state = RunState::Running;
            epoch = Some(status.epoch);

            let mut board = self.shared.board();
            for element in &mut board.elements {
                element.state = DisplayState::Unsorted;
            }
            board.stats = Statistics::started();
            board.algorithm = Some(algorithm);
            true
        });
        let Some(epoch) = epoch else {
            debug!(%algorithm, "start ignored, run already active");
            return None;
        };

        info!(%algorithm, size = self.len(), epoch, "run started");
        self.shared.render();
        Some(Run {
            vis: self.clone(),
            stepper: Stepper::new(self.shared.clone(), epoch),
            algorithm,
            finished: false,
        })
    }

    /// Close out run `epoch` after its routine returned.
    fn finish(&self, algorithm: Algorithm, epoch: u64, result: Result<()>) -> Result<RunOutcome> {
        match result {
            Ok(()) => {
                // A newer run may have claimed the state after our last step.
                if !self.shared.release(epoch, true) {
                    debug!(%algorithm, epoch, "run superseded");
                    return Ok(RunOutcome::Interrupted);
                }
                let stats = self.statistics();
                info!(
                    %algorithm,
                    comparisons = stats.comparisons,
                    swaps = stats.swaps,
                    elapsed_ms = stats.elapsed_ms,
                    "run completed"
                );
                self.shared.render();
                Ok(RunOutcome::Completed)
            }
            Err(Error::Interrupted) => {
                if self.shared.release(epoch, false) {
                    self.shared.render();
                }
                debug!(%algorithm, epoch, "run interrupted");
                Ok(RunOutcome::Interrupted)
            }
            Err(e) => {
                self.shared.release(epoch, false);
                error!(%algorithm, error = %e, "run failed");
                self.shared.render();
                Err(e)
            }
        }
    }

    /// Cancel the active run. Its pending delay wakes and the run unwinds
    /// without further mutation. Returns false if nothing was running.
    pub fn stop(&self) -> bool {
        let stopped = self.shared.run.send_if_modified(|status| {
            if status.state.is_active() {
                status.state = RunState::Stopped;
                true
            } else {
                false
            }
        });
        if stopped {
            debug!("run stop requested");
        }
        stopped
    }

    /// Hold the active run at its next suspension point.
    pub fn pause(&self) -> bool {
        self.transition(RunState::Running, RunState::Paused)
    }

    /// Continue a paused run.
    pub fn resume(&self) -> bool {
        self.transition(RunState::Paused, RunState::Running)
    }

    fn transition(&self, from: RunState, to: RunState) -> bool {
        let changed = self.shared.run.send_if_modified(|status| {
            if status.state == from {
                status.state = to;
                true
            } else {
                false
            }
        });
        if changed {
            debug!(?from, ?to, "run state changed");
            self.shared.render();
        }
        changed
    }

    /// Replace the sequence with `size` random values.
    pub fn regenerate(&self, size: usize) -> Result<()> {
        let size = self.shared.config.check_size(size)?;
        let values = self.shared.random_values(size);
        self.shared.replace(&values)?;
        debug!(size, "sequence regenerated");
        self.shared.render();
        Ok(())
    }

    /// Stop any active run and replace the sequence with fresh random
    /// values of the same length.
    ///
    /// A loaded sequence whose length is outside the size bounds is
    /// replaced with one of the configured default size.
    pub fn reset(&self) -> Result<()> {
        self.stop();
        let len = self.len();
        let size = if self.shared.config.size_bounds.contains(&len) {
            len
        } else {
            self.shared.config.size
        };
        self.regenerate(size)
    }

    /// Replace the sequence with explicit values.
    ///
    /// Unlike [`regenerate`](Self::regenerate) the length is not checked
    /// against the configured size bounds.
    pub fn load(&self, values: &[u32]) -> Result<()> {
        self.shared.replace(values)?;
        debug!(size = values.len(), "sequence loaded");
        self.shared.render();
        Ok(())
    }

    /// Set steps per second. Applies from the next suspension point.
    pub fn set_tempo(&self, rate: u32) -> Result<()> {
        let rate = self.shared.config.check_tempo(rate)?;
        self.shared.tempo.store(rate, Ordering::Relaxed);
        debug!(rate, "tempo changed");
        Ok(())
    }

    pub fn tempo(&self) -> u32 {
        self.shared.tempo.load(Ordering::Relaxed)
    }

    /// Delay applied at each suspension point.
    pub fn delay(&self) -> Duration {
        self.shared.delay()
    }

    pub fn run_state(&self) -> RunState {
        self.shared.run.borrow().state
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.shared.config
    }

    /// Number of bars in the sequence.
    pub fn len(&self) -> usize {
        self.shared.board().elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current sequence.
    pub fn snapshot(&self) -> Vec<Element> {
        self.shared.board().elements.clone()
    }

    /// Current counters and elapsed time.
    pub fn statistics(&self) -> StatsSnapshot {
        self.shared.board().stats.snapshot()
    }

    /// Sequence, counters and run state together.
    pub fn frame(&self) -> Frame {
        self.shared.frame()
    }
}

impl std::fmt::Debug for Visualizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visualizer")
            .field("len", &self.len())
            .field("tempo", &self.tempo())
            .field("state", &self.run_state())
            .finish()
    }
}
