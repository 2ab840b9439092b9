//! SortScope Engine
//!
//! Step-by-step comparison sorts for animation.
//!
//! # Architecture
//!
//! - **Element**: one bar, a value plus a display state
//! - **Statistics**: comparison/swap counters and run timing
//! - **Algorithms**: bubble, selection, insertion, merge and quick sort,
//!   each suspending after every visually significant step
//! - **Visualizer**: the playback controller; owns the sequence, the tempo
//!   and the run state, and notifies a [`Renderer`] after every mutation
//!
//! # Usage
//!
//! ```ignore
//! let vis = Visualizer::new(VisualizerConfig::default(), |frame: &Frame| {
//!     draw(&frame.elements);
//! })?;
//! vis.set_tempo(20)?;
//! let outcome = vis.start(Algorithm::Quick).await?;
//! ```

mod algorithms;
mod config;
mod element;
mod error;
mod render;
mod stats;
mod stepper;
mod visualizer;

pub use algorithms::{Algorithm, AlgorithmInfo};
pub use config::{delay_for_tempo, VisualizerConfig};
pub use element::{DisplayState, Element};
pub use error::{Error, Result};
pub use render::{Frame, NullRenderer, Renderer};
pub use stats::{Statistics, StatsSnapshot};
pub use visualizer::{Run, RunOutcome, RunState, Visualizer};

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Run `algorithm` over `values` at full speed and return the final
    /// values and counters.
    pub async fn run_to_end(algorithm: Algorithm, values: &[u32]) -> (Vec<u32>, StatsSnapshot) {
        let vis = Visualizer::new(VisualizerConfig::fast(), NullRenderer).unwrap();
        vis.load(values).unwrap();
        let outcome = vis.start(algorithm).await.unwrap();
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(vis.run_state(), RunState::Idle);
        assert!(vis
            .snapshot()
            .iter()
            .all(|e| e.state == DisplayState::Sorted));
        let values = vis.snapshot().iter().map(|e| e.value).collect();
        (values, vis.statistics())
    }
}
