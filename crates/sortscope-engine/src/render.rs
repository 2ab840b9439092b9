//! Renderer seam and the frames passed across it.

use serde::{Deserialize, Serialize};

use crate::algorithms::Algorithm;
use crate::element::Element;
use crate::stats::StatsSnapshot;
use crate::visualizer::RunState;

/// Everything a renderer needs to draw one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub elements: Vec<Element>,
    pub stats: StatsSnapshot,
    pub state: RunState,
    pub algorithm: Option<Algorithm>,
}

/// Receives a frame after every mutation of the sequence.
///
/// Called synchronously from the run; implementations should hand the frame
/// off rather than block.
pub trait Renderer: Send + Sync {
    fn render(&self, frame: &Frame);
}

impl<F> Renderer for F
where
    F: Fn(&Frame) + Send + Sync,
{
    fn render(&self, frame: &Frame) {
        self(frame)
    }
}

/// Renderer that drops every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&self, _frame: &Frame) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn empty_frame() -> Frame {
        Frame {
            elements: Element::sequence(&[1, 2]),
            stats: StatsSnapshot::default(),
            state: RunState::Idle,
            algorithm: None,
        }
    }

    #[test]
    fn closures_are_renderers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let renderer = move |frame: &Frame| {
            counter.fetch_add(frame.elements.len(), Ordering::SeqCst);
        };
        renderer.render(&empty_frame());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn frame_serialization() {
        let json = serde_json::to_string(&empty_frame()).unwrap();
        assert!(json.contains("\"state\":\"idle\""));
        assert!(json.contains("\"unsorted\""));

        let parsed: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, empty_frame());
    }
}
