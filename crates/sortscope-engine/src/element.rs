//! Array slots and their display states.

use serde::{Deserialize, Serialize};

/// Presentation tag describing an element's role in the current step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayState {
    /// Not yet placed
    #[default]
    Unsorted,
    /// Taking part in a comparison
    Comparing,
    /// Being moved
    Swapping,
    /// In its final position
    Sorted,
    /// Current quicksort pivot
    Pivot,
    /// Scratch marker for helper storage
    Auxiliary,
}

/// A single bar in the sequence.
///
/// `id` is assigned when the sequence is built and travels with the value
/// through every swap, shift and merge copy, so renderers can follow a bar
/// and tests can check relative order of equal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: u32,
    pub value: u32,
    pub state: DisplayState,
}

impl Element {
    /// Create an unsorted element.
    pub fn new(id: u32, value: u32) -> Self {
        Self {
            id,
            value,
            state: DisplayState::Unsorted,
        }
    }

    /// Build a sequence from raw values, ids following their positions.
    pub fn sequence(values: &[u32]) -> Vec<Element> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Element::new(i as u32, v))
            .collect()
    }
}
