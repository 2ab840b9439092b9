//! The five step-by-step sort routines.
//!
//! Each routine works in place on the run's sequence through a
//! [`Stepper`], yielding at every visually significant step.

mod bubble;
mod insertion;
mod merge;
mod quick;
mod selection;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stepper::Stepper;

/// Which sort to animate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Bubble,
    Selection,
    Insertion,
    Merge,
    Quick,
}

impl Algorithm {
    /// Every algorithm, in menu order.
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Bubble,
        Algorithm::Selection,
        Algorithm::Insertion,
        Algorithm::Merge,
        Algorithm::Quick,
    ];

    /// Identifier used in configuration and the API.
    pub fn id(&self) -> &'static str {
        match self {
            Algorithm::Bubble => "bubble",
            Algorithm::Selection => "selection",
            Algorithm::Insertion => "insertion",
            Algorithm::Merge => "merge",
            Algorithm::Quick => "quick",
        }
    }

    /// Display name, description and complexity figures.
    pub fn info(&self) -> AlgorithmInfo {
        match self {
            Algorithm::Bubble => AlgorithmInfo {
                id: *self,
                name: "Bubble Sort",
                description: "Repeatedly steps through the list, compares adjacent elements and swaps them if they are in the wrong order.",
                best: "O(n)",
                average: "O(n²)",
                worst: "O(n²)",
                space: "O(1)",
            },
            Algorithm::Selection => AlgorithmInfo {
                id: *self,
                name: "Selection Sort",
                description: "Finds the minimum element and places it at the beginning, then repeats for the remaining unsorted portion.",
                best: "O(n²)",
                average: "O(n²)",
                worst: "O(n²)",
                space: "O(1)",
            },
            Algorithm::Insertion => AlgorithmInfo {
                id: *self,
                name: "Insertion Sort",
                description: "Builds the sorted array one element at a time by inserting each element into its correct position.",
                best: "O(n)",
                average: "O(n²)",
                worst: "O(n²)",
                space: "O(1)",
            },
            Algorithm::Merge => AlgorithmInfo {
                id: *self,
                name: "Merge Sort",
                description: "Divides the array into halves, recursively sorts them, and then merges the sorted halves.",
                best: "O(n log n)",
                average: "O(n log n)",
                worst: "O(n log n)",
                space: "O(n)",
            },
            Algorithm::Quick => AlgorithmInfo {
                id: *self,
                name: "Quick Sort",
                description: "Selects a pivot element and partitions the array around it, then recursively sorts the subarrays.",
                best: "O(n log n)",
                average: "O(n log n)",
                worst: "O(n²)",
                space: "O(log n)",
            },
        }
    }

    /// Sort the stepper's sequence in place.
    pub(crate) async fn run(self, stepper: &mut Stepper) -> Result<()> {
        match self {
            Algorithm::Bubble => bubble::sort(stepper).await,
            Algorithm::Selection => selection::sort(stepper).await,
            Algorithm::Insertion => insertion::sort(stepper).await,
            Algorithm::Merge => merge::sort(stepper).await,
            Algorithm::Quick => quick::sort(stepper).await,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownAlgorithm(s.to_string()))
    }
}

/// Descriptive card for an algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlgorithmInfo {
    pub id: Algorithm,
    pub name: &'static str,
    pub description: &'static str,
    pub best: &'static str,
    pub average: &'static str,
    pub worst: &'static str,
    pub space: &'static str,
}
