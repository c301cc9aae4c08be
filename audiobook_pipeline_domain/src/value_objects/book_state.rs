// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The Job Coordinator's state machine (spec §4.5):
//!
//! ```text
//! Pending → Extracting → Segmenting → Synthesizing → Packaging → Completed
//!                ↘           ↘             ↘            ↘
//!                                 Failed
//! ```
//!
//! `BookState` only carries the enum and the DAG's legality rules; the
//! optimistic-concurrency enforcement of "only one writer advances a book"
//! lives in the `MetadataStore::update_book_state` contract, not here.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookState {
    Pending,
    Extracting,
    Segmenting,
    Synthesizing,
    Packaging,
    Completed,
    Failed,
}

pub const ALL_STATES: [BookState; 7] = [
    BookState::Pending,
    BookState::Extracting,
    BookState::Segmenting,
    BookState::Synthesizing,
    BookState::Packaging,
    BookState::Completed,
    BookState::Failed,
];

impl BookState {
    pub fn as_str(self) -> &'static str {
        match self {
            BookState::Pending => "pending",
            BookState::Extracting => "extracting",
            BookState::Segmenting => "segmenting",
            BookState::Synthesizing => "synthesizing",
            BookState::Packaging => "packaging",
            BookState::Completed => "completed",
            BookState::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        ALL_STATES.into_iter().find(|state| state.as_str() == s)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookState::Completed | BookState::Failed)
    }

    /// The state a worker for the given stage expects to find the book in
    /// before it starts work (spec §4.4 step 2/3), and the in-progress state
    /// it transitions to while working.
    pub fn entry_state_for_stage(stage: Stage) -> BookState {
        match stage {
            Stage::Extract => BookState::Pending,
            Stage::Segment => BookState::Extracting,
            Stage::Synthesize => BookState::Segmenting,
            Stage::Package => BookState::Synthesizing,
        }
    }

    /// The state the book is in while the stage's worker is actively running.
    pub fn in_progress_state_for_stage(stage: Stage) -> BookState {
        Self::entry_state_for_stage(stage)
    }

    /// The state the book advances to once the stage completes successfully.
    pub fn exit_state_for_stage(stage: Stage) -> BookState {
        match stage {
            Stage::Extract => BookState::Segmenting,
            Stage::Segment => BookState::Synthesizing,
            Stage::Synthesize => BookState::Packaging,
            Stage::Package => BookState::Completed,
        }
    }

    /// Whether `self -> next` is a legal transition in the DAG. Any
    /// non-terminal state may move to `Failed`; otherwise only the
    /// forward-adjacent state in the pipeline is legal. Terminal states
    /// never transition.
    pub fn can_transition_to(self, next: BookState) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == BookState::Failed {
            return true;
        }
        matches!(
            (self, next),
            (BookState::Pending, BookState::Extracting)
                | (BookState::Extracting, BookState::Segmenting)
                | (BookState::Segmenting, BookState::Synthesizing)
                | (BookState::Synthesizing, BookState::Packaging)
                | (BookState::Packaging, BookState::Completed)
        )
    }
}

impl fmt::Display for BookState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The four pipeline stages, matching the Queue Broker's named queues
/// (spec §4.3): `extract`, `segment`, `synthesize`, `package`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extract,
    Segment,
    Synthesize,
    Package,
}

impl Stage {
    pub fn queue_name(self) -> &'static str {
        match self {
            Stage::Extract => "extract",
            Stage::Segment => "segment",
            Stage::Synthesize => "synthesize",
            Stage::Package => "package",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "extract" => Some(Stage::Extract),
            "segment" => Some(Stage::Segment),
            "synthesize" => Some(Stage::Synthesize),
            "package" => Some(Stage::Package),
            _ => None,
        }
    }

    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Extract => Some(Stage::Segment),
            Stage::Segment => Some(Stage::Synthesize),
            Stage::Synthesize => Some(Stage::Package),
            Stage::Package => None,
        }
    }

    /// Entry/exit percent markers from the stage summary table (spec §4.4).
    pub fn entry_percent(self) -> u8 {
        match self {
            Stage::Extract => 0,
            Stage::Segment => 10,
            Stage::Synthesize => 25,
            Stage::Package => 50,
        }
    }

    pub fn exit_percent(self) -> u8 {
        match self {
            Stage::Extract => 10,
            Stage::Segment => 25,
            Stage::Synthesize => 50,
            Stage::Package => 100,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.queue_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_are_legal() {
        assert!(BookState::Pending.can_transition_to(BookState::Extracting));
        assert!(BookState::Extracting.can_transition_to(BookState::Segmenting));
        assert!(BookState::Segmenting.can_transition_to(BookState::Synthesizing));
        assert!(BookState::Synthesizing.can_transition_to(BookState::Packaging));
        assert!(BookState::Packaging.can_transition_to(BookState::Completed));
    }

    #[test]
    fn skipping_a_stage_is_illegal() {
        assert!(!BookState::Pending.can_transition_to(BookState::Segmenting));
        assert!(!BookState::Extracting.can_transition_to(BookState::Completed));
    }

    #[test]
    fn any_non_terminal_state_may_fail() {
        for state in ALL_STATES {
            if !state.is_terminal() {
                assert!(state.can_transition_to(BookState::Failed));
            }
        }
    }

    #[test]
    fn terminal_states_have_no_outgoing_transitions() {
        for next in ALL_STATES {
            assert!(!BookState::Completed.can_transition_to(next));
            assert!(!BookState::Failed.can_transition_to(next));
        }
    }

    #[test]
    fn stage_chain_covers_all_four_stages() {
        assert_eq!(Stage::Extract.next(), Some(Stage::Segment));
        assert_eq!(Stage::Segment.next(), Some(Stage::Synthesize));
        assert_eq!(Stage::Synthesize.next(), Some(Stage::Package));
        assert_eq!(Stage::Package.next(), None);
    }

    #[test]
    fn stage_and_state_percent_markers_are_monotonic() {
        for stage in [Stage::Extract, Stage::Segment, Stage::Synthesize, Stage::Package] {
            assert!(stage.entry_percent() < stage.exit_percent());
        }
    }

    #[test]
    fn as_str_round_trips() {
        for state in ALL_STATES {
            assert_eq!(BookState::parse(state.as_str()), Some(state));
        }
    }
}
