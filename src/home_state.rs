//! Immutable view state of the home screen.
//!
//! [`HomeUiState`] is the single value the rendering layer reads.  It is
//! rebuilt from scratch by [`HomeUiState::combine`] on every input change and
//! never mutated afterwards.

use crate::outcome::Outcome;
use crate::source::{MovieList, Section};

/// Presentation state of one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionUiState {
    Loading,
    Success(MovieList),
    Error,
}

impl From<&Outcome<MovieList>> for SectionUiState {
    fn from(outcome: &Outcome<MovieList>) -> Self {
        match outcome {
            Outcome::Loading => SectionUiState::Loading,
            Outcome::Success(movies) => SectionUiState::Success(MovieList::clone(movies)),
            Outcome::Error => SectionUiState::Error,
        }
    }
}

/// One section's identifier paired with its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionEntry {
    pub section: Section,
    pub state: SectionUiState,
}

/// The combined snapshot published to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeUiState {
    sections: Vec<SectionEntry>,
    pub is_refreshing: bool,
    pub is_error: bool,
}

impl HomeUiState {
    /// Every section loading, both flags off.
    pub fn initial(sections: &[Section]) -> Self {
        Self {
            sections: sections
                .iter()
                .map(|section| SectionEntry {
                    section: *section,
                    state: SectionUiState::Loading,
                })
                .collect(),
            is_refreshing: false,
            is_error: false,
        }
    }

    /// Build a snapshot from the latest value of every input.
    ///
    /// `outcomes[i]` belongs to `sections[i]`.  Each outcome maps to its
    /// section state on its own; nothing crosses between sections.  Every
    /// section appears in the result: one without an outcome is `Loading`,
    /// and outcomes past the last section are ignored.
    pub fn combine(
        sections: &[Section],
        outcomes: &[Outcome<MovieList>],
        is_refreshing: bool,
        is_error: bool,
    ) -> Self {
        Self {
            sections: sections
                .iter()
                .enumerate()
                .map(|(index, section)| SectionEntry {
                    section: *section,
                    state: outcomes
                        .get(index)
                        .map_or(SectionUiState::Loading, SectionUiState::from),
                })
                .collect(),
            is_refreshing,
            is_error,
        }
    }

    pub fn sections(&self) -> &[SectionEntry] {
        &self.sections
    }

    pub fn section(&self, section: Section) -> Option<&SectionUiState> {
        self.sections
            .iter()
            .find(|entry| entry.section == section)
            .map(|entry| &entry.state)
    }

    pub fn top_rated(&self) -> Option<&SectionUiState> {
        self.section(Section::TopRated)
    }
}
