use std::sync::Arc;

use chrono::{DateTime, Local};
use ratatui::widgets::ListState;

use crate::home_state::{HomeUiState, SectionEntry, SectionUiState};
use crate::source::Movie;

pub struct App {
    /// Latest snapshot received from the view model.
    pub state: Arc<HomeUiState>,
    /// Index of the section shown in the main pane.
    pub selected_section: usize,
    /// List selection state for scrolling within the section.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Set by input handling; the main loop forwards it to the refresher.
    pub refresh_requested: bool,
    /// Whether the screen currently observes the view model.
    pub observing: bool,
    /// When the last snapshot arrived.
    pub updated_at: Option<DateTime<Local>>,
}

impl App {
    pub fn new(state: Arc<HomeUiState>) -> Self {
        Self {
            state,
            selected_section: 0,
            list_state: ListState::default(),
            quit: false,
            refresh_requested: false,
            observing: true,
            updated_at: None,
        }
    }

    /// Show a new snapshot, keeping the cursor where it can stay.
    pub fn apply_snapshot(&mut self, state: Arc<HomeUiState>) {
        self.state = state;
        self.updated_at = Some(Local::now());
        let count = self.current_movies().len();
        match self.list_state.selected() {
            Some(_) if count == 0 => self.list_state.select(None),
            Some(i) if i >= count => self.list_state.select(Some(count - 1)),
            _ => {}
        }
    }

    pub fn current_section(&self) -> Option<&SectionEntry> {
        self.state.sections().get(self.selected_section)
    }

    /// Movies of the selected section; empty unless it loaded.
    pub fn current_movies(&self) -> &[Movie] {
        match self.current_section().map(|entry| &entry.state) {
            Some(SectionUiState::Success(movies)) => &movies[..],
            _ => &[],
        }
    }

    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
    }

    // -- sections ------------------------------------------------------------

    pub fn next_section(&mut self) {
        let count = self.state.sections().len();
        if count == 0 {
            return;
        }
        self.selected_section = (self.selected_section + 1) % count;
        self.list_state.select(None);
    }

    pub fn previous_section(&mut self) {
        let count = self.state.sections().len();
        if count == 0 {
            return;
        }
        self.selected_section = (self.selected_section + count - 1) % count;
        self.list_state.select(None);
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        let count = self.current_movies().len();
        if count == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(count - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.current_movies().is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.current_movies().is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let count = self.current_movies().len();
        if count > 0 {
            self.list_state.select(Some(count - 1));
        }
    }
}
