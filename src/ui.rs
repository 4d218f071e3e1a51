//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  Rendering only reads the current
//! [`HomeUiState`](crate::home_state::HomeUiState) snapshot; it never changes it.
//!
//! ## For contributors
//!
//! * The layout is a three-row split: section tabs on top, the selected
//!   section in the middle and a one-line status bar at the bottom.
//! * Every section renders its own loading / error / list state, so a failed
//!   section never hides its siblings.
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs},
    Frame,
};

use crate::app::App;
use crate::home_state::{SectionEntry, SectionUiState};

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [tabs_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_tabs(app, frame, tabs_area);
    draw_section(app, frame, main_area);
    draw_status_bar(app, frame, status_area);
}

fn tab_title(entry: &SectionEntry) -> Line<'static> {
    let marker = match &entry.state {
        SectionUiState::Loading => Span::styled(" …", Style::default().fg(Color::DarkGray)),
        SectionUiState::Success(movies) => {
            Span::styled(format!(" ({})", movies.len()), Style::default().fg(Color::Green))
        }
        SectionUiState::Error => Span::styled(" ✗", Style::default().fg(Color::Red)),
    };
    Line::from(vec![Span::raw(entry.section.title()), marker])
}

/// Render one tab per section with its status marker.
fn draw_tabs(app: &App, frame: &mut Frame, area: Rect) {
    let titles: Vec<Line> = app.state.sections().iter().map(tab_title).collect();
    let tabs = Tabs::new(titles)
        .select(app.selected_section)
        .block(Block::default().title(" Movies ").borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan));
    frame.render_widget(tabs, area);
}

/// Render the selected section's body.
fn draw_section(app: &mut App, frame: &mut Frame, area: Rect) {
    let Some(entry) = app.current_section() else {
        return;
    };
    let block = Block::default()
        .title(format!(" {} ", entry.section.title()))
        .borders(Borders::ALL);

    let message = match &entry.state {
        SectionUiState::Loading => Some(Line::styled(
            "Loading…",
            Style::default().fg(Color::DarkGray),
        )),
        SectionUiState::Error => Some(Line::styled(
            format!("Couldn't load {}. Press r to retry.", entry.section.title()),
            Style::default().fg(Color::Red),
        )),
        SectionUiState::Success(movies) if movies.is_empty() => Some(Line::styled(
            "Nothing here yet.",
            Style::default().fg(Color::DarkGray),
        )),
        SectionUiState::Success(_) => None,
    };
    if let Some(message) = message {
        frame.render_widget(Paragraph::new(message).block(block), area);
        return;
    }

    let list_items: Vec<ListItem> = app
        .current_movies()
        .iter()
        .map(|movie| {
            ListItem::new(Line::from(vec![
                Span::styled(movie.title().to_string(), Style::default().fg(Color::White)),
                Span::raw("  "),
                Span::styled(
                    movie.poster_url().to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(list_items)
        .block(block)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = if app.state.is_refreshing {
        Span::styled("Refreshing…", Style::default().fg(Color::Yellow))
    } else if app.state.is_error {
        Span::styled("Refresh failed", Style::default().fg(Color::Red))
    } else {
        match app.updated_at {
            Some(at) => Span::styled(
                format!("Updated {}", at.format("%H:%M:%S")),
                Style::default().fg(Color::Green),
            ),
            None => Span::styled("Waiting for data", Style::default().fg(Color::DarkGray)),
        }
    };

    let mut spans = vec![Span::raw(" "), status];
    if !app.observing {
        spans.push(Span::styled("  paused", Style::default().fg(Color::DarkGray)));
    }
    spans.push(Span::raw("  q: quit  r: refresh  Tab: section  ↑/↓: scroll"));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::home_state::HomeUiState;
    use crate::outcome::Outcome;
    use crate::source::{Genre, Movie, MovieList, Section};

    const SECTIONS: [Section; 3] = [
        Section::TopRated,
        Section::Genre(Genre::Action),
        Section::Genre(Genre::Animation),
    ];

    fn render(app: &mut App) -> String {
        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn loaded_app() -> App {
        let top: MovieList = [Movie::new("Arrival", "p1")].into_iter().collect();
        App::new(Arc::new(HomeUiState::combine(
            &SECTIONS,
            &[Outcome::Success(top), Outcome::Error, Outcome::Loading],
            false,
            false,
        )))
    }

    #[test]
    fn draw_does_not_panic_on_initial_state() {
        let mut app = App::new(Arc::new(HomeUiState::initial(&SECTIONS)));
        let text = render(&mut app);
        assert!(text.contains("Loading"));
        assert!(text.contains("Waiting for data"));
    }

    #[test]
    fn loaded_section_lists_titles_and_poster_urls() {
        let mut app = loaded_app();
        app.select_first();
        let text = render(&mut app);
        assert!(text.contains("Arrival"));
        assert!(text.contains("https://image.tmdb.org/t/p/w342/p1"));
    }

    #[test]
    fn tabs_show_every_section_state() {
        let mut app = loaded_app();
        let text = render(&mut app);
        assert!(text.contains("Top Rated (1)"));
        assert!(text.contains("Action ✗"));
        assert!(text.contains("Animation …"));
    }

    #[test]
    fn failed_section_shows_its_own_error() {
        let mut app = loaded_app();
        app.next_section();
        let text = render(&mut app);
        assert!(text.contains("Couldn't load Action"));
        assert!(text.contains("Top Rated (1)"), "siblings stay visible");
    }

    #[test]
    fn status_bar_reflects_flags() {
        let mut app = App::new(Arc::new(HomeUiState::combine(
            &SECTIONS,
            &[Outcome::Loading, Outcome::Loading, Outcome::Loading],
            true,
            false,
        )));
        assert!(render(&mut app).contains("Refreshing"));

        app.apply_snapshot(Arc::new(HomeUiState::combine(
            &SECTIONS,
            &[Outcome::Loading, Outcome::Loading, Outcome::Loading],
            false,
            true,
        )));
        assert!(render(&mut app).contains("Refresh failed"));
    }

    #[test]
    fn paused_marker_when_not_observing() {
        let mut app = loaded_app();
        app.observing = false;
        assert!(render(&mut app).contains("paused"));
    }
}
