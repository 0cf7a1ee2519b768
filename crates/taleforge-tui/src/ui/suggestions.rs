//! Suggested actions
//!
//! Lists the actions offered with the last message. Up/Down copies one into
//! the draft.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use crate::App;

const BORDER_SIZE: u16 = 2;
const SELECTED_PREFIX: &str = "> ";
const UNSELECTED_PREFIX: &str = "  ";

/// Rows needed to list every suggestion.
pub fn height(app: &App) -> u16 {
    u16::try_from(app.suggestions().count()).unwrap_or(u16::MAX).saturating_add(BORDER_SIZE)
}

/// Render the suggestions list.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Suggestions (Up/Down) ");

    let items: Vec<ListItem> = app
        .suggestions()
        .enumerate()
        .map(|(index, suggestion)| {
            let (prefix, style) = if app.selected_suggestion() == Some(index) {
                (SELECTED_PREFIX, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                (UNSELECTED_PREFIX, Style::default().fg(Color::Gray))
            };
            ListItem::new(Line::from(Span::styled(format!("{prefix}{suggestion}"), style)))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
