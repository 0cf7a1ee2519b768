//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

mod chat;
mod input;
mod notice;
mod panel;
mod status;
mod suggestions;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};
use taleforge_core::SessionMode;

use crate::App;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    const CHAT_AREA_MIN_HEIGHT: u16 = 3;
    const CHAT_AREA_MIN_WIDTH: u16 = 20;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let suggestions_height = if app.mode() == SessionMode::AwaitInput {
        suggestions::height(app)
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(CHAT_AREA_MIN_HEIGHT),
            Constraint::Length(suggestions_height),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [chat_area, suggestions_area, input_area, status_area] = chunks.as_ref() else {
        return;
    };

    let (chat_area, panel_area) = if app.panel().is_open() {
        let columns = [Constraint::Min(CHAT_AREA_MIN_WIDTH), Constraint::Length(panel::WIDTH)];
        let [chat, side] = Layout::horizontal(columns).areas(*chat_area);
        (chat, Some(side))
    } else {
        (*chat_area, None)
    };

    chat::render(frame, app, chat_area);
    if let Some(area) = panel_area {
        panel::render(frame, app, area);
    }
    if suggestions_height > 0 {
        suggestions::render(frame, app, *suggestions_area);
    }
    input::render(frame, app, *input_area);
    status::render(frame, app, *status_area);

    if let Some(text) = app.notice() {
        notice::render(frame, text);
    }
}

/// Greedy word wrap to `width` columns. Words longer than a line are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut len = 0;
        for word in paragraph.split(' ') {
            let mut word: Vec<char> = word.chars().collect();
            if len > 0 && len + 1 + word.len() > width {
                lines.push(std::mem::take(&mut line));
                len = 0;
            }
            while word.len() > width {
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            if len > 0 {
                line.push(' ');
                len += 1;
            }
            len += word.len();
            line.extend(word);
        }
        lines.push(line);
    }

    lines
}
