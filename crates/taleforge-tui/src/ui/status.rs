//! Status bar
//!
//! Displays the presentation mode and the server's game progress.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use taleforge_core::{GameProgress, SessionMode};

use crate::App;

fn mode_span(mode: SessionMode) -> Span<'static> {
    let (label, color) = match mode {
        SessionMode::Typing => ("Narrating", Color::Cyan),
        SessionMode::AwaitContinue => ("Floor cleared", Color::Yellow),
        SessionMode::AwaitInput => ("Your turn", Color::Green),
        SessionMode::Loading => ("Loading...", Color::Magenta),
        SessionMode::Completed => ("Completed", Color::Red),
    };
    Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

fn progress_label(progress: Option<GameProgress>) -> &'static str {
    match progress {
        Some(GameProgress::InProgress) => "in progress",
        Some(GameProgress::WaitingForNextFloor) => "waiting for next floor",
        Some(GameProgress::Completed) => "completed",
        None => "unknown",
    }
}

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let info = format!(
        " | Game: {} | Messages: {} | Tab info | Esc to leave",
        progress_label(app.session().game_progress()),
        app.session().history().len()
    );

    let status_line = Line::from(vec![
        Span::raw(" "),
        mode_span(app.mode()),
        Span::styled(info, Style::default().fg(Color::Gray)),
    ]);

    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
