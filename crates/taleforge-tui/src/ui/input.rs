//! Input line
//!
//! Displays the draft with cursor while an action is expected, otherwise a
//! hint for what Enter does.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};
use taleforge_core::SessionMode;

use crate::App;

const PROMPT_WIDTH: u16 = 3; // "> "
const INPUT_LINE_OFFSET_Y: u16 = 1; // inside top border
const RIGHT_PADDING: u16 = 1; // inside right border

fn hint(mode: SessionMode) -> &'static str {
    match mode {
        SessionMode::Typing => "Enter to skip",
        SessionMode::AwaitContinue => "Enter to continue to the next floor",
        SessionMode::Loading => "Waiting for the story...",
        SessionMode::Completed => "The story is over. Esc to leave",
        SessionMode::AwaitInput => "",
    }
}

/// Render the input line.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let mut block = Block::default().borders(Borders::ALL);
    if let Some(error) = app.input_error() {
        block = block
            .title(format!(" {error} "))
            .title_style(Style::default().fg(Color::Red))
            .border_style(Style::default().fg(Color::Red));
    }

    if app.mode() != SessionMode::AwaitInput {
        let paragraph = Paragraph::new(hint(app.mode()))
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let input_text = format!("> {}", app.draft());
    let paragraph =
        Paragraph::new(input_text).style(Style::default().fg(Color::White)).block(block);

    frame.render_widget(paragraph, area);

    if app.notice().is_some() {
        return;
    }

    let cursor_y = area.y.saturating_add(INPUT_LINE_OFFSET_Y);
    frame.set_cursor_position((cursor_column(area, app.cursor()), cursor_y));
}

/// Screen column of a draft cursor `chars` characters in, clamped to the box.
fn cursor_column(area: Rect, chars: usize) -> u16 {
    let available_width = area.width.saturating_sub(PROMPT_WIDTH + RIGHT_PADDING);
    let cursor_offset = u16::try_from(chars).unwrap_or(u16::MAX).min(available_width);

    let cursor_x = area.x.saturating_add(PROMPT_WIDTH).saturating_add(cursor_offset);
    let max_x = area.x.saturating_add(area.width).saturating_sub(RIGHT_PADDING);
    cursor_x.min(max_x)
}
