//! Blocking notice popup.

use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const POPUP_WIDTH_PERCENT: u16 = 60;
const POPUP_HEIGHT: u16 = 7;

fn centered(area: Rect) -> Rect {
    let [row] =
        Layout::vertical([Constraint::Length(POPUP_HEIGHT)]).flex(Flex::Center).areas(area);
    let [cell] = Layout::horizontal([Constraint::Percentage(POPUP_WIDTH_PERCENT)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

/// Render `text` over everything else until dismissed.
pub fn render(frame: &mut Frame, text: &str) {
    let area = centered(frame.area());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Notice ")
        .border_style(Style::default().fg(Color::Red));

    let body = vec![
        Line::raw(text.to_owned()),
        Line::raw(""),
        Line::from(Span::styled("Enter to dismiss", Style::default().fg(Color::DarkGray))),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(body).wrap(Wrap { trim: true }).block(block), area);
}
