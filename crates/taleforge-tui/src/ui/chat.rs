//! Story area
//!
//! Displays the delivered transcript followed by the message being typed.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};
use taleforge_core::Role;

use super::wrap;
use crate::App;

const BORDER_SIZE: u16 = 2;
const TYPING_CURSOR: &str = "▌";

fn role_style(role: Role) -> Style {
    match role {
        Role::Narrator => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        Role::Player => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        Role::System => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    }
}

fn push_message(items: &mut Vec<ListItem<'static>>, role: Role, text: &str, width: usize) {
    items.push(ListItem::new(Line::from(Span::styled(role.to_string(), role_style(role)))));
    items.extend(wrap(text, width).into_iter().map(|line| ListItem::new(Line::raw(line))));
    items.push(ListItem::new(Line::raw("")));
}

/// Render the story area.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" Session {} ", app.session_id());
    let block = Block::default().borders(Borders::ALL).title(title);
    let width = area.width.saturating_sub(BORDER_SIZE) as usize;

    let mut items = Vec::new();
    for message in app.session().history() {
        push_message(&mut items, message.role(), message.content(), width);
    }

    if let (Some(active), Some(visible)) = (app.session().active_typing(), app.typing_text()) {
        let typed = format!("{visible}{TYPING_CURSOR}");
        push_message(&mut items, active.role(), &typed, width);
    }

    if let Some(epilogue) = app.epilogue() {
        push_message(&mut items, Role::Narrator, epilogue, width);
    }

    if items.is_empty() {
        items.push(ListItem::new(Line::from(Span::styled(
            "The story is loading...",
            Style::default().fg(Color::DarkGray),
        ))));
    }

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    let list = List::new(visible_items).block(block);

    frame.render_widget(list, area);
}
