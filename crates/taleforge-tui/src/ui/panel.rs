//! Session-info side panel
//!
//! Theme, floor and the character sheet, toggled with Tab.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use taleforge_app::{PANEL_FAILURE, Panel};
use taleforge_client::{PlayerInfo, PlayerInfoResponse};

use crate::App;

/// Columns the panel takes when open.
pub const WIDTH: u16 = 34;

const NOT_SPECIFIED: &str = "Not specified";
const ATTRIBUTES_PER_ROW: usize = 3;

fn heading(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)))
}

fn muted(text: String) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().fg(Color::Gray)))
}

fn player_lines(player: &PlayerInfo, lines: &mut Vec<Line<'static>>) {
    let name = player.player_name.clone().unwrap_or_else(|| "Unnamed Player".to_owned());
    let mut header = vec![Span::styled(
        name,
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )];
    if player.is_ready {
        header.push(Span::styled(" [Ready]", Style::default().fg(Color::Green)));
    }

    lines.push(Line::raw(""));
    lines.push(heading("Player"));
    lines.push(Line::from(header));
    lines.push(Line::from(vec![
        Span::raw("HP: "),
        Span::styled(player.current_health.to_string(), Style::default().fg(Color::Red)),
        Span::raw(format!(" / {}", player.max_health)),
    ]));
    if !player.description.is_empty() {
        lines.push(muted(player.description.clone()));
    }

    let scores: Vec<String> =
        player.attributes().map(|(name, score)| format!("{name} {score:<3}")).collect();
    if scores.is_empty() {
        return;
    }
    lines.push(Line::raw(""));
    lines.push(heading("Attributes"));
    for row in scores.chunks(ATTRIBUTES_PER_ROW) {
        lines.push(muted(row.join(" ")));
    }
}

fn loaded_lines(info: &PlayerInfoResponse) -> Vec<Line<'static>> {
    let session = &info.session_info;
    let theme = session.theme.clone().unwrap_or_else(|| NOT_SPECIFIED.to_owned());
    let floor = session.current_floor.map_or_else(|| NOT_SPECIFIED.to_owned(), |f| f.to_string());

    let mut lines =
        vec![heading("Theme"), muted(theme), heading("Current Floor"), muted(floor)];
    if let Some(player) = &info.player_info {
        player_lines(player, &mut lines);
    }
    lines
}

/// Render the panel. Draws nothing while it is hidden.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.panel() {
        Panel::Hidden => return,
        Panel::Loading => vec![muted("Loading...".to_owned())],
        Panel::Failed => {
            vec![Line::from(Span::styled(PANEL_FAILURE, Style::default().fg(Color::Red)))]
        },
        Panel::Loaded(info) => loaded_lines(info),
    };

    let block = Block::default().borders(Borders::ALL).title(" Session (Tab) ");
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), area);
}
