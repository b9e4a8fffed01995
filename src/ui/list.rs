use super::image;
use crate::api::PhotoSource;
use crate::app::{App, dog_count};
use crate::model::SearchResultItem;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthChar;

const ROW_HEIGHT: u16 = 4;
const THUMB_WIDTH: u16 = 14;

pub fn render<S: PhotoSource>(app: &App<S>, frame: &mut Frame) {
    let area = frame.area();

    // Layout: header(3) + list(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    // ── Header ──
    let fetching = if app.is_fetching() { "  (fetching…)" } else { "" };
    let header_text = format!(" Dog Adopt   [{}]{}", dog_count(app.items.len()), fetching);
    let header = Paragraph::new(header_text)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        )
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(header, chunks[0]);

    // ── List ──
    let position = if app.items.is_empty() {
        " 0 of 0 ".to_string()
    } else {
        format!(" {} of {} ", app.list_selected + 1, app.items.len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Dogs ")
        .title_bottom(Line::from(position).alignment(Alignment::Right));
    let inner = block.inner(chunks[1]);
    frame.render_widget(block, chunks[1]);

    if app.items.is_empty() {
        let empty = Paragraph::new("No dogs to show")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty, inner);
    } else {
        let visible = ((inner.height / ROW_HEIGHT) as usize).max(1);
        let offset = app.list_selected.saturating_sub(visible - 1);
        let mut rng = app.age_rng.borrow_mut();

        for (slot, (i, item)) in app.items.iter().enumerate().skip(offset).take(visible).enumerate() {
            let y = inner.y + slot as u16 * ROW_HEIGHT;
            let height = ROW_HEIGHT.min(inner.bottom().saturating_sub(y));
            if height == 0 {
                break;
            }
            let row = Rect::new(inner.x, y, inner.width, height);
            render_row(frame, row, item, i == app.list_selected, &mut rng);
        }
    }

    // ── Status bar ──
    let key = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let status_line = Line::from(vec![
        Span::styled(" ↑↓", key),
        Span::raw(" Navigate  "),
        Span::styled("Enter", key),
        Span::raw(" Detail  "),
        Span::styled("?", key),
        Span::raw(" Help  "),
        Span::styled("q", key),
        Span::raw(" Quit  "),
        Span::styled(&app.status_msg, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(status_line), chunks[2]);
}

fn render_row(
    frame: &mut Frame,
    area: Rect,
    item: &SearchResultItem,
    selected: bool,
    rng: &mut fastrand::Rng,
) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(THUMB_WIDTH), Constraint::Min(1)])
        .split(area);

    image::render(frame, cols[0], item.thumb_url());

    let style = if selected {
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let marker = if selected { "▸ " } else { "  " };
    let width = (cols[1].width as usize).saturating_sub(2);

    let lines = vec![
        Line::from(vec![
            Span::raw(marker),
            Span::raw(truncate_str(&format!("Name: {}", item.display_name()), width)),
        ]),
        Line::from(format!("  Age: {}", item.display_age(rng))),
        Line::from(format!("  Likes: {}", item.display_likes())),
    ];
    frame.render_widget(Paragraph::new(lines).style(style), cols[1]);
}

/// Truncate a string to `max_width` terminal columns, adding "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    let total: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        used += w;
        result.push(c);
    }
    result.push('…');
    result
}
