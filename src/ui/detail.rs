use super::image;
use crate::api::PhotoSource;
use crate::app::App;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn render<S: PhotoSource>(app: &App<S>, frame: &mut Frame) {
    let area = frame.area();
    // Nothing handed over: draw an empty screen.
    let dog = match app.nav.selection() {
        Some(d) => d,
        None => return,
    };

    // Layout: header(3) + image(min) + metadata(5) + description(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Percentage(45),
            Constraint::Length(5),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    // ── Header ──
    let header = Paragraph::new(" ← Dog Adopt")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        )
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(header, chunks[0]);

    // ── Full image ──
    image::render(frame, chunks[1], dog.full_url());

    // ── Metadata ──
    let age = dog.display_age(&mut app.age_rng.borrow_mut());
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let meta_lines = vec![
        Line::from(vec![
            Span::styled(" Name: ", label),
            Span::styled(dog.display_name(), value),
        ]),
        Line::from(vec![
            Span::styled(" Age: ", label),
            Span::styled(age.to_string(), value),
        ]),
        Line::from(vec![
            Span::styled(" Likes: ", label),
            Span::styled(dog.display_likes(), Style::default().fg(Color::Yellow)),
        ]),
    ];
    let meta = Paragraph::new(meta_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Dog Detail "),
    );
    frame.render_widget(meta, chunks[2]);

    // ── Description ──
    let description = Paragraph::new(dog.display_description())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" About "),
        );
    frame.render_widget(description, chunks[3]);

    // ── Status bar ──
    let key = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let status_line = Line::from(vec![
        Span::styled(
            " [ Like ] ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" l", key),
        Span::raw(" Like  "),
        Span::styled("Esc", key),
        Span::raw(" Back  "),
        Span::styled("?", key),
        Span::raw(" Help"),
    ]);
    frame.render_widget(Paragraph::new(status_line), chunks[4]);
}
