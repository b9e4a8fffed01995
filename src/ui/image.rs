use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Stand-in for a decoded image: a bordered box filling `area` that names
/// the URL it would load. An empty URL gets a placeholder label.
pub fn render(frame: &mut Frame, area: Rect, url: &str) {
    if area.width < 2 || area.height < 2 {
        return;
    }

    let (label, style) = if url.is_empty() {
        ("no image", Style::default().fg(Color::DarkGray))
    } else {
        (url, Style::default().fg(Color::Blue))
    };

    let image = Paragraph::new(label)
        .style(style)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(image, area);
}
