use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub fn render(frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.area());

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let section = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let key = Style::default().fg(Color::Yellow);
    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("  Global", section)),
        Line::from(vec![Span::styled("    ?         ", key), Span::raw("Toggle this help")]),
        Line::from(vec![Span::styled("    Ctrl+C    ", key), Span::raw("Quit application")]),
        Line::from(""),
        Line::from(Span::styled("  List View", section)),
        Line::from(vec![Span::styled("    ↑/k ↓/j   ", key), Span::raw("Navigate up/down")]),
        Line::from(vec![Span::styled("    g/G       ", key), Span::raw("Jump to first/last dog")]),
        Line::from(vec![Span::styled("    Enter     ", key), Span::raw("Open dog detail")]),
        Line::from(vec![Span::styled("    r         ", key), Span::raw("Fetch again")]),
        Line::from(vec![Span::styled("    q         ", key), Span::raw("Quit application")]),
        Line::from(""),
        Line::from(Span::styled("  Detail View", section)),
        Line::from(vec![Span::styled("    l         ", key), Span::raw("Like")]),
        Line::from(vec![Span::styled("    Esc/q/⌫   ", key), Span::raw("Back to the list")]),
        Line::from(""),
    ];

    let help = Paragraph::new(help_text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help: Keybindings ")
                .title_bottom(
                    Line::from(" Press any key to close ").style(Style::default().fg(Color::DarkGray)),
                ),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(help, area);
}

/// Create a centered rectangle using percentage of parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
