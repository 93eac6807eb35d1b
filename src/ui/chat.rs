use crate::models::{ChatRole, ChatState};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn draw_chat_popup(f: &mut Frame, chat: &ChatState, lesson_title: &str) {
    let area = centered_rect(80, 85, f.area());

    f.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    let mut lines: Vec<Line> = Vec::new();
    for msg in &chat.messages {
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )));
                for line in msg.content.lines() {
                    lines.push(Line::from(format!("  {}", line)));
                }
                lines.push(Line::from(""));
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    "Tutor:",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )));
                let rendered = tui_markdown::from_str(&msg.content);
                for line in rendered.lines {
                    let mut indented: Vec<Span> = vec![Span::from("  ")];
                    indented.extend(line.spans);
                    lines.push(Line::from(indented));
                }
                if let Some(translation) = &msg.translation {
                    lines.push(Line::from(Span::styled(
                        format!("  ({})", translation),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                lines.push(Line::from(""));
            }
            ChatRole::System => {
                lines.push(Line::from(Span::styled(
                    msg.content.clone(),
                    Style::default().fg(Color::DarkGray),
                )));
                lines.push(Line::from(""));
            }
        }
    }
    if chat.waiting {
        lines.push(Line::from(Span::styled(
            "The tutor is typing...",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let transcript = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .scroll((chat.scroll_y, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Tutor - {} ", lesson_title)),
        );
    f.render_widget(transcript, chunks[0]);

    let input = Paragraph::new(if chat.input_buffer.is_empty() {
        "[Ask your tutor anything...]"
    } else {
        chat.input_buffer.as_str()
    })
    .block(Block::default().borders(Borders::ALL).title("Message"));
    f.render_widget(input, chunks[1]);

    let help = Line::from(vec![
        Span::styled(
            "Enter",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Send  "),
        Span::styled(
            "↑/↓",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Scroll  "),
        Span::styled(
            "Esc",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Close"),
    ]);
    f.render_widget(Paragraph::new(help), chunks[2]);
}
