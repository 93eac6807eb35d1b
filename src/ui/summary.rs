use crate::session::LessonSession;
use crate::ui::layout::calculate_summary_chunks;
use crate::utils::truncate_width;
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

fn score_color(score: u8) -> Color {
    if score >= 80 {
        Color::Green
    } else if score >= 50 {
        Color::Yellow
    } else {
        Color::Red
    }
}

pub fn draw_summary(f: &mut Frame, session: &LessonSession) {
    let layout = calculate_summary_chunks(f.area());

    let title = Paragraph::new(format!("Lesson Complete - {}", session.lesson.title))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, layout.header_area);

    let mut text = Text::default();
    let overall = session.overall_score();
    text.push_line(Line::from(vec![
        Span::from("Overall score: "),
        Span::styled(
            format!("{}%", overall),
            Style::default()
                .fg(score_color(overall))
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    text.push_line(Line::from(""));

    for (exercise, score) in session.lesson.exercises.iter().zip(&session.scores) {
        text.push_line(Line::from(vec![
            Span::styled(
                format!("{:>3}% ", score),
                Style::default().fg(score_color(*score)),
            ),
            Span::from(truncate_width(exercise.title(), 60)),
        ]));
    }

    let summary = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(summary, layout.content_area);

    let help_text = vec![Line::from(vec![
        Span::styled(
            "m",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Main Menu  "),
        Span::styled(
            "r",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Repeat Lesson  "),
        Span::styled(
            "q",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Quit"),
    ])];
    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}
