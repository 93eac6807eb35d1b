use crate::db::results::LessonResult;
use crate::gender::Gender;
use crate::models::Lesson;
use crate::utils::truncate_width;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

fn format_result_date(timestamp: u64) -> String {
    use std::time::{Duration, UNIX_EPOCH};

    let completed = UNIX_EPOCH + Duration::from_secs(timestamp);
    let datetime: chrono::DateTime<chrono::Local> = completed.into();

    let today = chrono::Local::now().date_naive();
    let result_date = datetime.date_naive();

    if result_date == today {
        format!("Today {}", datetime.format("%H:%M"))
    } else if result_date == today - chrono::Duration::days(1) {
        format!("Yesterday {}", datetime.format("%H:%M"))
    } else {
        result_date.format("%Y-%m-%d").to_string()
    }
}

fn format_result_item(result: &LessonResult) -> String {
    format!(
        "{} - {} ({}%)",
        format_result_date(result.completed_at),
        truncate_width(&result.lesson_id, 32),
        result.score
    )
}

#[allow(clippy::too_many_arguments)]
pub fn draw_menu(
    f: &mut Frame,
    lessons: &[Lesson],
    selected_index: usize,
    results: &[LessonResult],
    gender: Gender,
    pending_sync: usize,
    loading: Option<&str>,
    open_input: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Min(4),
            Constraint::Length(4),
        ])
        .split(f.area());

    let title = Paragraph::new("Ulpan - Hebrew Practice")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let lesson_items: Vec<ListItem> = lessons
        .iter()
        .enumerate()
        .map(|(i, lesson)| {
            let text = format!("{} ({})", lesson.title, lesson.level);
            let style = if i == selected_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(text).style(style)
        })
        .collect();

    let lessons_title = match loading {
        Some(id) => format!("Lessons (loading {}...)", id),
        None => "Lessons".to_string(),
    };
    let lesson_list = List::new(lesson_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(lessons_title),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_widget(lesson_list, chunks[1]);

    let result_items: Vec<ListItem> = if results.is_empty() {
        vec![ListItem::new("No completed lessons yet").style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )]
    } else {
        results
            .iter()
            .map(|result| ListItem::new(format_result_item(result)))
            .collect()
    };
    let results_list = List::new(result_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Recent Results"),
    );
    f.render_widget(results_list, chunks[2]);

    let footer_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(chunks[3]);

    let mut settings = vec![Line::from(format!("Speaking as: {}", gender))];
    if pending_sync > 0 {
        settings.push(Line::from(Span::styled(
            format!("{} ratings pending sync", pending_sync),
            Style::default().fg(Color::Yellow),
        )));
    }
    let settings_box = Paragraph::new(settings)
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL).title("Settings"));
    f.render_widget(settings_box, footer_chunks[0]);

    let help_text = vec![Line::from(vec![
        Span::styled(
            "↑/↓",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Navigate  "),
        Span::styled(
            "Enter",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Start  "),
        Span::styled(
            "r",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Review  "),
        Span::styled(
            "g",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Gender  "),
        Span::styled(
            "o",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Open by id  "),
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
    f.render_widget(help, footer_chunks[1]);

    if let Some(buffer) = open_input {
        draw_open_input(f, buffer);
    }
}

fn draw_open_input(f: &mut Frame, buffer: &str) {
    let area = f.area();
    let width = (area.width / 2).max(30).min(area.width);
    let popup = ratatui::layout::Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + area.height / 2 - 1,
        width,
        height: 3,
    };

    f.render_widget(Clear, popup);
    let input = Paragraph::new(if buffer.is_empty() {
        "[lesson id]".to_string()
    } else {
        buffer.to_string()
    })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Open lesson by id "),
    );
    f.render_widget(input, popup);
}

/// Shown when a lesson id resolves neither locally nor remotely.
pub fn draw_lesson_missing(f: &mut Frame, lesson_id: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(5)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new("Lesson Not Found")
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let message = Paragraph::new(vec![
        Line::from("Lesson not found"),
        Line::from(Span::styled(
            format!("id: {}", lesson_id),
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, chunks[1]);

    let help_text = vec![Line::from(vec![
        Span::styled(
            "m",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Main Menu  "),
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
    f.render_widget(help, chunks[2]);
}
