use crate::review::{Quality, ReviewPhase, ReviewSession};
use crate::ui::layout::calculate_review_chunks;
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

fn format_due(next_review: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(next_review) {
        Ok(when) => {
            let days = (chrono::Utc::now() - when.with_timezone(&chrono::Utc)).num_days();
            if days > 0 {
                format!("due {} days ago", days)
            } else {
                "due today".to_string()
            }
        }
        Err(_) => next_review.to_string(),
    }
}

pub fn draw_review(f: &mut Frame, session: &ReviewSession) {
    let layout = calculate_review_chunks(f.area());

    let header_text = match session.phase {
        ReviewPhase::Idle | ReviewPhase::Fetching => "Vocabulary Review".to_string(),
        ReviewPhase::Ready => format!("Vocabulary Review - {} due", session.queue.len()),
        ReviewPhase::Reviewing | ReviewPhase::Submitting => format!(
            "Vocabulary Review - {} / {}",
            session.index + 1,
            session.queue.len()
        ),
        ReviewPhase::Complete => "Vocabulary Review - done!".to_string(),
    };
    let header = Paragraph::new(header_text)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    let mut card = Text::default();
    match session.phase {
        ReviewPhase::Idle | ReviewPhase::Fetching => {
            card.push_line(Line::from("Fetching your due words..."));
        }
        ReviewPhase::Ready => {
            if let Some(stats) = &session.stats {
                card.push_line(Line::from(format!("Words tracked: {}", stats.total_words)));
                card.push_line(Line::from(format!(
                    "Due for review: {}",
                    stats.due_for_review
                )));
                card.push_line(Line::from(format!("Learning: {}", stats.learning)));
                card.push_line(Line::from(format!("Mastered: {}", stats.mastered)));
                card.push_line(Line::from(""));
            }
            card.push_line(Line::from("Press Enter to start reviewing."));
        }
        ReviewPhase::Reviewing | ReviewPhase::Submitting => {
            if let Some(word) = session.current() {
                card.push_line(Line::from(""));
                card.push_line(Line::from(Span::styled(
                    word.hebrew.clone(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )));
                if let Some(translit) = &word.transliteration {
                    card.push_line(Line::from(Span::styled(
                        translit.clone(),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                if session.show_answer {
                    card.push_line(Line::from(""));
                    card.push_line(Line::from(Span::styled(
                        word.english.clone(),
                        Style::default().fg(Color::Green),
                    )));
                    if let Some(example) = &word.example_sentence {
                        card.push_line(Line::from(example.clone()));
                    }
                    card.push_line(Line::from(""));
                    card.push_line(Line::from(Span::styled(
                        format!(
                            "{} ({} reviews, {})",
                            word.category,
                            word.repetitions,
                            format_due(&word.next_review)
                        ),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }
        }
        ReviewPhase::Complete => {
            card.push_line(Line::from("All due words reviewed."));
            if let Some(stats) = &session.stats {
                card.push_line(Line::from(format!(
                    "Learning: {}  Mastered: {}",
                    stats.learning, stats.mastered
                )));
            }
            if session.pending_sync > 0 {
                card.push_line(Line::from(Span::styled(
                    format!("{} ratings pending sync", session.pending_sync),
                    Style::default().fg(Color::Yellow),
                )));
            }
        }
    }
    if let Some(error) = &session.last_error {
        card.push_line(Line::from(""));
        card.push_line(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    let card_widget = Paragraph::new(card)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(card_widget, layout.card_area);

    let controls = if matches!(
        session.phase,
        ReviewPhase::Reviewing | ReviewPhase::Submitting
    ) && session.show_answer
    {
        let quality_span = |key: char, quality: Quality, color: Color| {
            vec![
                Span::styled(
                    format!("{}", key),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::from(format!(" {} ({})  ", quality.label(), quality.value())),
            ]
        };
        let mut spans = Vec::new();
        spans.extend(quality_span('1', Quality::Again, Color::Red));
        spans.extend(quality_span('2', Quality::Hard, Color::Yellow));
        spans.extend(quality_span('3', Quality::Good, Color::Green));
        spans.extend(quality_span('4', Quality::Easy, Color::Cyan));
        if session.phase == ReviewPhase::Submitting {
            spans.push(Span::styled(
                "saving...",
                Style::default().fg(Color::DarkGray),
            ));
        }
        vec![Line::from(spans)]
    } else if session.phase == ReviewPhase::Reviewing {
        vec![Line::from(vec![
            Span::styled(
                "Space",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::from(" Show answer"),
        ])]
    } else {
        vec![]
    };
    let controls_widget = Paragraph::new(controls)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("How well did you recall it?"),
        );
    f.render_widget(controls_widget, layout.controls_area);

    let help_text = vec![Line::from(vec![
        Span::styled(
            "m",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Main Menu  "),
        Span::styled(
            "Ctrl+C",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Exit App"),
    ])];
    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}
