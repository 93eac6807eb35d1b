use crate::exercise::{MatchSide, QuizState};
use crate::gender::{Gender, resolve};
use crate::models::Exercise;
use crate::session::{ExerciseStage, LessonSession};
use crate::ui::layout::calculate_exercise_chunks;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

pub fn draw_lesson(f: &mut Frame, session: &LessonSession, gender: Gender) {
    let layout = calculate_exercise_chunks(f.area());
    let exercise = session.current_exercise();

    let progress = format!(
        "{} - Exercise {} / {} - {}",
        session.lesson.title,
        session.exercise_index + 1,
        session.lesson.exercises.len(),
        exercise.title()
    );
    let header = Paragraph::new(progress)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    match (&session.stage, exercise) {
        (ExerciseStage::Cards(cards), _) => {
            draw_cards(f, &layout, cards.current, cards.flipped, exercise, gender);
        }
        (ExerciseStage::Choice { quiz, selected }, Exercise::ListenAndSelect { items, .. }) => {
            draw_choice(f, &layout, quiz, *selected, items);
        }
        (
            ExerciseStage::Typing { quiz, input, .. },
            Exercise::BuildSentence { items, .. }
            | Exercise::FillInBlank { items, .. }
            | Exercise::ListenAndType { items, .. },
        ) => {
            draw_typing(f, &layout, quiz, input, items);
        }
        (ExerciseStage::Match { state, column, cursor }, Exercise::MatchPairs { .. }) => {
            draw_match(f, &layout, state, *column, *cursor);
        }
        (ExerciseStage::Dialogue(dialogue), Exercise::DialogueCompletion { .. }) => {
            draw_dialogue(f, &layout, dialogue, gender);
        }
        _ => {}
    }

    draw_stage_help(f, &layout, &session.stage);

    if let Some(chat) = &session.chat {
        super::chat::draw_chat_popup(f, chat, &session.lesson.title);
    }
}

fn draw_cards(
    f: &mut Frame,
    layout: &crate::ui::layout::ExerciseLayout,
    index: usize,
    flipped: bool,
    exercise: &Exercise,
    gender: Gender,
) {
    let (front, transliteration, back, count) = match exercise {
        Exercise::VocabularyIntro { words, .. } => {
            let word = &words[index];
            (
                resolve(&word.hebrew, gender).to_string(),
                word.transliteration.clone(),
                word.english.clone(),
                words.len(),
            )
        }
        Exercise::SpeakingPractice { phrases, .. } => {
            let phrase = &phrases[index];
            (
                resolve(&phrase.phrase, gender).to_string(),
                phrase.transliteration.clone(),
                phrase.english.clone(),
                phrases.len(),
            )
        }
        _ => return,
    };

    let mut text = Text::default();
    text.push_line(Line::from(""));
    text.push_line(Line::from(Span::styled(
        front,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )));
    if let Some(translit) = transliteration {
        text.push_line(Line::from(Span::styled(
            translit,
            Style::default().fg(Color::DarkGray),
        )));
    }
    if flipped {
        text.push_line(Line::from(""));
        text.push_line(Line::from(Span::styled(
            back,
            Style::default().fg(Color::Green),
        )));
    }

    let card = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Card {} / {}", index + 1, count)),
        );
    f.render_widget(card, layout.content_area);
}

fn draw_choice(
    f: &mut Frame,
    layout: &crate::ui::layout::ExerciseLayout,
    quiz: &QuizState,
    selected: usize,
    items: &[crate::models::ChoiceItem],
) {
    let item = &items[quiz.current];

    let options: Vec<ListItem> = item
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let style = if quiz.checked && i == item.correct {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if quiz.checked && i == selected {
                Style::default().fg(Color::Red)
            } else if i == selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!("{}. {}", i + 1, option)).style(style)
        })
        .collect();

    let list = List::new(options).block(
        Block::default().borders(Borders::ALL).title(format!(
            "Item {} / {} - what did you hear?",
            quiz.current + 1,
            quiz.total
        )),
    );
    f.render_widget(list, layout.content_area);

    draw_check_feedback(f, layout, quiz, None);
}

fn draw_typing(
    f: &mut Frame,
    layout: &crate::ui::layout::ExerciseLayout,
    quiz: &QuizState,
    input: &str,
    items: &[crate::models::PromptItem],
) {
    let item = &items[quiz.current];

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(layout.content_area);

    let prompt = Paragraph::new(item.prompt.as_str())
        .wrap(Wrap { trim: true })
        .block(
            Block::default().borders(Borders::ALL).title(format!(
                "Item {} / {}",
                quiz.current + 1,
                quiz.total
            )),
        );
    f.render_widget(prompt, chunks[0]);

    let answer = Paragraph::new(if input.is_empty() && !quiz.checked {
        "[Type your answer...]"
    } else {
        input
    })
    .block(Block::default().borders(Borders::ALL).title("Your Answer"));
    f.render_widget(answer, chunks[1]);

    draw_check_feedback(f, layout, quiz, Some(item.answer.as_str()));
}

fn draw_check_feedback(
    f: &mut Frame,
    layout: &crate::ui::layout::ExerciseLayout,
    quiz: &QuizState,
    correct_answer: Option<&str>,
) {
    let mut text = Text::default();
    if quiz.checked {
        if quiz.last_correct {
            text.push_line(Line::from(Span::styled(
                "Correct!",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )));
        } else {
            text.push_line(Line::from(Span::styled(
                "Not quite.",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
            if let Some(answer) = correct_answer {
                text.push_line(Line::from(format!("Answer: {}", answer)));
            }
        }
    }
    let feedback = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
    f.render_widget(feedback, layout.feedback_area);
}

fn draw_match(
    f: &mut Frame,
    layout: &crate::ui::layout::ExerciseLayout,
    state: &crate::exercise::MatchState,
    column: MatchSide,
    cursor: usize,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout.content_area);

    let hebrew_items: Vec<ListItem> = state
        .pairs
        .iter()
        .enumerate()
        .map(|(i, pair)| {
            let style = match_entry_style(state, column, cursor, MatchSide::Hebrew, i, i);
            ListItem::new(pair.hebrew.clone()).style(style)
        })
        .collect();
    let hebrew_list = List::new(hebrew_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("עברית")
            .border_style(column_style(column == MatchSide::Hebrew)),
    );
    f.render_widget(hebrew_list, chunks[0]);

    let english_items: Vec<ListItem> = state
        .english_order
        .iter()
        .enumerate()
        .map(|(row, &pair_index)| {
            let style = match_entry_style(state, column, cursor, MatchSide::English, row, pair_index);
            ListItem::new(state.pairs[pair_index].english.clone()).style(style)
        })
        .collect();
    let english_list = List::new(english_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("English")
            .border_style(column_style(column == MatchSide::English)),
    );
    f.render_widget(english_list, chunks[1]);

    let mut text = Text::default();
    text.push_line(Line::from(format!(
        "Matched {} / {}",
        state.matched_count(),
        state.pairs.len()
    )));
    if state.last_mismatch.is_some() {
        text.push_line(Line::from(Span::styled(
            "Not a pair, try again",
            Style::default().fg(Color::Red),
        )));
    }
    let feedback = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
    f.render_widget(feedback, layout.feedback_area);
}

fn match_entry_style(
    state: &crate::exercise::MatchState,
    focused_column: MatchSide,
    cursor: usize,
    this_column: MatchSide,
    row: usize,
    pair_index: usize,
) -> Style {
    if state.is_locked(pair_index) {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::DIM)
    } else if state.armed == Some((this_column, pair_index)) {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else if focused_column == this_column && cursor == row {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    }
}

fn column_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_dialogue(
    f: &mut Frame,
    layout: &crate::ui::layout::ExerciseLayout,
    dialogue: &crate::exercise::DialogueState,
    gender: Gender,
) {
    let mut text = Text::default();
    let revealed = dialogue.revealed_lines();
    let current_blank = dialogue.current_blank_line();

    for (i, line) in dialogue.lines.iter().take(revealed).enumerate() {
        if Some(i) == current_blank {
            text.push_line(Line::from(vec![
                Span::styled(
                    format!("{}: ", line.speaker),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled("____", Style::default().fg(Color::Yellow)),
            ]));
            if let Some(blank) = &line.blank {
                text.push_line(Line::from(""));
                for (j, option) in blank.options.iter().enumerate() {
                    text.push_line(Line::from(format!(
                        "  {}. {}",
                        j + 1,
                        resolve(option, gender)
                    )));
                }
            }
        } else {
            text.push_line(Line::from(vec![
                Span::styled(
                    format!("{}: ", line.speaker),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::from(resolve(&line.text, gender).to_string()),
            ]));
        }
    }

    let script = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Dialogue"));
    f.render_widget(script, layout.content_area);

    let mut feedback = Text::default();
    if dialogue.wrong {
        feedback.push_line(Line::from(Span::styled(
            "Try again",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    } else if dialogue.awaiting_advance() {
        feedback.push_line(Line::from(Span::styled(
            "!נכון",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
    }
    let feedback_widget = Paragraph::new(feedback).block(Block::default().borders(Borders::ALL));
    f.render_widget(feedback_widget, layout.feedback_area);
}

fn draw_stage_help(
    f: &mut Frame,
    layout: &crate::ui::layout::ExerciseLayout,
    stage: &ExerciseStage,
) {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let mut spans = match stage {
        ExerciseStage::Cards(_) => vec![
            Span::styled("Space", key_style),
            Span::from(" Flip  "),
            Span::styled("p", key_style),
            Span::from(" Play  "),
            Span::styled("Enter", key_style),
            Span::from(" Next  "),
        ],
        ExerciseStage::Choice { .. } => vec![
            Span::styled("↑/↓", key_style),
            Span::from(" Select  "),
            Span::styled("p", key_style),
            Span::from(" Replay  "),
            Span::styled("Enter", key_style),
            Span::from(" Check / Next  "),
        ],
        ExerciseStage::Typing { .. } => vec![
            Span::styled("Enter", key_style),
            Span::from(" Check / Next  "),
            Span::styled("Ctrl+P", key_style),
            Span::from(" Replay  "),
        ],
        ExerciseStage::Match { .. } => vec![
            Span::styled("↑/↓", key_style),
            Span::from(" Move  "),
            Span::styled("Tab", key_style),
            Span::from(" Switch column  "),
            Span::styled("Enter", key_style),
            Span::from(" Pick  "),
        ],
        ExerciseStage::Dialogue(_) => vec![
            Span::styled("1-9", key_style),
            Span::from(" Choose reply  "),
        ],
    };
    spans.extend([
        Span::styled("Ctrl+T", key_style),
        Span::from(" Tutor  "),
        Span::styled("Esc", key_style),
        Span::from(" Quit to Menu"),
    ]);

    let help = Paragraph::new(vec![Line::from(spans)])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}

pub fn draw_quit_confirmation(f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(5)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new("Quit to Menu")
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let message = Paragraph::new("Leave this lesson? Progress in it is discarded.")
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, chunks[1]);

    let help_text = vec![Line::from(vec![
        Span::styled(
            "y",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Yes (Return to Menu)  "),
        Span::styled(
            "n",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::from(" No (Continue Lesson)  "),
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
    f.render_widget(help, chunks[2]);
}
