use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use ulpan::models::{ApiRequest, ApiResponse, AppState, ChatMessage, ChatRole, ChatState};
use ulpan::review::{Quality, REVIEW_PAGE_LIMIT, ReviewPhase, ReviewSession, Settle};
use ulpan::{AudioPlayer, Gender, LessonSession, db, lessons, logger, net_worker, session, ui};

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("--export-curriculum") {
        let path = args
            .get(2)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("curriculum.json"));
        lessons::export_catalog_to(&path)?;
        println!("Curriculum written to {}", path.display());
        return Ok(());
    }

    logger::init();

    let conn = match db::init_db() {
        Ok(conn) => Some(conn),
        Err(e) => {
            logger::log(&format!("Local database unavailable: {}", e));
            None
        }
    };

    let (request_tx, request_rx) = mpsc::channel();
    let (response_tx, response_rx) = mpsc::channel();
    let playback_gen = Arc::new(AtomicU64::new(0));
    let _worker = net_worker::spawn_net_worker(response_tx, request_rx, Arc::clone(&playback_gen));
    let mut audio = AudioPlayer::new(request_tx.clone(), Arc::clone(&playback_gen));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let catalog = lessons::catalog();
    let mut app_state = AppState::Menu;
    let mut selected_lesson: usize = 0;
    let mut gender = Gender::default();
    let mut lesson_session: Option<LessonSession> = None;
    let mut review_session = ReviewSession::new();
    let mut pending_lesson: Option<String> = None;
    let mut missing_lesson_id = String::new();
    let mut open_input: Option<String> = None;

    let mut recent = conn
        .as_ref()
        .map(|c| db::results::recent_results(c, 5).unwrap_or_default())
        .unwrap_or_default();
    let mut pending_sync = conn
        .as_ref()
        .and_then(|c| db::outbox::count(c).ok())
        .unwrap_or(0);

    loop {
        terminal.draw(|f| match app_state {
            AppState::Menu => ui::draw_menu(
                f,
                &catalog,
                selected_lesson,
                &recent,
                gender,
                pending_sync,
                pending_lesson.as_deref(),
                open_input.as_deref(),
            ),
            AppState::Lesson => {
                if let Some(session) = &lesson_session {
                    ui::draw_lesson(f, session, gender);
                }
            }
            AppState::LessonQuitConfirm => ui::draw_quit_confirmation(f),
            AppState::LessonMissing => ui::draw_lesson_missing(f, &missing_lesson_id),
            AppState::Summary => {
                if let Some(session) = &lesson_session {
                    ui::draw_summary(f, session);
                }
            }
            AppState::Review => ui::draw_review(f, &review_session),
        })?;

        // Timed transitions (dialogue pacing) run off the tick, not key input.
        if app_state == AppState::Lesson
            && let Some(session) = &mut lesson_session
        {
            session.tick(Instant::now());
            if session.completed {
                finish_lesson(session, &conn, &mut recent);
                app_state = AppState::Summary;
            }
        }

        // Worker responses are drained every tick; the channel never blocks
        // the UI thread.
        while let Ok(response) = response_rx.try_recv() {
            match response {
                ApiResponse::LessonLoaded { id, lesson } => {
                    if pending_lesson.as_deref() == Some(id.as_str()) {
                        pending_lesson = None;
                        match lessons::validate_lesson(&lesson) {
                            Ok(()) => {
                                let session = LessonSession::new(*lesson);
                                session.play_current_audio(&mut audio, gender);
                                lesson_session = Some(session);
                                app_state = AppState::Lesson;
                            }
                            Err(e) => {
                                logger::log(&format!("Rejected fetched lesson {}: {}", id, e));
                                missing_lesson_id = id;
                                app_state = AppState::LessonMissing;
                            }
                        }
                    }
                }
                ApiResponse::LessonFailed { id, error } => {
                    if pending_lesson.as_deref() == Some(id.as_str()) {
                        pending_lesson = None;
                        logger::log(&format!("Lesson {} unavailable: {}", id, error));
                        missing_lesson_id = id;
                        app_state = AppState::LessonMissing;
                    }
                }
                ApiResponse::ChatReply { reply } => {
                    if let Some(session) = &mut lesson_session
                        && let Some(chat) = &mut session.chat
                    {
                        chat.waiting = false;
                        chat.messages.push(ChatMessage {
                            role: ChatRole::Assistant,
                            content: reply.response,
                            translation: reply.translation,
                        });
                    }
                }
                ApiResponse::ChatFailed { error } => {
                    if let Some(session) = &mut lesson_session
                        && let Some(chat) = &mut session.chat
                    {
                        chat.waiting = false;
                        chat.messages.push(ChatMessage {
                            role: ChatRole::System,
                            content: format!("The tutor is unreachable ({})", error),
                            translation: None,
                        });
                    }
                }
                ApiResponse::Audio { playback, bytes } => {
                    audio.play_fetched(playback, bytes);
                }
                ApiResponse::AudioFailed {
                    playback,
                    text,
                    language,
                    ..
                } => {
                    audio.fallback(playback, &text, &language);
                }
                ApiResponse::StatsLoaded { stats } => review_session.stats_arrived(stats),
                ApiResponse::StatsFailed { error } => review_session.stats_failed(error),
                ApiResponse::ReviewQueue { items } => review_session.queue_arrived(items),
                ApiResponse::ReviewQueueFailed { error } => review_session.queue_failed(error),
                ApiResponse::QualitySubmitted { outbox_id, .. } => {
                    match outbox_id {
                        Some(id) => {
                            // Background outbox replay; does not touch the
                            // live session.
                            if let Some(conn) = &conn {
                                db::outbox::delete(conn, id).ok();
                                pending_sync = db::outbox::count(conn).unwrap_or(0);
                                review_session.pending_sync = pending_sync;
                            }
                        }
                        None => {
                            settle_review(&mut review_session, &request_tx);
                        }
                    }
                }
                ApiResponse::QualityFailed {
                    word_id,
                    quality,
                    outbox_id,
                    error,
                } => {
                    logger::log(&format!("Rating for {} not saved: {}", word_id, error));
                    match outbox_id {
                        Some(id) => {
                            if let Some(conn) = &conn {
                                db::outbox::bump_attempts(conn, id).ok();
                            }
                        }
                        None => {
                            // Park the rating locally, then advance as if it
                            // had succeeded.
                            if let Some(conn) = &conn {
                                db::outbox::enqueue(conn, &word_id, quality).ok();
                                pending_sync = db::outbox::count(conn).unwrap_or(0);
                                review_session.pending_sync = pending_sync;
                            }
                            settle_review(&mut review_session, &request_tx);
                        }
                    }
                }
            }
        }

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            break;
        }

        match app_state {
            AppState::Menu => {
                if let Some(buffer) = &mut open_input {
                    match key.code {
                        KeyCode::Esc => open_input = None,
                        KeyCode::Backspace => {
                            buffer.pop();
                        }
                        KeyCode::Enter => {
                            let id = buffer.trim().to_string();
                            open_input = None;
                            if !id.is_empty() {
                                if let Some(next) = open_lesson(&id, &mut audio, gender) {
                                    lesson_session = Some(next);
                                    app_state = AppState::Lesson;
                                } else if lessons::is_valid_slug(&id) {
                                    request_tx
                                        .send(ApiRequest::FetchLesson { id: id.clone() })
                                        .ok();
                                    pending_lesson = Some(id);
                                } else {
                                    missing_lesson_id = id;
                                    app_state = AppState::LessonMissing;
                                }
                            }
                        }
                        KeyCode::Char(c) => buffer.push(c),
                        _ => {}
                    }
                    continue;
                }
                match key.code {
                    KeyCode::Up => {
                        selected_lesson = selected_lesson.saturating_sub(1);
                    }
                    KeyCode::Down => {
                        if selected_lesson < catalog.len().saturating_sub(1) {
                            selected_lesson += 1;
                        }
                    }
                    KeyCode::Enter => {
                        if let Some(lesson) = catalog.get(selected_lesson) {
                            let next = LessonSession::new(lesson.clone());
                            next.play_current_audio(&mut audio, gender);
                            lesson_session = Some(next);
                            app_state = AppState::Lesson;
                        }
                    }
                    KeyCode::Char('g') => {
                        gender = gender.toggled();
                    }
                    KeyCode::Char('o') => {
                        open_input = Some(String::new());
                    }
                    KeyCode::Char('r') => {
                        review_session = ReviewSession::new();
                        flush_outbox(&conn, &request_tx);
                        start_review_fetch(&mut review_session, &request_tx);
                        review_session.pending_sync = pending_sync;
                        app_state = AppState::Review;
                    }
                    KeyCode::Char('q') => break,
                    _ => {}
                }
            }
            AppState::Lesson => {
                if let Some(current) = &mut lesson_session {
                    if current.chat.is_some() {
                        let lesson_id = current.lesson.id.clone();
                        if let Some(chat) = &mut current.chat
                            && session::handle_chat_input(chat, key, &request_tx, &lesson_id)
                        {
                            current.chat = None;
                        }
                    } else if key.code == KeyCode::Char('t')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        current.chat = Some(ChatState::default());
                    } else {
                        current.handle_key(key, &mut app_state, &mut audio, gender, Instant::now());
                        if current.completed {
                            finish_lesson(current, &conn, &mut recent);
                            app_state = AppState::Summary;
                        }
                    }
                }
            }
            AppState::LessonQuitConfirm => match key.code {
                KeyCode::Char('y') => {
                    lesson_session = None;
                    audio.stop();
                    app_state = AppState::Menu;
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    app_state = AppState::Lesson;
                }
                _ => {}
            },
            AppState::LessonMissing => match key.code {
                KeyCode::Char('m') | KeyCode::Esc => {
                    app_state = AppState::Menu;
                }
                KeyCode::Char('q') => break,
                _ => {}
            },
            AppState::Summary => match key.code {
                KeyCode::Char('m') | KeyCode::Esc => {
                    lesson_session = None;
                    app_state = AppState::Menu;
                }
                KeyCode::Char('r') => {
                    if let Some(finished) = &lesson_session {
                        let next = LessonSession::new(finished.lesson.clone());
                        next.play_current_audio(&mut audio, gender);
                        lesson_session = Some(next);
                        app_state = AppState::Lesson;
                    }
                }
                KeyCode::Char('q') => break,
                _ => {}
            },
            AppState::Review => match key.code {
                KeyCode::Char('m') | KeyCode::Esc => {
                    app_state = AppState::Menu;
                }
                KeyCode::Enter => {
                    review_session.start_reviewing();
                }
                KeyCode::Char(' ') => {
                    review_session.reveal();
                }
                KeyCode::Char(c) => {
                    if review_session.phase == ReviewPhase::Reviewing
                        && let Some(quality) = Quality::from_key(c)
                        && let Some((word_id, value)) = review_session.rate(quality)
                    {
                        request_tx
                            .send(ApiRequest::SubmitQuality {
                                word_id,
                                quality: value,
                                outbox_id: None,
                            })
                            .ok();
                    }
                }
                _ => {}
            },
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

/// Resolve a lesson id locally; remote ids go through the worker instead.
fn open_lesson(id: &str, audio: &mut AudioPlayer, gender: Gender) -> Option<LessonSession> {
    let lesson = lessons::find_local(id)?;
    let session = LessonSession::new(lesson);
    session.play_current_audio(audio, gender);
    Some(session)
}

fn finish_lesson(
    session: &LessonSession,
    conn: &Option<rusqlite::Connection>,
    recent: &mut Vec<db::results::LessonResult>,
) {
    if let Some(conn) = conn {
        if let Err(e) = db::results::record_result(conn, &session.lesson.id, session.overall_score())
        {
            logger::log(&format!("Could not record lesson result: {}", e));
        }
        *recent = db::results::recent_results(conn, 5).unwrap_or_default();
    }
}

fn start_review_fetch(review: &mut ReviewSession, request_tx: &mpsc::Sender<ApiRequest>) {
    review.begin_fetch();
    request_tx.send(ApiRequest::FetchStats).ok();
    request_tx
        .send(ApiRequest::FetchReview {
            limit: REVIEW_PAGE_LIMIT,
        })
        .ok();
}

/// Advance after a submission settled either way; completion triggers the
/// post-session refetch so freshly rescheduled words can surface.
fn settle_review(review: &mut ReviewSession, request_tx: &mpsc::Sender<ApiRequest>) {
    if review.submission_settled() == Settle::Completed {
        start_review_fetch(review, request_tx);
    }
}

/// Re-post ratings that never reached the backend. Runs when a review
/// session starts; responses carry the outbox row id so success can delete
/// the row without touching the live session.
fn flush_outbox(conn: &Option<rusqlite::Connection>, request_tx: &mpsc::Sender<ApiRequest>) {
    let Some(conn) = conn else {
        return;
    };
    match db::outbox::pending(conn, 50) {
        Ok(ratings) => {
            for rating in ratings {
                request_tx
                    .send(ApiRequest::SubmitQuality {
                        word_id: rating.word_id,
                        quality: rating.quality,
                        outbox_id: Some(rating.id),
                    })
                    .ok();
            }
        }
        Err(e) => logger::log(&format!("Could not read outbox: {}", e)),
    }
}
