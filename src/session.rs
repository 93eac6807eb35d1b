use crate::audio::AudioPlayer;
use crate::exercise::{
    Advance, AnswerMode, CardState, DialogueEvent, DialogueOutcome, DialogueState, MatchOutcome,
    MatchSide, MatchState, QuizState, answer_matches, score_percent,
};
use crate::gender::{Gender, GenderedText};
use crate::models::{
    ApiRequest, AppState, ChatMessage, ChatRole, ChatState, Exercise, Lesson,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::mpsc::Sender;
use std::time::Instant;

/// Per-exercise interaction state. The underlying machines live in
/// `exercise`; this layer adds whatever the keyboard needs (cursor, input
/// buffer, column focus).
#[derive(Debug)]
pub enum ExerciseStage {
    Cards(CardState),
    Choice {
        quiz: QuizState,
        selected: usize,
    },
    Typing {
        quiz: QuizState,
        mode: AnswerMode,
        input: String,
        cursor: usize,
    },
    Match {
        state: MatchState,
        column: MatchSide,
        cursor: usize,
    },
    Dialogue(DialogueState),
}

#[derive(Debug)]
pub struct LessonSession {
    pub lesson: Lesson,
    pub exercise_index: usize,
    pub stage: ExerciseStage,
    pub scores: Vec<u8>,
    pub chat: Option<ChatState>,
    pub completed: bool,
}

enum StageAction {
    None,
    Finish(u8),
}

impl LessonSession {
    pub fn new(lesson: Lesson) -> LessonSession {
        let completed = lesson.exercises.is_empty();
        let stage = lesson
            .exercises
            .first()
            .map(stage_for)
            .unwrap_or(ExerciseStage::Cards(CardState::new(0)));
        LessonSession {
            lesson,
            exercise_index: 0,
            stage,
            scores: Vec::new(),
            chat: None,
            completed,
        }
    }

    pub fn current_exercise(&self) -> &Exercise {
        &self.lesson.exercises[self.exercise_index]
    }

    /// Average of the per-exercise completion scores.
    pub fn overall_score(&self) -> u8 {
        if self.scores.is_empty() {
            return 100;
        }
        let sum: u32 = self.scores.iter().map(|s| *s as u32).sum();
        (sum as f64 / self.scores.len() as f64).round() as u8
    }

    fn finish_exercise(&mut self, score: u8) {
        self.scores.push(score);
        if self.exercise_index + 1 < self.lesson.exercises.len() {
            self.exercise_index += 1;
            self.stage = stage_for(&self.lesson.exercises[self.exercise_index]);
        } else {
            self.completed = true;
        }
    }

    /// Speak the listening prompt of the current item, if the current
    /// exercise has one.
    pub fn play_current_audio(&self, audio: &mut AudioPlayer, gender: Gender) {
        let text: Option<GenderedText> = match (&self.stage, self.current_exercise()) {
            (ExerciseStage::Cards(cards), Exercise::VocabularyIntro { words, .. }) => {
                words.get(cards.current).map(|w| w.hebrew.clone())
            }
            (ExerciseStage::Cards(cards), Exercise::SpeakingPractice { phrases, .. }) => {
                if let Some(phrase) = phrases.get(cards.current) {
                    audio.begin(&phrase.phrase, gender, phrase.audio_url.as_deref());
                }
                return;
            }
            (ExerciseStage::Choice { quiz, .. }, Exercise::ListenAndSelect { items, .. }) => {
                items.get(quiz.current).map(|i| i.prompt.clone())
            }
            (ExerciseStage::Typing { quiz, .. }, Exercise::ListenAndType { items, .. }) => {
                items.get(quiz.current).and_then(|i| i.audio.clone())
            }
            _ => None,
        };
        if let Some(text) = text {
            audio.begin(&text, gender, None);
        }
    }

    /// Drive time-based transitions (the dialogue pauses). Called once per
    /// main-loop tick.
    pub fn tick(&mut self, now: Instant) {
        let finished = match &mut self.stage {
            ExerciseStage::Dialogue(dialogue) => {
                matches!(dialogue.tick(now), Some(DialogueEvent::Completed))
            }
            _ => false,
        };
        if finished {
            self.finish_exercise(100);
        }
    }

    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        app_state: &mut AppState,
        audio: &mut AudioPlayer,
        gender: Gender,
        now: Instant,
    ) {
        if self.chat.is_some() {
            // The popup owns the keyboard while open.
            return;
        }
        if key.code == KeyCode::Esc {
            *app_state = AppState::LessonQuitConfirm;
            return;
        }

        let LessonSession { lesson, exercise_index, stage, .. } = self;
        let exercise = &lesson.exercises[*exercise_index];

        let action = match stage {
            ExerciseStage::Cards(cards) => handle_cards(cards, key, exercise, audio, gender),
            ExerciseStage::Choice { quiz, selected } => {
                handle_choice(quiz, selected, key, exercise, audio, gender)
            }
            ExerciseStage::Typing {
                quiz,
                mode,
                input,
                cursor,
            } => handle_typing(quiz, *mode, input, cursor, key, exercise, audio, gender),
            ExerciseStage::Match {
                state,
                column,
                cursor,
            } => handle_match(state, column, cursor, key),
            ExerciseStage::Dialogue(dialogue) => {
                handle_dialogue(dialogue, key, audio, gender, now)
            }
        };

        if let StageAction::Finish(score) = action {
            self.finish_exercise(score);
        }
    }
}

fn stage_for(exercise: &Exercise) -> ExerciseStage {
    match exercise {
        Exercise::VocabularyIntro { words, .. } => ExerciseStage::Cards(CardState::new(words.len())),
        Exercise::SpeakingPractice { phrases, .. } => {
            ExerciseStage::Cards(CardState::new(phrases.len()))
        }
        Exercise::ListenAndSelect { items, .. } => ExerciseStage::Choice {
            quiz: QuizState::new(items.len()),
            selected: 0,
        },
        Exercise::BuildSentence { items, .. } => ExerciseStage::Typing {
            quiz: QuizState::new(items.len()),
            mode: AnswerMode::Normalized,
            input: String::new(),
            cursor: 0,
        },
        // Fill-in-blank is deliberately strict: no trimming, no case folding.
        Exercise::FillInBlank { items, .. } => ExerciseStage::Typing {
            quiz: QuizState::new(items.len()),
            mode: AnswerMode::Exact,
            input: String::new(),
            cursor: 0,
        },
        Exercise::ListenAndType { items, .. } => ExerciseStage::Typing {
            quiz: QuizState::new(items.len()),
            mode: AnswerMode::Normalized,
            input: String::new(),
            cursor: 0,
        },
        Exercise::MatchPairs { pairs, .. } => ExerciseStage::Match {
            state: MatchState::new(pairs.clone()),
            column: MatchSide::Hebrew,
            cursor: 0,
        },
        Exercise::DialogueCompletion { lines, .. } => {
            ExerciseStage::Dialogue(DialogueState::new(lines.clone()))
        }
    }
}

fn handle_cards(
    cards: &mut CardState,
    key: KeyEvent,
    exercise: &Exercise,
    audio: &mut AudioPlayer,
    gender: Gender,
) -> StageAction {
    match key.code {
        KeyCode::Char(' ') => {
            cards.flip();
            StageAction::None
        }
        KeyCode::Char('p') => {
            play_card_audio(cards.current, exercise, audio, gender);
            StageAction::None
        }
        KeyCode::Enter => match cards.advance() {
            Advance::Next => {
                play_card_audio(cards.current, exercise, audio, gender);
                StageAction::None
            }
            Advance::Complete(score) => StageAction::Finish(score),
        },
        _ => StageAction::None,
    }
}

fn play_card_audio(index: usize, exercise: &Exercise, audio: &mut AudioPlayer, gender: Gender) {
    match exercise {
        Exercise::VocabularyIntro { words, .. } => {
            if let Some(word) = words.get(index) {
                audio.begin(&word.hebrew, gender, None);
            }
        }
        // Prefer a native-speaker recording when the content carries one.
        Exercise::SpeakingPractice { phrases, .. } => {
            if let Some(phrase) = phrases.get(index) {
                audio.begin(&phrase.phrase, gender, phrase.audio_url.as_deref());
            }
        }
        _ => {}
    }
}

fn handle_choice(
    quiz: &mut QuizState,
    selected: &mut usize,
    key: KeyEvent,
    exercise: &Exercise,
    audio: &mut AudioPlayer,
    gender: Gender,
) -> StageAction {
    let Exercise::ListenAndSelect { items, .. } = exercise else {
        return StageAction::None;
    };
    let item = &items[quiz.current];

    match key.code {
        KeyCode::Up => {
            if !quiz.checked && *selected > 0 {
                *selected -= 1;
            }
            StageAction::None
        }
        KeyCode::Down => {
            if !quiz.checked && *selected < item.options.len().saturating_sub(1) {
                *selected += 1;
            }
            StageAction::None
        }
        KeyCode::Char('p') => {
            audio.begin(&item.prompt, gender, None);
            StageAction::None
        }
        KeyCode::Enter => {
            if !quiz.checked {
                // Ordinal comparison: the option index is the answer.
                quiz.check(*selected == item.correct);
                StageAction::None
            } else {
                match quiz.advance() {
                    Advance::Next => {
                        *selected = 0;
                        audio.begin(&items[quiz.current].prompt, gender, None);
                        StageAction::None
                    }
                    Advance::Complete(score) => StageAction::Finish(score),
                }
            }
        }
        _ => StageAction::None,
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_typing(
    quiz: &mut QuizState,
    mode: AnswerMode,
    input: &mut String,
    cursor: &mut usize,
    key: KeyEvent,
    exercise: &Exercise,
    audio: &mut AudioPlayer,
    gender: Gender,
) -> StageAction {
    let items = match exercise {
        Exercise::BuildSentence { items, .. }
        | Exercise::FillInBlank { items, .. }
        | Exercise::ListenAndType { items, .. } => items,
        _ => return StageAction::None,
    };
    let item = &items[quiz.current];

    if key.code == KeyCode::Char('p') && key.modifiers.contains(KeyModifiers::CONTROL) {
        if let Some(text) = &item.audio {
            audio.begin(text, gender, None);
        }
        return StageAction::None;
    }

    if !quiz.checked {
        match key.code {
            KeyCode::Enter => {
                if !input.trim().is_empty() {
                    quiz.check(answer_matches(mode, input, &item.answer, &item.accepted));
                }
                StageAction::None
            }
            KeyCode::Left => {
                *cursor = cursor.saturating_sub(1);
                StageAction::None
            }
            KeyCode::Right => {
                if *cursor < input.chars().count() {
                    *cursor += 1;
                }
                StageAction::None
            }
            KeyCode::Backspace => {
                if *cursor > 0 {
                    let byte = byte_index(input, *cursor - 1);
                    input.remove(byte);
                    *cursor -= 1;
                }
                StageAction::None
            }
            KeyCode::Char(c) => {
                let byte = byte_index(input, *cursor);
                input.insert(byte, c);
                *cursor += 1;
                StageAction::None
            }
            _ => StageAction::None,
        }
    } else {
        match key.code {
            KeyCode::Enter => match quiz.advance() {
                Advance::Next => {
                    input.clear();
                    *cursor = 0;
                    if let Some(text) = &items[quiz.current].audio {
                        audio.begin(text, gender, None);
                    }
                    StageAction::None
                }
                Advance::Complete(score) => StageAction::Finish(score),
            },
            _ => StageAction::None,
        }
    }
}

/// Byte offset of the nth character; the input buffer holds Hebrew, so
/// char counts and byte counts differ.
fn byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn handle_match(
    state: &mut MatchState,
    column: &mut MatchSide,
    cursor: &mut usize,
    key: KeyEvent,
) -> StageAction {
    let len = state.pairs.len();
    match key.code {
        KeyCode::Up => {
            *cursor = cursor.saturating_sub(1);
            StageAction::None
        }
        KeyCode::Down => {
            if *cursor < len.saturating_sub(1) {
                *cursor += 1;
            }
            StageAction::None
        }
        KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
            *column = match column {
                MatchSide::Hebrew => MatchSide::English,
                MatchSide::English => MatchSide::Hebrew,
            };
            StageAction::None
        }
        KeyCode::Enter => {
            let pair_index = match column {
                MatchSide::Hebrew => *cursor,
                MatchSide::English => state.english_order.get(*cursor).copied().unwrap_or(0),
            };
            match state.select(*column, pair_index) {
                MatchOutcome::Completed => StageAction::Finish(100),
                _ => StageAction::None,
            }
        }
        _ => StageAction::None,
    }
}

fn handle_dialogue(
    dialogue: &mut DialogueState,
    key: KeyEvent,
    audio: &mut AudioPlayer,
    gender: Gender,
    now: Instant,
) -> StageAction {
    if let KeyCode::Char(c) = key.code
        && let Some(option) = c.to_digit(10)
        && option >= 1
    {
        match dialogue.choose(option as usize - 1, now) {
            DialogueOutcome::Correct { speak } => {
                audio.begin(&speak, gender, None);
            }
            DialogueOutcome::Incorrect | DialogueOutcome::Ignored => {}
        }
    }
    StageAction::None
}

/// Keys while the chat popup is open. Returns true when the popup should
/// close.
pub fn handle_chat_input(
    chat: &mut ChatState,
    key: KeyEvent,
    request_tx: &Sender<ApiRequest>,
    lesson_id: &str,
) -> bool {
    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Up => {
            chat.scroll_y = chat.scroll_y.saturating_sub(1);
        }
        KeyCode::Down => {
            chat.scroll_y = chat.scroll_y.saturating_add(1);
        }
        KeyCode::Enter => {
            let message = chat.input_buffer.trim().to_string();
            if !message.is_empty() && !chat.waiting {
                let history = chat.messages.clone();
                chat.messages.push(ChatMessage {
                    role: ChatRole::User,
                    content: message.clone(),
                    translation: None,
                });
                chat.input_buffer.clear();
                chat.waiting = true;
                request_tx
                    .send(ApiRequest::Chat {
                        message,
                        history,
                        lesson_id: Some(lesson_id.to_string()),
                    })
                    .ok();
            }
        }
        KeyCode::Backspace => {
            chat.input_buffer.pop();
        }
        KeyCode::Char(c) => {
            chat.input_buffer.push(c);
        }
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioError, PlaybackSink};
    use crate::lessons;
    use std::sync::Arc;
    use std::sync::atomic::AtomicU64;
    use std::sync::mpsc;

    struct NullSink;

    impl PlaybackSink for NullSink {
        fn play(&mut self, _bytes: Vec<u8>) -> Result<(), AudioError> {
            Ok(())
        }
        fn stop(&mut self) {}
    }

    fn test_audio() -> (AudioPlayer, mpsc::Receiver<ApiRequest>) {
        let (tx, rx) = mpsc::channel();
        let player = AudioPlayer::with_sink(Box::new(NullSink), tx, Arc::new(AtomicU64::new(0)));
        (player, rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn greetings_session() -> LessonSession {
        LessonSession::new(lessons::find_local("essential-greetings").unwrap())
    }

    fn type_str(
        session: &mut LessonSession,
        app_state: &mut AppState,
        audio: &mut AudioPlayer,
        text: &str,
    ) {
        for c in text.chars() {
            session.handle_key(
                key(KeyCode::Char(c)),
                app_state,
                audio,
                Gender::Male,
                Instant::now(),
            );
        }
    }

    #[test]
    fn test_session_starts_on_first_exercise() {
        let session = greetings_session();
        assert_eq!(session.exercise_index, 0);
        assert!(!session.completed);
        assert!(matches!(session.stage, ExerciseStage::Cards(_)));
    }

    #[test]
    fn test_cards_complete_moves_to_next_exercise() {
        let mut session = greetings_session();
        let mut app_state = AppState::Lesson;
        let (mut audio, _rx) = test_audio();

        let total = match session.current_exercise() {
            Exercise::VocabularyIntro { words, .. } => words.len(),
            _ => panic!("expected vocabulary intro first"),
        };
        for _ in 0..total {
            session.handle_key(
                key(KeyCode::Enter),
                &mut app_state,
                &mut audio,
                Gender::Male,
                Instant::now(),
            );
        }

        assert_eq!(session.exercise_index, 1);
        assert_eq!(session.scores, vec![100]);
        assert!(matches!(session.stage, ExerciseStage::Choice { .. }));
    }

    #[test]
    fn test_choice_check_then_advance() {
        let mut session = greetings_session();
        // Skip vocabulary intro.
        let mut app_state = AppState::Lesson;
        let (mut audio, _rx) = test_audio();
        for _ in 0..6 {
            session.handle_key(
                key(KeyCode::Enter),
                &mut app_state,
                &mut audio,
                Gender::Male,
                Instant::now(),
            );
        }
        assert!(matches!(session.stage, ExerciseStage::Choice { .. }));

        // First item: correct option is index 0, already selected.
        session.handle_key(
            key(KeyCode::Enter),
            &mut app_state,
            &mut audio,
            Gender::Male,
            Instant::now(),
        );
        if let ExerciseStage::Choice { quiz, .. } = &session.stage {
            assert!(quiz.checked);
            assert!(quiz.last_correct);
        } else {
            panic!("stage changed unexpectedly");
        }

        // Advance to item 2, pick the wrong option deliberately.
        session.handle_key(
            key(KeyCode::Enter),
            &mut app_state,
            &mut audio,
            Gender::Male,
            Instant::now(),
        );
        session.handle_key(
            key(KeyCode::Enter),
            &mut app_state,
            &mut audio,
            Gender::Male,
            Instant::now(),
        );
        // Second Enter finishes the exercise: 1 of 2 correct.
        session.handle_key(
            key(KeyCode::Enter),
            &mut app_state,
            &mut audio,
            Gender::Male,
            Instant::now(),
        );
        assert_eq!(session.scores.last(), Some(&50));
        assert!(matches!(session.stage, ExerciseStage::Match { .. }));
    }

    #[test]
    fn test_typing_exact_mode_rejects_padding() {
        let lesson = lessons::find_local("essential-greetings").unwrap();
        let fill_blank = lesson
            .exercises
            .iter()
            .position(|e| matches!(e, Exercise::FillInBlank { .. }))
            .unwrap();
        let mut session = LessonSession::new(lesson.clone());
        session.exercise_index = fill_blank;
        session.stage = stage_for(&lesson.exercises[fill_blank]);

        let mut app_state = AppState::Lesson;
        let (mut audio, _rx) = test_audio();

        type_str(&mut session, &mut app_state, &mut audio, " שלום ");
        session.handle_key(
            key(KeyCode::Enter),
            &mut app_state,
            &mut audio,
            Gender::Male,
            Instant::now(),
        );
        if let ExerciseStage::Typing { quiz, .. } = &session.stage {
            assert!(quiz.checked);
            assert!(!quiz.last_correct, "padded input must fail exact matching");
        } else {
            panic!("expected typing stage");
        }
    }

    #[test]
    fn test_typing_normalized_mode_accepts_padding() {
        let lesson = lessons::find_local("essential-greetings").unwrap();
        let listen_type = lesson
            .exercises
            .iter()
            .position(|e| matches!(e, Exercise::ListenAndType { .. }))
            .unwrap();
        let mut session = LessonSession::new(lesson.clone());
        session.exercise_index = listen_type;
        session.stage = stage_for(&lesson.exercises[listen_type]);

        let mut app_state = AppState::Lesson;
        let (mut audio, _rx) = test_audio();

        type_str(&mut session, &mut app_state, &mut audio, " שלום ");
        session.handle_key(
            key(KeyCode::Enter),
            &mut app_state,
            &mut audio,
            Gender::Male,
            Instant::now(),
        );
        if let ExerciseStage::Typing { quiz, .. } = &session.stage {
            assert!(quiz.checked);
            assert!(quiz.last_correct, "padding is forgiven for listening items");
        } else {
            panic!("expected typing stage");
        }
    }

    #[test]
    fn test_typing_empty_input_is_not_checked() {
        let lesson = lessons::find_local("cafe-ordering").unwrap();
        let mut session = LessonSession::new(lesson.clone());
        session.exercise_index = 2;
        session.stage = stage_for(&lesson.exercises[2]);

        let mut app_state = AppState::Lesson;
        let (mut audio, _rx) = test_audio();
        session.handle_key(
            key(KeyCode::Enter),
            &mut app_state,
            &mut audio,
            Gender::Male,
            Instant::now(),
        );
        if let ExerciseStage::Typing { quiz, .. } = &session.stage {
            assert!(!quiz.checked);
        } else {
            panic!("expected typing stage");
        }
    }

    #[test]
    fn test_esc_asks_for_quit_confirmation() {
        let mut session = greetings_session();
        let mut app_state = AppState::Lesson;
        let (mut audio, _rx) = test_audio();
        session.handle_key(
            key(KeyCode::Esc),
            &mut app_state,
            &mut audio,
            Gender::Male,
            Instant::now(),
        );
        assert_eq!(app_state, AppState::LessonQuitConfirm);
    }

    #[test]
    fn test_dialogue_correct_choice_triggers_gendered_audio() {
        let lesson = lessons::find_local("essential-greetings").unwrap();
        let dialogue = lesson
            .exercises
            .iter()
            .position(|e| matches!(e, Exercise::DialogueCompletion { .. }))
            .unwrap();
        let mut session = LessonSession::new(lesson.clone());
        session.exercise_index = dialogue;
        session.stage = stage_for(&lesson.exercises[dialogue]);

        let mut app_state = AppState::Lesson;
        let (mut audio, rx) = test_audio();

        session.handle_key(
            key(KeyCode::Char('1')),
            &mut app_state,
            &mut audio,
            Gender::Female,
            Instant::now(),
        );
        match rx.try_recv().unwrap() {
            ApiRequest::Synthesize { text, gender, .. } => {
                assert_eq!(text, "בוקר טוב");
                assert_eq!(gender, Gender::Female);
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_dialogue_completion_finishes_exercise() {
        let lesson = lessons::find_local("essential-greetings").unwrap();
        let dialogue = lesson
            .exercises
            .iter()
            .position(|e| matches!(e, Exercise::DialogueCompletion { .. }))
            .unwrap();
        let mut session = LessonSession::new(lesson.clone());
        session.exercise_index = dialogue;
        session.stage = stage_for(&lesson.exercises[dialogue]);

        let mut app_state = AppState::Lesson;
        let (mut audio, _rx) = test_audio();
        let start = Instant::now();

        // First blank: option 1 is correct.
        session.handle_key(key(KeyCode::Char('1')), &mut app_state, &mut audio, Gender::Male, start);
        session.tick(start + crate::exercise::DIALOGUE_ADVANCE_DELAY);
        // Second blank: option 2 is correct.
        session.handle_key(key(KeyCode::Char('2')), &mut app_state, &mut audio, Gender::Male, start);
        session.tick(start + crate::exercise::DIALOGUE_COMPLETE_DELAY * 2);

        // Dialogue is the next-to-last exercise; the session moved on.
        assert!(matches!(session.stage, ExerciseStage::Typing { .. }));
        assert_eq!(session.scores.last(), Some(&100));
    }

    #[test]
    fn test_overall_score_averages_exercises() {
        let mut session = greetings_session();
        session.scores = vec![100, 50, 67];
        assert_eq!(session.overall_score(), 72);
    }

    #[test]
    fn test_chat_send_posts_history_without_new_message() {
        let (tx, rx) = mpsc::channel();
        let mut chat = ChatState::default();
        chat.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: "שלום! במה נתרגל היום?".to_string(),
            translation: None,
        });
        chat.input_buffer = "מה זה בבקשה?".to_string();

        let closed = handle_chat_input(
            &mut chat,
            key(KeyCode::Enter),
            &tx,
            "essential-greetings",
        );
        assert!(!closed);
        assert!(chat.waiting);
        assert_eq!(chat.messages.len(), 2);

        match rx.try_recv().unwrap() {
            ApiRequest::Chat {
                message,
                history,
                lesson_id,
            } => {
                assert_eq!(message, "מה זה בבקשה?");
                assert_eq!(history.len(), 1);
                assert_eq!(lesson_id.as_deref(), Some("essential-greetings"));
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_chat_ignores_send_while_waiting() {
        let (tx, rx) = mpsc::channel();
        let mut chat = ChatState {
            waiting: true,
            input_buffer: "עוד שאלה".to_string(),
            ..Default::default()
        };
        handle_chat_input(&mut chat, key(KeyCode::Enter), &tx, "cafe-ordering");
        assert!(rx.try_recv().is_err());
        assert_eq!(chat.input_buffer, "עוד שאלה");
    }

    #[test]
    fn test_chat_esc_closes() {
        let (tx, _rx) = mpsc::channel();
        let mut chat = ChatState::default();
        assert!(handle_chat_input(&mut chat, key(KeyCode::Esc), &tx, "x"));
    }
}
