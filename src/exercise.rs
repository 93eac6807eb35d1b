use crate::gender::GenderedText;
use crate::models::{DialogueLine, MatchPair};
use rand::seq::SliceRandom;
use std::time::{Duration, Instant};

/// How typed answers are compared. Listening and typing exercises forgive case
/// and spacing; fill-in-blank and multiple choice do not. The asymmetry is
/// intentional and matched by the authored content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnswerMode {
    Exact,
    Normalized,
}

/// Lowercase and collapse runs of whitespace (also trims both ends).
pub fn normalize_answer(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn answer_matches(mode: AnswerMode, input: &str, answer: &str, accepted: &[String]) -> bool {
    match mode {
        AnswerMode::Exact => input == answer || accepted.iter().any(|a| a == input),
        AnswerMode::Normalized => {
            let input = normalize_answer(input);
            input == normalize_answer(answer)
                || accepted.iter().any(|a| normalize_answer(a) == input)
        }
    }
}

/// Percentage score as reported to the completion callback.
pub fn score_percent(correct: usize, total: usize) -> u8 {
    (correct as f64 / total as f64 * 100.0).round() as u8
}

#[derive(Debug, PartialEq)]
pub enum Advance {
    Next,
    Complete(u8),
}

/// Shared item-walk state for quiz-style exercises: one check per visit, then
/// advance resets the per-item latch.
#[derive(Debug)]
pub struct QuizState {
    pub total: usize,
    pub current: usize,
    pub checked: bool,
    pub last_correct: bool,
    pub correct: usize,
}

impl QuizState {
    pub fn new(total: usize) -> QuizState {
        QuizState {
            total,
            current: 0,
            checked: false,
            last_correct: false,
            correct: 0,
        }
    }

    /// Record the correctness of the current item. Returns false if the item
    /// was already checked this visit; the result of the first check stands.
    pub fn check(&mut self, is_correct: bool) -> bool {
        if self.checked {
            return false;
        }
        self.checked = true;
        self.last_correct = is_correct;
        if is_correct {
            self.correct += 1;
        }
        true
    }

    pub fn advance(&mut self) -> Advance {
        if self.current + 1 < self.total {
            self.current += 1;
            self.checked = false;
            self.last_correct = false;
            Advance::Next
        } else {
            Advance::Complete(score_percent(self.correct, self.total))
        }
    }
}

/// Flip-through state for vocabulary intro and speaking practice cards.
/// No scoring; the exercise completes once every card has been seen.
#[derive(Debug)]
pub struct CardState {
    pub total: usize,
    pub current: usize,
    pub flipped: bool,
}

impl CardState {
    pub fn new(total: usize) -> CardState {
        CardState {
            total,
            current: 0,
            flipped: false,
        }
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    pub fn advance(&mut self) -> Advance {
        if self.current + 1 < self.total {
            self.current += 1;
            self.flipped = false;
            Advance::Next
        } else {
            Advance::Complete(100)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchSide {
    Hebrew,
    English,
}

#[derive(Debug, PartialEq)]
pub enum MatchOutcome {
    Armed,
    Matched,
    Mismatched,
    /// The final pair locked; fires exactly once.
    Completed,
    Ignored,
}

/// Pair-matching board. The English column is displayed in shuffled order;
/// both sides address pairs by their authored index, so a correct match is
/// index equality. Locked pairs leave the selectable set.
#[derive(Debug)]
pub struct MatchState {
    pub pairs: Vec<MatchPair>,
    pub english_order: Vec<usize>,
    pub armed: Option<(MatchSide, usize)>,
    pub last_mismatch: Option<(usize, usize)>,
    locked: Vec<bool>,
    matched: usize,
    completed: bool,
}

impl MatchState {
    pub fn new(pairs: Vec<MatchPair>) -> MatchState {
        let mut order: Vec<usize> = (0..pairs.len()).collect();
        order.shuffle(&mut rand::thread_rng());
        MatchState::with_order(pairs, order)
    }

    /// Deterministic constructor for tests.
    pub fn with_order(pairs: Vec<MatchPair>, english_order: Vec<usize>) -> MatchState {
        let locked = vec![false; pairs.len()];
        MatchState {
            pairs,
            english_order,
            armed: None,
            last_mismatch: None,
            locked,
            matched: 0,
            completed: false,
        }
    }

    pub fn is_locked(&self, pair_index: usize) -> bool {
        self.locked.get(pair_index).copied().unwrap_or(false)
    }

    pub fn matched_count(&self) -> usize {
        self.matched
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn select(&mut self, side: MatchSide, pair_index: usize) -> MatchOutcome {
        if self.completed || pair_index >= self.pairs.len() || self.is_locked(pair_index) {
            return MatchOutcome::Ignored;
        }
        self.last_mismatch = None;

        match self.armed {
            None => {
                self.armed = Some((side, pair_index));
                MatchOutcome::Armed
            }
            Some((armed_side, _)) if armed_side == side => {
                // Same column again: re-arm on the new entry.
                self.armed = Some((side, pair_index));
                MatchOutcome::Armed
            }
            Some((_, armed_index)) => {
                self.armed = None;
                if armed_index == pair_index {
                    self.locked[pair_index] = true;
                    self.matched += 1;
                    if self.matched == self.pairs.len() {
                        self.completed = true;
                        MatchOutcome::Completed
                    } else {
                        MatchOutcome::Matched
                    }
                } else {
                    self.last_mismatch = Some((armed_index, pair_index));
                    MatchOutcome::Mismatched
                }
            }
        }
    }
}

/// Pause after a correct pick before the next blank is shown, and the longer
/// pause before completion fires on the last blank.
pub const DIALOGUE_ADVANCE_DELAY: Duration = Duration::from_millis(1200);
pub const DIALOGUE_COMPLETE_DELAY: Duration = Duration::from_millis(1800);

#[derive(Debug, PartialEq)]
pub enum DialogueOutcome {
    /// Correct pick; the chosen option should be spoken aloud.
    Correct { speak: GenderedText },
    Incorrect,
    Ignored,
}

#[derive(Debug, PartialEq)]
pub enum DialogueEvent {
    Advanced,
    Completed,
}

/// Walks the blanks of an ordered dialogue script. A correct pick schedules an
/// advance after a fixed display delay; an incorrect pick waits for a manual
/// retry. Deadlines are driven by `tick` from the main loop.
#[derive(Debug)]
pub struct DialogueState {
    pub lines: Vec<DialogueLine>,
    blanks: Vec<usize>,
    blank_pos: usize,
    pub wrong: bool,
    advance_at: Option<Instant>,
    completed: bool,
}

impl DialogueState {
    pub fn new(lines: Vec<DialogueLine>) -> DialogueState {
        let blanks: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.blank.is_some())
            .map(|(i, _)| i)
            .collect();
        let completed = blanks.is_empty();
        DialogueState {
            lines,
            blanks,
            blank_pos: 0,
            wrong: false,
            advance_at: None,
            completed,
        }
    }

    /// Line index of the blank currently being filled.
    pub fn current_blank_line(&self) -> Option<usize> {
        if self.completed {
            None
        } else {
            self.blanks.get(self.blank_pos).copied()
        }
    }

    /// How many script lines are revealed to the learner.
    pub fn revealed_lines(&self) -> usize {
        match self.current_blank_line() {
            Some(line) => line + 1,
            None => self.lines.len(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn awaiting_advance(&self) -> bool {
        self.advance_at.is_some()
    }

    pub fn choose(&mut self, option: usize, now: Instant) -> DialogueOutcome {
        if self.completed || self.advance_at.is_some() {
            return DialogueOutcome::Ignored;
        }
        let Some(line_index) = self.current_blank_line() else {
            return DialogueOutcome::Ignored;
        };
        let blank = self.lines[line_index]
            .blank
            .as_ref()
            .filter(|b| option < b.options.len());
        let Some(blank) = blank else {
            return DialogueOutcome::Ignored;
        };

        if option == blank.correct {
            let speak = blank.options[option].clone();
            self.wrong = false;
            let last = self.blank_pos + 1 == self.blanks.len();
            let delay = if last {
                DIALOGUE_COMPLETE_DELAY
            } else {
                DIALOGUE_ADVANCE_DELAY
            };
            self.advance_at = Some(now + delay);
            DialogueOutcome::Correct { speak }
        } else {
            self.wrong = true;
            DialogueOutcome::Incorrect
        }
    }

    pub fn tick(&mut self, now: Instant) -> Option<DialogueEvent> {
        let due = matches!(self.advance_at, Some(at) if now >= at);
        if !due {
            return None;
        }
        self.advance_at = None;
        if self.blank_pos + 1 == self.blanks.len() {
            self.completed = true;
            Some(DialogueEvent::Completed)
        } else {
            self.blank_pos += 1;
            self.wrong = false;
            Some(DialogueEvent::Advanced)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DialogueBlank;

    fn pairs(n: usize) -> Vec<MatchPair> {
        (0..n)
            .map(|i| MatchPair {
                hebrew: format!("עברית{}", i),
                english: format!("english{}", i),
            })
            .collect()
    }

    #[test]
    fn test_normalize_collapses_and_folds() {
        assert_eq!(normalize_answer("  Shalom   Lecha "), "shalom lecha");
        assert_eq!(normalize_answer(" שלום "), "שלום");
    }

    #[test]
    fn test_padded_hebrew_matches_only_normalized() {
        // The listening exercises forgive padding; fill-in-blank must not.
        assert!(answer_matches(AnswerMode::Normalized, " שלום ", "שלום", &[]));
        assert!(!answer_matches(AnswerMode::Exact, " שלום ", "שלום", &[]));
    }

    #[test]
    fn test_accepted_alternatives() {
        let accepted = vec!["shalom".to_string()];
        assert!(answer_matches(AnswerMode::Exact, "shalom", "שלום", &accepted));
        assert!(answer_matches(
            AnswerMode::Normalized,
            "SHALOM",
            "שלום",
            &accepted
        ));
        assert!(!answer_matches(AnswerMode::Exact, "SHALOM", "שלום", &accepted));
    }

    #[test]
    fn test_score_rounds_half_up() {
        assert_eq!(score_percent(1, 1), 100);
        assert_eq!(score_percent(2, 3), 67);
        assert_eq!(score_percent(1, 3), 33);
        assert_eq!(score_percent(1, 8), 13);
        assert_eq!(score_percent(0, 4), 0);
    }

    #[test]
    fn test_quiz_check_latches_once() {
        let mut quiz = QuizState::new(2);
        assert!(quiz.check(true));
        assert!(!quiz.check(false));
        assert_eq!(quiz.correct, 1);
        assert!(quiz.last_correct);
    }

    #[test]
    fn test_quiz_advance_resets_latch() {
        let mut quiz = QuizState::new(3);
        quiz.check(true);
        assert_eq!(quiz.advance(), Advance::Next);
        assert!(!quiz.checked);
        assert!(!quiz.last_correct);
        assert_eq!(quiz.current, 1);
    }

    #[test]
    fn test_quiz_final_score() {
        let mut quiz = QuizState::new(3);
        quiz.check(true);
        quiz.advance();
        quiz.check(false);
        quiz.advance();
        quiz.check(true);
        assert_eq!(quiz.advance(), Advance::Complete(67));
    }

    #[test]
    fn test_quiz_single_item() {
        let mut quiz = QuizState::new(1);
        quiz.check(true);
        assert_eq!(quiz.advance(), Advance::Complete(100));
    }

    #[test]
    fn test_card_walk_completes_after_last() {
        let mut cards = CardState::new(2);
        cards.flip();
        assert!(cards.flipped);
        assert_eq!(cards.advance(), Advance::Next);
        assert!(!cards.flipped);
        assert_eq!(cards.advance(), Advance::Complete(100));
    }

    #[test]
    fn test_match_arm_then_match() {
        let mut state = MatchState::with_order(pairs(2), vec![0, 1]);
        assert_eq!(state.select(MatchSide::Hebrew, 0), MatchOutcome::Armed);
        assert_eq!(state.select(MatchSide::English, 0), MatchOutcome::Matched);
        assert!(state.is_locked(0));
        assert_eq!(state.matched_count(), 1);
    }

    #[test]
    fn test_match_same_side_rearms() {
        let mut state = MatchState::with_order(pairs(3), vec![0, 1, 2]);
        assert_eq!(state.select(MatchSide::Hebrew, 0), MatchOutcome::Armed);
        assert_eq!(state.select(MatchSide::Hebrew, 1), MatchOutcome::Armed);
        // Cross-side click now checks against pair 1, not pair 0.
        assert_eq!(state.select(MatchSide::English, 1), MatchOutcome::Matched);
        assert!(!state.is_locked(0));
        assert!(state.is_locked(1));
    }

    #[test]
    fn test_match_mismatch_clears_armed() {
        let mut state = MatchState::with_order(pairs(2), vec![1, 0]);
        state.select(MatchSide::Hebrew, 0);
        assert_eq!(state.select(MatchSide::English, 1), MatchOutcome::Mismatched);
        assert_eq!(state.last_mismatch, Some((0, 1)));
        assert_eq!(state.armed, None);
        assert_eq!(state.matched_count(), 0);
    }

    #[test]
    fn test_match_locked_pair_cannot_be_reselected() {
        let mut state = MatchState::with_order(pairs(2), vec![0, 1]);
        state.select(MatchSide::Hebrew, 0);
        state.select(MatchSide::English, 0);
        assert_eq!(state.select(MatchSide::Hebrew, 0), MatchOutcome::Ignored);
        assert_eq!(state.select(MatchSide::English, 0), MatchOutcome::Ignored);
    }

    #[test]
    fn test_match_completion_fires_exactly_once() {
        let mut state = MatchState::with_order(pairs(2), vec![0, 1]);
        state.select(MatchSide::Hebrew, 0);
        assert_eq!(state.select(MatchSide::English, 0), MatchOutcome::Matched);
        state.select(MatchSide::Hebrew, 1);
        assert_eq!(state.select(MatchSide::English, 1), MatchOutcome::Completed);
        assert!(state.is_complete());
        // Any further clicks are dead.
        assert_eq!(state.select(MatchSide::Hebrew, 1), MatchOutcome::Ignored);
    }

    fn dialogue_lines() -> Vec<DialogueLine> {
        vec![
            DialogueLine {
                speaker: "דנה".to_string(),
                text: GenderedText::neutral("בוקר טוב!"),
                blank: None,
            },
            DialogueLine {
                speaker: "You".to_string(),
                text: GenderedText::neutral("___"),
                blank: Some(DialogueBlank {
                    options: vec![
                        GenderedText::neutral("בוקר טוב"),
                        GenderedText::neutral("לילה טוב"),
                    ],
                    correct: 0,
                }),
            },
            DialogueLine {
                speaker: "דנה".to_string(),
                text: GenderedText::neutral("מה שלומך?"),
                blank: None,
            },
            DialogueLine {
                speaker: "You".to_string(),
                text: GenderedText::neutral("___"),
                blank: Some(DialogueBlank {
                    options: vec![
                        GenderedText::neutral("רע"),
                        GenderedText::pair("מצוין, תודה", "מצוינת, תודה"),
                    ],
                    correct: 1,
                }),
            },
        ]
    }

    #[test]
    fn test_dialogue_correct_schedules_advance() {
        let mut state = DialogueState::new(dialogue_lines());
        let now = Instant::now();
        assert_eq!(state.current_blank_line(), Some(1));
        let outcome = state.choose(0, now);
        assert!(matches!(outcome, DialogueOutcome::Correct { .. }));
        assert!(state.awaiting_advance());

        // Not yet due.
        assert_eq!(state.tick(now + Duration::from_millis(100)), None);
        assert_eq!(
            state.tick(now + DIALOGUE_ADVANCE_DELAY),
            Some(DialogueEvent::Advanced)
        );
        assert_eq!(state.current_blank_line(), Some(3));
    }

    #[test]
    fn test_dialogue_incorrect_waits_for_retry() {
        let mut state = DialogueState::new(dialogue_lines());
        let now = Instant::now();
        assert_eq!(state.choose(1, now), DialogueOutcome::Incorrect);
        assert!(state.wrong);
        assert!(!state.awaiting_advance());
        // Retry succeeds.
        assert!(matches!(
            state.choose(0, now),
            DialogueOutcome::Correct { .. }
        ));
    }

    #[test]
    fn test_dialogue_last_blank_completes_after_longer_delay() {
        let mut state = DialogueState::new(dialogue_lines());
        let now = Instant::now();
        state.choose(0, now);
        state.tick(now + DIALOGUE_ADVANCE_DELAY);

        let outcome = state.choose(1, now);
        match outcome {
            DialogueOutcome::Correct { speak } => {
                assert_eq!(
                    speak,
                    GenderedText::pair("מצוין, תודה", "מצוינת, תודה")
                );
            }
            other => panic!("expected correct pick, got {:?}", other),
        }
        assert_eq!(state.tick(now + DIALOGUE_ADVANCE_DELAY), None);
        assert_eq!(
            state.tick(now + DIALOGUE_COMPLETE_DELAY),
            Some(DialogueEvent::Completed)
        );
        assert!(state.is_complete());
        assert_eq!(state.revealed_lines(), 4);
    }

    #[test]
    fn test_dialogue_choices_ignored_while_pending() {
        let mut state = DialogueState::new(dialogue_lines());
        let now = Instant::now();
        state.choose(0, now);
        assert_eq!(state.choose(0, now), DialogueOutcome::Ignored);
    }

    #[test]
    fn test_dialogue_without_blanks_is_complete() {
        let lines = vec![DialogueLine {
            speaker: "דנה".to_string(),
            text: GenderedText::neutral("שלום"),
            blank: None,
        }];
        let state = DialogueState::new(lines);
        assert!(state.is_complete());
        assert_eq!(state.revealed_lines(), 1);
    }
}
