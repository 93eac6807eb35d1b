use crate::models::{ReviewStats, VocabularyItem};

/// Page size for the due-word fetch.
pub const REVIEW_PAGE_LIMIT: usize = 20;

/// Quality of recall as submitted to the scheduler. The scale is 1/3/4/5 with
/// a deliberate gap at 2; the backend's bucketing depends on these exact
/// values, so they are fixed here rather than derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Again,
    Hard,
    Good,
    Easy,
}

impl Quality {
    pub fn value(self) -> u8 {
        match self {
            Quality::Again => 1,
            Quality::Hard => 3,
            Quality::Good => 4,
            Quality::Easy => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quality::Again => "Again",
            Quality::Hard => "Hard",
            Quality::Good => "Good",
            Quality::Easy => "Easy",
        }
    }

    pub fn from_key(c: char) -> Option<Quality> {
        match c {
            '1' => Some(Quality::Again),
            '2' => Some(Quality::Hard),
            '3' => Some(Quality::Good),
            '4' => Some(Quality::Easy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReviewPhase {
    Idle,
    Fetching,
    Ready,
    Reviewing,
    Submitting,
    Complete,
}

#[derive(Debug, PartialEq)]
pub enum Settle {
    Next,
    Completed,
}

/// Walks the learner through the due-word queue. Scheduling state lives on the
/// server; this machine only tracks the cursor, the reveal latch and the
/// in-flight submission. A failed submission never blocks progress.
#[derive(Debug)]
pub struct ReviewSession {
    pub phase: ReviewPhase,
    pub stats: Option<ReviewStats>,
    pub queue: Vec<VocabularyItem>,
    pub index: usize,
    pub show_answer: bool,
    pub pending_sync: usize,
    pub last_error: Option<String>,
    stats_loaded: bool,
    queue_loaded: bool,
    refetching: bool,
}

impl ReviewSession {
    pub fn new() -> ReviewSession {
        ReviewSession {
            phase: ReviewPhase::Idle,
            stats: None,
            queue: Vec::new(),
            index: 0,
            show_answer: false,
            pending_sync: 0,
            last_error: None,
            stats_loaded: false,
            queue_loaded: false,
            refetching: false,
        }
    }

    /// Mark the two entry fetches (stats, due queue) as in flight. The caller
    /// sends both requests; they are independent and may settle in any order.
    pub fn begin_fetch(&mut self) {
        self.stats_loaded = false;
        self.queue_loaded = false;
        self.last_error = None;
        if self.phase == ReviewPhase::Complete {
            self.refetching = true;
        } else {
            self.phase = ReviewPhase::Fetching;
        }
    }

    pub fn stats_arrived(&mut self, stats: ReviewStats) {
        self.stats = Some(stats);
        self.stats_loaded = true;
        self.maybe_ready();
    }

    pub fn stats_failed(&mut self, error: String) {
        self.stats_loaded = true;
        self.last_error = Some(error);
        self.maybe_ready();
    }

    pub fn queue_arrived(&mut self, items: Vec<VocabularyItem>) {
        self.queue = items;
        self.queue_loaded = true;
        self.maybe_ready();
    }

    pub fn queue_failed(&mut self, error: String) {
        self.queue = Vec::new();
        self.queue_loaded = true;
        self.last_error = Some(error);
        self.maybe_ready();
    }

    fn maybe_ready(&mut self) {
        if !(self.stats_loaded && self.queue_loaded) {
            return;
        }
        if self.refetching {
            // Back from Complete: only resurface when new due items exist.
            self.refetching = false;
            if !self.queue.is_empty() {
                self.index = 0;
                self.show_answer = false;
                self.phase = ReviewPhase::Ready;
            }
        } else if self.queue.is_empty() {
            self.phase = ReviewPhase::Complete;
        } else {
            self.index = 0;
            self.show_answer = false;
            self.phase = ReviewPhase::Ready;
        }
    }

    pub fn current(&self) -> Option<&VocabularyItem> {
        if matches!(self.phase, ReviewPhase::Reviewing | ReviewPhase::Submitting) {
            self.queue.get(self.index)
        } else {
            None
        }
    }

    pub fn start_reviewing(&mut self) {
        if self.phase == ReviewPhase::Ready {
            self.phase = ReviewPhase::Reviewing;
            self.index = 0;
            self.show_answer = false;
        }
    }

    /// One-way latch: the back of the card stays revealed until the next item.
    pub fn reveal(&mut self) {
        if self.phase == ReviewPhase::Reviewing {
            self.show_answer = true;
        }
    }

    /// Accept a rating for the current item. Returns the submission payload,
    /// or None when no rating is possible (not revealed, or already in
    /// flight).
    pub fn rate(&mut self, quality: Quality) -> Option<(String, u8)> {
        if self.phase != ReviewPhase::Reviewing || !self.show_answer {
            return None;
        }
        let word_id = self.queue.get(self.index)?.id.clone();
        self.phase = ReviewPhase::Submitting;
        Some((word_id, quality.value()))
    }

    /// The submission settled, successfully or not. Either way the session
    /// advances; a rejected POST is the caller's to log and park in the
    /// outbox.
    pub fn submission_settled(&mut self) -> Settle {
        if self.phase != ReviewPhase::Submitting {
            return Settle::Next;
        }
        if self.index + 1 < self.queue.len() {
            self.index += 1;
            self.show_answer = false;
            self.phase = ReviewPhase::Reviewing;
            Settle::Next
        } else {
            self.phase = ReviewPhase::Complete;
            Settle::Completed
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(id: &str) -> VocabularyItem {
        VocabularyItem {
            id: id.to_string(),
            hebrew: "מים".to_string(),
            english: "water".to_string(),
            transliteration: Some("mayim".to_string()),
            category: "food".to_string(),
            level: "beginner".to_string(),
            example_sentence: None,
            repetitions: 0,
            next_review: "2026-08-01T00:00:00Z".to_string(),
        }
    }

    fn ready_session(n: usize) -> ReviewSession {
        let mut session = ReviewSession::new();
        session.begin_fetch();
        session.stats_arrived(ReviewStats::default());
        session.queue_arrived((0..n).map(|i| word(&format!("w-{}", i))).collect());
        session
    }

    #[test]
    fn test_quality_values_skip_two() {
        assert_eq!(Quality::Again.value(), 1);
        assert_eq!(Quality::Hard.value(), 3);
        assert_eq!(Quality::Good.value(), 4);
        assert_eq!(Quality::Easy.value(), 5);
    }

    #[test]
    fn test_ready_requires_both_fetches() {
        let mut session = ReviewSession::new();
        session.begin_fetch();
        assert_eq!(session.phase, ReviewPhase::Fetching);
        session.stats_arrived(ReviewStats::default());
        assert_eq!(session.phase, ReviewPhase::Fetching);
        session.queue_arrived(vec![word("w-0")]);
        assert_eq!(session.phase, ReviewPhase::Ready);
    }

    #[test]
    fn test_empty_queue_goes_straight_to_complete() {
        let mut session = ReviewSession::new();
        session.begin_fetch();
        session.stats_arrived(ReviewStats::default());
        session.queue_arrived(vec![]);
        assert_eq!(session.phase, ReviewPhase::Complete);
    }

    #[test]
    fn test_rate_requires_reveal() {
        let mut session = ready_session(1);
        session.start_reviewing();
        assert!(session.rate(Quality::Good).is_none());
        session.reveal();
        let (word_id, quality) = session.rate(Quality::Good).unwrap();
        assert_eq!(word_id, "w-0");
        assert_eq!(quality, 4);
        assert_eq!(session.phase, ReviewPhase::Submitting);
    }

    #[test]
    fn test_advances_mid_queue() {
        let mut session = ready_session(3);
        session.start_reviewing();
        session.reveal();
        session.rate(Quality::Again).unwrap();
        assert_eq!(session.submission_settled(), Settle::Next);
        assert_eq!(session.index, 1);
        assert!(!session.show_answer);
        assert_eq!(session.phase, ReviewPhase::Reviewing);
    }

    #[test]
    fn test_completes_on_last_item() {
        let mut session = ready_session(2);
        session.start_reviewing();
        for _ in 0..2 {
            session.reveal();
            session.rate(Quality::Easy).unwrap();
            session.submission_settled();
        }
        assert_eq!(session.phase, ReviewPhase::Complete);
    }

    #[test]
    fn test_advance_is_independent_of_submission_outcome() {
        // Whether the POST resolved or rejected, settle advances the cursor.
        // The caller differentiates only for logging and the outbox.
        let mut session = ready_session(2);
        session.start_reviewing();
        session.reveal();
        session.rate(Quality::Hard).unwrap();
        assert_eq!(session.submission_settled(), Settle::Next);
        session.reveal();
        session.rate(Quality::Hard).unwrap();
        assert_eq!(session.submission_settled(), Settle::Completed);
    }

    #[test]
    fn test_no_double_submission_while_in_flight() {
        let mut session = ready_session(2);
        session.start_reviewing();
        session.reveal();
        assert!(session.rate(Quality::Good).is_some());
        assert!(session.rate(Quality::Good).is_none());
    }

    #[test]
    fn test_refetch_after_complete_resurfaces_only_with_due_items() {
        let mut session = ready_session(1);
        session.start_reviewing();
        session.reveal();
        session.rate(Quality::Good).unwrap();
        assert_eq!(session.submission_settled(), Settle::Completed);

        // Refetch returns nothing new: stay on the completion screen.
        session.begin_fetch();
        assert_eq!(session.phase, ReviewPhase::Complete);
        session.stats_arrived(ReviewStats::default());
        session.queue_arrived(vec![]);
        assert_eq!(session.phase, ReviewPhase::Complete);

        // Refetch with new due words: back to Ready.
        session.begin_fetch();
        session.stats_arrived(ReviewStats::default());
        session.queue_arrived(vec![word("w-9")]);
        assert_eq!(session.phase, ReviewPhase::Ready);
        assert_eq!(session.index, 0);
    }

    #[test]
    fn test_queue_failure_still_settles_entry() {
        let mut session = ReviewSession::new();
        session.begin_fetch();
        session.stats_failed("connection refused".to_string());
        session.queue_failed("connection refused".to_string());
        assert_eq!(session.phase, ReviewPhase::Complete);
        assert!(session.last_error.is_some());
    }

    #[test]
    fn test_quality_keys_map_in_display_order() {
        // Four keys, four buckets; the wire values keep the gap at 2.
        assert_eq!(Quality::from_key('1'), Some(Quality::Again));
        assert_eq!(Quality::from_key('2'), Some(Quality::Hard));
        assert_eq!(Quality::from_key('3'), Some(Quality::Good));
        assert_eq!(Quality::from_key('4'), Some(Quality::Easy));
        assert_eq!(Quality::from_key('5'), None);
    }
}
