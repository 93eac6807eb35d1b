use crate::gender::{Gender, GenderedText};
use serde::{Deserialize, Serialize};

/// A word as the backend schedules it. `repetitions` and `next_review` are
/// server-owned scheduling state; the client only displays them and never
/// computes either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub id: String,
    pub hebrew: String,
    pub english: String,
    #[serde(default)]
    pub transliteration: Option<String>,
    pub category: String,
    pub level: String,
    #[serde(default)]
    pub example_sentence: Option<String>,
    pub repetitions: u32,
    pub next_review: String,
}

/// Aggregate review counters, owned entirely by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewStats {
    pub total_words: u32,
    pub due_for_review: u32,
    pub learning: u32,
    pub mastered: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub level: String,
    pub objectives: Vec<String>,
    pub exercises: Vec<Exercise>,
}

/// One exercise of a lesson. Authored, ordered, read-only for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Exercise {
    VocabularyIntro { title: String, words: Vec<VocabCard> },
    ListenAndSelect { title: String, items: Vec<ChoiceItem> },
    MatchPairs { title: String, pairs: Vec<MatchPair> },
    BuildSentence { title: String, items: Vec<PromptItem> },
    FillInBlank { title: String, items: Vec<PromptItem> },
    SpeakingPractice { title: String, phrases: Vec<SpeechCard> },
    DialogueCompletion { title: String, lines: Vec<DialogueLine> },
    ListenAndType { title: String, items: Vec<PromptItem> },
}

impl Exercise {
    pub fn title(&self) -> &str {
        match self {
            Exercise::VocabularyIntro { title, .. }
            | Exercise::ListenAndSelect { title, .. }
            | Exercise::MatchPairs { title, .. }
            | Exercise::BuildSentence { title, .. }
            | Exercise::FillInBlank { title, .. }
            | Exercise::SpeakingPractice { title, .. }
            | Exercise::DialogueCompletion { title, .. }
            | Exercise::ListenAndType { title, .. } => title,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabCard {
    pub hebrew: GenderedText,
    pub english: String,
    #[serde(default)]
    pub transliteration: Option<String>,
}

/// Multiple-choice item; the prompt is spoken, not shown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceItem {
    pub prompt: GenderedText,
    pub options: Vec<String>,
    pub correct: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPair {
    pub hebrew: String,
    pub english: String,
}

/// Typed-answer item shared by build_sentence, fill_in_blank and
/// listen_and_type. `accepted` lists alternative answers beyond the canonical
/// one; `audio` is the text to speak for listening items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptItem {
    pub prompt: String,
    pub answer: String,
    #[serde(default)]
    pub accepted: Vec<String>,
    #[serde(default)]
    pub audio: Option<GenderedText>,
}

/// `audio_url` points at a pre-recorded native-speaker clip when the backend
/// has one; otherwise the phrase is synthesized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechCard {
    pub phrase: GenderedText,
    pub english: String,
    #[serde(default)]
    pub transliteration: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueLine {
    pub speaker: String,
    pub text: GenderedText,
    #[serde(default)]
    pub blank: Option<DialogueBlank>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueBlank {
    pub options: Vec<GenderedText>,
    pub correct: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

/// Wire shape of a tutor reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub translation: Option<String>,
}

/// Transient chat popup state; discarded when the lesson is left.
#[derive(Debug, Default)]
pub struct ChatState {
    pub messages: Vec<ChatMessage>,
    pub input_buffer: String,
    pub scroll_y: u16,
    pub waiting: bool,
}

#[derive(Debug, PartialEq)]
pub enum AppState {
    Menu,
    Lesson,
    LessonQuitConfirm,
    LessonMissing,
    Summary,
    Review,
}

/// Requests handled by the network worker thread.
#[derive(Debug)]
pub enum ApiRequest {
    FetchLesson {
        id: String,
    },
    Chat {
        message: String,
        history: Vec<ChatMessage>,
        lesson_id: Option<String>,
    },
    /// Text already resolved for the learner's gender. `playback` identifies
    /// the playback generation this fetch belongs to; stale generations are
    /// dropped without a response.
    Synthesize {
        text: String,
        language: String,
        gender: Gender,
        playback: u64,
    },
    FetchAudio {
        url: String,
        playback: u64,
    },
    FetchStats,
    FetchReview {
        limit: usize,
    },
    SubmitQuality {
        word_id: String,
        quality: u8,
        /// Set when re-posting a previously failed rating from the outbox.
        outbox_id: Option<i64>,
    },
}

#[derive(Debug)]
pub enum ApiResponse {
    LessonLoaded {
        id: String,
        lesson: Box<Lesson>,
    },
    LessonFailed {
        id: String,
        error: String,
    },
    ChatReply {
        reply: ChatReply,
    },
    ChatFailed {
        error: String,
    },
    Audio {
        playback: u64,
        bytes: Vec<u8>,
    },
    /// TTS endpoint failed; the caller decides on local-synthesis fallback.
    AudioFailed {
        playback: u64,
        text: String,
        language: String,
        error: String,
    },
    StatsLoaded {
        stats: ReviewStats,
    },
    StatsFailed {
        error: String,
    },
    ReviewQueue {
        items: Vec<VocabularyItem>,
    },
    ReviewQueueFailed {
        error: String,
    },
    QualitySubmitted {
        word_id: String,
        outbox_id: Option<i64>,
    },
    QualityFailed {
        word_id: String,
        quality: u8,
        outbox_id: Option<i64>,
        error: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exercise_tag_round_trip() {
        let json = r#"{
            "type": "fill_in_blank",
            "title": "Fill the blank",
            "items": [{"prompt": "___ , מה שלומך?", "answer": "שלום"}]
        }"#;
        let exercise: Exercise = serde_json::from_str(json).unwrap();
        match &exercise {
            Exercise::FillInBlank { title, items } => {
                assert_eq!(title, "Fill the blank");
                assert_eq!(items[0].answer, "שלום");
                assert!(items[0].accepted.is_empty());
                assert!(items[0].audio.is_none());
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_exercise_unknown_tag_rejected() {
        let json = r#"{"type": "word_search", "title": "?", "items": []}"#;
        assert!(serde_json::from_str::<Exercise>(json).is_err());
    }

    #[test]
    fn test_vocabulary_item_optional_fields() {
        let json = r#"{
            "id": "w-1",
            "hebrew": "מים",
            "english": "water",
            "category": "food",
            "level": "beginner",
            "repetitions": 3,
            "next_review": "2026-08-01T00:00:00Z"
        }"#;
        let item: VocabularyItem = serde_json::from_str(json).unwrap();
        assert!(item.transliteration.is_none());
        assert!(item.example_sentence.is_none());
        assert_eq!(item.repetitions, 3);
    }

    #[test]
    fn test_speech_card_defaults() {
        let json = r#"{"phrase": "נעים מאוד", "english": "nice to meet you"}"#;
        let card: SpeechCard = serde_json::from_str(json).unwrap();
        assert!(card.transliteration.is_none());
        assert!(card.audio_url.is_none());
    }

    #[test]
    fn test_chat_reply_without_translation() {
        let reply: ChatReply = serde_json::from_str(r#"{"response": "!שלום"}"#).unwrap();
        assert!(reply.translation.is_none());
    }

    #[test]
    fn test_exercise_title_access() {
        let exercise = Exercise::MatchPairs {
            title: "Match".to_string(),
            pairs: vec![],
        };
        assert_eq!(exercise.title(), "Match");
    }
}
