use crate::gender::GenderedText;
use crate::models::{
    ChoiceItem, DialogueBlank, DialogueLine, Exercise, Lesson, MatchPair, PromptItem, SpeechCard,
    VocabCard,
};
use regex::Regex;
use std::fs;
use std::io;
use std::path::Path;

lazy_static::lazy_static! {
    static ref SLUG: Regex = Regex::new("^[a-z0-9][a-z0-9-]*$").unwrap();
}

/// Lesson ids double as URL path segments, so they are restricted to
/// lowercase slugs.
pub fn is_valid_slug(id: &str) -> bool {
    SLUG.is_match(id)
}

/// The built-in catalog. Authored once, read-only for the session; lessons
/// not found here are fetched from the backend by id.
pub fn catalog() -> Vec<Lesson> {
    vec![essential_greetings(), cafe_ordering()]
}

pub fn find_local(id: &str) -> Option<Lesson> {
    catalog().into_iter().find(|lesson| lesson.id == id)
}

/// Structural checks on authored or fetched lesson content: slugs, gendered
/// pairs, and option indexes. Content bugs surface here instead of as a panic
/// mid-exercise.
pub fn validate_lesson(lesson: &Lesson) -> Result<(), String> {
    if !is_valid_slug(&lesson.id) {
        return Err(format!("invalid lesson id: {:?}", lesson.id));
    }
    for exercise in &lesson.exercises {
        validate_exercise(&lesson.id, exercise)?;
    }
    Ok(())
}

fn validate_exercise(lesson_id: &str, exercise: &Exercise) -> Result<(), String> {
    let fail = |what: &str| Err(format!("{}/{}: {}", lesson_id, exercise.title(), what));
    match exercise {
        Exercise::VocabularyIntro { words, .. } => {
            if words.is_empty() {
                return fail("no words");
            }
            for word in words {
                check_gendered(lesson_id, exercise, &word.hebrew)?;
            }
        }
        Exercise::ListenAndSelect { items, .. } => {
            if items.is_empty() {
                return fail("no items");
            }
            for item in items {
                check_gendered(lesson_id, exercise, &item.prompt)?;
                if item.correct >= item.options.len() {
                    return fail("correct option out of range");
                }
            }
        }
        Exercise::MatchPairs { pairs, .. } => {
            if pairs.is_empty() {
                return fail("no pairs");
            }
        }
        Exercise::BuildSentence { items, .. }
        | Exercise::FillInBlank { items, .. }
        | Exercise::ListenAndType { items, .. } => {
            if items.is_empty() {
                return fail("no items");
            }
            for item in items {
                if item.answer.is_empty() {
                    return fail("empty answer");
                }
                if let Some(audio) = &item.audio {
                    check_gendered(lesson_id, exercise, audio)?;
                }
            }
        }
        Exercise::SpeakingPractice { phrases, .. } => {
            if phrases.is_empty() {
                return fail("no phrases");
            }
            for phrase in phrases {
                check_gendered(lesson_id, exercise, &phrase.phrase)?;
            }
        }
        Exercise::DialogueCompletion { lines, .. } => {
            if lines.is_empty() {
                return fail("no lines");
            }
            for line in lines {
                check_gendered(lesson_id, exercise, &line.text)?;
                if let Some(blank) = &line.blank {
                    if blank.correct >= blank.options.len() {
                        return fail("blank answer out of range");
                    }
                    for option in &blank.options {
                        check_gendered(lesson_id, exercise, option)?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn check_gendered(lesson_id: &str, exercise: &Exercise, text: &GenderedText) -> Result<(), String> {
    text.validate()
        .map_err(|e| format!("{}/{}: {}", lesson_id, exercise.title(), e))
}

/// Export the authored catalog for database seeding. The catalog is already
/// structured data, so this is a plain serialization of it.
pub fn export_catalog() -> Vec<Lesson> {
    catalog()
}

pub fn export_catalog_to(path: &Path) -> io::Result<()> {
    let lessons = export_catalog();
    for lesson in &lessons {
        validate_lesson(lesson).map_err(io::Error::other)?;
    }
    let json = serde_json::to_string_pretty(&lessons)?;
    fs::write(path, json)
}

fn essential_greetings() -> Lesson {
    Lesson {
        id: "essential-greetings".to_string(),
        title: "Essential Greetings".to_string(),
        level: "beginner".to_string(),
        objectives: vec![
            "Greet people at any time of day".to_string(),
            "Say thank you, please and goodbye".to_string(),
            "Ask how someone is doing".to_string(),
        ],
        exercises: vec![
            Exercise::VocabularyIntro {
                title: "Greetings vocabulary".to_string(),
                words: vec![
                    VocabCard {
                        hebrew: GenderedText::neutral("שלום"),
                        english: "hello / peace".to_string(),
                        transliteration: Some("shalom".to_string()),
                    },
                    VocabCard {
                        hebrew: GenderedText::neutral("בוקר טוב"),
                        english: "good morning".to_string(),
                        transliteration: Some("boker tov".to_string()),
                    },
                    VocabCard {
                        hebrew: GenderedText::neutral("ערב טוב"),
                        english: "good evening".to_string(),
                        transliteration: Some("erev tov".to_string()),
                    },
                    VocabCard {
                        hebrew: GenderedText::neutral("תודה רבה"),
                        english: "thank you very much".to_string(),
                        transliteration: Some("toda raba".to_string()),
                    },
                    VocabCard {
                        hebrew: GenderedText::neutral("להתראות"),
                        english: "goodbye / see you".to_string(),
                        transliteration: Some("lehitraot".to_string()),
                    },
                    VocabCard {
                        hebrew: GenderedText::pair("ברוך הבא", "ברוכה הבאה"),
                        english: "welcome".to_string(),
                        transliteration: None,
                    },
                ],
            },
            Exercise::ListenAndSelect {
                title: "Listen and choose".to_string(),
                items: vec![
                    ChoiceItem {
                        prompt: GenderedText::neutral("בוקר טוב"),
                        options: vec![
                            "Good morning".to_string(),
                            "Good night".to_string(),
                            "Thank you".to_string(),
                        ],
                        correct: 0,
                    },
                    ChoiceItem {
                        prompt: GenderedText::neutral("להתראות"),
                        options: vec![
                            "Please".to_string(),
                            "Goodbye".to_string(),
                            "Hello".to_string(),
                        ],
                        correct: 1,
                    },
                ],
            },
            Exercise::MatchPairs {
                title: "Match the pairs".to_string(),
                pairs: vec![
                    MatchPair {
                        hebrew: "שלום".to_string(),
                        english: "hello".to_string(),
                    },
                    MatchPair {
                        hebrew: "תודה".to_string(),
                        english: "thank you".to_string(),
                    },
                    MatchPair {
                        hebrew: "בבקשה".to_string(),
                        english: "please".to_string(),
                    },
                    MatchPair {
                        hebrew: "כן".to_string(),
                        english: "yes".to_string(),
                    },
                    MatchPair {
                        hebrew: "לא".to_string(),
                        english: "no".to_string(),
                    },
                ],
            },
            Exercise::BuildSentence {
                title: "Build the sentence".to_string(),
                items: vec![PromptItem {
                    prompt: "Say: \"Good morning, Dana\"".to_string(),
                    answer: "בוקר טוב, דנה".to_string(),
                    accepted: vec!["בוקר טוב דנה".to_string()],
                    audio: None,
                }],
            },
            Exercise::FillInBlank {
                title: "Fill in the blank".to_string(),
                items: vec![
                    PromptItem {
                        prompt: "___, מה שלומך?".to_string(),
                        answer: "שלום".to_string(),
                        accepted: vec![],
                        audio: None,
                    },
                    PromptItem {
                        prompt: "תודה ___!".to_string(),
                        answer: "רבה".to_string(),
                        accepted: vec![],
                        audio: None,
                    },
                ],
            },
            Exercise::SpeakingPractice {
                title: "Say it out loud".to_string(),
                phrases: vec![
                    SpeechCard {
                        phrase: GenderedText::neutral("נעים מאוד"),
                        english: "nice to meet you".to_string(),
                        transliteration: Some("naim meod".to_string()),
                        audio_url: None,
                    },
                    SpeechCard {
                        phrase: GenderedText::pair("אתה מדבר עברית?", "את מדברת עברית?"),
                        english: "do you speak Hebrew?".to_string(),
                        transliteration: None,
                        audio_url: None,
                    },
                ],
            },
            Exercise::DialogueCompletion {
                title: "Complete the dialogue".to_string(),
                lines: vec![
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
                                GenderedText::neutral("להתראות"),
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
                                GenderedText::neutral("להתראות"),
                                GenderedText::pair("מצוין, תודה", "מצוינת, תודה"),
                            ],
                            correct: 1,
                        }),
                    },
                ],
            },
            Exercise::ListenAndType {
                title: "Type what you hear".to_string(),
                items: vec![
                    PromptItem {
                        prompt: "Type what you hear".to_string(),
                        answer: "שלום".to_string(),
                        accepted: vec![],
                        audio: Some(GenderedText::neutral("שלום")),
                    },
                    PromptItem {
                        prompt: "Type what you hear".to_string(),
                        answer: "תודה רבה".to_string(),
                        accepted: vec![],
                        audio: Some(GenderedText::neutral("תודה רבה")),
                    },
                ],
            },
        ],
    }
}

fn cafe_ordering() -> Lesson {
    Lesson {
        id: "cafe-ordering".to_string(),
        title: "Ordering at a Café".to_string(),
        level: "beginner".to_string(),
        objectives: vec![
            "Order a drink politely".to_string(),
            "Ask for the bill".to_string(),
        ],
        exercises: vec![
            Exercise::VocabularyIntro {
                title: "Café vocabulary".to_string(),
                words: vec![
                    VocabCard {
                        hebrew: GenderedText::neutral("קפה"),
                        english: "coffee".to_string(),
                        transliteration: Some("kafe".to_string()),
                    },
                    VocabCard {
                        hebrew: GenderedText::neutral("תה"),
                        english: "tea".to_string(),
                        transliteration: Some("te".to_string()),
                    },
                    VocabCard {
                        hebrew: GenderedText::neutral("מים"),
                        english: "water".to_string(),
                        transliteration: Some("mayim".to_string()),
                    },
                    VocabCard {
                        hebrew: GenderedText::neutral("חשבון"),
                        english: "bill".to_string(),
                        transliteration: Some("cheshbon".to_string()),
                    },
                    VocabCard {
                        hebrew: GenderedText::pair("אני מזמין", "אני מזמינה"),
                        english: "I am ordering".to_string(),
                        transliteration: None,
                    },
                ],
            },
            Exercise::MatchPairs {
                title: "Match the pairs".to_string(),
                pairs: vec![
                    MatchPair {
                        hebrew: "קפה".to_string(),
                        english: "coffee".to_string(),
                    },
                    MatchPair {
                        hebrew: "תה".to_string(),
                        english: "tea".to_string(),
                    },
                    MatchPair {
                        hebrew: "מים".to_string(),
                        english: "water".to_string(),
                    },
                    MatchPair {
                        hebrew: "עוגה".to_string(),
                        english: "cake".to_string(),
                    },
                ],
            },
            Exercise::FillInBlank {
                title: "Fill in the blank".to_string(),
                items: vec![
                    PromptItem {
                        prompt: "אפשר ___, בבקשה?".to_string(),
                        answer: "קפה".to_string(),
                        accepted: vec!["תה".to_string(), "מים".to_string()],
                        audio: None,
                    },
                    PromptItem {
                        prompt: "את ה___, בבקשה.".to_string(),
                        answer: "חשבון".to_string(),
                        accepted: vec![],
                        audio: None,
                    },
                ],
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_unique_slugs() {
        let lessons = catalog();
        let mut ids: Vec<&str> = lessons.iter().map(|l| l.id.as_str()).collect();
        for id in &ids {
            assert!(is_valid_slug(id), "bad slug {:?}", id);
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), lessons.len());
    }

    #[test]
    fn test_catalog_validates() {
        for lesson in catalog() {
            validate_lesson(&lesson).unwrap();
        }
    }

    #[test]
    fn test_essential_greetings_resolves_locally() {
        let lesson = find_local("essential-greetings").unwrap();
        assert_eq!(lesson.title, "Essential Greetings");
        assert_eq!(lesson.exercises.len(), 8);
    }

    #[test]
    fn test_unknown_id_is_not_local() {
        assert!(find_local("unknown-id").is_none());
    }

    #[test]
    fn test_slug_rejects_path_characters() {
        assert!(is_valid_slug("essential-greetings"));
        assert!(!is_valid_slug("Essential-Greetings"));
        assert!(!is_valid_slug("../etc/passwd"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("-leading-dash"));
    }

    #[test]
    fn test_validate_catches_out_of_range_answer() {
        let mut lesson = find_local("essential-greetings").unwrap();
        if let Exercise::ListenAndSelect { items, .. } = &mut lesson.exercises[1] {
            items[0].correct = 99;
        }
        assert!(validate_lesson(&lesson).is_err());
    }

    #[test]
    fn test_validate_catches_empty_gendered_variant() {
        let mut lesson = find_local("cafe-ordering").unwrap();
        if let Exercise::VocabularyIntro { words, .. } = &mut lesson.exercises[0] {
            words[4].hebrew = GenderedText::pair("אני מזמין", "");
        }
        assert!(validate_lesson(&lesson).is_err());
    }

    #[test]
    fn test_export_round_trips_through_json() {
        let exported = serde_json::to_string(&export_catalog()).unwrap();
        let parsed: Vec<Lesson> = serde_json::from_str(&exported).unwrap();
        assert_eq!(parsed.len(), catalog().len());
        assert_eq!(parsed[0].id, "essential-greetings");
    }

    #[test]
    fn test_export_writes_pretty_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curriculum.json");
        export_catalog_to(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("essential-greetings"));
        let parsed: Vec<Lesson> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 2);
    }
}
