use serde::{Deserialize, Serialize};
use std::fmt;

/// Grammatical gender the learner practices in. Hebrew second-person forms
/// differ by gender, so most authored content exists in two variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn toggled(self) -> Gender {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
        }
    }

    /// Wire value for the TTS endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content that is either gender-neutral or authored in both forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenderedText {
    Neutral(String),
    Gendered { male: String, female: String },
}

impl GenderedText {
    pub fn neutral(text: &str) -> GenderedText {
        GenderedText::Neutral(text.to_string())
    }

    pub fn pair(male: &str, female: &str) -> GenderedText {
        GenderedText::Gendered {
            male: male.to_string(),
            female: female.to_string(),
        }
    }

    /// A gendered pair must carry both forms; authored content with an empty
    /// variant would silently render nothing for one half of the learners.
    pub fn validate(&self) -> Result<(), InvalidGenderedText> {
        match self {
            GenderedText::Neutral(_) => Ok(()),
            GenderedText::Gendered { male, female } => {
                if male.is_empty() || female.is_empty() {
                    Err(InvalidGenderedText)
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("gendered text pair with an empty variant")]
pub struct InvalidGenderedText;

/// Resolve text for one gender. Neutral text passes through untouched; a pair
/// yields exactly the matching variant. Total over the closed enum, so there
/// is no fallback branch.
pub fn resolve(text: &GenderedText, gender: Gender) -> &str {
    match text {
        GenderedText::Neutral(s) => s,
        GenderedText::Gendered { male, female } => match gender {
            Gender::Male => male,
            Gender::Female => female,
        },
    }
}
