use std::fmt::{Debug, Display};
use std::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use thiserror::Error;

// Signed: ids written by hand as negative numbers are still valid rows.
pub type RecordId = i64;

/// Practice section a record belongs to. Every domain has its own file and its own id sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Reading,
    Listening,
    Speaking,
}

impl Domain {
    pub fn file_name(&self) -> &'static str {
        match self {
            Domain::Reading => "reading.csv",
            Domain::Listening => "listening.csv",
            Domain::Speaking => "speaking.csv",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Domain::Reading | Domain::Listening => &["id", "url", "right_answers", "day"],
            Domain::Speaking => &["id", "url", "day"],
        }
    }

    /// Speaking rows are written as soon as they are added, the scored logs wait for the first save.
    pub fn persists_on_add(&self) -> bool {
        matches!(self, Domain::Speaking)
    }

    pub fn requires_url(&self) -> bool {
        !matches!(self, Domain::Speaking)
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Reading => write!(f, "reading"),
            Domain::Listening => write!(f, "listening"),
            Domain::Speaking => write!(f, "speaking"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Right answers must be a non-negative integer, got \"{0}\"")]
    RightAnswersNotInteger(String),
    #[error("Right answers must be a non-negative integer")]
    NegativeRightAnswers,
    #[error("Day cannot be empty. Use YYYY-MM-DD.")]
    EmptyDay,
    #[error("Questions link cannot be empty")]
    EmptyUrl,
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// A typed row of one domain's log.
///
/// Records are only built from user input through [`Record::from_draft`], which is where every
/// validation rule lives. Rows read back from disk bypass it and are kept as they were stored.
pub trait Record:
    Serialize + DeserializeOwned + Debug + Clone + PartialEq + Send + Sync + 'static
{
    type Draft: Debug + Clone;

    const DOMAIN: Domain;

    fn id(&self) -> RecordId;
    fn blank(id: RecordId, day: String) -> Self;
    fn from_draft(id: RecordId, draft: Self::Draft) -> ValidationResult<Self>;
}

/// Integer cell reader: blank means zero, anything else must parse.
fn lenient_int<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: Display,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(T::default());
    }
    raw.parse::<T>().map_err(serde::de::Error::custom)
}

/// Reading or listening attempt.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct ScoredAttempt {
    #[serde(default, deserialize_with = "lenient_int")]
    pub id: RecordId,
    #[serde(default)]
    pub url: String,
    // Signed so that a negative value written by hand is still shown instead of dropped.
    #[serde(default, deserialize_with = "lenient_int")]
    pub right_answers: i64,
    #[serde(default)]
    pub day: String,
}

/// Raw form fields for a reading or listening attempt.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoredDraft {
    pub url: String,
    pub right_answers: String,
    pub day: String,
}

impl ScoredDraft {
    pub fn new(url: &str, right_answers: &str, day: &str) -> Self {
        ScoredDraft {
            url: url.to_string(),
            right_answers: right_answers.to_string(),
            day: day.to_string(),
        }
    }
}

impl From<&ScoredAttempt> for ScoredDraft {
    fn from(value: &ScoredAttempt) -> Self {
        ScoredDraft {
            url: value.url.clone(),
            right_answers: value.right_answers.to_string(),
            day: value.day.clone(),
        }
    }
}

fn parse_right_answers(raw: &str) -> ValidationResult<i64> {
    let raw = raw.trim();
    let value = raw
        .parse::<i64>()
        .map_err(|_| ValidationError::RightAnswersNotInteger(raw.to_string()))?;
    if value < 0 {
        return Err(ValidationError::NegativeRightAnswers);
    }
    Ok(value)
}

fn validate_scored(id: RecordId, draft: ScoredDraft) -> ValidationResult<ScoredAttempt> {
    let right_answers = parse_right_answers(&draft.right_answers)?;

    let day = draft.day.trim();
    if day.is_empty() {
        return Err(ValidationError::EmptyDay);
    }

    let url = draft.url.trim();
    if url.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }

    Ok(ScoredAttempt {
        id,
        url: url.to_string(),
        right_answers,
        day: day.to_string(),
    })
}

/// Reading log row. Same shape as [`ListeningAttempt`], kept apart so the two logs cannot be mixed.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(transparent)]
pub struct ReadingAttempt(pub ScoredAttempt);

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(transparent)]
pub struct ListeningAttempt(pub ScoredAttempt);

impl AsRef<ScoredAttempt> for ReadingAttempt {
    fn as_ref(&self) -> &ScoredAttempt {
        &self.0
    }
}

impl AsRef<ScoredAttempt> for ListeningAttempt {
    fn as_ref(&self) -> &ScoredAttempt {
        &self.0
    }
}

impl Record for ReadingAttempt {
    type Draft = ScoredDraft;
    const DOMAIN: Domain = Domain::Reading;

    fn id(&self) -> RecordId {
        self.0.id
    }

    fn blank(id: RecordId, day: String) -> Self {
        ReadingAttempt(ScoredAttempt {
            id,
            url: String::new(),
            right_answers: 0,
            day,
        })
    }

    fn from_draft(id: RecordId, draft: ScoredDraft) -> ValidationResult<Self> {
        validate_scored(id, draft).map(ReadingAttempt)
    }
}

impl Record for ListeningAttempt {
    type Draft = ScoredDraft;
    const DOMAIN: Domain = Domain::Listening;

    fn id(&self) -> RecordId {
        self.0.id
    }

    fn blank(id: RecordId, day: String) -> Self {
        ListeningAttempt(ScoredAttempt {
            id,
            url: String::new(),
            right_answers: 0,
            day,
        })
    }

    fn from_draft(id: RecordId, draft: ScoredDraft) -> ValidationResult<Self> {
        validate_scored(id, draft).map(ListeningAttempt)
    }
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct SpeakingAttempt {
    #[serde(default, deserialize_with = "lenient_int")]
    pub id: RecordId,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub day: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpeakingDraft {
    pub url: String,
    pub day: String,
}

impl SpeakingDraft {
    pub fn new(url: &str, day: &str) -> Self {
        SpeakingDraft {
            url: url.to_string(),
            day: day.to_string(),
        }
    }
}

impl From<&SpeakingAttempt> for SpeakingDraft {
    fn from(value: &SpeakingAttempt) -> Self {
        SpeakingDraft {
            url: value.url.clone(),
            day: value.day.clone(),
        }
    }
}

impl Record for SpeakingAttempt {
    type Draft = SpeakingDraft;
    const DOMAIN: Domain = Domain::Speaking;

    fn id(&self) -> RecordId {
        self.id
    }

    fn blank(id: RecordId, day: String) -> Self {
        SpeakingAttempt {
            id,
            url: String::new(),
            day,
        }
    }

    fn from_draft(id: RecordId, draft: SpeakingDraft) -> ValidationResult<Self> {
        let day = draft.day.trim();
        if day.is_empty() {
            return Err(ValidationError::EmptyDay);
        }

        Ok(SpeakingAttempt {
            id,
            url: draft.url.trim().to_string(),
            day: day.to_string(),
        })
    }
}
