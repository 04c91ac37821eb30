/*!
 * FAQ records and their external representations.
 *
 * - `ContentRecord`: the persisted entity, source text plus translations
 * - `FaqSnapshot`: the full externally visible form, also the cached form
 * - `ResolvedFaq`: the single-language view served by the read path
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::translation::{Field, TranslationSet};

/// A question/answer pair with its translations
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRecord {
    /// Identifier assigned by persistence
    pub id: i64,
    /// Question in the source language
    pub question: String,
    /// Answer in the source language
    pub answer: String,
    /// Translations into the other supported languages
    pub translations: TranslationSet,
    /// Creation time, never changes
    pub created_at: DateTime<Utc>,
    /// Time of the last successful mutation
    pub updated_at: DateTime<Utc>,
}

impl ContentRecord {
    /// Source-language text of a field
    pub fn source_text(&self, field: Field) -> &str {
        match field {
            Field::Question => &self.question,
            Field::Answer => &self.answer,
        }
    }

    /// Text of a field in `language`, falling back to the source text
    pub fn resolve(&self, field: Field, language: &str) -> &str {
        self.translations.resolve(field, language, self.source_text(field))
    }

    pub fn resolve_question(&self, language: &str) -> &str {
        self.resolve(Field::Question, language)
    }

    pub fn resolve_answer(&self, language: &str) -> &str {
        self.resolve(Field::Answer, language)
    }

    /// Single-language view of this record
    pub fn resolved(&self, language: &str) -> ResolvedFaq {
        ResolvedFaq {
            id: self.id,
            question: self.resolve_question(language).to_string(),
            answer: self.resolve_answer(language).to_string(),
            created_at: self.created_at,
        }
    }

    /// Full external representation
    pub fn to_snapshot(&self) -> FaqSnapshot {
        FaqSnapshot {
            id: self.id,
            question: self.question.clone(),
            answer: self.answer.clone(),
            question_translated: self.translations.field_map(Field::Question),
            answer_translated: self.translations.field_map(Field::Answer),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Rebuild a record from its external representation
    pub fn from_snapshot(snapshot: FaqSnapshot, source_language: &str) -> Self {
        let translations = TranslationSet::from_field_maps(
            source_language,
            &snapshot.question_translated,
            &snapshot.answer_translated,
        );
        Self {
            id: snapshot.id,
            question: snapshot.question,
            answer: snapshot.answer,
            translations,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        }
    }
}

impl fmt::Display for ContentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.question)
    }
}

/// Externally visible state of a record, stored under `record:<id>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqSnapshot {
    pub id: i64,
    pub question: String,
    pub answer: String,
    /// Translated questions keyed by language
    #[serde(default)]
    pub question_translated: BTreeMap<String, String>,
    /// Translated answers keyed by language
    #[serde(default)]
    pub answer_translated: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A record resolved for one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFaq {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

/// Fields that an update may change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaqUpdate {
    /// New question, if changing
    #[serde(default)]
    pub question: Option<String>,
    /// New answer, if changing
    #[serde(default)]
    pub answer: Option<String>,
}

impl FaqUpdate {
    /// Update changing only the question
    pub fn question(question: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
            answer: None,
        }
    }

    /// Update changing only the answer
    pub fn answer(answer: impl Into<String>) -> Self {
        Self {
            question: None,
            answer: Some(answer.into()),
        }
    }

    /// Whether the update changes nothing
    pub fn is_empty(&self) -> bool {
        self.question.is_none() && self.answer.is_none()
    }
}

/// Outcome of a write, for callers building HTTP-style responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteStatus {
    Created,
    Updated,
    Deleted,
}

impl WriteStatus {
    /// Equivalent HTTP status code
    pub fn http_status(&self) -> u16 {
        match self {
            WriteStatus::Created => 201,
            WriteStatus::Updated => 200,
            WriteStatus::Deleted => 204,
        }
    }
}
