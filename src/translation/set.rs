/*!
 * Per-record translation storage and fallback resolution.
 *
 * A `TranslationSet` maps a target language to the translated question and
 * answer of one record. It never holds the record's source language, and a
 * lookup that finds nothing usable falls back to the source text.
 */

use futures::future::join_all;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::ProviderError;
use crate::language_utils::normalize_language;
use crate::providers::TranslationProvider;

/// Translatable field of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    /// The question text
    Question,
    /// The answer text
    Answer,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Question => write!(f, "question"),
            Field::Answer => write!(f, "answer"),
        }
    }
}

/// Translated question and answer for one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedPair {
    /// Translated question
    pub question: String,
    /// Translated answer
    pub answer: String,
}

impl TranslatedPair {
    /// Create a new pair
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Text of one field
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Question => &self.question,
            Field::Answer => &self.answer,
        }
    }
}

/// Language to translated pair mapping for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationSet {
    /// Language the record is authored in, never a key of `entries`
    source_language: String,
    /// Entries keyed by normalized language code
    entries: BTreeMap<String, TranslatedPair>,
}

impl TranslationSet {
    /// Create an empty set for a record authored in `source_language`
    pub fn new(source_language: &str) -> Self {
        Self {
            source_language: normalize_language(source_language),
            entries: BTreeMap::new(),
        }
    }

    /// Rebuild a set from per-field maps, as stored in the database and in snapshots
    ///
    /// Languages missing from either map, and the source language, are dropped.
    pub fn from_field_maps(
        source_language: &str,
        questions: &BTreeMap<String, String>,
        answers: &BTreeMap<String, String>,
    ) -> Self {
        let mut set = Self::new(source_language);
        for (language, question) in questions {
            if let Some(answer) = answers.get(language) {
                set.insert(language, TranslatedPair::new(question.clone(), answer.clone()));
            }
        }
        set
    }

    /// Source language of the record
    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    /// Add or replace a language entry
    ///
    /// Returns false, and stores nothing, for the source language.
    pub fn insert(&mut self, language: &str, pair: TranslatedPair) -> bool {
        let language = normalize_language(language);
        if language == self.source_language || language.is_empty() {
            return false;
        }
        self.entries.insert(language, pair);
        true
    }

    /// Stored pair for a language, if any
    pub fn get(&self, language: &str) -> Option<&TranslatedPair> {
        self.entries.get(&normalize_language(language))
    }

    /// Whether an entry exists for a language
    pub fn contains(&self, language: &str) -> bool {
        self.get(language).is_some()
    }

    /// Languages with an entry, sorted
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of translated languages
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no language was translated
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Usable stored translation of `field` for `language`
    ///
    /// `None` for the source language, a missing entry, or blank text.
    pub fn lookup(&self, field: Field, language: &str) -> Option<&str> {
        let language = normalize_language(language);
        if language == self.source_language {
            return None;
        }
        self.entries
            .get(&language)
            .map(|pair| pair.get(field))
            .filter(|text| !text.trim().is_empty())
    }

    /// Text of `field` in `language`, falling back to `source_text`
    pub fn resolve<'a>(&'a self, field: Field, language: &str, source_text: &'a str) -> &'a str {
        self.lookup(field, language).unwrap_or(source_text)
    }

    /// Translations of one field keyed by language
    pub fn field_map(&self, field: Field) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(language, pair)| (language.clone(), pair.get(field).to_string()))
            .collect()
    }

    /// Translate a question/answer pair into every target language
    ///
    /// Languages are translated concurrently and independently. A language
    /// is stored only when both fields translated to non-blank text; any
    /// failure leaves it absent so lookups fall back to the source text.
    pub async fn populate(
        source_question: &str,
        source_answer: &str,
        source_language: &str,
        supported_languages: &[String],
        provider: &dyn TranslationProvider,
    ) -> Self {
        let mut set = Self::new(source_language);

        let mut targets: Vec<String> = Vec::new();
        for language in supported_languages {
            let language = normalize_language(language);
            if language.is_empty() || language == set.source_language || targets.contains(&language) {
                continue;
            }
            targets.push(language);
        }

        let attempts = targets.iter().map(|language| async move {
            let (question, answer) = futures::join!(
                translate_field(provider, language, Field::Question, source_question),
                translate_field(provider, language, Field::Answer, source_answer),
            );
            (language.as_str(), question, answer)
        });

        for (language, question, answer) in join_all(attempts).await {
            match (question, answer) {
                (Ok(question), Ok(answer)) => {
                    set.insert(language, TranslatedPair::new(question, answer));
                }
                (question, answer) => {
                    for (field, result) in [(Field::Question, question), (Field::Answer, answer)] {
                        if let Err(e) = result {
                            warn!(
                                "Translation of {} into '{}' via {} failed: {}",
                                field,
                                language,
                                provider.name(),
                                e
                            );
                        }
                    }
                }
            }
        }

        debug!(
            "Translated into {}/{} languages: {:?}",
            set.len(),
            targets.len(),
            set.languages().collect::<Vec<_>>()
        );

        set
    }
}

/// Translate one field, treating blank output as a failure
async fn translate_field(
    provider: &dyn TranslationProvider,
    language: &str,
    field: Field,
    text: &str,
) -> Result<String, ProviderError> {
    let translated = provider.translate(language, text).await?;
    if translated.trim().is_empty() {
        debug!("Empty {} translation for '{}'", field, language);
        return Err(ProviderError::EmptyResponse);
    }
    Ok(translated)
}
