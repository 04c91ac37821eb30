/*!
 * Database row models.
 *
 * `FaqRow` mirrors the `faqs` table column for column; conversion to and
 * from `ContentRecord` happens outside the SQLite closures so that a bad
 * row turns into a proper error instead of a rusqlite conversion failure.
 */

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use std::collections::BTreeMap;

use crate::faq::ContentRecord;
use crate::translation::{Field, TranslationSet};

/// Columns selected for every FAQ query, in `FaqRow` order
pub const FAQ_COLUMNS: &str =
    "id, question, answer, question_translated, answer_translated, created_at, updated_at";

/// Raw row of the `faqs` table
#[derive(Debug, Clone, PartialEq)]
pub struct FaqRow {
    pub id: i64,
    pub question: String,
    pub answer: String,
    /// JSON object language -> translated question
    pub question_translated: String,
    /// JSON object language -> translated answer
    pub answer_translated: String,
    pub created_at: String,
    pub updated_at: String,
}

impl FaqRow {
    /// Read a row selected with `FAQ_COLUMNS`
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            question: row.get(1)?,
            answer: row.get(2)?,
            question_translated: row.get(3)?,
            answer_translated: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    /// Convert into a record authored in `source_language`
    pub fn into_record(self, source_language: &str) -> Result<ContentRecord> {
        let questions: BTreeMap<String, String> = serde_json::from_str(&self.question_translated)
            .with_context(|| format!("Corrupt question_translated for FAQ {}", self.id))?;
        let answers: BTreeMap<String, String> = serde_json::from_str(&self.answer_translated)
            .with_context(|| format!("Corrupt answer_translated for FAQ {}", self.id))?;

        Ok(ContentRecord {
            id: self.id,
            question: self.question,
            answer: self.answer,
            translations: TranslationSet::from_field_maps(source_language, &questions, &answers),
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Serialize one field of a translation set for its JSON column
pub fn encode_translations(translations: &TranslationSet, field: Field) -> Result<String> {
    Ok(serde_json::to_string(&translations.field_map(field))?)
}

/// Truncate a timestamp to the precision stored in the database
pub fn storage_precision(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp.trunc_subsecs(6)
}

/// Format a timestamp as fixed-width RFC 3339 (microseconds, `Z`)
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored RFC 3339 timestamp
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid stored timestamp: {}", value))?
        .with_timezone(&Utc))
}
