// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;

use crate::error::ErrorReport;
use crate::types::record::ReviewRecord;
use crate::types::timestamp::Timestamp;

/// Where a word stands in its learning lifecycle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WordStatus {
    /// The word is being actively learned and participates in scheduling.
    Learning,
    /// The word has been learned; it only appears in test sessions.
    Learned,
}

impl WordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WordStatus::Learning => "learning",
            WordStatus::Learned => "learned",
        }
    }
}

impl TryFrom<&str> for WordStatus {
    type Error = ErrorReport;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "learning" => Ok(WordStatus::Learning),
            "learned" => Ok(WordStatus::Learned),
            _ => Err(ErrorReport::new("invalid word status in database")),
        }
    }
}

impl ToSql for WordStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for WordStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        WordStatus::try_from(string.as_str()).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// A vocabulary entry and its scheduling state.
#[derive(Clone, PartialEq, Debug)]
pub struct WordEntry {
    pub id: String,
    pub text: String,
    pub language: String,
    pub definition: String,
    pub part_of_speech: String,
    pub added_at: Timestamp,
    pub status: WordStatus,
    pub review: ReviewRecord,
}

impl WordEntry {
    pub fn new(
        text: impl Into<String>,
        language: impl Into<String>,
        definition: impl Into<String>,
        part_of_speech: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        let text = text.into();
        let language = language.into();
        Self {
            id: word_id(&text, &language),
            text,
            language,
            definition: definition.into(),
            part_of_speech: part_of_speech.into(),
            added_at: now,
            status: WordStatus::Learning,
            review: ReviewRecord::new(now),
        }
    }
}

/// The storage key for a word: language tag plus the lowercased text with
/// whitespace collapsed to underscores.
pub fn word_id(text: &str, language: &str) -> String {
    let normalized = text
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("{language}_{normalized}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_id() {
        assert_eq!(word_id("Hello World", "en"), "en_hello_world");
        assert_eq!(word_id("chat", "fr"), "fr_chat");
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!(WordStatus::try_from("learning").unwrap(), WordStatus::Learning);
        assert_eq!(WordStatus::try_from("learned").unwrap(), WordStatus::Learned);
        assert!(WordStatus::try_from("deleted").is_err());
    }

    #[test]
    fn test_new_word_defaults() {
        let now = Timestamp::from_millis(42);
        let word = WordEntry::new("ephemeral", "en", "lasting a short time", "adjective", now);
        assert_eq!(word.id, "en_ephemeral");
        assert_eq!(word.status, WordStatus::Learning);
        assert_eq!(word.added_at, now);
        assert_eq!(word.review.due_at, now);
    }
}
