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

use crate::collection::Collection;
use crate::error::Fallible;
use crate::store::WordStore;
use crate::types::timestamp::Timestamp;
use crate::types::word::WordEntry;
use crate::types::word::word_id;

/// Add a word, or refresh an existing entry without touching its scheduling
/// state.
pub fn add(
    collection: Collection,
    text: String,
    language: String,
    definition: String,
    part_of_speech: String,
) -> Fallible<()> {
    let id = word_id(&text, &language);
    match collection.db.get(&id)? {
        Some(mut existing) => {
            if !definition.is_empty() {
                existing.definition = definition;
            }
            if !part_of_speech.is_empty() {
                existing.part_of_speech = part_of_speech;
            }
            collection.db.put(&existing)?;
            println!("Updated \"{}\".", existing.text);
        }
        None => {
            let word = WordEntry::new(text, language, definition, part_of_speech, Timestamp::now());
            collection.db.put(&word)?;
            println!("Added \"{}\". It is due for review now.", word.text);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::types::word::WordStatus;

    fn open_collection() -> (tempfile::TempDir, Collection) {
        let dir = tempdir().unwrap();
        let collection =
            Collection::open(Some(dir.path().to_str().unwrap().to_string())).unwrap();
        (dir, collection)
    }

    #[test]
    fn test_add_creates_a_learning_word() {
        let (_dir, collection) = open_collection();
        let db = collection.db.clone();
        add(
            collection,
            "Sisyphean".to_string(),
            "en".to_string(),
            "endless and futile".to_string(),
            "adjective".to_string(),
        )
        .unwrap();
        let word = db.get("en_sisyphean").unwrap().unwrap();
        assert_eq!(word.status, WordStatus::Learning);
        assert_eq!(word.review.review_count, 0);
    }

    #[test]
    fn test_add_merges_without_resetting_review_state() {
        let (_dir, collection) = open_collection();
        let db = collection.db.clone();
        let now = Timestamp::now();
        let mut word = WordEntry::new("terse", "en", "curt", "adjective", now);
        word.review.review_count = 4;
        word.review.streak = 4;
        db.put(&word).unwrap();

        add(
            collection,
            "terse".to_string(),
            "en".to_string(),
            "using few words".to_string(),
            String::new(),
        )
        .unwrap();
        let merged = db.get("en_terse").unwrap().unwrap();
        assert_eq!(merged.definition, "using few words");
        assert_eq!(merged.part_of_speech, "adjective");
        assert_eq!(merged.review.review_count, 4);
        assert_eq!(merged.review.streak, 4);
    }
}
