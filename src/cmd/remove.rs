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
use crate::error::fail;
use crate::store::WordStore;
use crate::types::word::word_id;

pub fn remove(collection: Collection, text: String, language: String) -> Fallible<()> {
    let id = word_id(&text, &language);
    match collection.db.get(&id)? {
        Some(word) => {
            collection.db.delete(&id)?;
            println!("Removed \"{}\".", word.text);
            Ok(())
        }
        None => fail("word not found."),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::types::timestamp::Timestamp;
    use crate::types::word::WordEntry;

    #[test]
    fn test_remove_deletes_the_word() {
        let dir = tempdir().unwrap();
        let collection =
            Collection::open(Some(dir.path().to_str().unwrap().to_string())).unwrap();
        let db = collection.db.clone();
        let word = WordEntry::new("fleeting", "en", "", "", Timestamp::now());
        db.put(&word).unwrap();
        remove(collection, "fleeting".to_string(), "en".to_string()).unwrap();
        assert_eq!(db.get("en_fleeting").unwrap(), None);
    }

    #[test]
    fn test_remove_missing_word_fails() {
        let dir = tempdir().unwrap();
        let collection =
            Collection::open(Some(dir.path().to_str().unwrap().to_string())).unwrap();
        let result = remove(collection, "missing".to_string(), "en".to_string());
        assert!(result.is_err());
    }
}
