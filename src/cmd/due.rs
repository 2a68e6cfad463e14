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
use crate::srs;
use crate::store::WordStore;
use crate::types::timestamp::Timestamp;

/// List the words due for review, oldest-overdue first.
pub fn due(collection: Collection, limit: Option<usize>) -> Fallible<()> {
    let words = collection.db.query(None)?;
    let now = Timestamp::now();
    let due = srs::words_due(&words, now, limit);
    if due.is_empty() {
        println!("No words due for review.");
        return Ok(());
    }
    println!("{} words due:", due.len());
    for word in &due {
        let overdue_days = -srs::days_until_due(word, now);
        if overdue_days > 0 {
            println!(
                "  {} (due {}, {overdue_days} days overdue)",
                word.text,
                word.review.due_at.local_date_string()
            );
        } else {
            println!(
                "  {} (due {})",
                word.text,
                word.review.due_at.local_date_string()
            );
        }
    }
    Ok(())
}
