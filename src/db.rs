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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::Row;
use rusqlite::Transaction;

use crate::error::Fallible;
use crate::store::WordStore;
use crate::types::record::ReviewRecord;
use crate::types::timestamp::Timestamp;
use crate::types::word::WordEntry;
use crate::types::word::WordStatus;

/// The SQLite-backed word store. Cheap to clone; clones share the same
/// connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

const WORD_COLUMNS: &str = "id, text, language, definition, part_of_speech, added_at, status, due_at, interval_days, ease, streak, last_reviewed_at, review_count";

impl WordStore for Database {
    fn get(&self, id: &str) -> Fallible<Option<WordEntry>> {
        let conn = self.acquire();
        let sql = format!("select {WORD_COLUMNS} from words where id = ?;");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(word_from_row(row)?)),
            None => Ok(None),
        }
    }

    fn put(&self, word: &WordEntry) -> Fallible<()> {
        log::debug!("Storing word: {}", word.id);
        let conn = self.acquire();
        // An upsert rather than `insert or replace`: replacing would assign a
        // fresh rowid and lose the insertion order `query` promises.
        let sql = format!(
            "insert into words ({WORD_COLUMNS}) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             on conflict (id) do update set \
             text = excluded.text, language = excluded.language, \
             definition = excluded.definition, part_of_speech = excluded.part_of_speech, \
             added_at = excluded.added_at, status = excluded.status, \
             due_at = excluded.due_at, interval_days = excluded.interval_days, \
             ease = excluded.ease, streak = excluded.streak, \
             last_reviewed_at = excluded.last_reviewed_at, review_count = excluded.review_count;"
        );
        conn.execute(
            &sql,
            (
                &word.id,
                &word.text,
                &word.language,
                &word.definition,
                &word.part_of_speech,
                word.added_at,
                word.status,
                word.review.due_at,
                word.review.interval_days,
                word.review.ease,
                word.review.streak,
                word.review.last_reviewed_at,
                word.review.review_count,
            ),
        )?;
        Ok(())
    }

    fn query(&self, status: Option<WordStatus>) -> Fallible<Vec<WordEntry>> {
        let conn = self.acquire();
        let mut words = Vec::new();
        match status {
            Some(status) => {
                let sql = format!("select {WORD_COLUMNS} from words where status = ? order by rowid;");
                let mut stmt = conn.prepare(&sql)?;
                let mut rows = stmt.query([status])?;
                while let Some(row) = rows.next()? {
                    words.push(word_from_row(row)?);
                }
            }
            None => {
                let sql = format!("select {WORD_COLUMNS} from words order by rowid;");
                let mut stmt = conn.prepare(&sql)?;
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    words.push(word_from_row(row)?);
                }
            }
        }
        Ok(words)
    }

    fn delete(&self, id: &str) -> Fallible<()> {
        let conn = self.acquire();
        conn.execute("delete from words where id = ?;", [id])?;
        Ok(())
    }
}

fn word_from_row(row: &Row) -> Fallible<WordEntry> {
    let last_reviewed_at: Option<Timestamp> = row.get(11)?;
    Ok(WordEntry {
        id: row.get(0)?,
        text: row.get(1)?,
        language: row.get(2)?,
        definition: row.get(3)?,
        part_of_speech: row.get(4)?,
        added_at: row.get(5)?,
        status: row.get(6)?,
        review: ReviewRecord {
            due_at: row.get(7)?,
            interval_days: row.get(8)?,
            ease: row.get(9)?,
            streak: row.get(10)?,
            last_reviewed_at,
            review_count: row.get(12)?,
        },
    })
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["words"], |row| row.get(0))?;
    Ok(count > 0)
}
