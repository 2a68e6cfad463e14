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

use crate::error::Fallible;
use crate::types::word::WordEntry;
use crate::types::word::WordStatus;

/// Storage interface for word entries. The session scheduler takes any
/// implementation, so tests can substitute in-memory doubles for the SQLite
/// store.
///
/// `query` returns words in insertion order; the selection policies rely on
/// that for their tie-breaking.
pub trait WordStore {
    fn get(&self, id: &str) -> Fallible<Option<WordEntry>>;
    fn put(&self, word: &WordEntry) -> Fallible<()>;
    fn query(&self, status: Option<WordStatus>) -> Fallible<Vec<WordEntry>>;
    fn delete(&self, id: &str) -> Fallible<()>;
}
