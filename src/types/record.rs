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

use crate::types::timestamp::Timestamp;

/// The ease factor of a freshly added word.
pub const INITIAL_EASE: f64 = 2.5;

/// Per-word scheduling state. Replaced wholesale by the calculator's output
/// on every rating; never partially updated.
#[derive(Clone, PartialEq, Debug)]
pub struct ReviewRecord {
    /// When the word next becomes eligible for review.
    pub due_at: Timestamp,
    /// The last computed review interval.
    pub interval_days: u32,
    /// Interval growth multiplier, kept within `[1.3, 2.5]`.
    pub ease: f64,
    /// Consecutive successful reviews.
    pub streak: u32,
    /// None before the first review.
    pub last_reviewed_at: Option<Timestamp>,
    /// Incremented exactly once per rating.
    pub review_count: u32,
}

impl ReviewRecord {
    /// A fresh record: due immediately, default ease.
    pub fn new(now: Timestamp) -> Self {
        Self {
            due_at: now,
            interval_days: 0,
            ease: INITIAL_EASE,
            streak: 0,
            last_reviewed_at: None,
            review_count: 0,
        }
    }
}
