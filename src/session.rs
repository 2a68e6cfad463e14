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

//! The review session state machine: selects a batch of words for a
//! session, sequences presentation, applies calculator results through the
//! word store, and derives session statistics from the review log.

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::Fallible;
use crate::error::fail;
use crate::srs;
use crate::store::WordStore;
use crate::types::rating::Rating;
use crate::types::strength::Strength;
use crate::types::timestamp::DAY_MS;
use crate::types::timestamp::Timestamp;
use crate::types::word::WordEntry;
use crate::types::word::WordStatus;

/// The session lifecycle: `idle -> active <-> paused -> completed -> idle`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionStatus {
    Idle,
    Active,
    Paused,
    Completed,
}

/// What a session is for. Determines which words are selected and how the
/// batch is ordered.
#[derive(ValueEnum, Clone, Copy, Default, PartialEq, Eq, Debug)]
pub enum ReviewMode {
    /// Words being learned, due ones first, hardest first.
    #[default]
    Learning,
    /// Learned words only, shuffled.
    Test,
    /// Due words across both statuses, soonest-due first.
    Quick,
}

impl Display for ReviewMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewMode::Learning => write!(f, "learning"),
            ReviewMode::Test => write!(f, "test"),
            ReviewMode::Quick => write!(f, "quick"),
        }
    }
}

/// The outcome of `start`: either the session went active, or there was
/// nothing to review and the session stayed idle. The caller must branch on
/// this; an empty start is a reported condition, not an error.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionStart {
    Started { word_count: usize },
    NoWords,
}

/// The outcome of rating a word.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RateOutcome {
    /// The cursor moved to the next word.
    Advanced,
    /// That was the last word; the session is complete.
    Completed,
}

/// One entry in the append-only review log.
#[derive(Clone, Debug)]
pub struct ReviewedWord {
    pub word_id: String,
    pub rating: Rating,
    pub time_spent_ms: i64,
    pub timestamp: Timestamp,
}

/// Aggregate statistics, always recomputed from the review log.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SessionStats {
    pub reviewed_count: usize,
    pub correct_count: usize,
    pub average_rating: f64,
    pub total_time_ms: i64,
}

pub struct ReviewSession<S: WordStore> {
    store: S,
    strength: Strength,
    status: SessionStatus,
    mode: ReviewMode,
    words: Vec<WordEntry>,
    current: usize,
    flipped: bool,
    reviewed: Vec<ReviewedWord>,
}

impl<S: WordStore> ReviewSession<S> {
    pub fn new(store: S, strength: Strength) -> Self {
        Self {
            store,
            strength,
            status: SessionStatus::Idle,
            mode: ReviewMode::Learning,
            words: Vec::new(),
            current: 0,
            flipped: false,
            reviewed: Vec::new(),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn mode(&self) -> ReviewMode {
        self.mode
    }

    pub fn flipped(&self) -> bool {
        self.flipped
    }

    /// The word under the cursor, while a session is active or paused.
    pub fn current_word(&self) -> Option<&WordEntry> {
        match self.status {
            SessionStatus::Active | SessionStatus::Paused => self.words.get(self.current),
            _ => None,
        }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn reviewed(&self) -> &[ReviewedWord] {
        &self.reviewed
    }

    /// Load and order the batch for `mode`, then go active. The batch is
    /// fixed at this point; the session does not grow afterwards.
    pub fn start(
        &mut self,
        mode: ReviewMode,
        count: usize,
        now: Timestamp,
        rng: &mut impl Rng,
    ) -> Fallible<SessionStart> {
        if self.status != SessionStatus::Idle {
            return fail("a session is already in progress.");
        }
        let words = select_words(&self.store, mode, count, now, rng)?;
        if words.is_empty() {
            log::debug!("No words available for a {mode:?} session");
            return Ok(SessionStart::NoWords);
        }
        let word_count = words.len();
        log::debug!("Starting {mode:?} session with {word_count} words");
        self.status = SessionStatus::Active;
        self.mode = mode;
        self.words = words;
        self.current = 0;
        self.flipped = false;
        self.reviewed.clear();
        Ok(SessionStart::Started { word_count })
    }

    /// Toggle the presentation flag. Presentation-only; no state transition.
    pub fn flip_card(&mut self) {
        if self.status == SessionStatus::Active {
            self.flipped = !self.flipped;
        }
    }

    /// Apply a rating to the current word: run the calculator, persist the
    /// new record, log the review, and advance. If persistence fails the
    /// session is left exactly as it was and the rating must be resubmitted.
    pub fn rate_current(
        &mut self,
        rating: Rating,
        time_spent_ms: i64,
        now: Timestamp,
        rng: &mut impl Rng,
    ) -> Fallible<RateOutcome> {
        if self.status != SessionStatus::Active {
            return fail("no active session.");
        }
        let word = &self.words[self.current];
        let mut updated = word.clone();
        updated.review = srs::next_review(&word.review, rating, self.strength, now, rng);
        if let Err(e) = self.store.put(&updated) {
            log::error!("Failed to persist review for {}: {e}", updated.id);
            return Err(e);
        }
        self.reviewed.push(ReviewedWord {
            word_id: updated.id.clone(),
            rating,
            time_spent_ms,
            timestamp: now,
        });
        self.words[self.current] = updated;
        self.flipped = false;
        if self.current + 1 < self.words.len() {
            self.current += 1;
            Ok(RateOutcome::Advanced)
        } else {
            log::debug!("Session completed");
            self.status = SessionStatus::Completed;
            Ok(RateOutcome::Completed)
        }
    }

    /// No-op unless active.
    pub fn pause(&mut self) {
        if self.status == SessionStatus::Active {
            self.status = SessionStatus::Paused;
        }
    }

    /// No-op unless paused.
    pub fn resume(&mut self) {
        if self.status == SessionStatus::Paused {
            self.status = SessionStatus::Active;
        }
    }

    /// End the session early. No-op unless active or paused.
    pub fn end(&mut self) {
        if self.status == SessionStatus::Active || self.status == SessionStatus::Paused {
            log::debug!("Session ended after {} reviews", self.reviewed.len());
            self.status = SessionStatus::Completed;
        }
    }

    /// Clear a completed session back to idle. No-op from other states.
    pub fn reset(&mut self) {
        if self.status == SessionStatus::Completed {
            self.status = SessionStatus::Idle;
            self.words.clear();
            self.current = 0;
            self.flipped = false;
            self.reviewed.clear();
        }
    }

    /// Derive aggregate statistics from the review log. The log is the
    /// single source of truth; nothing here is cached.
    pub fn stats(&self) -> SessionStats {
        let reviewed_count = self.reviewed.len();
        let correct_count = self.reviewed.iter().filter(|r| r.rating.is_correct()).count();
        let total_time_ms: i64 = self.reviewed.iter().map(|r| r.time_spent_ms).sum();
        let average_rating = if reviewed_count == 0 {
            0.0
        } else {
            let total: u32 = self.reviewed.iter().map(|r| r.rating.score()).sum();
            total as f64 / reviewed_count as f64
        };
        SessionStats {
            reviewed_count,
            correct_count,
            average_rating,
            total_time_ms,
        }
    }
}

/// Pull and order the candidate batch for a mode. Each mode either
/// priority-sorts or shuffles, never both.
fn select_words<S: WordStore>(
    store: &S,
    mode: ReviewMode,
    limit: usize,
    now: Timestamp,
    rng: &mut impl Rng,
) -> Fallible<Vec<WordEntry>> {
    let mut words = match mode {
        ReviewMode::Learning => {
            let mut words = store.query(Some(WordStatus::Learning))?;
            // Due words first, hardest first within each group. The sort is
            // stable, so ties keep insertion order.
            words.sort_by(|a, b| {
                let due = srs::is_due(b, now).cmp(&srs::is_due(a, now));
                due.then(priority(b, now).total_cmp(&priority(a, now)))
            });
            words
        }
        ReviewMode::Test => {
            let mut words = store.query(Some(WordStatus::Learned))?;
            words.shuffle(rng);
            words
        }
        ReviewMode::Quick => {
            let mut words = store.query(None)?;
            words.retain(|w| w.review.due_at <= now);
            words.sort_by_key(|w| w.review.due_at);
            // Truncate on the due-soonest order, then present hardest first.
            words.truncate(limit);
            words.sort_by(|a, b| priority(b, now).total_cmp(&priority(a, now)));
            words
        }
    };
    words.truncate(limit);
    Ok(words)
}

/// Priority score for the "hardest first" orderings: urgency from status and
/// overdue time, discounted by the word's success rate so well-known words
/// sink.
fn priority(word: &WordEntry, now: Timestamp) -> f64 {
    let mut priority = match word.status {
        WordStatus::Learning => 60.0,
        WordStatus::Learned => 40.0,
    };
    let days_overdue = (now.millis() - word.review.due_at.millis()) as f64 / DAY_MS as f64;
    if days_overdue > 0.0 {
        priority += (days_overdue * 10.0).min(50.0);
    }
    priority += 10.0;
    if word.review.review_count > 0 {
        let success_rate = word.review.streak as f64 / word.review.review_count as f64;
        priority -= success_rate * 20.0;
    }
    priority
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::error::ErrorReport;

    /// In-memory store preserving insertion order.
    struct MemoryStore {
        words: RefCell<Vec<WordEntry>>,
    }

    impl MemoryStore {
        fn new(words: Vec<WordEntry>) -> Self {
            Self {
                words: RefCell::new(words),
            }
        }
    }

    impl WordStore for MemoryStore {
        fn get(&self, id: &str) -> Fallible<Option<WordEntry>> {
            Ok(self.words.borrow().iter().find(|w| w.id == id).cloned())
        }

        fn put(&self, word: &WordEntry) -> Fallible<()> {
            let mut words = self.words.borrow_mut();
            match words.iter_mut().find(|w| w.id == word.id) {
                Some(existing) => *existing = word.clone(),
                None => words.push(word.clone()),
            }
            Ok(())
        }

        fn query(&self, status: Option<WordStatus>) -> Fallible<Vec<WordEntry>> {
            Ok(self
                .words
                .borrow()
                .iter()
                .filter(|w| status.is_none() || status == Some(w.status))
                .cloned()
                .collect())
        }

        fn delete(&self, id: &str) -> Fallible<()> {
            self.words.borrow_mut().retain(|w| w.id != id);
            Ok(())
        }
    }

    /// A store whose writes always fail.
    struct BrokenStore;

    impl WordStore for BrokenStore {
        fn get(&self, _id: &str) -> Fallible<Option<WordEntry>> {
            Ok(None)
        }

        fn put(&self, _word: &WordEntry) -> Fallible<()> {
            Err(ErrorReport::new("disk on fire"))
        }

        fn query(&self, _status: Option<WordStatus>) -> Fallible<Vec<WordEntry>> {
            let now = Timestamp::from_millis(0);
            Ok(vec![WordEntry::new("stuck", "en", "", "", now)])
        }

        fn delete(&self, _id: &str) -> Fallible<()> {
            Ok(())
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    fn word(id: &str, status: WordStatus, due_at_ms: i64) -> WordEntry {
        let mut word = WordEntry::new(id, "en", "", "", Timestamp::from_millis(0));
        word.id = id.to_string();
        word.status = status;
        word.review.due_at = Timestamp::from_millis(due_at_ms);
        word
    }

    fn learning_batch(count: usize) -> Vec<WordEntry> {
        (0..count)
            .map(|i| word(&format!("w{i}"), WordStatus::Learning, i as i64))
            .collect()
    }

    #[test]
    fn test_start_with_no_words_reports_and_stays_idle() {
        let store = MemoryStore::new(Vec::new());
        let mut session = ReviewSession::new(store, Strength::Standard);
        let outcome = session
            .start(ReviewMode::Test, 20, Timestamp::from_millis(100), &mut rng())
            .unwrap();
        assert_eq!(outcome, SessionStart::NoWords);
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.current_word(), None);
    }

    #[test]
    fn test_start_goes_active_with_fixed_batch() {
        let store = MemoryStore::new(learning_batch(5));
        let mut session = ReviewSession::new(store, Strength::Standard);
        let outcome = session
            .start(ReviewMode::Learning, 3, Timestamp::from_millis(100), &mut rng())
            .unwrap();
        assert_eq!(outcome, SessionStart::Started { word_count: 3 });
        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.word_count(), 3);
        assert!(session.current_word().is_some());
    }

    #[test]
    fn test_start_twice_is_an_error() {
        let store = MemoryStore::new(learning_batch(2));
        let mut session = ReviewSession::new(store, Strength::Standard);
        let now = Timestamp::from_millis(100);
        session.start(ReviewMode::Learning, 5, now, &mut rng()).unwrap();
        assert!(session.start(ReviewMode::Learning, 5, now, &mut rng()).is_err());
    }

    #[test]
    fn test_rating_advances_and_completes() {
        let store = MemoryStore::new(learning_batch(2));
        let mut session = ReviewSession::new(store, Strength::Standard);
        let now = Timestamp::from_millis(100);
        let mut rng = rng();
        session.start(ReviewMode::Learning, 5, now, &mut rng).unwrap();

        let outcome = session.rate_current(Rating::Good, 1_000, now, &mut rng).unwrap();
        assert_eq!(outcome, RateOutcome::Advanced);
        assert_eq!(session.status(), SessionStatus::Active);

        let outcome = session.rate_current(Rating::Again, 2_000, now, &mut rng).unwrap();
        assert_eq!(outcome, RateOutcome::Completed);
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.reviewed().len(), 2);
        let entry = &session.reviewed()[0];
        assert!(entry.word_id.starts_with('w'));
        assert_eq!(entry.rating, Rating::Good);
        assert_eq!(entry.time_spent_ms, 1_000);
        assert_eq!(entry.timestamp, now);
    }

    #[test]
    fn test_review_log_never_exceeds_batch() {
        let store = MemoryStore::new(learning_batch(3));
        let mut session = ReviewSession::new(store, Strength::Standard);
        let now = Timestamp::from_millis(100);
        let mut rng = rng();
        session.start(ReviewMode::Learning, 3, now, &mut rng).unwrap();
        loop {
            assert!(session.reviewed().len() <= session.word_count());
            match session.rate_current(Rating::Good, 500, now, &mut rng) {
                Ok(RateOutcome::Advanced) => {}
                Ok(RateOutcome::Completed) => break,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(session.reviewed().len(), session.word_count());
    }

    #[test]
    fn test_rating_persists_through_the_store() {
        let store = MemoryStore::new(learning_batch(1));
        let mut session = ReviewSession::new(store, Strength::Standard);
        let now = Timestamp::from_millis(100);
        let mut rng = rng();
        session.start(ReviewMode::Learning, 1, now, &mut rng).unwrap();
        session.rate_current(Rating::Good, 500, now, &mut rng).unwrap();
        let stored = session.store.get("w0").unwrap().unwrap();
        assert_eq!(stored.review.review_count, 1);
        assert_eq!(stored.review.interval_days, 1);
        assert_eq!(stored.review.last_reviewed_at, Some(now));
    }

    #[test]
    fn test_persistence_failure_leaves_session_unchanged() {
        let mut session = ReviewSession::new(BrokenStore, Strength::Standard);
        let now = Timestamp::from_millis(100);
        let mut rng = rng();
        session.start(ReviewMode::Learning, 1, now, &mut rng).unwrap();
        let word_before = session.current_word().cloned();

        let result = session.rate_current(Rating::Good, 500, now, &mut rng);
        assert!(result.is_err());
        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.reviewed().len(), 0);
        assert_eq!(session.current_word().cloned(), word_before);
    }

    #[test]
    fn test_pause_and_resume_are_idempotent_safe() {
        let store = MemoryStore::new(learning_batch(1));
        let mut session = ReviewSession::new(store, Strength::Standard);
        let now = Timestamp::from_millis(100);

        // Wrong-state calls are no-ops.
        session.pause();
        assert_eq!(session.status(), SessionStatus::Idle);
        session.resume();
        assert_eq!(session.status(), SessionStatus::Idle);

        session.start(ReviewMode::Learning, 1, now, &mut rng()).unwrap();
        session.pause();
        assert_eq!(session.status(), SessionStatus::Paused);
        session.pause();
        assert_eq!(session.status(), SessionStatus::Paused);
        session.resume();
        assert_eq!(session.status(), SessionStatus::Active);
    }

    #[test]
    fn test_end_and_reset() {
        let store = MemoryStore::new(learning_batch(2));
        let mut session = ReviewSession::new(store, Strength::Standard);
        let now = Timestamp::from_millis(100);
        let mut rng = rng();
        session.start(ReviewMode::Learning, 2, now, &mut rng).unwrap();
        session.rate_current(Rating::Good, 500, now, &mut rng).unwrap();
        session.end();
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.stats().reviewed_count, 1);

        session.reset();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.reviewed().len(), 0);
        assert_eq!(session.word_count(), 0);

        // A fresh session can be started after reset.
        let outcome = session.start(ReviewMode::Learning, 2, now, &mut rng).unwrap();
        assert!(matches!(outcome, SessionStart::Started { .. }));
    }

    #[test]
    fn test_flip_card_toggles_only_while_active() {
        let store = MemoryStore::new(learning_batch(1));
        let mut session = ReviewSession::new(store, Strength::Standard);
        session.flip_card();
        assert!(!session.flipped());
        session
            .start(ReviewMode::Learning, 1, Timestamp::from_millis(100), &mut rng())
            .unwrap();
        session.flip_card();
        assert!(session.flipped());
        session.flip_card();
        assert!(!session.flipped());
    }

    #[test]
    fn test_stats_derive_from_the_log() {
        let store = MemoryStore::new(learning_batch(3));
        let mut session = ReviewSession::new(store, Strength::Standard);
        let now = Timestamp::from_millis(100);
        let mut rng = rng();
        session.start(ReviewMode::Learning, 3, now, &mut rng).unwrap();
        session.rate_current(Rating::Again, 1_000, now, &mut rng).unwrap();
        session.rate_current(Rating::Good, 2_000, now, &mut rng).unwrap();
        session.rate_current(Rating::Easy, 3_000, now, &mut rng).unwrap();

        let stats = session.stats();
        assert_eq!(stats.reviewed_count, 3);
        assert_eq!(stats.correct_count, 2);
        // Mean of 1, 3, 4.
        assert!((stats.average_rating - 8.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.total_time_ms, 6_000);
        // Recomputing yields the same value; nothing is cached.
        assert_eq!(session.stats(), stats);
    }

    #[test]
    fn test_learning_mode_puts_due_words_first() {
        let now = Timestamp::from_millis(10 * DAY_MS);
        let words = vec![
            word("future", WordStatus::Learning, now.millis() + DAY_MS),
            word("overdue", WordStatus::Learning, now.millis() - 2 * DAY_MS),
            word("ignored", WordStatus::Learned, 0),
        ];
        let store = MemoryStore::new(words);
        let mut session = ReviewSession::new(store, Strength::Standard);
        session.start(ReviewMode::Learning, 10, now, &mut rng()).unwrap();
        assert_eq!(session.word_count(), 2);
        assert_eq!(session.current_word().unwrap().id, "overdue");
    }

    #[test]
    fn test_learning_mode_orders_harder_words_first() {
        let now = Timestamp::from_millis(10 * DAY_MS);
        // Both due at the same time; "mastered" has a long success history
        // so its priority is discounted.
        let mut mastered = word("mastered", WordStatus::Learning, now.millis() - DAY_MS);
        mastered.review.streak = 10;
        mastered.review.review_count = 10;
        let struggling = word("struggling", WordStatus::Learning, now.millis() - DAY_MS);
        let store = MemoryStore::new(vec![mastered, struggling]);
        let mut session = ReviewSession::new(store, Strength::Standard);
        session.start(ReviewMode::Learning, 10, now, &mut rng()).unwrap();
        assert_eq!(session.current_word().unwrap().id, "struggling");
    }

    #[test]
    fn test_test_mode_selects_learned_words_only() {
        let now = Timestamp::from_millis(100);
        let words = vec![
            word("a", WordStatus::Learning, 0),
            word("b", WordStatus::Learned, 0),
            word("c", WordStatus::Learned, 0),
        ];
        let store = MemoryStore::new(words);
        let mut session = ReviewSession::new(store, Strength::Standard);
        let outcome = session.start(ReviewMode::Test, 10, now, &mut rng()).unwrap();
        assert_eq!(outcome, SessionStart::Started { word_count: 2 });
        assert!(
            session
                .words
                .iter()
                .all(|w| w.status == WordStatus::Learned)
        );
    }

    #[test]
    fn test_quick_mode_truncates_on_due_soonest() {
        let now = Timestamp::from_millis(10 * DAY_MS);
        let words = vec![
            word("latest", WordStatus::Learning, now.millis() - 1),
            word("oldest", WordStatus::Learned, 100),
            word("middle", WordStatus::Learning, DAY_MS),
            word("future", WordStatus::Learning, now.millis() + 1),
        ];
        let store = MemoryStore::new(words);
        let mut session = ReviewSession::new(store, Strength::Standard);
        let outcome = session.start(ReviewMode::Quick, 2, now, &mut rng()).unwrap();
        assert_eq!(outcome, SessionStart::Started { word_count: 2 });
        // The two soonest-due words survive the cut, whatever the final
        // presentation order.
        let mut ids: Vec<&str> = session.words.iter().map(|w| w.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["middle", "oldest"]);
    }

    #[test]
    fn test_selection_is_deterministic_under_a_seeded_rng() {
        let now = Timestamp::from_millis(100);
        let words: Vec<WordEntry> = (0..8)
            .map(|i| word(&format!("w{i}"), WordStatus::Learned, i as i64))
            .collect();
        let first = {
            let store = MemoryStore::new(words.clone());
            let mut session = ReviewSession::new(store, Strength::Standard);
            let mut rng = StdRng::seed_from_u64(3);
            session.start(ReviewMode::Test, 8, now, &mut rng).unwrap();
            session.words.iter().map(|w| w.id.clone()).collect::<Vec<_>>()
        };
        let second = {
            let store = MemoryStore::new(words);
            let mut session = ReviewSession::new(store, Strength::Standard);
            let mut rng = StdRng::seed_from_u64(3);
            session.start(ReviewMode::Test, 8, now, &mut rng).unwrap();
            session.words.iter().map(|w| w.id.clone()).collect::<Vec<_>>()
        };
        assert_eq!(first, second);
    }
}
