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

//! The spaced-repetition calculator: pure functions from a word's scheduling
//! state and a rating to the next scheduling state, plus the due-set,
//! statistics, and prediction queries built on top of it.

use rand::Rng;
use serde::Serialize;

use crate::types::rating::Rating;
use crate::types::record::ReviewRecord;
use crate::types::strength::Strength;
use crate::types::timestamp::DAY_MS;
use crate::types::timestamp::Timestamp;
use crate::types::word::WordEntry;
use crate::types::word::WordStatus;

/// The lower bound on the ease factor.
pub const MIN_EASE: f64 = 1.3;

/// The upper bound on the ease factor.
pub const MAX_EASE: f64 = 2.5;

/// The shortest and longest intervals the calculator will schedule, in days.
const MIN_INTERVAL_DAYS: f64 = 1.0;
const MAX_INTERVAL_DAYS: f64 = 365.0;

/// Compute the scheduling state after a review. The caller replaces the
/// word's record with the returned one wholesale.
///
/// `now` and `rng` are explicit so the result is reproducible under test;
/// production call sites pass `Timestamp::now()` and `rand::thread_rng()`.
pub fn next_review(
    record: &ReviewRecord,
    rating: Rating,
    strength: Strength,
    now: Timestamp,
    rng: &mut impl Rng,
) -> ReviewRecord {
    let multiplier = strength.multiplier();
    let mut ease = record.ease;
    let streak;
    let interval_days;
    match rating {
        Rating::Again => {
            streak = 0;
            interval_days = 0;
            ease = MIN_EASE.max(ease - 0.2);
        }
        Rating::Hard => {
            streak = record.streak.saturating_sub(1);
            interval_days = compute_interval(record.interval_days, ease * 0.6, multiplier, rng);
            ease = MIN_EASE.max(ease - 0.15);
        }
        Rating::Good => {
            streak = record.streak + 1;
            interval_days = compute_interval(record.interval_days, ease, multiplier, rng);
            if streak > 3 {
                ease = MAX_EASE.min(ease + 0.05);
            }
        }
        Rating::Easy => {
            streak = record.streak + 1;
            interval_days = compute_interval(record.interval_days, ease * 1.3, multiplier, rng);
            ease = MAX_EASE.min(ease + 0.15);
        }
    }
    ReviewRecord {
        due_at: now.plus_days(interval_days),
        interval_days,
        ease,
        streak,
        last_reviewed_at: Some(now),
        review_count: record.review_count + 1,
    }
}

/// The interval growth schedule: first success lands on the next day, the
/// second about a week out, and from there the interval is multiplied by the
/// effective ease. The ±10% jitter beyond the second review keeps words that
/// were added together from re-colliding on the same future day.
fn compute_interval(
    prev_interval: u32,
    effective_ease: f64,
    strength_multiplier: f64,
    rng: &mut impl Rng,
) -> u32 {
    if prev_interval == 0 {
        return ((1.0 * strength_multiplier).round() as u32).max(1);
    }
    if prev_interval == 1 {
        return ((6.0 * strength_multiplier).round() as u32).max(2);
    }
    let base = prev_interval as f64 * effective_ease * strength_multiplier;
    let jitter = rng.gen_range(0.9..=1.1);
    (base * jitter).round().clamp(MIN_INTERVAL_DAYS, MAX_INTERVAL_DAYS) as u32
}

/// Whether a word is eligible for review right now.
pub fn is_due(word: &WordEntry, now: Timestamp) -> bool {
    word.status == WordStatus::Learning && word.review.due_at <= now
}

/// Words due for review, oldest-overdue first. The sort is stable, so words
/// with equal due times keep their input order.
pub fn words_due(words: &[WordEntry], now: Timestamp, limit: Option<usize>) -> Vec<WordEntry> {
    let mut due: Vec<WordEntry> = words.iter().filter(|w| is_due(w, now)).cloned().collect();
    due.sort_by_key(|w| w.review.due_at);
    if let Some(limit) = limit {
        due.truncate(limit);
    }
    due
}

/// Aggregate counts and averages over a word collection. Averages cover
/// learning-status words only.
#[derive(Serialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DeckStats {
    pub total_words: usize,
    pub learning_words: usize,
    pub learned_words: usize,
    pub due_words: usize,
    pub average_ease: f64,
    pub average_streak: f64,
}

pub fn deck_stats(words: &[WordEntry], now: Timestamp) -> DeckStats {
    let learning: Vec<&WordEntry> = words
        .iter()
        .filter(|w| w.status == WordStatus::Learning)
        .collect();
    let learned_count = words
        .iter()
        .filter(|w| w.status == WordStatus::Learned)
        .count();
    let due_count = learning.iter().filter(|w| w.review.due_at <= now).count();
    let (average_ease, average_streak) = if learning.is_empty() {
        (0.0, 0.0)
    } else {
        let total_ease: f64 = learning.iter().map(|w| w.review.ease).sum();
        let total_streak: f64 = learning.iter().map(|w| w.review.streak as f64).sum();
        (
            total_ease / learning.len() as f64,
            total_streak / learning.len() as f64,
        )
    };
    DeckStats {
        total_words: words.len(),
        learning_words: learning.len(),
        learned_words: learned_count,
        due_words: due_count,
        average_ease,
        average_streak,
    }
}

/// A what-if projection: the schedule a word would land on if it were rated
/// a particular way right now.
#[derive(Clone, Debug)]
pub struct Prediction {
    pub rating: Rating,
    pub due_at: Timestamp,
    pub interval_days: u32,
}

/// Project the result of each of the four ratings. The input record is not
/// modified.
pub fn predict_review_dates(
    record: &ReviewRecord,
    strength: Strength,
    now: Timestamp,
    rng: &mut impl Rng,
) -> Vec<Prediction> {
    Rating::ALL
        .iter()
        .map(|&rating| {
            let next = next_review(record, rating, strength, now, rng);
            Prediction {
                rating,
                due_at: next.due_at,
                interval_days: next.interval_days,
            }
        })
        .collect()
}

/// The fraction of reviewed words whose current streak is positive. Zero
/// when nothing has been reviewed yet.
pub fn retention_rate(words: &[WordEntry]) -> f64 {
    let reviewed: Vec<&WordEntry> = words
        .iter()
        .filter(|w| w.review.review_count > 0)
        .collect();
    if reviewed.is_empty() {
        return 0.0;
    }
    let retained = reviewed.iter().filter(|w| w.review.streak > 0).count();
    retained as f64 / reviewed.len() as f64
}

/// Adjust the daily review limit from session performance: raise it 20%
/// (capped at 50) when the user finishes comfortably, lower it 20% (floored
/// at 10) when they struggle, leave it alone otherwise. The two-sided
/// thresholds can oscillate at the boundary; there is no extra guard.
pub fn suggest_daily_limit(current_limit: u32, completion_rate: f64, average_minutes: f64) -> u32 {
    if completion_rate > 0.9 && average_minutes < 15.0 {
        return ((current_limit as f64 * 1.2).round() as u32).min(50);
    }
    if completion_rate < 0.7 || average_minutes > 25.0 {
        return ((current_limit as f64 * 0.8).round() as u32).max(10);
    }
    current_limit
}

/// Days until a word comes due, rounded up. Negative when overdue.
pub fn days_until_due(word: &WordEntry, now: Timestamp) -> i64 {
    let ms_until_due = word.review.due_at.millis() - now.millis();
    (ms_until_due as f64 / DAY_MS as f64).ceil() as i64
}

/// Human-readable rendering of an interval length.
pub fn format_interval(days: u32) -> String {
    if days == 0 {
        return "now".to_string();
    }
    if days == 1 {
        return "1 day".to_string();
    }
    if days < 30 {
        return format!("{days} days");
    }
    if days < 365 {
        return format!("{} months", (days as f64 / 30.0).round());
    }
    format!("{} years", (days as f64 / 365.0).round())
}
