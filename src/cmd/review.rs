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

use std::io::Read;
use std::time::Instant;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::session::RateOutcome;
use crate::session::ReviewMode;
use crate::session::ReviewSession;
use crate::session::SessionStart;
use crate::srs;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

pub fn review(collection: Collection, mode: ReviewMode, count: Option<usize>) -> Fallible<()> {
    let config = collection.config.clone();
    let strength = config.review.strength;
    let count = count.unwrap_or(config.review.daily_limit as usize);
    let mut rng = rand::thread_rng();

    let mut session = ReviewSession::new(collection.db.clone(), strength);
    match session.start(mode, count, Timestamp::now(), &mut rng)? {
        SessionStart::NoWords => {
            // Distinct from a completed session: there was nothing to do.
            println!("No words available for review. Add some words first.");
            return Ok(());
        }
        SessionStart::Started { word_count } => {
            println!("Reviewing {word_count} words.");
        }
    }

    loop {
        let word = match session.current_word() {
            Some(word) => word.clone(),
            None => break,
        };
        println!();
        println!("Q: {}", word.text);
        println!("[press space + enter to reveal]");
        wait_for_space();
        session.flip_card();
        if word.part_of_speech.is_empty() {
            println!("A: {}", word.definition);
        } else {
            println!("A: ({}) {}", word.part_of_speech, word.definition);
        }

        let predictions = srs::predict_review_dates(&word.review, strength, Timestamp::now(), &mut rng);
        let preview: Vec<String> = predictions
            .iter()
            .map(|p| format!("{} = {}", p.rating.as_str(), srs::format_interval(p.interval_days)))
            .collect();
        println!("[{}]", preview.join(", "));

        let started = Instant::now();
        let mut quit = false;
        loop {
            let rating = match read_answer() {
                Answer::Rated(rating) => rating,
                Answer::Quit => {
                    session.end();
                    quit = true;
                    break;
                }
            };
            let spent = started.elapsed().as_millis() as i64;
            match session.rate_current(rating, spent, Timestamp::now(), &mut rng) {
                Ok(RateOutcome::Advanced) => break,
                Ok(RateOutcome::Completed) => break,
                Err(e) => {
                    // The rating was not applied; the word stays current.
                    println!("Failed to save the review ({e}). Please try again.");
                }
            }
        }
        if quit {
            break;
        }
    }

    let stats = session.stats();
    println!();
    println!("Session {} completed.", session.mode());
    println!(
        "Reviewed {} words, {} correct, average rating {:.1}.",
        stats.reviewed_count, stats.correct_count, stats.average_rating
    );
    let minutes = stats.total_time_ms as f64 / 60_000.0;
    println!("Time spent: {minutes:.1} minutes.");

    let completion_rate = stats.reviewed_count as f64 / session.word_count() as f64;
    let suggested = srs::suggest_daily_limit(config.review.daily_limit, completion_rate, minutes);
    if suggested != config.review.daily_limit {
        println!(
            "Suggestion: change daily_limit from {} to {suggested} in wordmill.toml.",
            config.review.daily_limit
        );
    }
    Ok(())
}

fn wait_for_space() {
    loop {
        let ch = std::io::stdin().bytes().next();
        if let Some(Ok(b' ')) = ch {
            break;
        }
    }
}

enum Answer {
    Rated(Rating),
    Quit,
}

fn read_answer() -> Answer {
    loop {
        println!("Rating: (1 = Again, 2 = Hard, 3 = Good, 4 = Easy, q = quit)");
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).unwrap();
        match input.trim() {
            "1" => return Answer::Rated(Rating::Again),
            "2" => return Answer::Rated(Rating::Hard),
            "3" => return Answer::Rated(Rating::Good),
            "4" => return Answer::Rated(Rating::Easy),
            "q" => return Answer::Quit,
            _ => println!("Invalid input. Please enter a number between 1 and 4."),
        }
    }
}
