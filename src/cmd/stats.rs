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

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use serde::Serialize;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::srs;
use crate::srs::DeckStats;
use crate::store::WordStore;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsReport {
    #[serde(flatten)]
    deck: DeckStats,
    retention_rate: f64,
}

pub fn print_stats(collection: Collection, format: StatsFormat) -> Fallible<()> {
    let words = collection.db.query(None)?;
    let now = Timestamp::now();
    let report = StatsReport {
        deck: srs::deck_stats(&words, now),
        retention_rate: srs::retention_rate(&words),
    };

    match format {
        StatsFormat::Text => {
            println!("Total words:    {}", report.deck.total_words);
            println!("Learning:       {}", report.deck.learning_words);
            println!("Learned:        {}", report.deck.learned_words);
            println!("Due now:        {}", report.deck.due_words);
            println!("Average ease:   {:.2}", report.deck.average_ease);
            println!("Average streak: {:.1}", report.deck.average_streak);
            println!("Retention rate: {:.0}%", report.retention_rate * 100.0);
        }
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&report)?;
            println!("{}", stats_json);
        }
    }
    Ok(())
}
