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

use clap::Parser;

use crate::cmd::add::add;
use crate::cmd::due::due;
use crate::cmd::remove::remove;
use crate::cmd::review::review;
use crate::cmd::serve::serve;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::session::ReviewMode;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Review due words.
    Review {
        /// Optional path to the collection directory.
        directory: Option<String>,
        /// Which kind of session to run.
        #[arg(long, value_enum, default_value_t)]
        mode: ReviewMode,
        /// Override the configured number of words per session.
        #[arg(long)]
        count: Option<usize>,
    },
    /// List the words due for review.
    Due {
        /// Optional path to the collection directory.
        directory: Option<String>,
        /// Show at most this many words.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Add a word to the collection.
    Add {
        /// The word itself.
        text: String,
        #[arg(long, default_value = "")]
        definition: String,
        #[arg(long, default_value = "")]
        part_of_speech: String,
        #[arg(long, default_value = "en")]
        language: String,
        /// Optional path to the collection directory.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Remove a word from the collection.
    Remove {
        /// The word itself.
        text: String,
        #[arg(long, default_value = "en")]
        language: String,
        /// Optional path to the collection directory.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Print collection statistics.
    Stats {
        /// Optional path to the collection directory.
        directory: Option<String>,
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Run the multiplayer table-tennis server.
    Serve {
        /// Address to bind, e.g. 0.0.0.0:8000.
        #[arg(long)]
        bind: Option<String>,
        /// Optional path to the collection directory (for wordmill.toml).
        #[arg(long)]
        directory: Option<String>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Review {
            directory,
            mode,
            count,
        } => {
            let collection = Collection::open(directory)?;
            review(collection, mode, count)
        }
        Command::Due { directory, limit } => {
            let collection = Collection::open(directory)?;
            due(collection, limit)
        }
        Command::Add {
            text,
            definition,
            part_of_speech,
            language,
            directory,
        } => {
            let collection = Collection::open(directory)?;
            add(collection, text, language, definition, part_of_speech)
        }
        Command::Remove {
            text,
            language,
            directory,
        } => {
            let collection = Collection::open(directory)?;
            remove(collection, text, language)
        }
        Command::Stats { directory, format } => {
            let collection = Collection::open(directory)?;
            print_stats(collection, format)
        }
        Command::Serve { bind, directory } => {
            let collection = Collection::open(directory)?;
            serve(bind, &collection.config).await
        }
    }
}
