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

/// How well a word was recalled during review.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rating {
    /// Total failure: review again immediately.
    Again,
    /// Partial success.
    Hard,
    /// Standard success.
    Good,
    /// High success.
    Easy,
}

impl Rating {
    /// All ratings, in ascending order of success.
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Numeric score, used for session averages.
    pub fn score(self) -> u32 {
        match self {
            Rating::Again => 1,
            Rating::Hard => 2,
            Rating::Good => 3,
            Rating::Easy => 4,
        }
    }

    /// Whether the rating counts as a correct answer.
    pub fn is_correct(self) -> bool {
        self.score() >= Rating::Good.score()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }
}
