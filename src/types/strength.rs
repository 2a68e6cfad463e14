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

use serde::Deserialize;
use serde::Serialize;

/// Global review-strength profile. Scales interval growth uniformly; never
/// touches per-word ease.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Gentle,
    #[default]
    Standard,
    Intense,
}

impl Strength {
    pub fn multiplier(self) -> f64 {
        match self {
            Strength::Gentle => 0.8,
            Strength::Standard => 1.0,
            Strength::Intense => 1.3,
        }
    }
}
