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

use std::path::Path;

use serde::Deserialize;

use crate::error::Fallible;
use crate::types::strength::Strength;

/// User configuration, read from `wordmill.toml` in the collection
/// directory. A missing file means defaults.
#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub review: ReviewConfig,
    pub server: ServerConfig,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub strength: Strength,
    pub daily_limit: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            strength: Strength::Standard,
            daily_limit: 30,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

impl Config {
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join("wordmill.toml");
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.review.daily_limit, 30);
        assert_eq!(config.review.strength, Strength::Standard);
        assert_eq!(config.server.bind, "0.0.0.0:8000");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        write(
            dir.path().join("wordmill.toml"),
            "[review]\nstrength = \"intense\"\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.review.strength, Strength::Intense);
        assert_eq!(config.review.daily_limit, 30);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        write(dir.path().join("wordmill.toml"), "review = 3").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }
}
