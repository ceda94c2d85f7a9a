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

use std::fs::read_to_string;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::Fallible;
use crate::reconcile::DuplicatePolicy;

pub const CONFIG_FILE: &str = "tracker.toml";

/// Settings read from `tracker.toml` in the data directory. Every section
/// and key is optional.
#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub backup: BackupConfig,
    pub server: ServerConfig,
    pub import: ImportConfig,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BackupConfig {
    /// Base URL of the remote backup, e.g. a Firebase Realtime Database.
    /// Backups are disabled when absent.
    pub url: Option<String>,
    /// How long to wait for outstanding backups before exiting.
    pub timeout_secs: u64,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 5,
        }
    }
}

impl BackupConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub port: u16,
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            open_browser: true,
        }
    }
}

#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    /// Duplicate policy used when `import` is not given one.
    pub policy: DuplicatePolicy,
}

impl Config {
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No {CONFIG_FILE}, using defaults.");
            return Ok(Self::default());
        }
        let content = read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use super::*;
    use crate::helper::create_tmp_directory;

    #[test]
    fn test_missing_file_gives_defaults() -> Fallible<()> {
        let directory = create_tmp_directory()?;
        let config = Config::load(&directory)?;
        assert_eq!(config, Config::default());
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.backup.timeout(), Duration::from_secs(5));
        assert_eq!(config.import.policy, DuplicatePolicy::Skip);
        Ok(())
    }

    #[test]
    fn test_load_file() -> Fallible<()> {
        let directory = create_tmp_directory()?;
        write(
            directory.join(CONFIG_FILE),
            "[backup]\nurl = \"https://tracker.example.com\"\n\n[import]\npolicy = \"update\"\n",
        )?;
        let config = Config::load(&directory)?;
        assert_eq!(
            config.backup.url.as_deref(),
            Some("https://tracker.example.com")
        );
        assert_eq!(config.backup.timeout_secs, 5);
        assert_eq!(config.import.policy, DuplicatePolicy::Update);
        assert!(config.server.open_browser);
        Ok(())
    }

    #[test]
    fn test_unknown_key() {
        assert!(Config::parse("[server]\nprot = 80\n").is_err());
    }

    #[test]
    fn test_bad_policy() {
        assert!(Config::parse("[import]\npolicy = \"merge\"\n").is_err());
    }
}
