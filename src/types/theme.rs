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

use crate::db::Database;
use crate::error::Fallible;

#[derive(ValueEnum, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Anything other than `dark` is the light theme.
    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// The stored preference, shared by every user of the database.
    pub fn load(db: &Database) -> Fallible<Self> {
        Ok(db
            .theme()?
            .map(|name| Self::from_name(&name))
            .unwrap_or_default())
    }

    pub fn save(self, db: &Database) -> Fallible<()> {
        db.set_theme(self.as_str())
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
    }

    #[test]
    fn test_load_and_save() -> Fallible<()> {
        let db = Database::in_memory()?;
        assert_eq!(Theme::load(&db)?, Theme::Light);
        Theme::Dark.save(&db)?;
        assert_eq!(Theme::load(&db)?, Theme::Dark);
        db.set_theme("purple")?;
        assert_eq!(Theme::load(&db)?, Theme::Light);
        Ok(())
    }
}
