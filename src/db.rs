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

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::store::ProblemStore;
use crate::types::goals::Goals;
use crate::types::timestamp::Timestamp;

const CURRENT_USER_KEY: &str = "dsaTrackerUser";
const THEME_KEY: &str = "dsaTrackerTheme";

fn problems_key(user: &str) -> String {
    format!("dsaTracker_problems_{user}")
}

fn goals_key(user: &str) -> String {
    format!("dsaTracker_goals_{user}")
}

/// Local persistence: a single key-value table holding JSON documents.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(database_path: &Path) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating database schema.");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn in_memory() -> Fallible<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    pub fn get(&self, key: &str) -> Fallible<Option<String>> {
        let sql = "select value from entries where key = ?;";
        let value: Option<String> = self
            .conn
            .query_row(sql, [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Fallible<()> {
        let sql = "insert into entries (key, value, updated_at) values (?, ?, ?) on conflict (key) do update set value = excluded.value, updated_at = excluded.updated_at;";
        self.conn.execute(sql, (key, value, Timestamp::now()))?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Fallible<()> {
        self.conn.execute("delete from entries where key = ?;", [key])?;
        Ok(())
    }

    /// Load a user's problems. Returns None if nothing was saved yet.
    pub fn load_problems(&self, user: &str) -> Fallible<Option<ProblemStore>> {
        match self.get(&problems_key(user))? {
            Some(json) => {
                let store: ProblemStore = serde_json::from_str(&json).map_err(|e| {
                    ErrorReport::new(format!("stored problems for {user:?} are corrupt: {e}"))
                })?;
                Ok(Some(store))
            }
            None => Ok(None),
        }
    }

    pub fn save_problems(&self, user: &str, store: &ProblemStore) -> Fallible<()> {
        let json = serde_json::to_string(store)?;
        self.set(&problems_key(user), &json)?;
        log::debug!("Saved {} problems for {user}.", store.len());
        Ok(())
    }

    /// Load a user's goals. Returns None if nothing was saved yet.
    pub fn load_goals(&self, user: &str) -> Fallible<Option<Goals>> {
        match self.get(&goals_key(user))? {
            Some(json) => {
                let goals: Goals = serde_json::from_str(&json).map_err(|e| {
                    ErrorReport::new(format!("stored goals for {user:?} are corrupt: {e}"))
                })?;
                Ok(Some(goals))
            }
            None => Ok(None),
        }
    }

    pub fn save_goals(&self, user: &str, goals: &Goals) -> Fallible<()> {
        let json = serde_json::to_string(goals)?;
        self.set(&goals_key(user), &json)
    }

    /// The user who logged in last, if they have not logged out.
    pub fn current_user(&self) -> Fallible<Option<String>> {
        self.get(CURRENT_USER_KEY)
    }

    pub fn set_current_user(&self, user: &str) -> Fallible<()> {
        self.set(CURRENT_USER_KEY, user)
    }

    pub fn clear_current_user(&self) -> Fallible<()> {
        self.remove(CURRENT_USER_KEY)
    }

    pub fn theme(&self) -> Fallible<Option<String>> {
        self.get(THEME_KEY)
    }

    pub fn set_theme(&self, theme: &str) -> Fallible<()> {
        self.set(THEME_KEY, theme)
    }
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["entries"], |row| row.get(0))?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::create_tmp_directory;
    use crate::types::problem::Problem;

    #[test]
    fn test_get_set_remove() -> Fallible<()> {
        let db = Database::in_memory()?;
        assert_eq!(db.get("k")?, None);
        db.set("k", "v1")?;
        db.set("k", "v2")?;
        assert_eq!(db.get("k")?, Some("v2".to_string()));
        db.remove("k")?;
        assert_eq!(db.get("k")?, None);
        Ok(())
    }

    #[test]
    fn test_problems_are_per_user() -> Fallible<()> {
        let db = Database::in_memory()?;
        let mut store = ProblemStore::new();
        store.insert("Array", Problem::new("Two Sum", "L1"))?;
        db.save_problems("admin", &store)?;
        assert_eq!(db.load_problems("admin")?, Some(store));
        assert_eq!(db.load_problems("demo")?, None);
        assert!(db.get("dsaTracker_problems_admin")?.is_some());
        Ok(())
    }

    #[test]
    fn test_goals() -> Fallible<()> {
        let db = Database::in_memory()?;
        assert_eq!(db.load_goals("admin")?, None);
        let goals = Goals::new(2, 10, None)?;
        db.save_goals("admin", &goals)?;
        assert_eq!(db.load_goals("admin")?, Some(goals));
        Ok(())
    }

    #[test]
    fn test_corrupt_problems() -> Fallible<()> {
        let db = Database::in_memory()?;
        db.set("dsaTracker_problems_admin", "{not json")?;
        assert!(db.load_problems("admin").is_err());
        Ok(())
    }

    #[test]
    fn test_current_user_and_theme() -> Fallible<()> {
        let db = Database::in_memory()?;
        assert_eq!(db.current_user()?, None);
        db.set_current_user("demo")?;
        assert_eq!(db.current_user()?, Some("demo".to_string()));
        db.clear_current_user()?;
        assert_eq!(db.current_user()?, None);
        db.set_theme("dark")?;
        assert_eq!(db.theme()?, Some("dark".to_string()));
        Ok(())
    }

    #[test]
    fn test_file_database_persists() -> Fallible<()> {
        let directory = create_tmp_directory()?;
        let path = directory.join("tracker.db");
        {
            let db = Database::new(&path)?;
            db.set_theme("dark")?;
        }
        let db = Database::new(&path)?;
        assert_eq!(db.theme()?, Some("dark".to_string()));
        Ok(())
    }
}
