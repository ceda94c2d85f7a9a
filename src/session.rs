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

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::backup::RemoteBackup;
use crate::db::Database;
use crate::error::Fallible;
use crate::error::fail;
use crate::reconcile::DuplicatePolicy;
use crate::reconcile::ImportStats;
use crate::reconcile::reconcile;
use crate::snapshot::Export;
use crate::snapshot::ImportPayload;
use crate::store::ProblemStore;
use crate::types::date::Date;
use crate::types::difficulty::Difficulty;
use crate::types::goals::Goals;
use crate::types::problem::Problem;
use crate::types::timestamp::Timestamp;

/// The demo accounts. There is no real authentication.
const DEMO_USERS: [(&str, &str); 3] = [
    ("admin", "admin123"),
    ("user1", "password123"),
    ("demo", "demo123"),
];

fn is_demo_user(user: &str) -> bool {
    DEMO_USERS.iter().any(|(name, _)| *name == user)
}

/// Checks the credentials and remembers the user for later commands.
pub fn login(db: &Database, user: &str, password: &str) -> Fallible<()> {
    let user = user.trim();
    if user.is_empty() || password.is_empty() {
        return fail("please fill in all fields.");
    }
    let valid = DEMO_USERS
        .iter()
        .any(|(name, pass)| *name == user && *pass == password);
    if !valid {
        return fail("invalid credentials! Try: admin / admin123");
    }
    db.set_current_user(user)?;
    log::info!("Logged in as {user}.");
    Ok(())
}

pub fn logout(db: &Database) -> Fallible<()> {
    db.clear_current_user()
}

/// Everything one logged-in user works with: their problems and goals, the
/// database they are persisted to, and the optional remote backup.
///
/// Every mutating operation writes the affected document back to the
/// database before returning, then queues a backup.
pub struct Session {
    user: String,
    store: ProblemStore,
    goals: Goals,
    db: Database,
    backup: Option<RemoteBackup>,
    pending: Vec<JoinHandle<Fallible<()>>>,
}

impl Session {
    /// Opens a session for `user`, seeding default data on first use.
    pub fn open(db: Database, user: &str, backup: Option<RemoteBackup>) -> Fallible<Self> {
        let (store, store_is_new) = match db.load_problems(user)? {
            Some(store) => {
                log::debug!("Loaded {} topics for {user}.", store.topic_count());
                (store, false)
            }
            None => {
                log::debug!("No existing data for {user}, loading defaults.");
                (default_problems(Timestamp::now()), true)
            }
        };
        let (goals, goals_are_new) = match db.load_goals(user)? {
            Some(goals) => (goals, false),
            None => (Goals::default(), true),
        };
        let mut session = Self {
            user: user.to_string(),
            store,
            goals,
            db,
            backup,
            pending: Vec::new(),
        };
        if store_is_new {
            session.save()?;
        }
        if goals_are_new {
            session.save_goals()?;
        }
        Ok(session)
    }

    /// Opens a session for the last user who logged in.
    pub fn resume(db: Database, backup: Option<RemoteBackup>) -> Fallible<Self> {
        match db.current_user()? {
            Some(user) if is_demo_user(&user) => Self::open(db, &user, backup),
            _ => fail("not logged in. Run `dsatracker login` first."),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn store(&self) -> &ProblemStore {
        &self.store
    }

    pub fn goals(&self) -> &Goals {
        &self.goals
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Adds a new problem. Topic, title and link are required. A link that
    /// is already tracked elsewhere is refused unless `force` is set.
    pub fn add_problem(&mut self, topic: &str, mut problem: Problem, force: bool) -> Fallible<()> {
        validate_required(topic, &problem)?;
        if let Some((existing_topic, existing)) = self.store.find_by_link(&problem.link) {
            if !force {
                return fail(format!(
                    "a problem with this link already exists: {:?} in {existing_topic:?}.",
                    existing.title
                ));
            }
            log::warn!(
                "Adding {:?} although its link is already used by {:?}.",
                problem.title,
                existing.title
            );
        }
        problem.date_added = Some(Timestamp::now());
        problem.last_solved = if problem.is_solved() {
            Some(Date::today())
        } else {
            None
        };
        self.store.insert(topic, problem)?;
        self.save()
    }

    /// Replaces a problem, moving it when `new_topic` differs. `dateAdded`
    /// is kept from the original.
    pub fn edit_problem(
        &mut self,
        topic: &str,
        title: &str,
        new_topic: &str,
        mut problem: Problem,
    ) -> Fallible<()> {
        validate_required(new_topic, &problem)?;
        problem.date_added = None;
        self.store
            .move_problem(topic, title, new_topic, problem, Timestamp::now())?;
        self.save()
    }

    pub fn mark_solved(&mut self, topic: &str, title: &str) -> Fallible<()> {
        self.store.mark_solved(topic, title, Date::today())?;
        self.save()
    }

    pub fn save_solution(&mut self, topic: &str, title: &str, solution: &str) -> Fallible<()> {
        self.store
            .save_solution(topic, title, solution, Date::today())?;
        self.save()
    }

    pub fn delete_problem(&mut self, topic: &str, title: &str) -> Fallible<Problem> {
        let problem = self.store.delete(topic, title)?;
        self.save()?;
        Ok(problem)
    }

    pub fn set_goals(&mut self, goals: Goals) -> Fallible<()> {
        self.goals = goals;
        self.save_goals()
    }

    /// Reconciles an import into the store, merges its goals, and persists
    /// both. A failed write does not undo the in-memory merge.
    pub fn import(
        &mut self,
        payload: &ImportPayload,
        policy: DuplicatePolicy,
    ) -> Fallible<ImportStats> {
        log::info!(
            "Importing {} problems in {} topics with policy {policy}.",
            payload.problem_count(),
            payload.problems.len()
        );
        let stats = reconcile(&mut self.store, &payload.problems, policy, Timestamp::now());
        if let Some(goals) = &payload.goals {
            self.goals.merge(goals);
            self.save_goals()?;
        }
        self.save()?;
        Ok(stats)
    }

    pub fn export(&self, now: Timestamp) -> Export<'_> {
        Export::new(&self.store, &self.goals, now)
    }

    /// Replaces the local problems with a remote copy if the remote has more
    /// topics. Returns whether it did.
    pub fn adopt_remote(&mut self, remote: ProblemStore) -> Fallible<bool> {
        if remote.topic_count() <= self.store.topic_count() {
            return Ok(false);
        }
        log::info!(
            "Remote copy has {} topics against {} locally, adopting it.",
            remote.topic_count(),
            self.store.topic_count()
        );
        self.store = remote;
        self.db.save_problems(&self.user, &self.store)?;
        Ok(true)
    }

    pub fn backup(&self) -> Option<&RemoteBackup> {
        self.backup.as_ref()
    }

    /// Writes the problems to the database and queues a remote backup.
    pub fn save(&mut self) -> Fallible<()> {
        self.db.save_problems(&self.user, &self.store)?;
        if let Some(backup) = &self.backup {
            let body = serde_json::to_string(&self.store)?;
            let handle = backup.spawn_put(&self.user, "problems", body);
            self.track(handle);
        }
        Ok(())
    }

    pub fn save_goals(&mut self) -> Fallible<()> {
        self.db.save_goals(&self.user, &self.goals)?;
        if let Some(backup) = &self.backup {
            let body = serde_json::to_string(&self.goals)?;
            let handle = backup.spawn_put(&self.user, "goals", body);
            self.track(handle);
        }
        Ok(())
    }

    fn track(&mut self, handle: JoinHandle<Fallible<()>>) {
        self.pending.retain(|pending| !pending.is_finished());
        self.pending.push(handle);
    }

    /// Gives queued backups up to `limit` to finish.
    pub async fn flush_backups(&mut self, limit: Duration) {
        wait_for_backups(self.take_pending(), limit).await;
    }

    /// Hands over the queued backups, for callers that cannot hold the
    /// session across an await.
    pub fn take_pending(&mut self) -> Vec<JoinHandle<Fallible<()>>> {
        self.pending.drain(..).collect()
    }
}

/// Waits up to `limit` for the given backups. Their outcomes were already
/// logged by the tasks themselves and are ignored here.
pub async fn wait_for_backups(pending: Vec<JoinHandle<Fallible<()>>>, limit: Duration) {
    if pending.is_empty() {
        return;
    }
    log::debug!("Waiting for {} backups.", pending.len());
    let wait_all = async {
        for handle in pending {
            let _ = handle.await;
        }
    };
    if timeout(limit, wait_all).await.is_err() {
        log::warn!("Gave up waiting for remote backups.");
    }
}

fn validate_required(topic: &str, problem: &Problem) -> Fallible<()> {
    let required = [topic, problem.title.as_str(), problem.link.as_str()];
    if required.iter().any(|field| field.trim().is_empty()) {
        return fail("please fill in all required fields (topic, title, link).");
    }
    Ok(())
}

fn default_problem(
    title: &str,
    link: &str,
    difficulty: Difficulty,
    tags: [&str; 2],
    now: Timestamp,
) -> Problem {
    Problem {
        difficulty,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        date_added: Some(now),
        ..Problem::new(title, link)
    }
}

/// The problems a new user starts with.
fn default_problems(now: Timestamp) -> ProblemStore {
    let mut store = ProblemStore::new();
    let defaults = [
        (
            "Array & String",
            default_problem(
                "Two Sum",
                "https://leetcode.com/problems/two-sum/",
                Difficulty::Easy,
                ["Hash Map", "Array"],
                now,
            ),
        ),
        (
            "Array & String",
            default_problem(
                "3Sum",
                "https://leetcode.com/problems/3sum/",
                Difficulty::Medium,
                ["Two Pointers", "Array"],
                now,
            ),
        ),
        (
            "Dynamic Programming",
            default_problem(
                "Fibonacci Number",
                "https://leetcode.com/problems/fibonacci-number/",
                Difficulty::Easy,
                ["Memoization", "Bottom-up"],
                now,
            ),
        ),
    ];
    for (topic, problem) in defaults {
        if let Err(e) = store.insert(topic, problem) {
            log::error!("Invalid default problem: {e}");
        }
    }
    store
}
