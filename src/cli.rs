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

use std::env::current_dir;
use std::io::read_to_string;
use std::io::stdin;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

use crate::backup::RemoteBackup;
use crate::cmd::export::export_problems;
use crate::cmd::goals::GoalsArgs;
use crate::cmd::goals::goals;
use crate::cmd::import::import_file;
use crate::cmd::list::FilterArgs;
use crate::cmd::list::list_problems;
use crate::cmd::problem::ProblemArgs;
use crate::cmd::problem::add_problem;
use crate::cmd::problem::delete_problem;
use crate::cmd::problem::edit_problem;
use crate::cmd::problem::mark_solved;
use crate::cmd::problem::save_solution;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::cmd::sync::sync;
use crate::config::Config;
use crate::db::Database;
use crate::error::Fallible;
use crate::error::fail;
use crate::reconcile::DuplicatePolicy;
use crate::session::Session;
use crate::session::login;
use crate::session::logout;
use crate::types::theme::Theme;
use crate::web::server::start_server;

const DATABASE_FILE: &str = "tracker.db";

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory holding the database and `tracker.toml`. Defaults to the
    /// current directory.
    #[arg(long, global = true)]
    directory: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in as one of the demo users.
    Login {
        user: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the current user.
    Logout,
    /// Print the current user.
    Whoami,
    /// Show or change the colour theme.
    Theme {
        #[arg(value_enum)]
        choice: Option<ThemeChoice>,
    },
    /// Serve the dashboard in the browser.
    Serve {
        /// Port to listen on. Overrides `server.port`.
        #[arg(long)]
        port: Option<u16>,
        /// Don't open the browser.
        #[arg(long)]
        no_open: bool,
    },
    #[command(flatten)]
    Session(SessionCommand),
}

/// Commands that work on the logged-in user's data.
#[derive(Subcommand)]
enum SessionCommand {
    /// Add a problem to a topic.
    Add {
        topic: String,
        #[command(flatten)]
        fields: ProblemArgs,
        /// Add even if another problem has the same link.
        #[arg(long)]
        force: bool,
    },
    /// Change a problem's fields, or move it to another topic.
    Edit {
        topic: String,
        #[arg(value_name = "TITLE")]
        problem: String,
        #[arg(long)]
        new_topic: Option<String>,
        #[command(flatten)]
        fields: ProblemArgs,
    },
    /// Record that a problem was solved today.
    Solve {
        topic: String,
        #[arg(value_name = "TITLE")]
        problem: String,
    },
    /// Save a solution. Read from `--file`, the argument, or standard input.
    Solution {
        topic: String,
        #[arg(value_name = "TITLE")]
        problem: String,
        text: Option<String>,
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },
    /// Delete a problem.
    Delete {
        topic: String,
        #[arg(value_name = "TITLE")]
        problem: String,
    },
    /// List problems, optionally filtered.
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Print progress statistics.
    Stats {
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Show or set practice goals.
    Goals {
        #[command(flatten)]
        args: GoalsArgs,
    },
    /// Import problems from a JSON file.
    Import {
        file: PathBuf,
        /// What to do with problems that already exist. Defaults to
        /// `import.policy`.
        #[arg(long, value_enum)]
        policy: Option<DuplicatePolicy>,
    },
    /// Export problems and goals to a JSON file.
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Load the remote backup if it has more topics than the local data.
    Sync,
}

#[derive(ValueEnum, Clone, Copy)]
enum ThemeChoice {
    Light,
    Dark,
    Toggle,
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    let directory: PathBuf = match cli.directory {
        Some(dir) => PathBuf::from(dir),
        None => current_dir()?,
    };
    if !directory.exists() {
        return fail("directory does not exist.");
    }
    let config = Config::load(&directory)?;
    let db = Database::new(&directory.join(DATABASE_FILE))?;
    let backup = config.backup.url.as_deref().map(RemoteBackup::new);
    match cli.command {
        Command::Login { user, password } => {
            login(&db, &user, &password)?;
            let mut session = Session::open(db, user.trim(), backup)?;
            println!("Welcome back, {}!", session.user());
            session.flush_backups(config.backup.timeout()).await;
        }
        Command::Logout => {
            logout(&db)?;
            println!("Logged out successfully.");
        }
        Command::Whoami => match db.current_user()? {
            Some(user) => println!("{user}"),
            None => println!("Not logged in."),
        },
        Command::Theme { choice } => {
            let current = Theme::load(&db)?;
            let theme = match choice {
                None => current,
                Some(ThemeChoice::Light) => Theme::Light,
                Some(ThemeChoice::Dark) => Theme::Dark,
                Some(ThemeChoice::Toggle) => current.toggle(),
            };
            if theme != current {
                theme.save(&db)?;
                println!("Theme updated!");
            }
            println!("{theme}");
        }
        Command::Serve { port, no_open } => {
            let session = Session::resume(db, backup)?;
            let mut server = config.server;
            if let Some(port) = port {
                server.port = port;
            }
            if no_open {
                server.open_browser = false;
            }
            start_server(session, &server, config.backup.timeout()).await?;
        }
        Command::Session(command) => {
            let mut session = Session::resume(db, backup)?;
            let result = run(&mut session, command, &config).await;
            session.flush_backups(config.backup.timeout()).await;
            result?;
        }
    }
    Ok(())
}

async fn run(session: &mut Session, command: SessionCommand, config: &Config) -> Fallible<()> {
    match command {
        SessionCommand::Add {
            topic,
            fields,
            force,
        } => add_problem(session, &topic, fields, force),
        SessionCommand::Edit {
            topic,
            problem,
            new_topic,
            fields,
        } => edit_problem(session, &topic, &problem, new_topic, fields),
        SessionCommand::Solve { topic, problem } => mark_solved(session, &topic, &problem),
        SessionCommand::Solution {
            topic,
            problem,
            text,
            file,
        } => {
            let solution = match (text, file) {
                (Some(text), _) => text,
                (None, Some(file)) => std::fs::read_to_string(file)?,
                (None, None) => read_to_string(stdin())?,
            };
            save_solution(session, &topic, &problem, &solution)
        }
        SessionCommand::Delete { topic, problem } => delete_problem(session, &topic, &problem),
        SessionCommand::List { filter } => {
            list_problems(session, filter.into());
            Ok(())
        }
        SessionCommand::Stats { format } => print_stats(session, format),
        SessionCommand::Goals { args } => goals(session, args),
        SessionCommand::Import { file, policy } => {
            let policy = policy.unwrap_or(config.import.policy);
            import_file(session, &file, policy)
        }
        SessionCommand::Export { output } => export_problems(session, output).map(|_| ()),
        SessionCommand::Sync => sync(session).await,
    }
}
