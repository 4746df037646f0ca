//! Fixture seed entry point.
//!
//! # Responsibility
//! - Wipe the configured todo database and load the fixture set.
//! - Report each inserted fixture and exit 0, or print a diagnostic and
//!   exit 1.
//!
//! Configuration comes from `DATABASE_URL`, `TODO_LOG_LEVEL` and
//! `TODO_LOG_DIR`.

use std::error::Error;
use std::process::ExitCode;
use todo_core::{init_logging, seed_fixtures, CoreConfig, SeededTodo, SqliteTodoRepository};

fn main() -> ExitCode {
    match run() {
        Ok(seeded) => {
            for todo in &seeded {
                println!("Inserted todo: {} with ID: {}", todo.text, todo.id);
            }
            println!("Seeding complete.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Seeding failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<Vec<SeededTodo>, Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    init_logging(&config.log_level, &config.log_target)?;
    log::info!(
        "event=seed_cli module=cli status=start database={} version={}",
        config.database,
        todo_core::core_version()
    );

    let conn = config.database.open()?;
    let repo = SqliteTodoRepository::try_new(&conn)?;
    Ok(seed_fixtures(&repo)?)
}
