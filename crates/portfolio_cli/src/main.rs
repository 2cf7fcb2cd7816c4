//! Command-line front end for the portfolio core.
//!
//! # Responsibility
//! - Open the snapshot database, load the store and apply one command.
//! - Print derived views and gate signals as JSON on stdout.
//!
//! # Invariants
//! - The store is saved only after a successful mutation.
//! - A gated completion prints the gate signal and exits with code 2.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use log::info;
use portfolio_core::{
    blocked_tasks, default_log_level, dependents_of, due_today, init_logging,
    is_ready_to_complete, list_tasks, open_db, unresolved_prerequisites,
    portfolio_summary, project_health, search_projects, workload_by_assignee, BlockerDetails,
    NewDecision, NewProject, NewTask, PersistenceService, PortfolioStore, SqliteSnapshotRepository,
    StoreError, TaskListQuery, TaskPerspective, TaskStatus,
};
use serde_json::{json, Value};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

const APP_DIR_NAME: &str = "portfolio";
const GATED_EXIT_CODE: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "portfolio", version, about = "Project portfolio dashboard")]
struct Cli {
    /// Snapshot database file.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Absolute directory for rolling log files.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Reference date for overdue checks (YYYY-MM-DD); defaults to today.
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Portfolio summary plus every project with health.
    Dashboard,
    Projects {
        #[arg(long)]
        search: Option<String>,
    },
    Tasks {
        #[arg(long)]
        search: Option<String>,
        /// all | active | blocked | overdue
        #[arg(long, value_parser = parse_perspective, default_value = "all")]
        perspective: TaskPerspective,
        #[arg(long)]
        project: Option<String>,
    },
    /// One task with prerequisites, dependents, risks and decisions.
    Task {
        task_id: String,
    },
    /// Open tasks due today or earlier.
    Today,
    Blocked,
    Workload,
    SetStatus {
        task_id: String,
        #[arg(value_parser = parse_status)]
        status: TaskStatus,
    },
    /// Blocks a task, or edits the details of a blocked one.
    Block {
        task_id: String,
        #[arg(long)]
        reason: String,
        #[arg(long, default_value = "")]
        owner: String,
        #[arg(long, default_value = "")]
        eta: String,
    },
    Unblock {
        task_id: String,
    },
    AddDependency {
        task_id: String,
        dep_id: String,
    },
    RemoveDependency {
        task_id: String,
        dep_id: String,
    },
    AddProject {
        name: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long, default_value = "")]
        description: String,
    },
    AddTask {
        project_id: String,
        title: String,
        #[arg(long, default_value = "")]
        assignee: String,
        #[arg(long)]
        due: NaiveDate,
        #[arg(long = "depends-on")]
        depends_on: Vec<String>,
    },
    LogDecision {
        description: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long = "project")]
        projects: Vec<String>,
        #[arg(long = "task")]
        tasks: Vec<String>,
    },
    /// Replaces persisted data with the demonstration portfolio.
    Reset,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    start_logging(&cli);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let db_path = resolve_db_path(cli.db)?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = open_db(&db_path)?;
    let persistence = PersistenceService::new(SqliteSnapshotRepository::try_new(&conn)?);

    if matches!(cli.command, Command::Reset) {
        let store = persistence.reset()?;
        print_json(&json!({ "reset": true, "projects": store.projects().len() }))?;
        return Ok(ExitCode::SUCCESS);
    }

    let loaded = persistence.load_or_seed()?;
    info!(
        "event=cli_load module=cli status=ok source={:?}",
        loaded.source
    );
    let mut store = loaded.store;

    match apply(&mut store, cli.command, today) {
        Ok(Outcome::Read(value)) => {
            print_json(&value)?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(Outcome::Mutated(value)) => {
            persistence.save(&store)?;
            print_json(&value)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(StoreError::Gated(signal)) => {
            print_json(&json!({ "gated": signal }))?;
            Ok(ExitCode::from(GATED_EXIT_CODE))
        }
        Err(err) => Err(err.into()),
    }
}

enum Outcome {
    Read(Value),
    Mutated(Value),
}

fn apply(store: &mut PortfolioStore, command: Command, today: NaiveDate) -> Result<Outcome, StoreError> {
    let outcome = match command {
        Command::Dashboard => {
            let views = store.project_views();
            let summary = portfolio_summary(&views, store.tasks(), store.risks(), today);
            let projects: Vec<Value> = views
                .iter()
                .map(|view| {
                    let health = project_health(view, store.tasks_of_project(&view.project.id), today);
                    json!({ "project": view, "health": health })
                })
                .collect();
            Outcome::Read(json!({ "summary": summary, "projects": projects }))
        }
        Command::Projects { search } => {
            let views: Vec<Value> = search_projects(store.projects(), search.as_deref().unwrap_or(""))
                .into_iter()
                .filter_map(|project| store.project_view(&project.id))
                .map(|view| json!(view))
                .collect();
            Outcome::Read(json!(views))
        }
        Command::Tasks {
            search,
            perspective,
            project,
        } => {
            let query = TaskListQuery {
                search,
                perspective,
                project_id: project,
            };
            Outcome::Read(json!(list_tasks(store.tasks(), &query, today)))
        }
        Command::Task { task_id } => {
            let task = store
                .task(&task_id)
                .ok_or_else(|| StoreError::TaskNotFound(task_id.clone()))?;
            let all = store.tasks();
            Outcome::Read(json!({
                "task": task,
                "readyToComplete": is_ready_to_complete(task, all),
                "unresolvedPrerequisites": unresolved_prerequisites(task, all),
                "dependents": dependents_of(&task_id, all),
                "risks": store.risks_for_task(&task_id),
                "decisions": store.decisions_for_task(&task_id),
            }))
        }
        Command::Today => Outcome::Read(json!(due_today(store.tasks(), today))),
        Command::Blocked => Outcome::Read(json!(blocked_tasks(store.tasks(), store.projects()))),
        Command::Workload => Outcome::Read(json!(workload_by_assignee(store.tasks(), today))),
        Command::SetStatus { task_id, status } => {
            store.set_task_status(&task_id, status)?;
            Outcome::Mutated(json!(store.task(&task_id)))
        }
        Command::Block {
            task_id,
            reason,
            owner,
            eta,
        } => {
            store.set_blocker(&task_id, Some(BlockerDetails::new(reason, owner, eta)))?;
            Outcome::Mutated(json!(store.task(&task_id)))
        }
        Command::Unblock { task_id } => {
            store.set_blocker(&task_id, None)?;
            Outcome::Mutated(json!(store.task(&task_id)))
        }
        Command::AddDependency { task_id, dep_id } => {
            store.add_dependency(&task_id, &dep_id)?;
            Outcome::Mutated(json!(store.task(&task_id)))
        }
        Command::RemoveDependency { task_id, dep_id } => {
            store.remove_dependency(&task_id, &dep_id)?;
            Outcome::Mutated(json!(store.task(&task_id)))
        }
        Command::AddProject {
            name,
            start,
            end,
            description,
        } => {
            let id = store.add_project(NewProject {
                name,
                description,
                start_date: start,
                end_date: end,
            })?;
            Outcome::Mutated(json!(store.project_view(&id)))
        }
        Command::AddTask {
            project_id,
            title,
            assignee,
            due,
            depends_on,
        } => {
            let mut input = NewTask::todo(project_id, title, assignee, due);
            input.dependencies = depends_on;
            let id = store.add_task(input)?;
            Outcome::Mutated(json!(store.task(&id)))
        }
        Command::LogDecision {
            description,
            date,
            projects,
            tasks,
        } => {
            let id = store.add_decision(NewDecision {
                description,
                date: date.unwrap_or(today),
                impacted_project_ids: projects,
                impacted_task_ids: tasks,
            })?;
            Outcome::Mutated(json!({ "decisionId": id }))
        }
        // Handled before the store is loaded.
        Command::Reset => Outcome::Read(Value::Null),
    };
    Ok(outcome)
}

fn start_logging(cli: &Cli) {
    let Some(log_dir) = cli
        .log_dir
        .clone()
        .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME).join("logs")))
    else {
        return;
    };
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    if let Err(err) = init_logging(level, &log_dir.to_string_lossy()) {
        eprintln!("warning: logging disabled: {err}");
        return;
    }
    info!(
        "event=cli_start module=cli status=ok version={}",
        portfolio_core::core_version()
    );
}

fn resolve_db_path(explicit: Option<PathBuf>) -> Result<PathBuf, Box<dyn Error>> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let data_dir = dirs::data_dir().ok_or("no platform data directory; pass --db")?;
    Ok(data_dir.join(APP_DIR_NAME).join("portfolio.sqlite3"))
}

fn parse_status(value: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse(value)
        .ok_or_else(|| format!("unknown status `{value}`; expected todo|in-progress|at-risk|blocked|done"))
}

fn parse_perspective(value: &str) -> Result<TaskPerspective, String> {
    TaskPerspective::parse(value)
        .ok_or_else(|| format!("unknown perspective `{value}`; expected all|active|blocked|overdue"))
}

fn print_json(value: &Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
