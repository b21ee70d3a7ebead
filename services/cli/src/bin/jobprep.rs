//! services/cli/src/bin/jobprep.rs

use clap::{Parser, Subcommand};
use jobprep_core::credentials::LoginForm;
use jobprep_core::search::{CvUpload, JobSearchForm};
use jobprep_core::session::InterviewSession;
use jobprep_lib::{
    adapters::{BackendClient, DbAdapter, LocalStore},
    app::{
        auth, history_task, render, require_auth, run_interview, search_task, AppState, Console,
    },
    config::Config,
    error::ClientError,
};
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "jobprep")]
#[command(about = "Find matching jobs and rehearse interviews for them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search jobs by position and experience, or by CV
    Search {
        #[arg(long, default_value = "")]
        position: String,
        #[arg(long, default_value = "")]
        experience: String,
        /// PDF CV used instead of the experience text
        #[arg(long)]
        cv: Option<PathBuf>,
    },
    /// Show or clear recent searches
    History {
        #[arg(long)]
        clear: bool,
    },
    /// Start a mock interview for a job
    Interview { job_id: String },
    /// List saved interviews, or open one with --id
    Interviews {
        #[arg(long)]
        id: Option<String>,
    },
    /// Review the flashcards of a saved interview
    Flashcards { interview_id: String },
    /// Rating history across saved interviews
    Progress,
    /// Account details
    Profile,
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
    },
    Login {
        #[arg(long)]
        email: String,
    },
    Logout,
}

/// A command whose local input has already been read and checked.
enum Action {
    Search(JobSearchForm),
    Run(Command),
}

impl Action {
    /// Reads the CV and validates the search form, so a bad search fails
    /// before any connection is made.
    async fn prepare(command: Command) -> Result<Self, ClientError> {
        match command {
            Command::Search {
                position,
                experience,
                cv,
            } => {
                let form = search_form(position, experience, cv).await?;
                form.clone().validate()?;
                Ok(Action::Search(form))
            }
            other => Ok(Action::Run(other)),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    ExitCode::from(exit_status(run(cli).await))
}

/// Prints the error's message, not its debug form, and picks the exit status.
fn exit_status(result: Result<(), ClientError>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{e}");
            1
        }
    }
}

async fn run(cli: Cli) -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded.");

    // --- 2. Check Local Input ---
    let action = Action::prepare(cli.command).await?;

    // --- 3. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 4. Initialize Service Adapters ---
    let backend = Arc::new(BackendClient::new(
        config.backend_url.clone(),
        config.http_timeout,
    )?);

    // --- 5. Build the Shared AppState ---
    let state = AppState {
        db: db_adapter,
        config: config.clone(),
        conversation: backend.clone(),
        matcher: backend.clone(),
        cv_analyzer: backend.clone(),
        flashcards: backend,
        local: Arc::new(LocalStore::new(config.home_dir.clone())),
    };

    let mut console = Console::stdin();
    match action {
        Action::Search(form) => search(state, form, &mut console).await,
        Action::Run(command) => dispatch(state, command, &mut console).await,
    }
}

async fn search<R: AsyncRead + Unpin>(
    state: AppState,
    form: JobSearchForm,
    console: &mut Console<R>,
) -> Result<(), ClientError> {
    let mut history = state.local.load_history().await?;
    let jobs = search_task::search_jobs(&state, form, &mut history).await?;
    state.local.save_history(&history).await?;
    println!("{}", render::job_list(&jobs));
    if !jobs.is_empty() {
        pick_and_interview(state, jobs, console).await?;
    }
    Ok(())
}

async fn dispatch<R: AsyncRead + Unpin>(
    state: AppState,
    command: Command,
    console: &mut Console<R>,
) -> Result<(), ClientError> {
    match command {
        Command::Search {
            position,
            experience,
            cv,
        } => {
            let form = search_form(position, experience, cv).await?;
            search(state, form, console).await?;
        }
        Command::History { clear } => {
            let mut history = state.local.load_history().await?;
            if clear {
                history.clear();
                state.local.save_history(&history).await?;
                println!("Search history cleared.");
            } else {
                println!("{}", render::search_history(&history));
            }
        }
        Command::Interview { job_id } => {
            let user_id = require_auth(&state).await?;
            run_interview(state, InterviewSession::loading(job_id), Some(user_id), console)
                .await?;
        }
        Command::Interviews { id } => {
            let user_id = require_auth(&state).await?;
            match id {
                Some(id) => history_task::show_interview(state, user_id, &id, console).await?,
                None => {
                    let interviews = history_task::list_interviews(&state, user_id).await?;
                    println!("{}", render::interview_list(&interviews));
                }
            }
        }
        Command::Flashcards { interview_id } => {
            let user_id = require_auth(&state).await?;
            history_task::review_flashcards(state, user_id, &interview_id, console).await?;
        }
        Command::Progress => {
            let user_id = require_auth(&state).await?;
            let report = history_task::progress(&state, user_id).await?;
            println!("{}", render::progress(&report));
        }
        Command::Profile => {
            let user_id = require_auth(&state).await?;
            let (user, report) = history_task::profile(&state, user_id).await?;
            println!("{} <{}>", user.username, user.email);
            println!("Member since {}", user.created_at.format("%Y-%m-%d"));
            println!("Interviews: {}  Passed: {}", report.sessions(), report.passed);
        }
        Command::Signup { email, username } => {
            let password = console.ask("Password: ").await?;
            let form = LoginForm {
                email,
                password,
                username: Some(username),
            };
            let user = auth::signup(&state, &form).await?;
            println!("Welcome, {}! You are logged in.", user.username);
        }
        Command::Login { email } => {
            let password = console.ask("Password: ").await?;
            let form = LoginForm {
                email,
                password,
                username: None,
            };
            auth::login(&state, &form).await?;
            println!("Logged in.");
        }
        Command::Logout => {
            auth::logout(&state).await?;
            println!("Logged out.");
        }
    }
    Ok(())
}

async fn search_form(
    position: String,
    experience: String,
    cv: Option<PathBuf>,
) -> Result<JobSearchForm, ClientError> {
    let cv = match cv {
        Some(path) => Some(read_cv(path).await?),
        None => None,
    };
    Ok(JobSearchForm {
        position,
        experience,
        cv,
    })
}

async fn read_cv(path: PathBuf) -> Result<CvUpload, ClientError> {
    let bytes = tokio::fs::read(&path).await?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(CvUpload { file_name, bytes })
}

/// Offers to start an interview for one of the matched jobs.
async fn pick_and_interview<R: AsyncRead + Unpin>(
    state: AppState,
    mut jobs: Vec<jobprep_core::domain::Job>,
    console: &mut Console<R>,
) -> Result<(), ClientError> {
    let Some(choice) = console
        .prompt("Interview for job number (enter to skip): ")
        .await?
    else {
        return Ok(());
    };
    let Ok(index) = choice.trim().parse::<usize>() else {
        return Ok(());
    };
    if index == 0 || index > jobs.len() {
        println!("No job number {index}.");
        return Ok(());
    }
    let user_id = require_auth(&state).await?;
    let job = jobs.swap_remove(index - 1);
    run_interview(state, InterviewSession::for_job(job), Some(user_id), console).await
}
