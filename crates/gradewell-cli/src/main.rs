//! gradewell CLI: author, grade, and track activities from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "gradewell",
    version,
    about = "Activity grading portal with a local fallback grader"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Clone)]
pub struct GlobalArgs {
    /// Config file path (default: ./gradewell.toml, then ~/.config/gradewell/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Portal data directory (overrides `data_dir` from the config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and a sample activity
    Init,

    /// Validate activity TOML files
    Validate {
        /// Path to an activity file or directory
        #[arg(long)]
        activity: PathBuf,
    },

    /// Grade one answer set without storing it
    Grade {
        /// Activity TOML file
        #[arg(long)]
        activity: PathBuf,

        /// JSON object mapping question id to answer
        #[arg(long)]
        answers: PathBuf,

        /// Skip the remote grader and grade locally
        #[arg(long)]
        offline: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Add activities to the portal
    Publish {
        /// Path to an activity file or directory
        #[arg(long)]
        activity: PathBuf,
    },

    /// Grade a student's answers and store the submission
    Submit {
        /// Id of a published activity
        #[arg(long)]
        activity_id: String,

        /// Student id (e.g. "student-1")
        #[arg(long)]
        student: String,

        /// JSON object mapping question id to answer
        #[arg(long)]
        answers: PathBuf,

        /// Skip the remote grader and grade locally
        #[arg(long)]
        offline: bool,
    },

    /// List published activities
    Activities {
        /// Only activities assigned to this student
        #[arg(long)]
        student: Option<String>,
    },

    /// List stored submissions
    Submissions {
        /// Only this student's submissions
        #[arg(long)]
        student: Option<String>,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gradewell=info")),
        )
        .init();

    let cli = Cli::parse();
    let global = cli.global;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { activity } => commands::validate::execute(activity),
        Commands::Grade {
            activity,
            answers,
            offline,
            format,
        } => commands::grade::execute(&global, activity, answers, offline, format).await,
        Commands::Publish { activity } => commands::publish::execute(&global, activity),
        Commands::Submit {
            activity_id,
            student,
            answers,
            offline,
        } => commands::submit::execute(&global, activity_id, student, answers, offline).await,
        Commands::Activities { student } => commands::activities::execute(&global, student),
        Commands::Submissions { student } => commands::submissions::execute(&global, student),
        Commands::ListModels { provider } => {
            commands::list_models::execute(&global, provider).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
