//! quizgate CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "quizgate",
    version,
    about = "Bounded-attempt quizzes with review gating and analytics"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides `data_dir` from the config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and example quiz set
    Init,

    /// Validate quiz-set TOML files
    Validate {
        /// Path to quiz-set file or directory
        #[arg(long)]
        quiz_set: PathBuf,
    },

    /// Import quiz sets from TOML or questions from CSV
    Import {
        /// Path to quiz-set TOML file or directory
        #[arg(long, conflicts_with = "csv", required_unless_present = "csv")]
        quiz_set: Option<PathBuf>,

        /// Path to CSV file with questions
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Append CSV questions to this existing set
        #[arg(long, requires = "csv", conflicts_with = "title")]
        set_id: Option<String>,

        /// Title for a new set created from CSV
        #[arg(long, requires = "csv")]
        title: Option<String>,

        /// Author recorded on a new set
        #[arg(long, default_value = "admin")]
        created_by: String,
    },

    /// Print the CSV import template
    Template,

    /// List quiz sets
    Sets,

    /// Create a quiz set filled with placeholder questions
    CreateSet {
        #[arg(long)]
        title: String,

        /// Number of placeholder questions
        #[arg(long, default_value_t = 1)]
        questions: usize,

        /// Author recorded on the set
        #[arg(long, default_value = "admin")]
        created_by: String,
    },

    /// Delete a quiz set (its attempts are kept)
    DeleteSet {
        #[arg(long)]
        id: String,
    },

    /// Submit an attempt
    Take {
        /// Quiz set id
        #[arg(long)]
        set: String,

        /// Learner email
        #[arg(long)]
        email: String,

        /// Learner display name
        #[arg(long)]
        name: Option<String>,

        /// Answers as comma-separated question=option pairs (e.g. "q1=b,q2=c")
        #[arg(long)]
        answers: String,
    },

    /// Show a learner's gate state
    Status {
        #[arg(long)]
        set: String,

        #[arg(long)]
        email: String,
    },

    /// Review the latest attempt, unlocking with a passcode if given
    Review {
        #[arg(long)]
        set: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        passcode: Option<String>,
    },

    /// Show a learner's attempts, newest first
    History {
        #[arg(long)]
        set: String,

        #[arg(long)]
        email: String,

        /// Show every answer of each attempt
        #[arg(long)]
        detail: bool,
    },

    /// Show analytics for a quiz set
    Stats {
        #[arg(long)]
        set: String,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Also save the report as JSON to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Render a report saved with `stats --output`
    Report {
        /// Path to the saved report JSON
        file: PathBuf,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Generate a natural-language summary of problem questions
    Insights {
        #[arg(long)]
        set: String,

        /// Provider name from the config
        #[arg(long)]
        provider: Option<String>,

        /// Model id (defaults to `default_model`)
        #[arg(long)]
        model: Option<String>,
    },

    /// List models offered by the configured insight backends
    Models {
        /// Filter to one provider
        #[arg(long)]
        provider: Option<String>,
    },

    /// Show the role an identity resolves to
    Whoami {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: Option<String>,
    },

    /// Manage the admin whitelist
    Admins {
        #[command(subcommand)]
        action: AdminAction,
    },

    /// Delete every attempt for every set
    Reset {
        /// Confirm the irreversible reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum AdminAction {
    /// List admins
    List,
    /// Add an admin
    Add { email: String },
    /// Remove an admin
    Remove { email: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizgate=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let opts = commands::GlobalOpts {
        config: cli.config,
        data_dir: cli.data_dir,
    };

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { quiz_set } => commands::validate::execute(quiz_set),
        Commands::Import {
            quiz_set,
            csv,
            set_id,
            title,
            created_by,
        } => commands::import::execute(&opts, quiz_set, csv, set_id, title, created_by),
        Commands::Template => commands::template::execute(),
        Commands::Sets => commands::sets::execute(&opts),
        Commands::CreateSet {
            title,
            questions,
            created_by,
        } => commands::sets::create(&opts, &title, questions, &created_by),
        Commands::DeleteSet { id } => commands::sets::delete(&opts, &id),
        Commands::Take {
            set,
            email,
            name,
            answers,
        } => commands::take::execute(&opts, &set, &email, name.as_deref(), &answers),
        Commands::Status { set, email } => commands::review::status(&opts, &set, &email),
        Commands::Review {
            set,
            email,
            passcode,
        } => commands::review::execute(&opts, &set, &email, passcode.as_deref()),
        Commands::History { set, email, detail } => {
            commands::review::history(&opts, &set, &email, detail)
        }
        Commands::Stats {
            set,
            format,
            output,
        } => commands::stats::execute(&opts, &set, &format, output),
        Commands::Report { file, format } => commands::stats::show_saved(&file, &format),
        Commands::Insights {
            set,
            provider,
            model,
        } => commands::insights::execute(&opts, &set, provider.as_deref(), model).await,
        Commands::Models { provider } => commands::models::execute(&opts, provider.as_deref()),
        Commands::Whoami { email, name } => {
            commands::admins::whoami(&opts, &email, name.as_deref())
        }
        Commands::Admins { action } => commands::admins::execute(&opts, action),
        Commands::Reset { yes } => commands::reset::execute(&opts, yes),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
