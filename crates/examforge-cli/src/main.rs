//! examforge CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "examforge", version, about = "Exam catalog, sessions and AI exam generation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the exams in a catalog
    Catalog {
        /// Catalog .toml file or directory
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Take an exam and print the score
    Take {
        /// Catalog .toml file or directory
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Exam ID
        #[arg(long)]
        exam: String,

        /// Answers as position:option pairs, e.g. "0:2,1:B" (prompted if omitted)
        #[arg(long)]
        answers: Option<String>,

        /// Save the attempt as JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate a new exam from a document
    Generate {
        /// Catalog .toml file or directory
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Source document (pdf, docx or txt)
        #[arg(long)]
        document: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Summarize saved attempts
    Stats {
        /// Directory of attempt JSON files
        #[arg(long)]
        reports: PathBuf,

        /// Pass threshold in percent (defaults to the configured value)
        #[arg(long)]
        pass_threshold: Option<u8>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate catalog TOML files
    Validate {
        /// Catalog .toml file or directory
        #[arg(long)]
        catalog: PathBuf,
    },

    /// Create starter config and example catalog
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examforge=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Catalog { catalog, config } => commands::catalog::execute(catalog, config),
        Commands::Take {
            catalog,
            exam,
            answers,
            output,
            config,
        } => commands::take::execute(catalog, exam, answers, output, config),
        Commands::Generate {
            catalog,
            document,
            config,
        } => commands::generate::execute(catalog, document, config).await,
        Commands::Stats {
            reports,
            pass_threshold,
            config,
        } => commands::stats::execute(reports, pass_threshold, config),
        Commands::Validate { catalog } => commands::validate::execute(catalog),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
