//! CLI frontend for the Questwriter chapter editor.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::Options;
use commands::branch::BranchAction;
use commands::choice::ChoiceAction;
use commands::condition::ConditionAction;
use commands::operation::OperationAction;
use commands::segment::SegmentAction;
use commands::variable::VariableAction;

#[derive(Parser)]
#[command(
    name = "qw",
    about = "Questwriter: an editor for branching quest chapters",
    version,
    propagate_version = true
)]
struct Cli {
    /// Chapter file to work on
    #[arg(short, long, global = true, default_value = "chapter.json")]
    file: PathBuf,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    yes: bool,

    /// Spaces per indentation level when saving (default: 2, at most 8)
    #[arg(long, global = true)]
    indent: Option<usize>,

    /// Log more (-v for info, -vv for debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new chapter file with one branch and one ending
    New,

    /// Validate a chapter file and report broken references
    Check,

    /// Print the branches, segments and options of the chapter
    Show {
        /// Only show this branch
        #[arg(short, long)]
        branch: Option<usize>,

        /// Also show conditions and operations
        #[arg(short, long)]
        rules: bool,
    },

    /// List story variables and where they are used
    Variables,

    /// Change the chapter title
    Title {
        /// New title
        title: String,
    },

    /// Add, move, delete or rename branches
    Branch {
        #[command(subcommand)]
        action: BranchAction,
    },

    /// Add, move, delete or edit segments
    Segment {
        #[command(subcommand)]
        action: SegmentAction,
    },

    /// Add, move, delete or edit options
    Choice {
        #[command(subcommand)]
        action: ChoiceAction,
    },

    /// Edit the conditions gating an option
    Condition {
        #[command(subcommand)]
        action: ConditionAction,
    },

    /// Edit the operations an option performs
    Operation {
        #[command(subcommand)]
        action: OperationAction,
    },

    /// Add, move, delete or edit story variables
    Variable {
        #[command(subcommand)]
        action: VariableAction,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let opts = Options {
        file: &cli.file,
        yes: cli.yes,
        indent: cli.indent,
    };

    let result = match cli.command {
        Commands::New => commands::new::run(&opts),
        Commands::Check => commands::check::run(&opts),
        Commands::Show { branch, rules } => commands::show::run(&opts, branch, rules),
        Commands::Variables => commands::variables::run(&opts),
        Commands::Title { title } => commands::title::run(&opts, title),
        Commands::Branch { action } => commands::branch::run(&opts, action),
        Commands::Segment { action } => commands::segment::run(&opts, action),
        Commands::Choice { action } => commands::choice::run(&opts, action),
        Commands::Condition { action } => commands::condition::run(&opts, action),
        Commands::Operation { action } => commands::operation::run(&opts, action),
        Commands::Variable { action } => commands::variable::run(&opts, action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
