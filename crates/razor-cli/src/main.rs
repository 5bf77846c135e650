//! Razor CLI
//!
//! Command-line front end for tokenizing, parsing, lowering and checking
//! Razor templates

mod commands;
mod output;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use razor_core::init_tracing;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "razor")]
#[command(about = "Razor template front end: tokenize, parse, lower and check .cshtml/.razor files")]
#[command(version = razor_core::VERSION)]
#[command(
    long_about = "Inspect and check Razor templates.\n\
\n\
Examples:\n  \
razor tokens Index.cshtml --mode code   # Code tokens of a file\n  \
razor parse Index.cshtml                # Syntax tree after tag helper rewriting\n  \
razor lower Index.cshtml --catalog th.json\n  \
razor check Views/                      # Report diagnostics for every template\n  \
razor config schema                     # JSON Schema of razor.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (razor.toml/.razorrc.json)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Number of threads to use for parallel processing
    #[arg(
        short = 'j',
        long,
        global = true,
        help = "Number of threads (default: number of CPU cores)"
    )]
    threads: Option<usize>,

    /// Generate shell completion script
    #[arg(
        long,
        value_enum,
        help = "Generate completion script for specified shell"
    )]
    generate_completion: Option<Shell>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tokens of a file
    Tokens {
        file: PathBuf,

        /// Grammar to tokenize with
        #[arg(long, default_value = "markup")]
        mode: TokenizerMode,
    },

    /// Print the syntax tree of a file after tag helper rewriting
    Parse {
        file: PathBuf,

        /// Tag helper descriptor catalogs, in addition to configured ones
        #[arg(long = "catalog")]
        catalogs: Vec<PathBuf>,
    },

    /// Print the intermediate tree of a file
    Lower {
        file: PathBuf,

        #[arg(long = "catalog")]
        catalogs: Vec<PathBuf>,

        /// Append source spans to every node
        #[arg(long)]
        spans: bool,
    },

    /// Report diagnostics for every template under the given paths
    Check {
        /// Files or directories to check
        #[arg(help = "Files or directories to process (default: current directory)")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,

        #[arg(long = "catalog")]
        catalogs: Vec<PathBuf>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the JSON Schema of the configuration file
    Schema,

    /// Show the configuration in effect
    Show,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TokenizerMode {
    /// HTML tokenizer
    Markup,
    /// C# tokenizer
    Code,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable reports with source context
    Human,
    /// JSON array of files and their diagnostics
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(shell) = cli.generate_completion {
        generate_completion_script(shell);
        return ExitCode::SUCCESS;
    }

    let use_colors = !cli.no_color && std::env::var("NO_COLOR").is_err();
    colored::control::set_override(use_colors);

    if std::env::var("RUST_LOG").is_err() {
        let log_level = match cli.verbose {
            0 => "razor=error",
            1 => "razor=warn",
            2 => "razor=info",
            3 => "razor=debug",
            _ => "razor=trace",
        };
        // SAFETY: no other threads exist yet
        unsafe {
            std::env::set_var("RUST_LOG", log_level);
        }
    }
    init_tracing();

    if let Some(threads) = cli.threads
        && let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
    {
        error!("Failed to set thread pool size: {}", e);
        return ExitCode::FAILURE;
    }

    match run_command(cli, use_colors) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn generate_completion_script(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

/// `Ok(false)` when the command ran but found errors
fn run_command(cli: Cli, use_colors: bool) -> Result<bool> {
    let config = cli.config;
    match cli.command {
        Some(Commands::Tokens { file, mode }) => {
            commands::tokens_command(&file, mode)?;
            Ok(true)
        }
        Some(Commands::Parse { file, catalogs }) => {
            commands::parse_command(&file, &catalogs, config.as_deref())?;
            Ok(true)
        }
        Some(Commands::Lower {
            file,
            catalogs,
            spans,
        }) => {
            commands::lower_command(&file, &catalogs, spans, config.as_deref())?;
            Ok(true)
        }
        Some(Commands::Check {
            paths,
            format,
            catalogs,
        }) => {
            let paths = if paths.is_empty() {
                vec![PathBuf::from(".")]
            } else {
                paths
            };
            let summary =
                commands::check_command(&paths, format, &catalogs, config.as_deref(), use_colors)?;
            Ok(!summary.has_errors())
        }
        Some(Commands::Config { action }) => {
            match action {
                ConfigAction::Schema => commands::config_schema_command()?,
                ConfigAction::Show => commands::config_show_command(config.as_deref())?,
            }
            Ok(true)
        }
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            Ok(true)
        }
    }
}
