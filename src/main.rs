use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use code_skeleton::analyzer::scanner::SymlinkPolicy;
use code_skeleton::cli::commands;
use code_skeleton::cli::GenerateOptions;
use code_skeleton::formats::{Layout, OutputFormat};
use code_skeleton::types::ResolutionLevel;

#[derive(Parser)]
#[command(name = "code-skeleton")]
#[command(
    version,
    about = "Token-efficient structure maps of Python and Rust source trees"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan source roots and write skeleton documents
    Generate {
        #[arg(long = "source", short = 's', help = "Source root (repeatable, default from config: .)")]
        sources: Vec<PathBuf>,
        #[arg(long, short, help = "Read this config file instead of the global/project chain")]
        config: Option<PathBuf>,
        #[arg(long, short, help = "Output directory")]
        output: Option<PathBuf>,
        #[arg(long, short, help = "Resolution level: packages, modules, classes, functions")]
        level: Option<ResolutionLevel>,
        #[arg(
            long = "format",
            short = 'f',
            help = "Output format: json, yaml (repeatable)"
        )]
        formats: Vec<OutputFormat>,
        #[arg(long, help = "Document layout: split, embedded")]
        layout: Option<Layout>,
        #[arg(long, short = 'x', help = "Exclude pattern (repeatable, replaces defaults)")]
        exclude: Vec<String>,
        #[arg(long, help = "Symlink policy: forbid, follow, skip")]
        symlinks: Option<SymlinkPolicy>,
        #[arg(long, short = 'j', help = "Extraction workers (0 = sequential)")]
        workers: Option<usize>,
        #[arg(long, help = "Honour .gitignore files in source roots")]
        gitignore: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Write a default configuration file
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mcode-skeleton encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Generate {
            sources,
            config,
            output,
            level,
            formats,
            layout,
            exclude,
            symlinks,
            workers,
            gitignore,
        } => {
            commands::generate::run(GenerateOptions {
                sources,
                config,
                output,
                level,
                formats,
                layout,
                exclude,
                symlinks,
                workers,
                gitignore,
            })?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
