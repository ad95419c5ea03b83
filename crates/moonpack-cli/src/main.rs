//! moonpack command-line tool.
//!
//! Single entry point for bundling MoonLoader Lua projects:
//! scaffolding (`init`), one-shot builds (`build`), and rebuild-on-change
//! (`watch`).

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::output::{resolve_color_choice, StyledOutput};

#[derive(Parser)]
#[command(name = "moonpack")]
#[command(about = "Bundler for MoonLoader Lua projects")]
#[command(version)]
struct Cli {
    /// Color output (auto, always, never)
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project in the given directory
    Init {
        /// Target directory (created if missing)
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Project name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Bundle the project once
    #[command(alias = "b")]
    Build {
        /// Project directory containing moonpack.json
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Rebuild whenever a source file changes
    #[command(alias = "w")]
    Watch {
        /// Project directory containing moonpack.json
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
        /// Quiet window after a change before rebuilding, in milliseconds
        #[arg(long, default_value = "200")]
        debounce: u64,
    },
}

fn main() -> ExitCode {
    // Unknown commands and bad flags exit 1, not clap's default 2.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let failed = err.use_stderr();
            let _ = err.print();
            return if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
    };
    let mut out = StyledOutput::new(resolve_color_choice(cli.color.as_deref()));

    let result = match cli.command {
        Some(Commands::Init { path, name }) => commands::init::execute(&path, name, &mut out),
        Some(Commands::Build { dir }) => commands::build::execute(&dir, &mut out),
        Some(Commands::Watch { dir, debounce }) => {
            commands::watch::execute(&dir, debounce, &mut out)
        }
        None => {
            use clap::CommandFactory;
            let _ = Cli::command().print_help();
            return ExitCode::SUCCESS;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            out.error_line(&format!("error: {err:#}"));
            ExitCode::FAILURE
        }
    }
}
