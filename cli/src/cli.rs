//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;

/// Create and track the VM of a single-VM deployment
#[derive(Parser)]
#[command(
    name = "keel",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Deployment state file [default: ~/.keel/deployment.json]
    #[arg(long, global = true, env = "KEEL_STATE", value_name = "PATH")]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the deployment VM from a stemcell
    CreateVm(commands::create_vm::CreateVmArgs),

    /// Show the current VM
    Current,

    /// Forget the current VM without deleting it
    Forget(commands::forget::ForgetArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            state,
            command,
        } = self;

        let app = || {
            AppContext::new(&AppFlags {
                output: OutputFlags {
                    no_color,
                    quiet,
                    json,
                },
                state: state.clone(),
            })
        };

        match command {
            Command::CreateVm(args) => commands::create_vm::run(&app()?, &args).await,
            Command::Current => commands::current::run(&app()?).await,
            Command::Forget(args) => commands::forget::run(&app()?, &args).await,
            Command::Config(cmd) => commands::config::run(&app()?, cmd),
            Command::Version => {
                commands::version::run(json);
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
