//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Publish a Raspberry Pi sensor server through a Cloudflare Tunnel
#[derive(Parser)]
#[command(
    name = "pitunnel",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Enable debug logging on stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Provision the host: dependencies, tunnel, DNS, services
    Provision(commands::provision::ProvisionArgs),

    /// Print the generated ingress config and unit files
    Render(commands::render::RenderArgs),

    /// Show service states and endpoint health
    Status(commands::status::StatusArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            quiet,
            no_color,
            verbose,
            command,
        } = self;
        crate::logging::init(verbose);

        let yes = matches!(&command, Command::Provision(args) if args.yes);
        let app = AppContext::new(&AppFlags {
            output: OutputFlags { no_color, quiet },
            behaviour: BehaviourFlags { yes },
        });

        match command {
            Command::Provision(args) => commands::provision::run(&app, args).await,
            Command::Render(args) => commands::render::run(&args).await,
            Command::Status(args) => commands::status::run(&app, &args).await,
            Command::Version => {
                commands::version::run();
                Ok(())
            }
        }
    }
}
