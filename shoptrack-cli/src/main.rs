//! ShopTrack CLI - Inventory management in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;
mod view;

use commands::{auth, config, history, products, shell, stock, Reported};

/// ShopTrack - inventory management in your terminal
#[derive(Parser)]
#[command(name = "shoptrack", version, about, long_about = None)]
struct Cli {
    /// Log to stderr (-v info, -vv debug, -vvv trace); SHOPTRACK_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(long, short)]
        username: Option<String>,
        /// Read the password from the first line of stdin
        #[arg(long)]
        password_stdin: bool,
    },

    /// Create an account and log in
    Register {
        #[arg(long, short)]
        username: Option<String>,
        #[arg(long, short)]
        email: Option<String>,
        /// Read the password from the first line of stdin
        #[arg(long)]
        password_stdin: bool,
    },

    /// Log out and forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage products
    Products {
        #[command(subcommand)]
        command: products::ProductCommands,
    },

    /// Change stock levels
    Stock {
        #[command(subcommand)]
        command: stock::StockCommands,
    },

    /// View and edit the transaction history
    History {
        #[command(subcommand)]
        command: history::HistoryCommands,
    },

    /// Interactive menu over products and history
    Shell,

    /// Show or change client settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

const LOG_ENV: &str = "SHOPTRACK_LOG";

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "off",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli.command);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Service failures were already printed by the view
            if e.downcast_ref::<Reported>().is_none() {
                output::error(&format!("{:#}", e));
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Login {
            username,
            password_stdin,
        } => auth::run_login(username, password_stdin),
        Commands::Register {
            username,
            email,
            password_stdin,
        } => auth::run_register(username, email, password_stdin),
        Commands::Logout => auth::run_logout(),
        Commands::Whoami { json } => auth::run_whoami(json),
        Commands::Products { command } => products::run(command),
        Commands::Stock { command } => stock::run(command),
        Commands::History { command } => history::run(command),
        Commands::Shell => shell::run(),
        Commands::Config { command } => config::run(command),
    }
}
