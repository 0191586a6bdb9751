//! Config commands - show and change client settings

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use shoptrack_core::config::{Config, API_URL_ENV};
use shoptrack_core::ports::TokenStore;
use shoptrack_core::adapters::FileTokenStore;

use super::{get_data_dir, print_json};
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Point the client at a different backend
    SetUrl {
        /// Base URL including the /api prefix
        url: String,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show { json } => run_show(json),
        ConfigCommands::SetUrl { url } => run_set_url(&url),
    }
}

fn run_show(json: bool) -> Result<()> {
    // Reads local files only; no session probe
    let data_dir = get_data_dir()?;
    let config = Config::load(&data_dir)?;
    let has_session = FileTokenStore::new(&data_dir).load()?.is_some();

    if json {
        return print_json(&serde_json::json!({
            "dataDir": data_dir,
            "apiBaseUrl": config.api_base_url,
            "apiBaseUrlFromEnv": config.api_base_url_from_env(),
            "requestTimeoutSecs": config.request_timeout_secs,
            "lowStockThreshold": config.low_stock_threshold,
            "sessionStored": has_session,
        }));
    }

    let mut table = output::create_table();
    table.add_row(vec!["Data directory".to_string(), data_dir.display().to_string()]);
    let url = if config.api_base_url_from_env() {
        format!("{} (from {})", config.api_base_url, API_URL_ENV)
    } else {
        config.api_base_url.clone()
    };
    table.add_row(vec!["API base URL".to_string(), url]);
    table.add_row(vec![
        "Request timeout".to_string(),
        format!("{}s", config.request_timeout_secs),
    ]);
    table.add_row(vec![
        "Low stock threshold".to_string(),
        config.low_stock_threshold.to_string(),
    ]);
    table.add_row(vec![
        "Session".to_string(),
        if has_session { "stored" } else { "none" }.to_string(),
    ]);
    println!("{}", table);
    Ok(())
}

fn run_set_url(url: &str) -> Result<()> {
    let data_dir = get_data_dir()?;
    let mut config = Config::load(&data_dir)?;
    config.set_api_base_url(url)?;
    config.save(&data_dir)?;

    output::success(&format!("API base URL set to {}", config.api_base_url));
    if std::env::var(API_URL_ENV).is_ok() {
        output::info(&format!("{} is set and still takes precedence", API_URL_ENV));
    }
    println!(
        "{}",
        "Log in again if the new server does not know your session.".dimmed()
    );
    Ok(())
}
