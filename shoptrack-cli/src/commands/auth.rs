//! Auth commands - login, register, logout, whoami

use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{Input, Password};

use shoptrack_core::{Credentials, Registration};

use super::{get_context, print_json, reported};
use crate::output;
use crate::view::TerminalView;

/// Read the password from stdin (first line) or prompt for it
fn read_password(from_stdin: bool, confirm: bool) -> Result<String> {
    if from_stdin {
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read password from stdin")?;
        return Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string());
    }

    let prompt = Password::new().with_prompt("Password");
    let password = if confirm {
        prompt
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?
    } else {
        prompt.interact()?
    };
    Ok(password)
}

fn prompt_if_missing(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Input::new().with_prompt(prompt).interact_text()?),
    }
}

pub fn run_login(username: Option<String>, password_stdin: bool) -> Result<()> {
    let view = Arc::new(TerminalView::new(false));
    let ctx = get_context(&view)?;

    let username = prompt_if_missing(username, "Username")?;
    let password = read_password(password_stdin, false)?;
    let credentials = Credentials::new(&username, &password);

    let user = reported(view.spin("Signing in...", || ctx.login(&credentials)))?;
    println!("  User ID: {}", user.id);
    Ok(())
}

pub fn run_register(
    username: Option<String>,
    email: Option<String>,
    password_stdin: bool,
) -> Result<()> {
    let view = Arc::new(TerminalView::new(false));
    let ctx = get_context(&view)?;

    let username = prompt_if_missing(username, "Username")?;
    let email = prompt_if_missing(email, "Email")?;
    let password = read_password(password_stdin, true)?;
    let registration = Registration::new(&username, &email, &password);

    let user = reported(view.spin("Creating account...", || ctx.register(&registration)))?;
    println!("  User ID: {}", user.id);
    Ok(())
}

pub fn run_logout() -> Result<()> {
    let view = Arc::new(TerminalView::new(false));
    let ctx = get_context(&view)?;

    if ctx.session.token().is_none() {
        output::warning("Not logged in");
        return Ok(());
    }

    view.spin("Signing out...", || ctx.logout());
    Ok(())
}

pub fn run_whoami(json: bool) -> Result<()> {
    let view = Arc::new(TerminalView::new(json));
    let ctx = get_context(&view)?;
    let user = ctx.session.current_user();

    if json {
        return print_json(&serde_json::json!({
            "authenticated": user.is_some(),
            "user": user,
            "apiBaseUrl": ctx.api.base_url(),
        }));
    }

    match user {
        Some(user) => {
            if let Some(welcome) = ctx.session.welcome_message() {
                println!("{}", welcome.bold());
            }
            println!("  User ID: {}", user.id);
            if let Some(email) = &user.email {
                println!("  Email: {}", email);
            }
            println!("  Server: {}", ctx.api.base_url().dimmed());
        }
        None => {
            output::warning("Not logged in");
            println!("{}", "Run 'shoptrack login' to sign in.".dimmed());
        }
    }

    Ok(())
}
