//! History commands - transaction log

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use rust_decimal::Decimal;

use shoptrack_core::{Action, HistoryFilter, HistoryInput};

use super::{get_session_context, print_json, reported};
use crate::output;
use crate::view::TerminalView;

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List transactions
    List {
        /// Only buys or only sells
        #[arg(long, short, conflicts_with = "product")]
        action: Option<Action>,
        /// Only transactions for this product ID
        #[arg(long, short)]
        product: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one transaction
    Show {
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a transaction
    Add {
        /// Product ID
        #[arg(long)]
        product: i64,
        /// buy or sell
        #[arg(long)]
        action: Action,
        #[arg(long)]
        quantity: i64,
        /// Unit price
        #[arg(long)]
        price: String,
    },
    /// Update a transaction; fields not given keep their current values
    Update {
        id: i64,
        #[arg(long)]
        product: Option<i64>,
        #[arg(long)]
        action: Option<Action>,
        #[arg(long)]
        quantity: Option<i64>,
        #[arg(long)]
        price: Option<String>,
    },
    /// Delete a transaction
    Delete {
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

pub fn run(command: HistoryCommands) -> Result<()> {
    match command {
        HistoryCommands::List {
            action,
            product,
            json,
        } => run_list(action, product, json),
        HistoryCommands::Show { id, json } => run_show(id, json),
        HistoryCommands::Add {
            product,
            action,
            quantity,
            price,
        } => run_add(product, action, quantity, &price),
        HistoryCommands::Update {
            id,
            product,
            action,
            quantity,
            price,
        } => run_update(id, product, action, quantity, price),
        HistoryCommands::Delete { id, force } => run_delete(id, force),
    }
}

fn parse_price(raw: &str) -> Result<Decimal> {
    raw.trim()
        .trim_start_matches('$')
        .parse()
        .with_context(|| format!("Invalid price: {}", raw))
}

fn run_list(action: Option<Action>, product: Option<i64>, json: bool) -> Result<()> {
    let view = Arc::new(TerminalView::new(json));
    let ctx = get_session_context(&view)?;

    let filter = match (action, product) {
        (Some(action), _) => HistoryFilter::Action(action),
        (None, Some(product_id)) => HistoryFilter::Product(product_id),
        (None, None) => HistoryFilter::All,
    };

    reported(view.spin("Loading history...", || ctx.app.filter_history(filter)))?;
    let history = ctx.app.history();

    if json {
        return print_json(&history);
    }
    output::print_history(&history);
    Ok(())
}

fn run_show(id: i64, json: bool) -> Result<()> {
    let view = Arc::new(TerminalView::new(json));
    let ctx = get_session_context(&view)?;

    let entry = reported(view.spin("Loading transaction...", || ctx.app.get_transaction(id)))?;
    if json {
        return print_json(&entry);
    }
    output::print_history_entry(&entry);
    Ok(())
}

fn run_add(product_id: i64, action: Action, quantity: i64, price: &str) -> Result<()> {
    let view = Arc::new(TerminalView::new(false));
    let ctx = get_session_context(&view)?;

    let input = HistoryInput {
        product_id,
        action,
        quantity,
        price: parse_price(price)?,
    };
    reported(view.spin("Recording transaction...", || ctx.app.create_transaction(&input)))
}

fn run_update(
    id: i64,
    product_id: Option<i64>,
    action: Option<Action>,
    quantity: Option<i64>,
    price: Option<String>,
) -> Result<()> {
    let view = Arc::new(TerminalView::new(false));
    let ctx = get_session_context(&view)?;

    let current = reported(view.spin("Loading transaction...", || ctx.app.get_transaction(id)))?;
    let product_id = product_id
        .or(current.product_id)
        .context("Transaction has no product; pass --product")?;

    let input = HistoryInput {
        product_id,
        action: action.unwrap_or(current.action),
        quantity: quantity.unwrap_or(current.quantity),
        price: match price {
            Some(p) => parse_price(&p)?,
            None => current.price,
        },
    };
    reported(view.spin("Saving transaction...", || ctx.app.update_transaction(id, &input)))
}

fn run_delete(id: i64, force: bool) -> Result<()> {
    let view = Arc::new(TerminalView::new(false));
    let ctx = get_session_context(&view)?;

    if !force {
        let entry = reported(view.spin("Loading transaction...", || ctx.app.get_transaction(id)))?;
        println!(
            "\n{}\n",
            format!(
                "This will delete transaction #{} ({} {} x {}).",
                entry.id,
                entry.action.label(),
                entry.quantity,
                entry.product_label()
            )
            .yellow()
        );
        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    reported(view.spin("Deleting transaction...", || ctx.app.delete_transaction(id)))
}
