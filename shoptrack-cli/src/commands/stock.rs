//! Stock commands - add, remove or set a product's stock level

use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;

use shoptrack_core::StockOperation;

use super::{get_session_context, reported};
use crate::view::TerminalView;

#[derive(Subcommand)]
pub enum StockCommands {
    /// Add units to a product's stock
    Add {
        /// Product ID
        id: i64,
        /// Positive whole number
        quantity: String,
    },
    /// Remove units from a product's stock
    Remove {
        /// Product ID
        id: i64,
        /// Positive whole number
        quantity: String,
    },
    /// Set a product's stock to an exact level
    Set {
        /// Product ID
        id: i64,
        /// Positive whole number
        quantity: String,
    },
}

pub fn run(command: StockCommands) -> Result<()> {
    let (id, operation, quantity) = match command {
        StockCommands::Add { id, quantity } => (id, StockOperation::Add, quantity),
        StockCommands::Remove { id, quantity } => (id, StockOperation::Remove, quantity),
        StockCommands::Set { id, quantity } => (id, StockOperation::Set, quantity),
    };

    let view = Arc::new(TerminalView::new(false));
    let ctx = get_session_context(&view)?;

    reported(view.spin("Updating stock...", || {
        ctx.app.manage_stock(id, operation, &quantity)
    }))?;

    if let Some(product) = ctx.app.products().into_iter().find(|p| p.id == id) {
        println!("  {} now has {} in stock", product.name, product.stock);
    }
    Ok(())
}
