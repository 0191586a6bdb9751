//! Products commands - list, show, add, update, delete, search

use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::{Confirm, Input};
use rust_decimal::Decimal;

use shoptrack_core::ProductInput;

use super::{get_session_context, print_json, reported};
use crate::output;
use crate::view::TerminalView;

#[derive(Subcommand)]
pub enum ProductCommands {
    /// List all products
    List {
        /// Only show products whose name or description contains TEXT
        #[arg(long, short)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one product
    Show {
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a product (prompts for missing fields)
    Add {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        stock: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Update a product; fields not given keep their current values
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        stock: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a product
    Delete {
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
    /// Search products on the server
    Search {
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List products at or below a stock threshold
    LowStock {
        /// Stock threshold (defaults to the configured one)
        #[arg(long, short)]
        threshold: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a product's price
    Price {
        id: i64,
        price: String,
    },
}

pub fn run(command: ProductCommands) -> Result<()> {
    match command {
        ProductCommands::List { search, json } => run_list(search, json),
        ProductCommands::Show { id, json } => run_show(id, json),
        ProductCommands::Add {
            name,
            price,
            stock,
            description,
        } => run_add(name, price, stock, description),
        ProductCommands::Update {
            id,
            name,
            price,
            stock,
            description,
        } => run_update(id, name, price, stock, description),
        ProductCommands::Delete { id, force } => run_delete(id, force),
        ProductCommands::Search { query, json } => run_search(&query, json),
        ProductCommands::LowStock { threshold, json } => run_low_stock(threshold, json),
        ProductCommands::Price { id, price } => run_price(id, &price),
    }
}

fn run_list(search: Option<String>, json: bool) -> Result<()> {
    let view = Arc::new(TerminalView::new(json));
    let ctx = get_session_context(&view)?;

    reported(view.spin("Loading products...", || ctx.app.load_products()))?;
    if let Some(text) = &search {
        ctx.app.set_search(text);
    }
    let products = ctx.app.visible_products();

    if json {
        return print_json(&products);
    }
    output::print_products(&products);
    Ok(())
}

fn run_show(id: i64, json: bool) -> Result<()> {
    let view = Arc::new(TerminalView::new(json));
    let ctx = get_session_context(&view)?;

    let product = reported(view.spin("Loading product...", || ctx.app.get_product(id)))?;
    if json {
        return print_json(&product);
    }
    output::print_product(&product);
    Ok(())
}

fn prompt_field(value: Option<String>, prompt: &str, default: Option<String>) -> Result<String> {
    if let Some(v) = value {
        return Ok(v);
    }
    let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
    if let Some(d) = default {
        input = input.default(d);
    }
    Ok(input.interact_text()?)
}

fn run_add(
    name: Option<String>,
    price: Option<String>,
    stock: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let view = Arc::new(TerminalView::new(false));
    let ctx = get_session_context(&view)?;

    let prompting = name.is_none() || price.is_none() || stock.is_none();
    if prompting {
        ctx.app.show_product_form();
    }
    let name = prompt_field(name, "Name", None)?;
    let price = prompt_field(price, "Price", None)?;
    let stock = prompt_field(stock, "Stock", Some("0".to_string()))?;
    let description = match description {
        Some(d) => d,
        None if prompting => prompt_field(None, "Description", None)?,
        None => String::new(),
    };

    let input = ProductInput::parse(&name, &price, &stock, &description)?;
    reported(view.spin("Saving product...", || ctx.app.create_product(&input)))?;

    if let Some(product) = ctx.app.products().into_iter().rev().find(|p| p.name == input.name) {
        println!("  Product ID: {}", product.id);
    }
    Ok(())
}

fn run_update(
    id: i64,
    name: Option<String>,
    price: Option<String>,
    stock: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let view = Arc::new(TerminalView::new(false));
    let ctx = get_session_context(&view)?;

    let product = reported(view.spin("Loading product...", || ctx.app.edit_product(id)))?;
    let current = product.to_input();

    let input = ProductInput::parse(
        &name.unwrap_or(current.name),
        &price.unwrap_or_else(|| current.price.to_string()),
        &stock.unwrap_or_else(|| current.stock.to_string()),
        &description.unwrap_or(current.description),
    )?;

    if input == product.to_input() {
        output::warning("Nothing to update");
        ctx.app.hide_product_form();
        return Ok(());
    }

    reported(view.spin("Saving product...", || ctx.app.submit_product(&input)))
}

fn run_delete(id: i64, force: bool) -> Result<()> {
    let view = Arc::new(TerminalView::new(false));
    let ctx = get_session_context(&view)?;

    if !force {
        let product = reported(view.spin("Loading product...", || ctx.app.get_product(id)))?;
        println!(
            "\n{}\n",
            format!("This will delete '{}' (#{}).", product.name, product.id).yellow()
        );
        if !Confirm::new()
            .with_prompt("Are you sure you want to delete this product?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    reported(view.spin("Deleting product...", || ctx.app.delete_product(id)))
}

fn run_search(query: &str, json: bool) -> Result<()> {
    let view = Arc::new(TerminalView::new(json));
    let ctx = get_session_context(&view)?;

    let products = reported(view.spin("Searching...", || ctx.app.search_products(query)))?;
    if json {
        return print_json(&products);
    }
    output::print_products(&products);
    Ok(())
}

fn run_low_stock(threshold: Option<i64>, json: bool) -> Result<()> {
    let view = Arc::new(TerminalView::new(json));
    let ctx = get_session_context(&view)?;
    let threshold = threshold.unwrap_or(ctx.config.low_stock_threshold);

    let products = reported(view.spin("Loading low stock products...", || {
        ctx.app.low_stock_products(threshold)
    }))?;
    if json {
        return print_json(&products);
    }
    println!("{}", format!("Products with stock at or below {}", threshold).bold());
    output::print_products(&products);
    Ok(())
}

fn run_price(id: i64, price: &str) -> Result<()> {
    let view = Arc::new(TerminalView::new(false));
    let ctx = get_session_context(&view)?;

    let price: Decimal = price
        .trim()
        .trim_start_matches('$')
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid price: {}", price))?;

    reported(view.spin("Updating price...", || ctx.app.update_price(id, price)))
}
