//! Interactive shell - menu-driven session over products and history

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, Input, Password, Select};
use rust_decimal::Decimal;

use shoptrack_core::{
    Action, Credentials, HistoryFilter, ProductInput, Registration, Section, ShopTrackContext,
    StockOperation,
};

use super::get_context;
use crate::output;
use crate::view::TerminalView;

enum Step {
    Continue,
    Quit,
}

pub fn run() -> Result<()> {
    let view = Arc::new(TerminalView::interactive());
    let ctx = get_context(&view)?;

    println!("{}", "ShopTrack inventory shell".bold());
    println!("{}", ctx.api.base_url().dimmed());

    if !view.spin("Loading...", || ctx.start()) {
        println!("{}", "Please log in or register.".dimmed());
    }

    loop {
        let step = if ctx.session.is_authenticated() {
            main_menu(&ctx, &view)?
        } else {
            auth_menu(&ctx, &view)?
        };
        if let Step::Quit = step {
            break;
        }
    }

    Ok(())
}

fn auth_menu(ctx: &ShopTrackContext, view: &TerminalView) -> Result<Step> {
    let items = ["Log in", "Register", "Quit"];
    let choice = Select::new()
        .with_prompt("ShopTrack")
        .items(&items)
        .default(0)
        .interact()?;

    match choice {
        0 => {
            let username: String = Input::new().with_prompt("Username").interact_text()?;
            let password = Password::new().with_prompt("Password").interact()?;
            let credentials = Credentials::new(&username, &password);
            // Failures are shown by the view; the menu simply comes back
            let _ = view.spin("Signing in...", || ctx.login(&credentials));
        }
        1 => {
            let username: String = Input::new().with_prompt("Username").interact_text()?;
            let email: String = Input::new().with_prompt("Email").interact_text()?;
            let password = Password::new()
                .with_prompt("Password")
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()?;
            let registration = Registration::new(&username, &email, &password);
            let _ = view.spin("Creating account...", || ctx.register(&registration));
        }
        _ => return Ok(Step::Quit),
    }
    Ok(Step::Continue)
}

const PRODUCT_ITEMS: [&str; 12] = [
    "Refresh",
    "Search (filter list)",
    "Add product",
    "Edit product",
    "Delete product",
    "Add stock",
    "Remove stock",
    "Set stock",
    "Change price",
    "Low stock report",
    "Switch to history",
    "Log out / quit",
];

const HISTORY_ITEMS: [&str; 5] = [
    "Refresh",
    "Filter by action",
    "Filter by product",
    "Switch to products",
    "Log out / quit",
];

fn main_menu(ctx: &ShopTrackContext, view: &TerminalView) -> Result<Step> {
    match ctx.app.current_section() {
        Section::Products => products_menu(ctx, view),
        Section::History => history_menu(ctx, view),
    }
}

fn prompt_id(prompt: &str) -> Result<i64> {
    Ok(Input::<i64>::new().with_prompt(prompt).interact_text()?)
}

fn products_menu(ctx: &ShopTrackContext, view: &TerminalView) -> Result<Step> {
    let choice = Select::new()
        .with_prompt("Products")
        .items(&PRODUCT_ITEMS)
        .default(0)
        .interact()?;

    // Service failures are reported through the view, so results are dropped
    match choice {
        0 => {
            let _ = view.spin("Loading products...", || ctx.app.refresh());
        }
        1 => {
            let text: String = Input::new()
                .with_prompt("Search (empty to clear)")
                .allow_empty(true)
                .interact_text()?;
            ctx.app.set_search(&text);
        }
        2 => {
            ctx.app.show_product_form();
            product_form(ctx, view, None)?;
        }
        3 => {
            let id = prompt_id("Product ID")?;
            if let Ok(product) = ctx.app.edit_product(id) {
                product_form(ctx, view, Some(product.to_input()))?;
            }
        }
        4 => {
            let id = prompt_id("Product ID")?;
            if Confirm::new()
                .with_prompt("Are you sure you want to delete this product?")
                .default(false)
                .interact()?
            {
                let _ = view.spin("Deleting product...", || ctx.app.delete_product(id));
            }
        }
        5 | 6 | 7 => {
            let operation = match choice {
                5 => StockOperation::Add,
                6 => StockOperation::Remove,
                _ => StockOperation::Set,
            };
            let id = prompt_id("Product ID")?;
            let quantity: String = Input::new()
                .with_prompt(format!("Quantity to {}", operation))
                .interact_text()?;
            let _ = view.spin("Updating stock...", || {
                ctx.app.manage_stock(id, operation, &quantity)
            });
        }
        8 => {
            let id = prompt_id("Product ID")?;
            let raw: String = Input::new().with_prompt("New price").interact_text()?;
            match raw.trim().trim_start_matches('$').parse::<Decimal>() {
                Ok(price) => {
                    let _ = view.spin("Updating price...", || ctx.app.update_price(id, price));
                }
                Err(_) => output::error("Price must be greater than 0"),
            }
        }
        9 => {
            let threshold = Input::<i64>::new()
                .with_prompt("Threshold")
                .default(ctx.config.low_stock_threshold)
                .interact_text()?;
            let _ = view.spin("Loading...", || ctx.app.low_stock_products(threshold));
        }
        10 => {
            let _ = view.spin("Loading history...", || ctx.app.switch_section(Section::History));
        }
        _ => return leave(ctx, view),
    }
    Ok(Step::Continue)
}

/// Prompt for every field, pre-filled when editing; retries until saved or cancelled
fn product_form(ctx: &ShopTrackContext, view: &TerminalView, current: Option<ProductInput>) -> Result<()> {
    let mut draft = current.map(|c| (c.name, c.price.to_string(), c.stock.to_string(), c.description));

    loop {
        let (name, price, stock, description) = draft.clone().unwrap_or_default();
        let name: String = Input::new().with_prompt("Name").with_initial_text(name).allow_empty(true).interact_text()?;
        let price: String = Input::new().with_prompt("Price").with_initial_text(price).allow_empty(true).interact_text()?;
        let stock: String = Input::new().with_prompt("Stock").with_initial_text(stock).allow_empty(true).interact_text()?;
        let description: String = Input::new()
            .with_prompt("Description")
            .with_initial_text(description)
            .allow_empty(true)
            .interact_text()?;
        draft = Some((name.clone(), price.clone(), stock.clone(), description.clone()));

        let saved = match ProductInput::parse(&name, &price, &stock, &description) {
            Ok(input) => view
                .spin("Saving product...", || ctx.app.submit_product(&input))
                .is_ok(),
            Err(e) => {
                output::error(&e.to_string());
                false
            }
        };
        if saved {
            return Ok(());
        }

        if !Confirm::new().with_prompt("Try again?").default(true).interact()? {
            ctx.app.hide_product_form();
            return Ok(());
        }
    }
}

fn history_menu(ctx: &ShopTrackContext, view: &TerminalView) -> Result<Step> {
    let choice = Select::new()
        .with_prompt("History")
        .items(&HISTORY_ITEMS)
        .default(0)
        .interact()?;

    match choice {
        0 => {
            let _ = view.spin("Loading history...", || ctx.app.refresh());
        }
        1 => {
            let filters = ["All", "Bought", "Sold"];
            let selected = Select::new()
                .with_prompt("Show")
                .items(&filters)
                .default(0)
                .interact()?;
            let filter = match selected {
                1 => HistoryFilter::Action(Action::Buy),
                2 => HistoryFilter::Action(Action::Sell),
                _ => HistoryFilter::All,
            };
            let _ = view.spin("Loading history...", || ctx.app.filter_history(filter));
        }
        2 => {
            let id = prompt_id("Product ID")?;
            let _ = view.spin("Loading history...", || {
                ctx.app.filter_history(HistoryFilter::Product(id))
            });
        }
        3 => {
            let _ = view.spin("Loading products...", || ctx.app.switch_section(Section::Products));
        }
        _ => return leave(ctx, view),
    }
    Ok(Step::Continue)
}

fn leave(ctx: &ShopTrackContext, view: &TerminalView) -> Result<Step> {
    let choices = ["Quit (stay logged in)", "Log out", "Back"];
    let choice = Select::new().items(&choices).default(0).interact()?;
    match choice {
        0 => Ok(Step::Quit),
        1 => {
            view.spin("Signing out...", || ctx.logout());
            Ok(Step::Continue)
        }
        _ => Ok(Step::Continue),
    }
}
