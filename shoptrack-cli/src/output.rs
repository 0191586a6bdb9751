//! Output formatting utilities

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use rust_decimal::Decimal;

use shoptrack_core::{Action, HistoryEntry, Product};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format an amount as US dollars, e.g. `$1,234.50`
pub fn format_currency(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2).abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && !amount.round_dp(2).is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}${}.{}", sign, grouped, cents)
}

/// Format a timestamp in local time, e.g. `Jan 5, 2025, 02:30 PM`
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    format_datetime(&timestamp.with_timezone(&Local))
}

fn format_datetime<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    timestamp.format("%b %-d, %Y, %I:%M %p").to_string()
}

pub fn products_table(products: &[Product]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["ID", "Name", "Price", "Stock", "Description"]);

    for product in products {
        let stock = if product.is_low_stock() {
            Cell::new(format!("{} (low)", product.stock)).fg(Color::Red)
        } else {
            Cell::new(product.stock)
        };
        table.add_row(vec![
            Cell::new(product.id),
            Cell::new(&product.name),
            Cell::new(format_currency(product.price)),
            stock,
            Cell::new(product.description.as_deref().unwrap_or("")),
        ]);
    }

    table
}

pub fn history_table(history: &[HistoryEntry]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["ID", "Date", "Product", "Action", "Quantity", "Price", "Total"]);

    for entry in history {
        let action = match entry.action {
            Action::Buy => Cell::new(entry.action.label()).fg(Color::Green),
            Action::Sell => Cell::new(entry.action.label()).fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(entry.id),
            Cell::new(format_timestamp(&entry.created_at)),
            Cell::new(entry.product_label()),
            action,
            Cell::new(entry.quantity),
            Cell::new(format_currency(entry.price)),
            Cell::new(format_currency(entry.price * Decimal::from(entry.quantity))),
        ]);
    }

    table
}

pub fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("{}", "No products found.".dimmed());
        return;
    }
    println!("{}", products_table(products));
    let low = products.iter().filter(|p| p.is_low_stock()).count();
    if low > 0 {
        warning(&format!("{} product(s) running low on stock", low));
    }
}

pub fn print_history(history: &[HistoryEntry]) {
    if history.is_empty() {
        println!("{}", "No transactions found.".dimmed());
        return;
    }
    println!("{}", history_table(history));
}

pub fn print_product(product: &Product) {
    let mut table = create_table();
    table.add_row(vec!["ID".to_string(), product.id.to_string()]);
    table.add_row(vec!["Name".to_string(), product.name.clone()]);
    table.add_row(vec!["Price".to_string(), format_currency(product.price)]);
    table.add_row(vec!["Stock".to_string(), product.stock.to_string()]);
    table.add_row(vec![
        "Description".to_string(),
        product.description.clone().unwrap_or_default(),
    ]);
    println!("{}", table);
    if product.is_low_stock() {
        warning("Low stock");
    }
}

pub fn print_history_entry(entry: &HistoryEntry) {
    let mut table = create_table();
    table.add_row(vec!["ID".to_string(), entry.id.to_string()]);
    table.add_row(vec!["Date".to_string(), format_timestamp(&entry.created_at)]);
    table.add_row(vec!["Product".to_string(), entry.product_label()]);
    table.add_row(vec!["Action".to_string(), entry.action.label().to_string()]);
    table.add_row(vec!["Quantity".to_string(), entry.quantity.to_string()]);
    table.add_row(vec!["Price".to_string(), format_currency(entry.price)]);
    println!("{}", table);
}
