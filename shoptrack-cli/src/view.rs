//! Terminal implementation of the core `View` port

use std::sync::Mutex;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use shoptrack_core::domain::{HistoryEntry, Product, User};
use shoptrack_core::ports::{Notice, NoticeKind, Section, View};

use crate::output;

pub struct TerminalView {
    /// Machine-readable output: success notices are dropped, lists are not drawn
    json: bool,
    /// Draw product/history lists as the services push them (the shell)
    lists: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl TerminalView {
    /// View for one-shot commands; they print their own results
    pub fn new(json: bool) -> Self {
        Self {
            json,
            lists: false,
            spinner: Mutex::new(None),
        }
    }

    /// View for the interactive shell
    pub fn interactive() -> Self {
        Self {
            json: false,
            lists: true,
            spinner: Mutex::new(None),
        }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Run `f` with a spinner on stderr (terminals only)
    pub fn spin<T>(&self, message: &str, f: impl FnOnce() -> T) -> T {
        if self.json || atty::isnt(atty::Stream::Stderr) {
            return f();
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.set_spinner(Some(spinner.clone()));

        let result = f();

        self.set_spinner(None);
        spinner.finish_and_clear();
        result
    }

    fn set_spinner(&self, spinner: Option<ProgressBar>) {
        *self.spinner.lock().unwrap_or_else(|e| e.into_inner()) = spinner;
    }

    /// Print without tearing an active spinner
    fn print(&self, f: impl FnOnce()) {
        let spinner = self
            .spinner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        match spinner {
            Some(spinner) => spinner.suspend(f),
            None => f(),
        }
    }
}

impl View for TerminalView {
    fn render_products(&self, products: &[Product]) {
        if self.lists && !self.json {
            self.print(|| output::print_products(products));
        }
    }

    fn render_history(&self, history: &[HistoryEntry]) {
        if self.lists && !self.json {
            self.print(|| output::print_history(history));
        }
    }

    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Success if self.json => {}
            NoticeKind::Success => self.print(|| output::success(&notice.message)),
            NoticeKind::Error => self.print(|| output::error(&notice.message)),
        }
    }

    fn show_auth_section(&self) {}

    fn show_main_app(&self, user: Option<&User>) {
        if self.lists {
            let name = user.map(User::display_name).unwrap_or("User");
            self.print(|| println!("\n{}\n", format!("Welcome, {}!", name).bold()));
        }
    }

    fn show_section(&self, section: Section) {
        if self.lists {
            let title = match section {
                Section::Products => "Products",
                Section::History => "Transaction History",
            };
            self.print(|| println!("\n{}", title.bold().underline()));
        }
    }

    fn show_product_form(&self, product: Option<&Product>) {
        if self.lists {
            let title = match product {
                Some(p) => format!("Edit product #{} ({})", p.id, p.name),
                None => "Add product".to_string(),
            };
            self.print(|| println!("{}", title.bold()));
        }
    }

    fn hide_product_form(&self) {}
}
