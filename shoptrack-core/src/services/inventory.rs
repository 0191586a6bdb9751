//! Inventory service - products, stock and transaction history
//!
//! Holds the in-memory snapshot of both collections and pushes it to the
//! view. Every mutation goes to the server first and is followed by a reload;
//! nothing is patched locally. State is only locked for short reads and
//! writes, never across a request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use rust_decimal::Decimal;
use tracing::{debug, error, info};

use crate::domain::result::{Error, Result};
use crate::domain::{
    parse_quantity, validate_quantity, HistoryEntry, HistoryFilter, HistoryInput, Product,
    ProductInput, StockOperation,
};
use crate::ports::{Notice, Section, View};
use crate::services::sequence::{Applied, RequestSequence};
use crate::services::ApiClient;

const PRODUCTS_LOAD_FAILED: &str = "Failed to load products";
const HISTORY_LOAD_FAILED: &str = "Failed to load transaction history";
const HISTORY_FILTER_FAILED: &str = "Failed to filter history";

#[derive(Debug, Default)]
struct AppState {
    products: Vec<Product>,
    history: Vec<HistoryEntry>,
    section: Section,
    editing: Option<Product>,
    history_filter: HistoryFilter,
    search: String,
    products_applied: Applied,
    history_applied: Applied,
}

impl AppState {
    fn visible_products(&self) -> Vec<Product> {
        let query = self.search.trim();
        if query.is_empty() {
            return self.products.clone();
        }
        self.products
            .iter()
            .filter(|p| p.matches(query))
            .cloned()
            .collect()
    }
}

/// Where a product save goes
#[derive(Debug, Clone, Copy)]
enum SaveTarget {
    /// Whatever the form is editing, or a new product
    Form,
    New,
    Existing(i64),
}

/// Releases the submit guard when dropped
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct InventoryApp {
    api: Arc<ApiClient>,
    view: Arc<dyn View>,
    state: Mutex<AppState>,
    product_requests: RequestSequence,
    history_requests: RequestSequence,
    submitting: AtomicBool,
}

impl InventoryApp {
    pub fn new(api: Arc<ApiClient>, view: Arc<dyn View>) -> Self {
        Self {
            api,
            view,
            state: Mutex::new(AppState::default()),
            product_requests: RequestSequence::new(),
            history_requests: RequestSequence::new(),
            submitting: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn notify_failure(&self, error: &Error, fallback: &str) {
        let message = error.to_string();
        let message = if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        };
        self.view.notify(Notice::error(message));
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Initial load after authentication: products section, both collections
    pub fn enter_main_app(&self) {
        self.state().section = Section::Products;
        self.view.show_section(Section::Products);
        // Failures are already reported to the view
        let _ = self.load_products();
        let _ = self.load_history();
    }

    pub fn switch_section(&self, section: Section) -> Result<()> {
        self.state().section = section;
        self.view.show_section(section);
        match section {
            Section::Products => self.load_products(),
            Section::History => self.load_history(),
        }
    }

    /// Reload whichever section is showing
    pub fn refresh(&self) -> Result<()> {
        let section = self.state().section;
        match section {
            Section::Products => self.load_products(),
            Section::History => self.load_history(),
        }
    }

    /// Forget everything loaded for the previous user
    pub fn reset(&self) {
        let mut state = self.state();
        // Loads still in flight hold older tickets and will be discarded
        state.products_applied.accept(self.product_requests.issue());
        state.history_applied.accept(self.history_requests.issue());
        state.products.clear();
        state.history.clear();
        state.section = Section::Products;
        state.editing = None;
        state.history_filter = HistoryFilter::All;
        state.search.clear();
    }

    pub fn current_section(&self) -> Section {
        self.state().section
    }

    pub fn products(&self) -> Vec<Product> {
        self.state().products.clone()
    }

    /// Products matching the current search text
    pub fn visible_products(&self) -> Vec<Product> {
        self.state().visible_products()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.state().history.clone()
    }

    pub fn history_filter(&self) -> HistoryFilter {
        self.state().history_filter
    }

    pub fn editing_product(&self) -> Option<Product> {
        self.state().editing.clone()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Fetch the full product list and replace the snapshot.
    ///
    /// On failure the previous snapshot stays in place.
    pub fn load_products(&self) -> Result<()> {
        let ticket = self.product_requests.issue();
        let result = self.api.get_products().map(|e| e.into_data_or_default());

        match result {
            Ok(products) => {
                let visible = {
                    let mut state = self.state();
                    if !state.products_applied.accept(ticket) {
                        debug!(?ticket, "Discarding stale products response");
                        return Ok(());
                    }
                    state.products = products;
                    state.visible_products()
                };
                debug!(count = visible.len(), "Products loaded");
                self.view.render_products(&visible);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to load products");
                if self.product_requests.is_latest(ticket) {
                    self.view.notify(Notice::error(PRODUCTS_LOAD_FAILED));
                }
                Err(e)
            }
        }
    }

    /// Fetch history under the active filter and replace the snapshot
    pub fn load_history(&self) -> Result<()> {
        let ticket = self.history_requests.issue();
        let filter = self.state().history_filter;
        let result = match filter {
            HistoryFilter::All => self.api.get_history(),
            HistoryFilter::Action(action) => self.api.get_transactions_by_action(action),
            HistoryFilter::Product(id) => self.api.get_transactions_by_product(id),
        }
        .map(|e| e.into_data_or_default());

        match result {
            Ok(history) => {
                let mut state = self.state();
                if !state.history_applied.accept(ticket) {
                    debug!(?ticket, "Discarding stale history response");
                    return Ok(());
                }
                state.history = history;
                let history = state.history.clone();
                drop(state);

                debug!(count = history.len(), ?filter, "History loaded");
                self.view.render_history(&history);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to load transaction history");
                if self.history_requests.is_latest(ticket) {
                    let message = match filter {
                        HistoryFilter::All => HISTORY_LOAD_FAILED,
                        _ => HISTORY_FILTER_FAILED,
                    };
                    self.view.notify(Notice::error(message));
                }
                Err(e)
            }
        }
    }

    /// Change the history filter and reload from the server
    pub fn filter_history(&self, filter: HistoryFilter) -> Result<()> {
        self.state().history_filter = filter;
        self.load_history()
    }

    /// Client-side product filter; no request is made
    pub fn set_search(&self, text: &str) {
        let visible = {
            let mut state = self.state();
            state.search = text.to_string();
            state.visible_products()
        };
        self.view.render_products(&visible);
    }

    // =========================================================================
    // Product form
    // =========================================================================

    /// Open an empty form for a new product
    pub fn show_product_form(&self) {
        self.state().editing = None;
        self.view.show_product_form(None);
    }

    pub fn hide_product_form(&self) {
        self.state().editing = None;
        self.view.hide_product_form();
    }

    /// Open the form pre-filled with a product.
    ///
    /// Looks in the loaded snapshot first and falls back to fetching it.
    pub fn edit_product(&self, product_id: i64) -> Result<Product> {
        let cached = self
            .state()
            .products
            .iter()
            .find(|p| p.id == product_id)
            .cloned();

        let product = match cached {
            Some(product) => product,
            None => self.get_product(product_id)?,
        };

        self.state().editing = Some(product.clone());
        self.view.show_product_form(Some(&product));
        Ok(product)
    }

    /// Create a product, or update the one being edited.
    ///
    /// A second submit while one is in flight fails with `Error::Busy`.
    pub fn submit_product(&self, input: &ProductInput) -> Result<()> {
        self.save_product(input, SaveTarget::Form)
    }

    /// Create a product without going through the form state
    pub fn create_product(&self, input: &ProductInput) -> Result<()> {
        self.save_product(input, SaveTarget::New)
    }

    /// Update a product without going through the form state
    pub fn update_product(&self, product: &Product, input: &ProductInput) -> Result<()> {
        self.save_product(input, SaveTarget::Existing(product.id))
    }

    fn save_product(&self, input: &ProductInput, target: SaveTarget) -> Result<()> {
        if self.submitting.load(Ordering::SeqCst) {
            return Err(Error::Busy);
        }

        if let Err(e) = input.validate() {
            self.view.notify(Notice::error(e.to_string()));
            return Err(e);
        }

        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::Busy);
        }
        let _guard = SubmitGuard(&self.submitting);

        // Form state is only read once the guard is held
        let product_id = match target {
            SaveTarget::Form => self.state().editing.as_ref().map(|p| p.id),
            SaveTarget::New => None,
            SaveTarget::Existing(id) => Some(id),
        };
        let result = match product_id {
            Some(id) => self
                .api
                .update_product(id, input)
                .map(|_| "Product updated successfully!"),
            None => self
                .api
                .create_product(input)
                .map(|_| "Product created successfully!"),
        };

        match result {
            Ok(message) => {
                info!(?product_id, name = %input.name, "Product saved");
                self.view.notify(Notice::success(message));
                if let SaveTarget::Form = target {
                    self.hide_product_form();
                }
                let _ = self.load_products();
                Ok(())
            }
            Err(e) => {
                self.notify_failure(&e, "Failed to save product");
                Err(e)
            }
        }
    }

    /// Delete a product; confirmation is the caller's job
    pub fn delete_product(&self, product_id: i64) -> Result<()> {
        match self.api.delete_product(product_id) {
            Ok(_) => {
                info!(product_id, "Product deleted");
                self.view.notify(Notice::success("Product deleted successfully!"));
                let _ = self.load_products();
                Ok(())
            }
            Err(e) => {
                self.notify_failure(&e, "Failed to delete product");
                Err(e)
            }
        }
    }

    pub fn get_product(&self, product_id: i64) -> Result<Product> {
        let result = self.api.get_product(product_id).and_then(|e| e.into_data());
        if let Err(e) = &result {
            self.notify_failure(e, "Failed to load product");
        }
        result
    }

    // =========================================================================
    // Stock and price
    // =========================================================================

    /// Stock change from raw user input
    pub fn manage_stock(&self, product_id: i64, operation: StockOperation, raw_quantity: &str) -> Result<()> {
        match parse_quantity(raw_quantity) {
            Ok(quantity) => self.apply_stock(product_id, operation, quantity),
            Err(e) => {
                self.view.notify(Notice::error(e.to_string()));
                Err(e)
            }
        }
    }

    pub fn add_stock(&self, product_id: i64, quantity: i64) -> Result<()> {
        self.update_stock(product_id, StockOperation::Add, quantity)
    }

    pub fn remove_stock(&self, product_id: i64, quantity: i64) -> Result<()> {
        self.update_stock(product_id, StockOperation::Remove, quantity)
    }

    pub fn set_stock(&self, product_id: i64, quantity: i64) -> Result<()> {
        self.update_stock(product_id, StockOperation::Set, quantity)
    }

    pub fn update_stock(&self, product_id: i64, operation: StockOperation, quantity: i64) -> Result<()> {
        match validate_quantity(quantity) {
            Ok(quantity) => self.apply_stock(product_id, operation, quantity),
            Err(e) => {
                self.view.notify(Notice::error(e.to_string()));
                Err(e)
            }
        }
    }

    fn apply_stock(&self, product_id: i64, operation: StockOperation, quantity: u32) -> Result<()> {
        match self.api.update_stock(product_id, operation, quantity) {
            Ok(_) => {
                info!(product_id, %operation, quantity, "Stock updated");
                self.view.notify(Notice::success(format!(
                    "Stock {} successfully!",
                    operation.past_tense()
                )));
                // Stock changes write history on the server
                let _ = self.load_products();
                let _ = self.load_history();
                Ok(())
            }
            Err(e) => {
                self.notify_failure(&e, &format!("Failed to {} stock", operation));
                Err(e)
            }
        }
    }

    pub fn update_price(&self, product_id: i64, price: Decimal) -> Result<()> {
        if price <= Decimal::ZERO {
            let e = Error::validation("Price must be greater than 0");
            self.view.notify(Notice::error(e.to_string()));
            return Err(e);
        }

        match self.api.update_price(product_id, price) {
            Ok(_) => {
                info!(product_id, %price, "Price updated");
                self.view.notify(Notice::success("Price updated successfully!"));
                let _ = self.load_products();
                let _ = self.load_history();
                Ok(())
            }
            Err(e) => {
                self.notify_failure(&e, "Failed to update price");
                Err(e)
            }
        }
    }

    // =========================================================================
    // Server-side queries (do not touch the snapshot)
    // =========================================================================

    pub fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        let query = query.trim();
        if query.is_empty() {
            let e = Error::validation("Search query is required");
            self.view.notify(Notice::error(e.to_string()));
            return Err(e);
        }

        match self.api.search_products(query).map(|e| e.into_data_or_default()) {
            Ok(products) => {
                self.view.render_products(&products);
                Ok(products)
            }
            Err(e) => {
                self.notify_failure(&e, "Failed to search products");
                Err(e)
            }
        }
    }

    pub fn low_stock_products(&self, threshold: i64) -> Result<Vec<Product>> {
        match self
            .api
            .get_low_stock_products(threshold)
            .map(|e| e.into_data_or_default())
        {
            Ok(products) => {
                self.view.render_products(&products);
                Ok(products)
            }
            Err(e) => {
                self.notify_failure(&e, "Failed to load low stock products");
                Err(e)
            }
        }
    }

    // =========================================================================
    // History records
    // =========================================================================

    pub fn get_transaction(&self, history_id: i64) -> Result<HistoryEntry> {
        let result = self
            .api
            .get_history_entry(history_id)
            .and_then(|e| e.into_data());
        if let Err(e) = &result {
            self.notify_failure(e, "Failed to load transaction");
        }
        result
    }

    pub fn create_transaction(&self, input: &HistoryInput) -> Result<()> {
        self.mutate_history(input, None)
    }

    pub fn update_transaction(&self, history_id: i64, input: &HistoryInput) -> Result<()> {
        self.mutate_history(input, Some(history_id))
    }

    fn mutate_history(&self, input: &HistoryInput, history_id: Option<i64>) -> Result<()> {
        if let Err(e) = input.validate() {
            self.view.notify(Notice::error(e.to_string()));
            return Err(e);
        }

        let result = match history_id {
            Some(id) => self
                .api
                .update_transaction(id, input)
                .map(|_| "Transaction updated successfully!"),
            None => self
                .api
                .create_transaction(input)
                .map(|_| "Transaction recorded successfully!"),
        };

        match result {
            Ok(message) => {
                info!(history_id = ?history_id, action = %input.action, "Transaction saved");
                self.view.notify(Notice::success(message));
                let _ = self.load_history();
                Ok(())
            }
            Err(e) => {
                self.notify_failure(&e, "Failed to save transaction");
                Err(e)
            }
        }
    }

    pub fn delete_transaction(&self, history_id: i64) -> Result<()> {
        match self.api.delete_transaction(history_id) {
            Ok(_) => {
                info!(history_id, "Transaction deleted");
                self.view.notify(Notice::success("Transaction deleted successfully!"));
                let _ = self.load_history();
                Ok(())
            }
            Err(e) => {
                self.notify_failure(&e, "Failed to delete transaction");
                Err(e)
            }
        }
    }
}
