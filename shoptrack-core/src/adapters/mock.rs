//! Scripted transport and recording view for unit tests
//!
//! `ScriptedTransport` answers requests from per-route response queues
//! (method plus path relative to the base URL, query string included).
//! The last queued response for a route is sticky. Routes can also be
//! held so a test controls exactly when a response is delivered.

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::domain::{HistoryEntry, Product, User};
use crate::ports::{HttpRequest, HttpResponse, Method, Notice, Section, Transport, View};

const HOLD_TIMEOUT: Duration = Duration::from_secs(5);

pub fn json_response(status: u16, body: JsonValue) -> HttpResponse {
    HttpResponse::new(status, body.to_string())
}

/// `{"success": true, "data": <data>}`
pub fn ok_response(data: JsonValue) -> HttpResponse {
    json_response(200, serde_json::json!({ "success": true, "data": data }))
}

#[derive(Clone)]
enum Outcome {
    Respond(HttpResponse),
    Fail(String),
}

struct Route {
    method: Option<Method>,
    path: Option<String>,
    outcomes: VecDeque<Outcome>,
}

impl Route {
    fn matches(&self, method: Method, path: &str) -> bool {
        self.method.map_or(true, |m| m == method) && self.path.as_deref().map_or(true, |p| p == path)
    }

    fn next(&mut self) -> Option<Outcome> {
        if self.outcomes.len() > 1 {
            self.outcomes.pop_front()
        } else {
            self.outcomes.front().cloned()
        }
    }
}

struct Hold {
    method: Method,
    path: String,
    arrived: Sender<()>,
    release: Receiver<()>,
}

/// Handle for a held request
pub struct HeldRequest {
    arrived: Receiver<()>,
    release: Sender<()>,
}

impl HeldRequest {
    /// Block until the held request reaches the transport
    pub fn wait_arrived(&self) {
        self.arrived
            .recv_timeout(HOLD_TIMEOUT)
            .expect("held request never arrived");
    }

    /// Let the held request return its response
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

pub struct ScriptedTransport {
    base_url: String,
    routes: Mutex<Vec<Route>>,
    holds: Mutex<Vec<Hold>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(base_url: &str) -> Arc<Self> {
        Arc::new(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            routes: Mutex::new(Vec::new()),
            holds: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn push(&self, method: Option<Method>, path: Option<&str>, outcome: Outcome) {
        let mut routes = self.routes.lock().unwrap();
        let existing = routes
            .iter_mut()
            .find(|r| r.method == method && r.path.as_deref() == path);
        match existing {
            Some(route) => route.outcomes.push_back(outcome),
            None => routes.push(Route {
                method,
                path: path.map(str::to_string),
                outcomes: VecDeque::from(vec![outcome]),
            }),
        }
    }

    /// Queue a response for one route
    pub fn respond(&self, method: Method, path: &str, response: HttpResponse) {
        self.push(Some(method), Some(path), Outcome::Respond(response));
    }

    /// Queue a transport failure for one route
    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.push(Some(method), Some(path), Outcome::Fail(message.to_string()));
    }

    /// Fallback response for any route without its own script
    pub fn respond_any(&self, response: HttpResponse) {
        self.push(None, None, Outcome::Respond(response));
    }

    /// Hold the next request to a route until the handle is released
    pub fn hold(&self, method: Method, path: &str) -> HeldRequest {
        let (arrived_tx, arrived_rx) = channel();
        let (release_tx, release_rx) = channel();
        self.holds.lock().unwrap().push(Hold {
            method,
            path: path.to_string(),
            arrived: arrived_tx,
            release: release_rx,
        });
        HeldRequest {
            arrived: arrived_rx,
            release: release_tx,
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `"METHOD /path"` for every request sent so far
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, self.path_of(&r.url)))
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn path_of<'a>(&self, url: &'a str) -> &'a str {
        url.strip_prefix(self.base_url.as_str()).unwrap_or(url)
    }

    fn outcome_for(&self, method: Method, path: &str) -> Option<Outcome> {
        let mut routes = self.routes.lock().unwrap();
        if let Some(route) = routes
            .iter_mut()
            .find(|r| r.path.is_some() && r.matches(method, path))
        {
            return route.next();
        }
        routes
            .iter_mut()
            .find(|r| r.path.is_none() && r.matches(method, path))
            .and_then(Route::next)
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let path = self.path_of(&request.url).to_string();

        // Pick the outcome on arrival so held requests keep their place
        let outcome = self.outcome_for(request.method, &path);

        let hold = {
            let mut holds = self.holds.lock().unwrap();
            holds
                .iter()
                .position(|h| h.method == request.method && h.path == path)
                .map(|i| holds.remove(i))
        };
        if let Some(hold) = hold {
            let _ = hold.arrived.send(());
            let _ = hold.release.recv_timeout(HOLD_TIMEOUT);
        }

        match outcome {
            Some(Outcome::Respond(response)) => Ok(response),
            Some(Outcome::Fail(message)) => Err(Error::Transport(message)),
            None => Ok(json_response(
                404,
                serde_json::json!({ "success": false, "message": format!("No route for {} {}", request.method, path) }),
            )),
        }
    }
}

/// Everything a service pushed into the view
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Products(Vec<Product>),
    History(Vec<HistoryEntry>),
    Notice(Notice),
    AuthSection,
    MainApp(Option<User>),
    Section(Section),
    FormShown(Option<i64>),
    FormHidden,
}

#[derive(Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Notice(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn last_notice(&self) -> Option<Notice> {
        self.notices().pop()
    }

    pub fn last_products(&self) -> Option<Vec<Product>> {
        self.events().into_iter().rev().find_map(|e| match e {
            ViewEvent::Products(p) => Some(p),
            _ => None,
        })
    }

    pub fn last_history(&self) -> Option<Vec<HistoryEntry>> {
        self.events().into_iter().rev().find_map(|e| match e {
            ViewEvent::History(h) => Some(h),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl View for RecordingView {
    fn render_products(&self, products: &[Product]) {
        self.record(ViewEvent::Products(products.to_vec()));
    }

    fn render_history(&self, history: &[HistoryEntry]) {
        self.record(ViewEvent::History(history.to_vec()));
    }

    fn notify(&self, notice: Notice) {
        self.record(ViewEvent::Notice(notice));
    }

    fn show_auth_section(&self) {
        self.record(ViewEvent::AuthSection);
    }

    fn show_main_app(&self, user: Option<&User>) {
        self.record(ViewEvent::MainApp(user.cloned()));
    }

    fn show_section(&self, section: Section) {
        self.record(ViewEvent::Section(section));
    }

    fn show_product_form(&self, product: Option<&Product>) {
        self.record(ViewEvent::FormShown(product.map(|p| p.id)));
    }

    fn hide_product_form(&self) {
        self.record(ViewEvent::FormHidden);
    }
}
