//! Mock ShopTrack backend for integration tests
//!
//! A small in-memory implementation of the REST API on a local port. It
//! speaks just enough HTTP/1.1 for reqwest (one request per connection) and
//! records every request so tests can assert on paths and headers.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};

use shoptrack_core::domain::{HistoryEntry, Product, User};
use shoptrack_core::ports::{Notice, Section, View};

pub const VALID_PASSWORD: &str = "abcdef";

/// One request as the server saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn call(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Knobs for failure scenarios
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// `/auth/logout` answers 500
    pub fail_logout: bool,
    /// Every route answers 502 with an HTML body
    pub bad_gateway: bool,
    /// Delay before responding
    pub delay_ms: u64,
}

#[derive(Debug, Default)]
struct Backend {
    sessions: Vec<(String, i64)>,
    next_session: u32,
    products: Vec<Value>,
    history: Vec<Value>,
    next_product_id: i64,
    next_history_id: i64,
    requests: Vec<Recorded>,
}

impl Backend {
    fn seeded() -> Self {
        Self {
            products: vec![
                json!({"id": 5, "name": "Widget", "price": 9.99, "stock": 4, "description": "Blue widget"}),
                json!({"id": 6, "name": "Gadget", "price": "24.50", "stock": 40, "description": null}),
            ],
            history: vec![json!({
                "id": 1, "product_id": 5, "product_name": "Widget", "action": "buy",
                "quantity": 4, "price": 9.99, "created_at": "2025-01-05T14:30:00"
            })],
            next_product_id: 7,
            next_history_id: 2,
            ..Default::default()
        }
    }

    fn user_for(&self, authorization: Option<&str>) -> Option<i64> {
        let token = authorization?.strip_prefix("Bearer ")?;
        self.sessions
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, user)| *user)
    }

    fn record_history(&mut self, product_id: i64, action: &str, quantity: i64) {
        let product = self.products.iter().find(|p| p["id"] == product_id).cloned();
        let entry = json!({
            "id": self.next_history_id,
            "product_id": product_id,
            "product_name": product.as_ref().map(|p| p["name"].clone()),
            "action": action,
            "quantity": quantity,
            "price": product.as_ref().map(|p| p["price"].clone()).unwrap_or(json!(0)),
            "created_at": "2025-02-01 09:15:00",
        });
        self.next_history_id += 1;
        self.history.push(entry);
    }
}

pub struct MockShopTrackServer {
    port: u16,
    backend: Arc<Mutex<Backend>>,
    running: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockShopTrackServer {
    /// Bind to an ephemeral port and serve seeded inventory data
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let backend = Arc::new(Mutex::new(Backend::seeded()));

        // Non-blocking accept so drop can stop the loop
        listener.set_nonblocking(true)?;

        let running_clone = running.clone();
        let backend_clone = backend.clone();
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let backend = backend_clone.clone();
                        thread::spawn(move || handle_connection(stream, &cfg, &backend));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            backend,
            running,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/api", self.port)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.backend.lock().unwrap().requests.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.requests().iter().map(Recorded::call).collect()
    }

    pub fn clear_requests(&self) {
        self.backend.lock().unwrap().requests.clear();
    }

    /// Register a token the backend accepts
    pub fn add_session(&self, token: &str, user_id: i64) {
        self.backend
            .lock()
            .unwrap()
            .sessions
            .push((token.to_string(), user_id));
    }

    pub fn product_stock(&self, product_id: i64) -> Option<i64> {
        self.backend
            .lock()
            .unwrap()
            .products
            .iter()
            .find(|p| p["id"] == product_id)
            .and_then(|p| p["stock"].as_i64())
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockShopTrackServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read headers, then as much body as Content-Length says
fn read_request(stream: &mut TcpStream) -> Option<(String, String, Option<String>, String)> {
    stream.set_nonblocking(false).ok()?;
    stream.set_read_timeout(Some(Duration::from_secs(5))).ok()?;

    let mut data = Vec::new();
    let mut buffer = [0; 4096];
    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let mut lines = head.lines();
    let mut parts = lines.next()?.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut content_length = 0;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse().unwrap_or(0);
            } else if name.eq_ignore_ascii_case("authorization") {
                authorization = Some(value.to_string());
            }
        }
    }

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }
    let body = String::from_utf8_lossy(&data[header_end..]).to_string();

    Some((method, path, authorization, body))
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, backend: &Mutex<Backend>) {
    let Some((method, path, authorization, body)) = read_request(&mut stream) else {
        return;
    };

    if config.delay_ms > 0 {
        thread::sleep(Duration::from_millis(config.delay_ms));
    }

    let (status, response) = {
        let mut backend = backend.lock().unwrap();
        backend.requests.push(Recorded {
            method: method.clone(),
            path: path.clone(),
            authorization: authorization.clone(),
            body: body.clone(),
        });
        if config.bad_gateway {
            let _ = send_response(&mut stream, 502, "<html><body>Bad Gateway</body></html>");
            return;
        }
        route(&mut backend, config, &method, &path, authorization.as_deref(), &body)
    };

    let _ = send_response(&mut stream, status, &response.to_string());
}

fn ok(data: Value) -> (u16, Value) {
    (200, json!({"success": true, "data": data}))
}

fn fail(status: u16, message: &str) -> (u16, Value) {
    (status, json!({"success": false, "message": message}))
}

fn route(
    backend: &mut Backend,
    config: &MockConfig,
    method: &str,
    path: &str,
    authorization: Option<&str>,
    body: &str,
) -> (u16, Value) {
    let Some(path) = path.strip_prefix("/api") else {
        return fail(404, "Not found");
    };
    let (path, query) = path.split_once('?').unwrap_or((path, ""));
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let payload: Value = serde_json::from_str(body).unwrap_or(Value::Null);

    // Authentication routes
    match (method, segments.as_slice()) {
        ("POST", ["auth", "login"]) => {
            return if payload["password"] == VALID_PASSWORD {
                backend.sessions.push(("tok1".to_string(), 7));
                ok(json!({"session_id": "tok1", "user_id": 7}))
            } else {
                fail(401, "Invalid credentials")
            };
        }
        ("POST", ["auth", "register"]) => {
            backend.next_session += 1;
            let token = format!("reg-{}", backend.next_session);
            backend.sessions.push((token.clone(), 100));
            return ok(json!({"session_id": token, "user_id": 100}));
        }
        ("POST", ["auth", "logout"]) => {
            if config.fail_logout {
                return fail(500, "Logout failed");
            }
            if let Some(token) = authorization.and_then(|a| a.strip_prefix("Bearer ")) {
                backend.sessions.retain(|(t, _)| t != token);
            }
            return ok(Value::Null);
        }
        ("GET", ["auth", "validate"]) => {
            return match backend.user_for(authorization) {
                Some(user) => ok(json!({"user": {"id": user, "username": "alice", "email": "alice@example.com"}})),
                None => (401, json!({"detail": "Invalid or expired session"})),
            };
        }
        _ => {}
    }

    if backend.user_for(authorization).is_none() {
        return (401, json!({"detail": "Not authenticated"}));
    }

    match (method, segments.as_slice()) {
        ("GET", ["products"]) => ok(Value::Array(backend.products.clone())),
        ("POST", ["products"]) => {
            let mut product = payload.clone();
            product["id"] = json!(backend.next_product_id);
            backend.next_product_id += 1;
            backend.products.push(product.clone());
            ok(product)
        }
        ("GET", ["products", "low-stock"]) => {
            let threshold: i64 = query
                .strip_prefix("threshold=")
                .and_then(|t| t.parse().ok())
                .unwrap_or(10);
            let low: Vec<Value> = backend
                .products
                .iter()
                .filter(|p| p["stock"].as_i64().unwrap_or(0) <= threshold)
                .cloned()
                .collect();
            ok(Value::Array(low))
        }
        ("GET", ["products", "search", query]) => {
            let query = query.replace("%20", " ").to_lowercase();
            let found: Vec<Value> = backend
                .products
                .iter()
                .filter(|p| {
                    p["name"]
                        .as_str()
                        .map_or(false, |n| n.to_lowercase().contains(&query))
                })
                .cloned()
                .collect();
            ok(Value::Array(found))
        }
        ("GET", ["products", id]) => match find(&backend.products, id) {
            Some(i) => ok(backend.products[i].clone()),
            None => fail(404, "Product not found"),
        },
        ("PUT", ["products", id]) => match find(&backend.products, id) {
            Some(i) => {
                let id = backend.products[i]["id"].clone();
                let mut product = payload.clone();
                product["id"] = id;
                backend.products[i] = product.clone();
                ok(product)
            }
            None => fail(404, "Product not found"),
        },
        ("DELETE", ["products", id]) => match find(&backend.products, id) {
            Some(i) => {
                backend.products.remove(i);
                ok(Value::Null)
            }
            None => fail(404, "Product not found"),
        },
        ("POST", ["products", id, "stock", op, qty]) => {
            let Some(i) = find(&backend.products, id) else {
                return fail(404, "Product not found");
            };
            let qty: i64 = qty.parse().unwrap_or(0);
            let stock = backend.products[i]["stock"].as_i64().unwrap_or(0);
            let new_stock = match *op {
                "add" => stock + qty,
                "remove" if qty > stock => return fail(400, "Insufficient stock"),
                "remove" => stock - qty,
                "set" => qty,
                _ => return fail(400, "Unknown stock operation"),
            };
            backend.products[i]["stock"] = json!(new_stock);
            let product_id = backend.products[i]["id"].as_i64().unwrap_or(0);
            match *op {
                "add" => backend.record_history(product_id, "buy", qty),
                "remove" => backend.record_history(product_id, "sell", qty),
                _ => {}
            }
            ok(backend.products[i].clone())
        }
        ("PUT", ["products", id, "price", price]) => match find(&backend.products, id) {
            Some(i) => {
                backend.products[i]["price"] = json!(price.parse::<f64>().unwrap_or(0.0));
                ok(backend.products[i].clone())
            }
            None => fail(404, "Product not found"),
        },
        ("GET", ["history"]) => ok(Value::Array(backend.history.clone())),
        ("POST", ["history"]) => {
            let mut entry = payload.clone();
            entry["id"] = json!(backend.next_history_id);
            entry["created_at"] = json!("2025-03-01T10:00:00Z");
            backend.next_history_id += 1;
            backend.history.push(entry.clone());
            ok(entry)
        }
        ("GET", ["history", "action", action]) => {
            let entries: Vec<Value> = backend
                .history
                .iter()
                .filter(|h| h["action"] == *action)
                .cloned()
                .collect();
            ok(Value::Array(entries))
        }
        ("GET", ["history", "product", id]) => {
            let id: i64 = id.parse().unwrap_or(-1);
            let entries: Vec<Value> = backend
                .history
                .iter()
                .filter(|h| h["product_id"] == id)
                .cloned()
                .collect();
            ok(Value::Array(entries))
        }
        ("GET", ["history", id]) => match find(&backend.history, id) {
            Some(i) => ok(backend.history[i].clone()),
            None => fail(404, "Transaction not found"),
        },
        ("PUT", ["history", id]) => match find(&backend.history, id) {
            Some(i) => {
                for key in ["product_id", "action", "quantity", "price"] {
                    backend.history[i][key] = payload[key].clone();
                }
                ok(backend.history[i].clone())
            }
            None => fail(404, "Transaction not found"),
        },
        ("DELETE", ["history", id]) => match find(&backend.history, id) {
            Some(i) => {
                backend.history.remove(i);
                ok(Value::Null)
            }
            None => fail(404, "Transaction not found"),
        },
        _ => fail(404, "Endpoint not found"),
    }
}

fn find(items: &[Value], id: &str) -> Option<usize> {
    let id: i64 = id.parse().ok()?;
    items.iter().position(|item| item["id"] == id)
}

fn send_response(stream: &mut TcpStream, status: u16, body: &str) -> std::io::Result<()> {
    let status_text = match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        _ => "Unknown",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes())?;
    stream.flush()
}

/// View that keeps what it was given
#[derive(Default)]
pub struct CollectingView {
    pub products: Mutex<Vec<Product>>,
    pub history: Mutex<Vec<HistoryEntry>>,
    pub notices: Mutex<Vec<Notice>>,
    pub main_app_user: Mutex<Option<User>>,
    pub auth_shown: Mutex<usize>,
}

impl CollectingView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn last_notice(&self) -> Option<Notice> {
        self.notices.lock().unwrap().last().cloned()
    }
}

impl View for CollectingView {
    fn render_products(&self, products: &[Product]) {
        *self.products.lock().unwrap() = products.to_vec();
    }

    fn render_history(&self, history: &[HistoryEntry]) {
        *self.history.lock().unwrap() = history.to_vec();
    }

    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }

    fn show_auth_section(&self) {
        *self.auth_shown.lock().unwrap() += 1;
    }

    fn show_main_app(&self, user: Option<&User>) {
        *self.main_app_user.lock().unwrap() = user.cloned();
    }

    fn show_section(&self, _section: Section) {}

    fn show_product_form(&self, _product: Option<&Product>) {}

    fn hide_product_form(&self) {}
}
