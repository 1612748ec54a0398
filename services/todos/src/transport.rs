use std::{
    collections::HashMap,
    net::{TcpListener, TcpStream},
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, Mutex, MutexGuard, mpsc},
    time::Duration,
};

use schema::{Todo, TodoId};
use store::{InMemoryStore, TodoStore};

use crate::{
    TodoError,
    event_log::{DisabledEventLog, EventLog},
};

mod errors;
mod http;
mod request;
mod routes;
mod server_runtime;
mod todo_routes;

use errors::*;
pub(crate) use errors::INTERNAL_ERROR_MESSAGE;
pub(crate) use http::*;
use request::*;
use routes::*;
use todo_routes::*;

pub use server_runtime::serve_http_with_workers;

/// Everything a request handler needs: the store behind the single mutation
/// gate, and the event log.
pub struct TodoRuntime {
    store: Box<dyn TodoStore + Send>,
    events: Arc<dyn EventLog>,
}

impl TodoRuntime {
    pub fn new<S>(store: S, events: Arc<dyn EventLog>) -> Self
    where
        S: TodoStore + Send + 'static,
    {
        Self {
            store: Box::new(store),
            events,
        }
    }

    pub fn in_memory(store: InMemoryStore) -> Self {
        Self::new(store, Arc::new(DisabledEventLog))
    }

    pub fn events(&self) -> Arc<dyn EventLog> {
        Arc::clone(&self.events)
    }

    pub fn todos(&self) -> Result<Vec<Todo>, TodoError> {
        crate::list_todos(&*self.store, None)
    }

    fn list(&self, completed: Option<bool>) -> Result<Vec<Todo>, TodoError> {
        crate::list_todos(&*self.store, completed)
    }

    fn get(&self, id: TodoId) -> Result<Todo, TodoError> {
        crate::get_todo(&*self.store, id)
    }

    fn create(&mut self, input: schema::CreateTodo) -> Result<Todo, TodoError> {
        crate::create_todo(&mut *self.store, input)
    }

    fn update(&mut self, id: TodoId, patch: schema::TodoPatch) -> Result<Todo, TodoError> {
        crate::update_todo(&mut *self.store, id, patch)
    }

    fn delete(&mut self, id: TodoId) -> Result<Todo, TodoError> {
        crate::delete_todo(&mut *self.store, id)
    }
}

pub type SharedRuntime = Arc<Mutex<TodoRuntime>>;
pub(crate) const MAX_HTTP_BODY_BYTES: usize = 1024 * 1024;
const SOCKET_TIMEOUT_SECS: u64 = 5;
const REJECTED_REQUEST_LABEL: &str = "<request rejected>";

pub fn shared(runtime: TodoRuntime) -> SharedRuntime {
    Arc::new(Mutex::new(runtime))
}

/// The runtime caches no collection state between requests, so a guard left
/// poisoned by a panicking handler is still safe to hand out.
pub(crate) fn lock_runtime(runtime: &SharedRuntime) -> MutexGuard<'_, TodoRuntime> {
    runtime.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("recovering todos runtime lock poisoned by an earlier panic");
        poisoned.into_inner()
    })
}

/// Outermost boundary: every request gets a response, even if a handler panics.
pub(crate) fn handle_request_guarded(runtime: &SharedRuntime, request: &HttpRequest) -> HttpResponse {
    match catch_unwind(AssertUnwindSafe(|| handle_request(runtime, request))) {
        Ok(response) => response,
        Err(_) => {
            tracing::error!(
                method = %request.method,
                target = %request.target,
                "request handler panicked"
            );
            HttpResponse::internal_server_error(INTERNAL_ERROR_MESSAGE)
        }
    }
}

pub fn handle_http_request_bytes(
    runtime: &SharedRuntime,
    raw_request: &[u8],
) -> Result<Vec<u8>, String> {
    let request = match parse_http_request_bytes(raw_request) {
        Ok(request) => request,
        Err(err) => {
            record_rejected_request(runtime, &err);
            return Err(err);
        }
    };
    let response = handle_request_guarded(runtime, &request);
    Ok(render_response_text(&response).into_bytes())
}

fn parse_http_request_bytes(raw_request: &[u8]) -> Result<HttpRequest, String> {
    let request_text =
        std::str::from_utf8(raw_request).map_err(|_| "request must be valid UTF-8".to_string())?;
    let (header_block, body) = request_text
        .split_once("\r\n\r\n")
        .ok_or_else(|| "missing HTTP header terminator".to_string())?;

    let mut lines = header_block.split("\r\n");
    let request_line = lines
        .next()
        .ok_or_else(|| "missing request line".to_string())?;
    let (method, target) = parse_request_line(request_line)?;

    let mut headers = HashMap::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| "invalid HTTP header".to_string())?;
        headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    let content_length = parse_content_length(&headers)?;
    if content_length != body.len() {
        return Err("content-length does not match body size".to_string());
    }

    Ok(HttpRequest {
        method,
        target,
        body: body.as_bytes().to_vec(),
    })
}

/// Requests whose framing cannot be parsed never reach the router, so they
/// are recorded here instead.
fn record_rejected_request(runtime: &SharedRuntime, err: &str) {
    tracing::debug!(error = %err, "todos request rejected before routing");
    let events = lock_runtime(runtime).events();
    events.record(&format!("{REJECTED_REQUEST_LABEL} failed: 400 {err}"));
}

fn handle_connection(runtime: &SharedRuntime, mut stream: TcpStream) -> std::io::Result<()> {
    stream.set_read_timeout(Some(Duration::from_secs(SOCKET_TIMEOUT_SECS)))?;
    stream.set_write_timeout(Some(Duration::from_secs(SOCKET_TIMEOUT_SECS)))?;

    let request = match read_http_request(&mut stream) {
        Ok(Some(request)) => request,
        Ok(None) => return Ok(()),
        Err(err) => {
            record_rejected_request(runtime, &err);
            return write_response(&mut stream, HttpResponse::bad_request(&err));
        }
    };

    let response = handle_request_guarded(runtime, &request);
    write_response(&mut stream, response)
}
