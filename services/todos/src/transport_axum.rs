use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::State,
    http::{Request, Response, StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
    routing::any,
};

use crate::transport::{
    HttpRequest, HttpResponse, INTERNAL_ERROR_MESSAGE, MAX_HTTP_BODY_BYTES, SharedRuntime,
    TodoRuntime, handle_request_guarded, shared,
};

#[derive(Clone)]
struct AppState {
    runtime: SharedRuntime,
}

pub fn serve_http_with_axum(
    todo_runtime: TodoRuntime,
    bind_addr: &str,
    worker_threads: usize,
) -> Result<(), String> {
    let worker_threads = worker_threads.max(1);
    let tokio_runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build tokio runtime: {e}"))?;

    let bind_addr = bind_addr.to_string();
    tokio_runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| format!("failed to bind {bind_addr}: {e}"))?;
        tracing::info!("todos service listening on http://{bind_addr}");

        let state = AppState {
            runtime: shared(todo_runtime),
        };

        axum::serve(listener, app(state))
            .await
            .map_err(|e| format!("axum server failed: {e}"))
    })
}

fn app(state: AppState) -> Router {
    Router::new()
        .fallback(any(dispatch))
        .with_state(state)
        .layer(axum::extract::DefaultBodyLimit::max(MAX_HTTP_BODY_BYTES))
}

/// Routing stays in `transport`; this only converts between axum and the
/// transport request/response types.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> impl IntoResponse {
    let method = request.method().to_string();
    let target = request
        .uri()
        .path_and_query()
        .map(|value| value.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let body = match to_bytes(request.into_body(), MAX_HTTP_BODY_BYTES).await {
        Ok(bytes) => bytes.to_vec(),
        Err(err) => {
            return response_from_transport(HttpResponse::bad_request(&format!(
                "request body error: {err}"
            )));
        }
    };

    let request = HttpRequest {
        method,
        target,
        body,
    };

    let runtime = Arc::clone(&state.runtime);
    let response = match tokio::task::spawn_blocking(move || {
        handle_request_guarded(&runtime, &request)
    })
    .await
    {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(error = %err, "todos request task failed");
            HttpResponse::internal_server_error(INTERNAL_ERROR_MESSAGE)
        }
    };
    response_from_transport(response)
}

fn response_from_transport(response: HttpResponse) -> Response<Body> {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut out = Response::new(Body::from(response.body));
    *out.status_mut() = status;
    out.headers_mut().insert(
        CONTENT_TYPE,
        response
            .content_type
            .parse()
            .unwrap_or(axum::http::HeaderValue::from_static("application/json")),
    );
    out
}
