use super::*;

const TODOS_PATH: &str = "/todos";
const TODO_ITEM_PREFIX: &str = "/todos/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Route {
    ListTodos,
    GetTodo(TodoId),
    CreateTodo,
    UpdateTodo(TodoId),
    DeleteTodo(TodoId),
    NotFound,
}

/// Exact, case-sensitive match on method and path. No trailing-slash
/// normalization.
pub(super) fn match_route(method: &str, path: &str) -> Route {
    match (method, path) {
        ("GET", TODOS_PATH) => Route::ListTodos,
        ("POST", TODOS_PATH) => Route::CreateTodo,
        _ => match (method, todo_id_from_path(path)) {
            ("GET", Some(id)) => Route::GetTodo(id),
            ("PUT", Some(id)) => Route::UpdateTodo(id),
            ("DELETE", Some(id)) => Route::DeleteTodo(id),
            _ => Route::NotFound,
        },
    }
}

/// `/todos/{id}` where the last segment is decimal digits only. Ids that do
/// not fit a `TodoId` are treated as unroutable.
fn todo_id_from_path(path: &str) -> Option<TodoId> {
    let segment = path.strip_prefix(TODO_ITEM_PREFIX)?;
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse::<TodoId>().ok()
}

pub(super) fn handle_request(runtime: &SharedRuntime, request: &HttpRequest) -> HttpResponse {
    let (path, query) = split_target(&request.target);
    let events = lock_runtime(runtime).events();
    events.record(&format!("{} {}", request.method, path));

    let outcome = match match_route(&request.method, &path) {
        Route::ListTodos => handle_list_todos(runtime, &query),
        Route::GetTodo(id) => handle_get_todo(runtime, id),
        Route::CreateTodo => handle_create_todo(runtime, request),
        Route::UpdateTodo(id) => handle_update_todo(runtime, id, request),
        Route::DeleteTodo(id) => handle_delete_todo(runtime, id),
        Route::NotFound => Err(RequestFailure::route_not_found()),
    };

    match outcome {
        Ok(response) => response,
        Err(failure) => {
            if failure.status >= 500 {
                tracing::error!(
                    method = %request.method,
                    path = %path,
                    cause = %failure.cause,
                    "todos request failed"
                );
            } else {
                tracing::debug!(
                    method = %request.method,
                    path = %path,
                    status = failure.status,
                    cause = %failure.cause,
                    "todos request rejected"
                );
            }
            events.record(&format!(
                "{} {} failed: {} {}",
                request.method, path, failure.status, failure.cause
            ));
            failure.to_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_routes_match_exactly() {
        assert_eq!(match_route("GET", "/todos"), Route::ListTodos);
        assert_eq!(match_route("POST", "/todos"), Route::CreateTodo);
        assert_eq!(match_route("PUT", "/todos"), Route::NotFound);
        assert_eq!(match_route("DELETE", "/todos"), Route::NotFound);
        assert_eq!(match_route("GET", "/todos/"), Route::NotFound);
        assert_eq!(match_route("GET", "/TODOS"), Route::NotFound);
        assert_eq!(match_route("get", "/todos"), Route::NotFound);
    }

    #[test]
    fn item_routes_require_numeric_id() {
        assert_eq!(match_route("GET", "/todos/12"), Route::GetTodo(12));
        assert_eq!(match_route("PUT", "/todos/007"), Route::UpdateTodo(7));
        assert_eq!(match_route("DELETE", "/todos/0"), Route::DeleteTodo(0));
        assert_eq!(match_route("GET", "/todos/abc"), Route::NotFound);
        assert_eq!(match_route("GET", "/todos/-1"), Route::NotFound);
        assert_eq!(match_route("GET", "/todos/1/"), Route::NotFound);
        assert_eq!(match_route("GET", "/todos/1/extra"), Route::NotFound);
        assert_eq!(match_route("POST", "/todos/1"), Route::NotFound);
        assert_eq!(match_route("PATCH", "/todos/1"), Route::NotFound);
    }

    #[test]
    fn oversized_ids_do_not_route() {
        assert_eq!(
            match_route("GET", "/todos/99999999999999999999999"),
            Route::NotFound
        );
    }
}
