use serde::de::DeserializeOwned;

use schema::{TodoPatch, validate_create};

use super::*;
use crate::api::{CreateTodoRequest, UpdateTodoRequest};

type RouteResult = Result<HttpResponse, RequestFailure>;

pub(super) fn handle_list_todos(
    runtime: &SharedRuntime,
    query: &HashMap<String, String>,
) -> RouteResult {
    let completed = completed_filter(query);
    let todos = lock_runtime(runtime).list(completed)?;
    Ok(HttpResponse::ok_json(&todos))
}

pub(super) fn handle_get_todo(runtime: &SharedRuntime, id: TodoId) -> RouteResult {
    let todo = lock_runtime(runtime).get(id)?;
    Ok(HttpResponse::ok_json(&todo))
}

pub(super) fn handle_create_todo(runtime: &SharedRuntime, request: &HttpRequest) -> RouteResult {
    let payload: CreateTodoRequest = parse_json_body(&request.body)?;
    let input = validate_create(payload.title, payload.completed)?;
    let todo = lock_runtime(runtime).create(input)?;
    Ok(HttpResponse::created_json(&todo))
}

/// The body is decoded before the store is consulted, so a malformed body is a
/// 400 even when the id does not exist.
pub(super) fn handle_update_todo(
    runtime: &SharedRuntime,
    id: TodoId,
    request: &HttpRequest,
) -> RouteResult {
    let payload: UpdateTodoRequest = parse_json_body(&request.body)?;
    let todo = lock_runtime(runtime).update(id, TodoPatch::from(payload))?;
    Ok(HttpResponse::ok_json(&todo))
}

pub(super) fn handle_delete_todo(runtime: &SharedRuntime, id: TodoId) -> RouteResult {
    let todo = lock_runtime(runtime).delete(id)?;
    Ok(HttpResponse::ok_json(&todo))
}

/// `completed=true` selects finished items, any other non-empty value selects
/// open ones, and an empty or absent value disables the filter.
fn completed_filter(query: &HashMap<String, String>) -> Option<bool> {
    query
        .get("completed")
        .filter(|raw| !raw.is_empty())
        .map(|raw| raw == "true")
}

/// Bodies must be JSON objects. Derived `Deserialize` would also accept a
/// positional array, so the shape is checked before decoding.
fn parse_json_body<T>(body: &[u8]) -> Result<T, RequestFailure>
where
    T: DeserializeOwned,
{
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(RequestFailure::invalid_json)?;
    if !value.is_object() {
        return Err(RequestFailure::invalid_json("body is not a JSON object"));
    }
    serde_json::from_value(value).map_err(RequestFailure::invalid_json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn completed_filter_treats_anything_but_true_as_false() {
        assert_eq!(completed_filter(&query(&[("completed", "true")])), Some(true));
        assert_eq!(completed_filter(&query(&[("completed", "false")])), Some(false));
        assert_eq!(completed_filter(&query(&[("completed", "yes")])), Some(false));
        assert_eq!(completed_filter(&query(&[("completed", "TRUE")])), Some(false));
        assert_eq!(completed_filter(&query(&[("completed", "")])), None);
        assert_eq!(completed_filter(&query(&[])), None);
    }

    #[test]
    fn body_decoding_rejects_non_objects_and_wrong_types() {
        assert!(parse_json_body::<CreateTodoRequest>(b"").is_err());
        assert!(parse_json_body::<CreateTodoRequest>(b"{\"title\":").is_err());
        assert!(parse_json_body::<CreateTodoRequest>(b"null").is_err());
        assert!(parse_json_body::<CreateTodoRequest>(b"\"title\"").is_err());
        assert!(parse_json_body::<CreateTodoRequest>(b"[]").is_err());
        assert!(parse_json_body::<CreateTodoRequest>(br#"["buy milk"]"#).is_err());
        assert!(parse_json_body::<UpdateTodoRequest>(br#"["renamed", true]"#).is_err());
        assert!(parse_json_body::<UpdateTodoRequest>(b"42").is_err());
        assert!(parse_json_body::<UpdateTodoRequest>(b"{\"completed\":\"yes\"}").is_err());
        assert!(parse_json_body::<UpdateTodoRequest>(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn body_decoding_ignores_unknown_fields_and_nulls() {
        let payload: UpdateTodoRequest =
            parse_json_body(br#"{"title":null,"completed":true,"priority":3}"#).unwrap();
        assert_eq!(
            payload,
            UpdateTodoRequest {
                title: None,
                completed: Some(true),
            }
        );
    }
}
