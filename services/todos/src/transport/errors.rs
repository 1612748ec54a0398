use std::fmt::Display;

use schema::ValidationError;
use store::StoreError;

use super::HttpResponse;
use crate::TodoError;

pub(crate) const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub(super) const INVALID_JSON_MESSAGE: &str = "Invalid JSON";
pub(super) const ROUTE_NOT_FOUND_MESSAGE: &str = "Route not found";
pub(super) const TITLE_REQUIRED_MESSAGE: &str = "Title is required";
pub(super) const TODO_NOT_FOUND_MESSAGE: &str = "Todo not found";

/// A request that ends in an error response. `message` goes to the client,
/// `cause` only to the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RequestFailure {
    pub(super) status: u16,
    pub(super) message: &'static str,
    pub(super) cause: String,
}

impl RequestFailure {
    pub(super) fn invalid_json(cause: impl Display) -> Self {
        Self {
            status: 400,
            message: INVALID_JSON_MESSAGE,
            cause: format!("invalid JSON body: {cause}"),
        }
    }

    pub(super) fn route_not_found() -> Self {
        Self {
            status: 404,
            message: ROUTE_NOT_FOUND_MESSAGE,
            cause: "no route matched".to_string(),
        }
    }

    pub(super) fn to_response(&self) -> HttpResponse {
        HttpResponse::error_with_status(self.status, self.message)
    }
}

impl From<ValidationError> for RequestFailure {
    fn from(value: ValidationError) -> Self {
        Self {
            status: 400,
            message: TITLE_REQUIRED_MESSAGE,
            cause: value.to_string(),
        }
    }
}

impl From<StoreError> for RequestFailure {
    fn from(value: StoreError) -> Self {
        Self {
            status: 500,
            message: INTERNAL_ERROR_MESSAGE,
            cause: format!("persistence failure: {value}"),
        }
    }
}

impl From<TodoError> for RequestFailure {
    fn from(value: TodoError) -> Self {
        match value {
            TodoError::Validation(err) => err.into(),
            TodoError::NotFound(id) => Self {
                status: 404,
                message: TODO_NOT_FOUND_MESSAGE,
                cause: format!("todo {id} not found"),
            },
            TodoError::IdsExhausted => Self {
                status: 500,
                message: INTERNAL_ERROR_MESSAGE,
                cause: TodoError::IdsExhausted.to_string(),
            },
            TodoError::Store(err) => err.into(),
        }
    }
}
