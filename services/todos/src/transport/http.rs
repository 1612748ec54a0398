use std::{io::Write, net::TcpStream};

use serde::Serialize;

use super::INTERNAL_ERROR_MESSAGE;
use crate::api::ErrorResponse;

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HttpRequest {
    pub(crate) method: String,
    pub(crate) target: String,
    pub(crate) body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HttpResponse {
    pub(crate) status: u16,
    pub(crate) content_type: &'static str,
    pub(crate) body: String,
}

impl HttpResponse {
    pub(crate) fn json<T>(status: u16, payload: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_string(payload) {
            Ok(body) => Self {
                status,
                content_type: JSON_CONTENT_TYPE,
                body,
            },
            Err(err) => {
                tracing::error!(error = %err, "failed to encode response payload");
                Self::internal_server_error(INTERNAL_ERROR_MESSAGE)
            }
        }
    }

    pub(crate) fn ok_json<T>(payload: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        Self::json(200, payload)
    }

    pub(crate) fn created_json<T>(payload: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        Self::json(201, payload)
    }

    pub(crate) fn bad_request(message: &str) -> Self {
        Self::error_with_status(400, message)
    }

    pub(crate) fn internal_server_error(message: &str) -> Self {
        Self::error_with_status(500, message)
    }

    pub(crate) fn error_with_status(status: u16, message: &str) -> Self {
        let body = serde_json::to_string(&ErrorResponse { error: message })
            .unwrap_or_else(|_| format!("{{\"error\":\"{INTERNAL_ERROR_MESSAGE}\"}}"));
        Self {
            status,
            content_type: JSON_CONTENT_TYPE,
            body,
        }
    }
}

pub(crate) fn write_response(
    stream: &mut TcpStream,
    response: HttpResponse,
) -> std::io::Result<()> {
    stream.write_all(render_response_text(&response).as_bytes())?;
    stream.flush()
}

pub(crate) fn render_response_text(response: &HttpResponse) -> String {
    let status_text = match response.status {
        200 => "200 OK",
        201 => "201 Created",
        400 => "400 Bad Request",
        404 => "404 Not Found",
        _ => "500 Internal Server Error",
    };
    let body_len = response.body.len();
    format!(
        "HTTP/1.1 {status_text}\r\nContent-Type: {}\r\nContent-Length: {body_len}\r\nConnection: close\r\n\r\n{}",
        response.content_type, response.body
    )
}
