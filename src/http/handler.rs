//! POST handler: log the body, answer `200 OK`.

use std::borrow::Cow;

use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};

use crate::http::request::{request_id, IncomingRequest};
use crate::http::response::{self, RequestError};
use crate::http::server::AppState;
use crate::net::{Connection, ConnectionState};

/// Read the declared body, hand its text to the sink and acknowledge.
pub async fn log_body(State(state): State<AppState>, request: Request) -> Response {
    let connection = request.extensions().get::<Connection>().cloned();
    let request_id = request_id(request.headers()).to_string();
    advance(connection.as_ref(), ConnectionState::ReadHeaders);

    let result = record(&state, request, connection.as_ref()).await;
    advance(connection.as_ref(), ConnectionState::WriteResponse);

    match result {
        Ok(bytes) => {
            tracing::info!(request_id = %request_id, bytes, "POST body logged");
            response::ok()
        }
        Err(e) => {
            match &e {
                RequestError::Sink(_) => {
                    tracing::error!(request_id = %request_id, error = %e, "Failed to record POST body")
                }
                _ => tracing::warn!(request_id = %request_id, error = %e, "Rejected POST"),
            }
            e.into_response()
        }
    }
}

async fn record(
    state: &AppState,
    request: Request,
    connection: Option<&Connection>,
) -> Result<usize, RequestError> {
    advance(connection, ConnectionState::ReadBody);
    let incoming = IncomingRequest::read(request, state.max_body_bytes).await?;

    let text = incoming.body_text();
    if let Cow::Owned(_) = text {
        tracing::warn!(
            bytes = incoming.body.len(),
            "POST body is not valid UTF-8, logging with replacement characters"
        );
    }

    state.sink.record(&text).map_err(RequestError::Sink)?;
    Ok(incoming.body.len())
}

pub(crate) fn advance(connection: Option<&Connection>, next: ConnectionState) {
    if let Some(connection) = connection {
        connection.advance(next);
    }
}
