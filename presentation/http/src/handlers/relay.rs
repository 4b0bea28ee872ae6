//! The relay handler: method gate, validation, delivery

use crate::{handle_relay_error, AppState};
use axum::{
    body::Bytes,
    extract::State,
    http::Method,
    response::{IntoResponse, Response},
};
use promptrelay_core::prelude::*;
use tracing::debug;

/// Entry point for every path. `OPTIONS` never gets here; the CORS layer answers it.
pub async fn relay(State(state): State<AppState>, method: Method, body: Bytes) -> Response {
    match relay_prompt(&state, &method, &body).await {
        Ok(response) => response,
        Err(e) => handle_relay_error(&e).into_response(),
    }
}

async fn relay_prompt(state: &AppState, method: &Method, body: &[u8]) -> Result<Response, RelayError> {
    if *method != Method::POST {
        return Err(RelayError::MethodNotAllowed(method.to_string()));
    }

    let request = PromptRequest::from_json_body(body, state.config.max_prompt_chars)?;
    debug!(
        "Relaying {}-character prompt from `{}` field via {} delivery",
        request.char_len(),
        request.field(),
        state.delivery.mode()
    );

    let api_key = state
        .config
        .api_key
        .as_ref()
        .ok_or(RelayError::MissingCredential)?;

    state
        .delivery
        .deliver(state.generator.as_ref(), api_key, request)
        .await
}
