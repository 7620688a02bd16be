use {
    axum::{
        extract::{Path, State},
        http::{StatusCode, header},
        response::{IntoResponse, Json, Response},
    },
    bytes::Bytes,
    serde::Deserialize,
    serde_json::{Value, json},
    tracing::{debug, info},
    vocalis_channels::{ChannelOutbound, ChannelPlugin},
    vocalis_common::BlockId,
};

use crate::{error::GatewayError, server::AppState};

/// Telegram update envelope. Only `message` is acted upon; edits, channel
/// posts and callback queries are acknowledged and dropped.
#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    #[serde(default)]
    message: Option<Value>,
}

fn decode_json<T: serde::de::DeserializeOwned>(body: &Bytes) -> Result<T, GatewayError> {
    Ok(serde_json::from_slice(body)?)
}

/// Webhook endpoint. Replies are pushed through the Bot API; the HTTP
/// response is always the bare acknowledgment.
pub async fn telegram_respond(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let update: TelegramUpdate = decode_json(&body)?;
    let Some(message) = update.message else {
        debug!(update_id = update.update_id, "ignoring update without message");
        return Ok(ack());
    };

    let gw = &state.gateway;
    let msg = gw.telegram.parse_inbound(message)?;
    if let Some(reply) = gw.dispatcher.respond(&msg).await? {
        gw.telegram.send(std::slice::from_ref(&reply)).await?;
        info!(
            update_id = update.update_id,
            conversation_id = %reply.conversation_id,
            "telegram reply delivered"
        );
    }
    Ok(ack())
}

fn ack() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// Widget endpoint: the reply travels back in the response body, or `{}`.
pub async fn answer(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, GatewayError> {
    let payload: Value = decode_json(&body)?;
    let gw = &state.gateway;
    let msg = gw.widget.parse_inbound(payload)?;
    let reply = gw.dispatcher.respond(&msg).await?;
    Ok(Json(gw.widget.encode_reply(reply.as_ref())?))
}

/// Registration state of every transport.
pub async fn info_handler(State(state): State<AppState>) -> Result<Json<Value>, GatewayError> {
    let gw = &state.gateway;
    Ok(Json(json!({
        "callback_url": gw.callback_url(),
        "telegram": gw.telegram.info().await?,
        "widget": gw.widget.info().await?,
    })))
}

pub async fn init_handler(State(state): State<AppState>) -> Result<Json<Value>, GatewayError> {
    let reports = state.gateway.instance_init().await?;
    Ok(Json(json!({ "reports": reports })))
}

/// Raw block content, served with the block's MIME type.
pub async fn block_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, GatewayError> {
    let id: BlockId = id
        .parse()
        .map_err(|_| GatewayError::BadRequest(format!("invalid block id: {id}")))?;

    let block = match state.gateway.store().get(&id).await {
        Ok(block) => block,
        Err(vocalis_media::Error::NotFound(id)) => {
            return Err(GatewayError::NotFound(format!("block not found: {id}")));
        },
        Err(e) => {
            return Err(GatewayError::Channel(vocalis_channels::Error::external(
                "block store", e,
            )));
        },
    };

    let response = match block.content {
        Some(content) => {
            let mime = block
                .mime_type
                .unwrap_or_else(|| "application/octet-stream".into());
            ([(header::CONTENT_TYPE, mime)], content).into_response()
        },
        None => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string())],
            block.text,
        )
            .into_response(),
    };
    Ok(response)
}

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let gw = &state.gateway;
    Json(json!({
        "status": "ok",
        "version": gw.version,
        "capabilities": gw.dispatcher.capabilities().names(),
    }))
}
