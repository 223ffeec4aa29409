use actix_web::{get, post, web, HttpResponse};
use secrecy::ExposeSecret;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::domain::InboundEvent,
    models::dto::webhook::{MessagingEvent, VerifyQuery, WebhookPayload},
};

/// Subscription verification handshake. The platform expects the raw
/// challenge echoed back on success and a 403 otherwise.
#[get("/webhook")]
async fn verify_webhook(
    state: web::Data<AppState>,
    query: web::Query<VerifyQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();

    let mode_ok = query.mode.as_deref() == Some("subscribe");
    let token_ok =
        query.verify_token.as_deref() == Some(state.config.verify_token.expose_secret());

    if mode_ok && token_ok {
        log::info!("webhook verified");
        return Ok(HttpResponse::Ok()
            .content_type("text/plain")
            .body(query.challenge.unwrap_or_default()));
    }

    Err(AppError::VerificationFailed)
}

/// Event delivery. The platform retries on non-200, so processing failures
/// for individual events are logged and acknowledged rather than surfaced.
#[post("/webhook")]
async fn receive_webhook(
    state: web::Data<AppState>,
    payload: web::Json<WebhookPayload>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();

    if payload.object.as_deref() != Some("page") {
        return Ok(HttpResponse::NotFound().body("Not Found"));
    }

    for entry in payload.entry {
        for event in entry.messaging {
            let sender_id = event.sender.id.clone();
            if sender_id.is_empty() {
                continue;
            }
            let Some(inbound) = to_inbound_event(event) else {
                continue;
            };

            let contents = state.engine.handle_event(&sender_id, inbound).await;
            for content in &contents {
                if let Err(err) = state.sender.deliver(&sender_id, content).await {
                    log::error!("delivery to {} failed: {}", sender_id, err);
                }
            }
        }
    }

    Ok(HttpResponse::Ok().body("EVENT_RECEIVED"))
}

/// Maps one raw messaging event to the engine's inbound type. Events the
/// bot does not react to (read receipts, echoes, empty messages) map to
/// `None` and are skipped.
fn to_inbound_event(event: MessagingEvent) -> Option<InboundEvent> {
    if let Some(postback) = event.postback {
        return postback.payload.map(InboundEvent::Postback);
    }

    let message = event.message?;

    if let Some(attachments) = message.attachments {
        if let Some(attachment) = attachments.into_iter().find(|a| a.payload.url.is_some()) {
            return Some(InboundEvent::Attachment {
                url: attachment.payload.url.unwrap_or_default(),
                // Attachment kinds are categories like "file", not MIME
                // types; only pass through ones the extractor can use.
                content_type: Some(attachment.kind).filter(|k| k.contains('/')),
            });
        }
    }

    message.text.map(InboundEvent::Text)
}
