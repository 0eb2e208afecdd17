use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;

use billet_db::{Message, Response, StoreError, ids};
use billet_types::api::{Claims, ComposeRequest, ComposeResponse, MessageView, OptionView};

use crate::auth::AppState;
use crate::{Reject, internal, reject};

/// Record a message from the authenticated sender and hand back the
/// selection links to embed in the outbound mail.
pub async fn compose(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ComposeRequest>,
) -> Result<impl IntoResponse, Reject> {
    if !req.to.contains('@') {
        return Err(reject(StatusCode::BAD_REQUEST, "invalid recipient address"));
    }
    if req.subject.is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "subject must not be empty"));
    }

    let message = Message {
        from: claims.sub.clone(),
        to: req.to,
        subject: req.subject,
        body: req.body,
        options: req.options,
    };
    let option_count = message.options.len() as u32;

    let db = state.clone();
    let sender = claims.sub.clone();
    let result = tokio::task::spawn_blocking(move || db.store.record_message(&sender, &message))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            internal()
        })?;

    let id = match result {
        Ok(id) => id,
        // The login callback runs ensure_user, so a missing sender record
        // is a caller bug, surfaced as a hard failure.
        Err(StoreError::UserNotFound(email)) => {
            return Err(reject(
                StatusCode::CONFLICT,
                &format!("no such user: {}", email),
            ));
        }
        Err(e) => {
            error!("record_message failed: {}", e);
            return Err(internal());
        }
    };

    let links = (0..option_count)
        .map(|option| format!("{}/respond/{}", state.base_url, ids::response_id(&id, 0, option)))
        .collect();

    Ok((StatusCode::CREATED, Json(ComposeResponse { id, links })))
}

/// All messages sent by the authenticated user, with per-option selection
/// state.
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, Reject> {
    let db = state.clone();
    let email = claims.sub.clone();

    let rows = tokio::task::spawn_blocking(move || {
        let mut rows = Vec::new();
        for (id, message) in db.store.user_messages(&email)? {
            let slots = db.store.message_responses(&id)?;
            rows.push((id, message, slots));
        }
        Ok::<_, StoreError>(rows)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        internal()
    })?
    .map_err(|e| {
        error!("listing messages failed: {}", e);
        internal()
    })?;

    let views: Vec<MessageView> = rows
        .into_iter()
        .map(|(id, message, slots)| view(id, message, slots))
        .collect();

    Ok(Json(views))
}

/// One message with selection state; only its sender may see it.
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, Reject> {
    let db = state.clone();
    let message_id = id.clone();

    let found = tokio::task::spawn_blocking(move || {
        match db.store.message(&message_id)? {
            Some(message) => {
                let slots = db.store.message_responses(&message_id)?;
                Ok::<_, StoreError>(Some((message, slots)))
            }
            None => Ok(None),
        }
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        internal()
    })?
    .map_err(|e| {
        error!("fetching message failed: {}", e);
        internal()
    })?;

    let Some((message, slots)) = found else {
        return Err(reject(StatusCode::NOT_FOUND, "no such message"));
    };
    if message.from != claims.sub {
        return Err(reject(StatusCode::FORBIDDEN, "not your message"));
    }

    Ok(Json(view(id, message, slots)))
}

fn view(id: String, message: Message, slots: Vec<Response>) -> MessageView {
    MessageView {
        id,
        from: message.from,
        to: message.to,
        subject: message.subject,
        body: message.body,
        options: message
            .options
            .into_iter()
            .zip(slots)
            .map(|(label, slot)| OptionView {
                label,
                selected_at: slot.selected_at,
            })
            .collect(),
    }
}
