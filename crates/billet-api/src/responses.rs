use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::error;

use billet_db::StoreError;
use billet_types::api::SelectionView;

use crate::auth::AppState;
use crate::{Reject, internal, reject};

/// The public selection link. The key in the path is the content-addressed
/// response id embedded in the outbound mail; no session is required.
/// Replays return the originally recorded selection.
pub async fn select(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, Reject> {
    let db = state.clone();
    let response_key = key.clone();

    let outcome = tokio::task::spawn_blocking(move || {
        let response = db.store.record_selection(&response_key, Utc::now())?;
        let message = db
            .store
            .message(&response.message_id)?
            .ok_or_else(|| StoreError::MessageNotFound(response.message_id.clone()))?;
        Ok::<_, StoreError>((response, message))
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        internal()
    })?;

    let (response, message) = match outcome {
        Ok(pair) => pair,
        Err(StoreError::ResponseNotFound(_)) => {
            return Err(reject(StatusCode::NOT_FOUND, "unknown response link"));
        }
        Err(e) => {
            error!("record_selection failed: {}", e);
            return Err(internal());
        }
    };

    let Some(option) = message.options.get(response.option as usize) else {
        error!(
            "response {} points at option {} outside message {}",
            key, response.option, response.message_id
        );
        return Err(internal());
    };
    let Some(selected_at) = response.selected_at else {
        error!("response {} has no selection timestamp after recording", key);
        return Err(internal());
    };

    Ok(Json(SelectionView {
        subject: message.subject,
        option: option.clone(),
        selected_at,
    }))
}
