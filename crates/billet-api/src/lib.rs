pub mod auth;
pub mod messages;
pub mod middleware;
pub mod responses;

use axum::Json;
use axum::http::StatusCode;
use billet_types::api::ErrorBody;

pub(crate) type Reject = (StatusCode, Json<ErrorBody>);

pub(crate) fn reject(status: StatusCode, error: &str) -> Reject {
    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
        }),
    )
}

pub(crate) fn internal() -> Reject {
    reject(StatusCode::INTERNAL_SERVER_ERROR, "store unavailable")
}
