use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info, warn};

use billet_db::{Store, StoreError};
use billet_mail::Mailer;
use billet_types::api::{Claims, LoginRequest, LoginRequested, VerifyResponse};

use crate::{Reject, internal, reject};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Store,
    pub mailer: Mailer,
    pub jwt_secret: String,
    pub base_url: String,
}

/// Issue a login token and mail the callback link. The token travels only
/// by email; the HTTP response never contains it.
pub async fn request_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, Reject> {
    if !req.email.contains('@') {
        return Err(reject(StatusCode::BAD_REQUEST, "invalid email address"));
    }

    // Issue (and commit) the token before any network I/O: the mail call
    // must never run inside a store transaction.
    let db = state.clone();
    let email = req.email.clone();
    let token = tokio::task::spawn_blocking(move || db.store.issue_login(&email))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            internal()
        })?
        .map_err(|e| {
            error!("issue_login failed: {}", e);
            internal()
        })?;

    let body = login_email_body(&state.base_url, &token);

    info!("sending login email to {}", req.email);
    if let Err(e) = state.mailer.send_mail(&req.email, "Billet login", &body).await {
        warn!("login email failed: {}", e);
        return Err(reject(
            StatusCode::BAD_GATEWAY,
            "login email failed to send",
        ));
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(LoginRequested { email: req.email }),
    ))
}

/// The emailed callback: verify and consume the token, make sure the user
/// record exists, and hand back a session JWT.
pub async fn verify_login(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, Reject> {
    info!("verifying login {}", token);

    let db = state.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let email = db.store.verify_login(&token)?;
        db.store.ensure_user(&email)?;
        Ok::<_, StoreError>(email)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        internal()
    })?;

    let email = match outcome {
        Ok(email) => email,
        Err(StoreError::LoginExpired) => {
            return Err(reject(
                StatusCode::GONE,
                "expired login link, request another",
            ));
        }
        Err(StoreError::LoginNotFound) => {
            return Err(reject(StatusCode::NOT_FOUND, "invalid login link"));
        }
        Err(e) => {
            error!("verify_login failed: {}", e);
            return Err(internal());
        }
    };

    info!("login verified for {}", email);
    let session = create_token(&state.jwt_secret, &email).map_err(|e| {
        error!("token creation failed: {}", e);
        internal()
    })?;

    Ok(Json(VerifyResponse {
        email,
        token: session,
    }))
}

fn login_email_body(base_url: &str, token: &str) -> String {
    format!("Click this, please: {}/auth/verify/{}", base_url, token)
}

fn create_token(secret: &str, email: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    #[test]
    fn session_token_round_trips() {
        let token = create_token("test-secret", "a@x.com").unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, "a@x.com");
    }

    #[test]
    fn login_email_embeds_the_callback_link() {
        let body = login_email_body("https://billet.example.com", "tok-123");
        assert!(body.contains("https://billet.example.com/auth/verify/tok-123"));
    }

    #[test]
    fn session_token_rejects_wrong_secret() {
        let token = create_token("test-secret", "a@x.com").unwrap();
        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"other-secret"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }
}
