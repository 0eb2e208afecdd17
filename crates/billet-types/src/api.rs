use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- JWT Claims --

/// JWT claims shared between billet-api (REST middleware) and billet-server.
/// The subject is the authenticated email address; users have no other id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
}

/// The login token itself travels only by email, never in this response.
#[derive(Debug, Serialize)]
pub struct LoginRequested {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub email: String,
    pub token: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComposeRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub options: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ComposeResponse {
    pub id: String,
    /// One selection link per option, in option order.
    pub links: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageView {
    pub id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Serialize)]
pub struct OptionView {
    pub label: String,
    pub selected_at: Option<DateTime<Utc>>,
}

// -- Responses --

#[derive(Debug, Serialize)]
pub struct SelectionView {
    pub subject: String,
    pub option: String,
    pub selected_at: DateTime<Utc>,
}

// -- Errors --

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
