//! Outbound mail delivery seam: `send_mail(to, subject, body)`.
//!
//! `Http` posts to a Mandrill-style transactional mail API. `Log` only
//! records the message through tracing, so development works without a
//! mail provider (the login link lands in the server log).

use anyhow::{Result, anyhow};
use serde_json::json;
use tracing::info;

pub enum Mailer {
    Http(HttpMailer),
    Log,
}

pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl Mailer {
    pub fn http(endpoint: String, api_key: String, from: String) -> Self {
        Self::Http(HttpMailer {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            from,
        })
    }

    pub async fn send_mail(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        match self {
            Mailer::Http(mailer) => mailer.send(to, subject, body).await,
            Mailer::Log => {
                info!("mail to {} ({}): {}", to, subject, body);
                Ok(())
            }
        }
    }
}

impl HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let payload = json!({
            "key": self.api_key,
            "message": {
                "text": body,
                "subject": subject,
                "from_email": self.from,
                "from_name": "Billet",
                "to": [{ "email": to }],
            },
        });

        let response = self.client.post(&self.endpoint).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("mail API returned {}", response.status()));
        }
        Ok(())
    }
}
