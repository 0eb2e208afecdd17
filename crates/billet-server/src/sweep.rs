use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use billet_api::auth::AppState;
use billet_db::LOGIN_TTL_SECS;

/// Background task that prunes login tokens past their validity window.
///
/// Runs on an interval and deletes tokens issued more than the TTL ago.
/// Expiry is still enforced at verification time; this loop only keeps
/// never-verified tokens from accumulating in the logins bucket.
pub async fn run_sweep_loop(state: AppState, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        let db = state.clone();
        let result = tokio::task::spawn_blocking(move || {
            let cutoff = Utc::now() - chrono::Duration::seconds(LOGIN_TTL_SECS);
            db.store.sweep_logins(cutoff)
        })
        .await;

        match result {
            Ok(Ok(count)) if count > 0 => info!("sweep: pruned {} expired login tokens", count),
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!("sweep error: {}", e),
            Err(e) => warn!("sweep join error: {}", e),
        }
    }
}
