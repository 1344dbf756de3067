//! Periodic eviction of abandoned onboarding wizard sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::wizard::WizardRegistry;

/// How often idle sessions are looked for.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Drop wizard sessions unused for `idle_for` until `cancel` is triggered.
pub async fn run(wizards: Arc<WizardRegistry>, idle_for: Duration, cancel: CancellationToken) {
    tracing::info!(
        idle_secs = idle_for.as_secs(),
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Wizard sweep started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Wizard sweep stopping");
                break;
            }
            _ = interval.tick() => {
                let evicted = wizards.evict_idle(idle_for).await;
                if evicted > 0 {
                    let open = wizards.session_count().await;
                    tracing::info!(
                        evicted,
                        open,
                        "Wizard sweep: dropped idle sessions"
                    );
                } else {
                    tracing::debug!("Wizard sweep: nothing idle");
                }
            }
        }
    }
}
