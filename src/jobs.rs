//! Background jobs

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::services::Services;

/// Spawn the periodic order-expiration task.
///
/// Runs once at startup, then on every interval tick. Each pass moves
/// RESERVED orders older than the configured TTL to RESERVATION_EXPIRED.
pub fn spawn_order_expiration(services: Arc<Services>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match services.orders.expire_stale_reservations().await {
                Ok(0) => tracing::debug!("Expiration pass found no stale reservations"),
                Ok(count) => tracing::info!(count, "Expired stale reservations"),
                Err(e) => tracing::error!("Expiration pass failed: {}", e),
            }
        }
    });
}
