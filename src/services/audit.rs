//! Append-only audit trail for booking and admin actions.

use tracing::warn;

use crate::db::Store;
use crate::entities::audit_log;

pub const BOOKING_CREATED: &str = "BOOKING_CREATED";
pub const BOOKING_CANCELLED: &str = "BOOKING_CANCELLED";
pub const CHECK_IN: &str = "CHECK_IN";
pub const AUTO_NO_SHOW: &str = "AUTO_NO_SHOW";
pub const CREATE_DESK: &str = "CREATE_DESK";
pub const TOGGLE_DESK_ACTIVE: &str = "TOGGLE_DESK_ACTIVE";
pub const TOGGLE_DESK_ADMIN_ONLY: &str = "TOGGLE_DESK_ADMIN_ONLY";
pub const TOGGLE_CAN_BOOK: &str = "TOGGLE_CAN_BOOK";

/// Actor email recorded for transitions no user initiated (the sweeper).
pub const SYSTEM_ACTOR: &str = "system";

/// Records audit events best-effort: a failed insert is logged and swallowed
/// so bookkeeping never fails the operation it describes.
#[derive(Clone)]
pub struct AuditRecorder {
    store: Store,
}

impl AuditRecorder {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn record(&self, actor_email: &str, action: &str, details: &str) {
        if let Err(err) = self.store.append_audit(actor_email, action, details).await {
            warn!(action, %err, "Failed to write audit entry");
        }
    }

    pub async fn recent(&self, limit: u64) -> anyhow::Result<Vec<audit_log::Model>> {
        self.store.recent_audit(limit).await
    }
}
