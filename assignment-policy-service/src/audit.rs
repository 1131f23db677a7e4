//! Best-effort audit trail for classified-data access.
//!
//! Audit writes are a side effect of operations that have already completed
//! or failed on their own merits; they must never gate the caller. `record`
//! therefore returns `()` — a failed write is counted, logged locally and
//! dropped, so the "never blocks or fails the caller" contract is enforced
//! by the signature rather than by discipline at each call site.

use common::store::DynAuditStore;
use common::types::{AuditAction, AuditEntry, Classification};

use crate::metrics::PolicyMetricsHelper;

#[derive(Clone)]
pub struct AuditTrail {
    store: DynAuditStore,
}

impl AuditTrail {
    pub fn new(store: DynAuditStore) -> Self {
        Self { store }
    }

    pub async fn record(
        &self,
        actor_id: &str,
        classification: Classification,
        action: AuditAction,
        detail: Option<String>,
    ) {
        let entry = AuditEntry::new(actor_id, classification, action, detail);
        if let Err(err) = self.store.append(entry).await {
            PolicyMetricsHelper::record_audit_write_failure();
            tracing::warn!(
                error = %err,
                actor_id,
                action = action.as_str(),
                classification = classification.as_str(),
                "audit log write failed; continuing"
            );
        }
    }
}
