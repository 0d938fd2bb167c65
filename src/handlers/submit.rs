use axum::extract::State;

use crate::middleware::JsonBody;
use crate::service::audit_log::AuditEntry;
use crate::types::SubmitRequest;
use crate::{JournalError, router::JournalState};

/// POST /api/submit -> appends one audit line for the submitted tab.
pub async fn submit(
    State(state): State<JournalState>,
    JsonBody(req): JsonBody<SubmitRequest>,
) -> Result<&'static str, JournalError> {
    let entry = AuditEntry::now(&req.tab_name, &req.key_values);
    state.audit.append(&entry).await?;
    Ok("Logged successfully")
}
