use axum::{Json, extract::State, http::StatusCode};
use tracing::{debug, info};

use crate::db::Tab;
use crate::middleware::JsonBody;
use crate::types::{CreateTabRequest, DeleteTabRequest, RenameTabRequest};
use crate::{JournalError, router::JournalState};

/// GET /api/tabs
pub async fn list_tabs(State(state): State<JournalState>) -> Result<Json<Vec<Tab>>, JournalError> {
    Ok(Json(state.store.list_tabs().await?))
}

/// POST /api/tabs -> the created tab with its assigned id.
pub async fn create_tab(
    State(state): State<JournalState>,
    JsonBody(req): JsonBody<CreateTabRequest>,
) -> Result<Json<Tab>, JournalError> {
    let tab = state.store.create_tab(&req.name).await?;
    info!(id = tab.id, name = %tab.name, "tab created");
    Ok(Json(tab))
}

/// POST /api/tabs/delete
pub async fn delete_tab(
    State(state): State<JournalState>,
    JsonBody(req): JsonBody<DeleteTabRequest>,
) -> Result<StatusCode, JournalError> {
    state.store.delete_tab(req.id).await?;
    info!(id = req.id, "tab deleted");
    Ok(StatusCode::OK)
}

/// POST /api/tabs/rename
pub async fn rename_tab(
    State(state): State<JournalState>,
    JsonBody(req): JsonBody<RenameTabRequest>,
) -> Result<StatusCode, JournalError> {
    let updated = state.store.rename_tab(req.id, &req.name).await?;
    if updated == 0 {
        debug!(id = req.id, "rename matched no tab");
    }
    Ok(StatusCode::OK)
}
