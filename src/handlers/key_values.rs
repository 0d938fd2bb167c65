use axum::{
    Json,
    extract::{RawQuery, State},
    http::StatusCode,
};
use tracing::info;

use crate::db::KeyValue;
use crate::middleware::JsonBody;
use crate::middleware::auth::first_query_value;
use crate::types::ReplaceKeyValuesRequest;
use crate::{JournalError, router::JournalState};

/// GET /api/keyvalues?tab_id=
pub async fn get_key_values(
    State(state): State<JournalState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<KeyValue>>, JournalError> {
    let tab_id = parse_tab_id(query.as_deref())?;
    Ok(Json(state.store.list_key_values(tab_id).await?))
}

/// POST /api/keyvalues -> replaces the tab's whole key-value set.
pub async fn replace_key_values(
    State(state): State<JournalState>,
    JsonBody(req): JsonBody<ReplaceKeyValuesRequest>,
) -> Result<StatusCode, JournalError> {
    state
        .store
        .replace_key_values(req.tab_id, &req.key_values)
        .await?;
    info!(tab_id = req.tab_id, count = req.key_values.len(), "key-values replaced");
    Ok(StatusCode::OK)
}

fn parse_tab_id(query: Option<&str>) -> Result<i64, JournalError> {
    let raw = query
        .and_then(|qs| first_query_value(qs, "tab_id"))
        .filter(|v| !v.is_empty())
        .ok_or(JournalError::MissingParameter("tab_id"))?;
    raw.parse()
        .map_err(|_| JournalError::BadRequest(format!("invalid tab_id: {raw}")))
}
