use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    middleware::from_extractor_with_state,
    routing::{any, get, post},
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{services::ServeFile, trace::TraceLayer};

use crate::auth::TokenStore;
use crate::db::JournalStore;
use crate::handlers::{key_values, login, submit, tabs};
use crate::middleware::RequireToken;
use crate::service::audit_log::AuditLog;

/// Resources shared by every handler.
#[derive(Clone)]
pub struct JournalState {
    pub store: JournalStore,
    pub audit: AuditLog,
    pub tokens: TokenStore,
    pub secure_cookie: bool,
    pub index_path: Arc<PathBuf>,
}

impl JournalState {
    pub fn new(
        store: JournalStore,
        audit: AuditLog,
        tokens: TokenStore,
        secure_cookie: bool,
        index_path: PathBuf,
    ) -> Self {
        Self {
            store,
            audit,
            tokens,
            secure_cookie,
            index_path: Arc::new(index_path),
        }
    }
}

impl FromRef<JournalState> for TokenStore {
    fn from_ref(state: &JournalState) -> Self {
        state.tokens.clone()
    }
}

pub fn journal_router(state: JournalState) -> Router {
    let protected = Router::new()
        .route("/api/tabs", get(tabs::list_tabs).post(tabs::create_tab))
        .route("/api/tabs/delete", post(tabs::delete_tab))
        .route("/api/tabs/rename", post(tabs::rename_tab))
        .route(
            "/api/keyvalues",
            get(key_values::get_key_values).post(key_values::replace_key_values),
        )
        .route("/api/submit", post(submit::submit))
        .route_layer(from_extractor_with_state::<RequireToken, _>(state.clone()));

    // The front end answers `/` and every path no other route claims.
    let index = ServeFile::new(state.index_path.as_path());

    Router::new()
        .route_service("/", index.clone())
        .route("/api/login", any(login::login))
        .merge(protected)
        .fallback_service(index)
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
