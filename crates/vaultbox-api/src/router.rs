//! Route definitions for the Vaultbox HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    let api_routes = Router::new()
        .merge(health_routes())
        .merge(user_routes())
        .merge(folder_routes())
        .merge(file_routes())
        .merge(tag_routes())
        .merge(link_routes())
        .merge(share_routes())
        .merge(activity_routes())
        .merge(public_routes());

    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// The caller's identity
fn user_routes() -> Router<AppState> {
    Router::new().route("/me", get(handlers::user::me))
}

/// Folder CRUD, tree, breadcrumbs, search
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/folders",
            get(handlers::folder::list_folders).post(handlers::folder::create_folder),
        )
        .route(
            "/folders/defaults",
            post(handlers::folder::create_default_folders),
        )
        .route("/folders/tree", get(handlers::folder::get_tree))
        .route("/folders/search", get(handlers::folder::search_folders))
        .route(
            "/folders/{id}",
            get(handlers::folder::get_folder)
                .put(handlers::folder::rename_folder)
                .delete(handlers::folder::delete_folder),
        )
        .route("/folders/{id}/move", put(handlers::folder::move_folder))
        .route(
            "/folders/{id}/breadcrumbs",
            get(handlers::folder::breadcrumbs),
        )
}

/// File records, upload, content, tags, bulk operations, quick search
fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(handlers::file::quick_search))
        .route(
            "/files",
            get(handlers::file::list_files).post(handlers::file::upload_file),
        )
        .route("/files/search", get(handlers::file::search_files))
        .route("/files/bulk/delete", post(handlers::file::bulk_delete))
        .route("/files/bulk/move", post(handlers::file::bulk_move))
        .route(
            "/files/{id}",
            get(handlers::file::get_file).delete(handlers::file::delete_file),
        )
        .route("/files/{id}/move", put(handlers::file::move_file))
        .route(
            "/files/{id}/tags",
            post(handlers::file::add_tags).delete(handlers::file::remove_tags),
        )
        .route("/files/{id}/access", get(handlers::file::check_access))
        .route("/files/{id}/url", get(handlers::file::file_url))
        .route("/files/{id}/content", get(handlers::file::file_content))
        .route(
            "/files/{id}/links",
            post(handlers::link::create_link),
        )
        .route(
            "/files/{id}/shares",
            get(handlers::share::list_file_shares).post(handlers::share::share_file),
        )
}

/// Tag vocabulary
fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(handlers::tag::list_tags))
        .route("/tags/suggest", get(handlers::tag::suggest_tags))
}

/// Share link management
fn link_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(handlers::link::list_links))
        .route("/links/{id}", delete(handlers::link::revoke_link))
}

/// User shares
fn share_routes() -> Router<AppState> {
    Router::new()
        .route("/shares/with-me", get(handlers::share::shared_with_me))
        .route("/shares/{id}", delete(handlers::share::remove_share))
}

/// Activity log
fn activity_routes() -> Router<AppState> {
    Router::new()
        .route("/activities", get(handlers::activity::list_activities))
        .route(
            "/activities/recent",
            get(handlers::activity::recent_activities),
        )
        .route(
            "/activities/{resource_type}/{id}",
            get(handlers::activity::resource_activities),
        )
}

/// Anonymous share link access
fn public_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/s/{token}",
            get(handlers::public::open_link).post(handlers::public::unlock_link),
        )
        .route("/s/{token}/content", get(handlers::public::link_content))
}
