//! Router assembly: API, common routes, and static serving of uploaded files.

mod api;
mod common;

pub use api::api_routes;
pub use common::common_routes;

use crate::state::AppState;
use crate::upload::UPLOADS_ROUTE;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// The full application. `body_limit` bounds a whole request body; axum's 2 MB default
/// is lifted so multipart uploads can carry full-size images.
pub fn app(state: AppState, body_limit: usize) -> Router {
    let uploads = ServeDir::new(state.uploads.dir());
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(api_routes(state))
        .nest_service(UPLOADS_ROUTE, uploads)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(body_limit))
                .layer(DefaultBodyLimit::disable()),
        )
}
