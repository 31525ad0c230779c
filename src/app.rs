use crate::handlers;
use crate::state::AppState;
use crate::visitor::assign_visitor;
use axum::{extract::DefaultBodyLimit, middleware, routing::{get, post}, Router};

const UPLOAD_BODY_LIMIT: usize = 16 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let features = state.config.features;
    let mut router = Router::new()
        .route("/", get(handlers::index))
        .route("/admin", get(handlers::admin_page))
        .route("/api/next-event", get(handlers::next_event))
        .route("/api/ticker", get(handlers::ticker))
        .route("/api/spots", get(handlers::spots))
        .route("/api/registration-status", get(handlers::registration_status))
        .route("/api/register", post(handlers::register))
        .route("/api/admin/login", post(handlers::admin_login))
        .route("/api/admin/logout", post(handlers::admin_logout))
        .route("/api/admin/summary", get(handlers::admin_summary))
        .route("/api/admin/trend", get(handlers::admin_trend))
        .route("/api/admin/diagnostic", get(handlers::admin_diagnostic));

    if features.feedback {
        router = router.route("/api/feedback", post(handlers::feedback));
    }
    if features.gallery {
        router = router
            .route("/api/gallery", get(handlers::gallery))
            .route(
                "/api/gallery/upload",
                post(handlers::gallery_upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
            )
            .route("/api/gallery/delete", post(handlers::gallery_delete));
    }

    router
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(assign_visitor))
        .with_state(state)
}
