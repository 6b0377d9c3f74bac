// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{admin, game, guest},
    state::AppState,
    utils::{
        jwt::{admin_middleware, auth_middleware, guest_middleware},
        qr::QR_ROUTE,
    },
};

/// Assembles the main application router.
///
/// * Public routes: guest search, results by token, QR code files, the
///   admin login QR code.
/// * Game routes: guest session token required.
/// * Admin routes: admin token required.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = [
        state.config.base_url.as_str(),
        "http://localhost:5000",
        "http://127.0.0.1:5000",
    ]
    .iter()
    .filter_map(|origin| origin.trim_end_matches('/').parse().ok())
    .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let public_routes = Router::new()
        .route("/guests/search", get(guest::search_guests))
        .route("/guests/submitted", get(guest::submitted_guests))
        .route("/answers/{token}", get(guest::guest_answers))
        .route("/game/start", post(game::start_game))
        .route("/admin/login", post(admin::login))
        .route("/admin/qr-code", get(admin::login_qr_code));

    let game_routes = Router::new()
        .route("/questions", get(game::list_questions))
        .route("/answers/{question_id}", put(game::save_answer))
        .route("/summary", get(game::summary))
        .route("/submit", post(game::submit))
        .layer(middleware::from_fn(guest_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route(
            "/questions/{id}/actual-answer",
            put(admin::update_actual_answer),
        )
        .route("/leaderboard", get(admin::get_leaderboard))
        .route("/responses", get(admin::all_responses))
        .route("/stats", get(admin::stats))
        .route("/guests", get(admin::list_guests))
        .route("/reset", post(admin::reset_event))
        // Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        // Target of the link in each guest's QR code
        .route("/answers/{token}", get(guest::guest_answers))
        .nest("/api", public_routes)
        .nest("/api/game", game_routes)
        .nest("/api/admin", admin_routes)
        .nest_service(
            &format!("/{}", QR_ROUTE),
            ServeDir::new(state.config.qr_code_dir.clone()),
        )
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
