pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod redis;
pub mod services;
pub mod store;
pub mod utils;

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{delete, get, patch, post},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::Config, redis::RedisClient};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub redis: Arc<RedisClient>,
    pub config: Arc<Config>,
}

pub fn create_app(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/verify-email", get(handlers::auth::verify_email))
        .route(
            "/api/auth/request-phone-otp",
            post(handlers::auth::request_phone_otp),
        )
        .route("/api/auth/verify-phone", post(handlers::auth::verify_phone))
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/auth/logout", post(handlers::auth::logout));

    let user_routes = Router::new()
        .route(
            "/api/users/profile",
            get(handlers::users::get_profile).patch(handlers::users::update_profile),
        )
        .route(
            "/api/users/{username}",
            get(handlers::users::get_user_by_username),
        );

    let post_routes = Router::new()
        .route(
            "/api/posts",
            get(handlers::posts::get_posts).post(handlers::posts::create_post),
        )
        .route(
            "/api/posts/{post_id}",
            get(handlers::posts::get_post)
                .patch(handlers::posts::update_post)
                .delete(handlers::posts::delete_post),
        )
        .route(
            "/api/posts/{post_id}/vote",
            get(handlers::posts::get_user_vote).post(handlers::posts::vote_post),
        )
        .route(
            "/api/posts/{post_id}/comments",
            get(handlers::comments::get_comments).post(handlers::comments::create_comment),
        )
        .route(
            "/api/comments/{comment_id}",
            delete(handlers::comments::delete_comment),
        );

    let person_routes = Router::new()
        .route("/api/persons", post(handlers::persons::create_person))
        .route(
            "/api/persons/search",
            get(handlers::persons::search_persons),
        )
        .route(
            "/api/persons/{person_id}",
            get(handlers::persons::get_person)
                .patch(handlers::persons::update_person)
                .delete(handlers::persons::delete_person),
        )
        .route(
            "/api/persons/{person_id}/posts",
            get(handlers::persons::get_person_posts),
        );

    let search_routes = Router::new()
        .route("/api/search", get(handlers::search::search))
        .route(
            "/api/search/persons",
            get(handlers::search::search_persons),
        )
        .route("/api/search/posts", get(handlers::search::search_posts))
        .route("/api/search/users", get(handlers::search::search_users))
        .route("/api/search/trending", get(handlers::search::trending));

    let vetting_routes = Router::new()
        .route(
            "/api/vetting",
            get(handlers::vetting::list_requests).post(handlers::vetting::create_request),
        )
        .route(
            "/api/vetting/search",
            get(handlers::vetting::search_requests),
        )
        .route(
            "/api/vetting/{request_id}",
            get(handlers::vetting::get_request),
        )
        .route(
            "/api/vetting/{request_id}/status",
            patch(handlers::vetting::update_status),
        );

    Router::new()
        .merge(auth_routes)
        .merge(user_routes)
        .merge(post_routes)
        .merge(person_routes)
        .merge(search_routes)
        .merge(vetting_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
