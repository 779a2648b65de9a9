use axum::Router;

use crate::state::AppState;

pub mod agent;
pub mod chat;
pub mod feedback;
pub mod health;
pub mod profile;
pub mod scenarios;
pub mod sessions;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(scenarios::router())
        .merge(profile::router())
        .merge(sessions::router())
        .merge(chat::router())
        .merge(feedback::router())
        .merge(agent::router())
}
