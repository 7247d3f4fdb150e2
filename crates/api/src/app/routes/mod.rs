use axum::Router;

pub mod accounts;
pub mod system;
pub mod users;

/// Router for all resource endpoints.
pub fn router() -> Router {
    Router::new()
        .merge(users::router())
        .merge(accounts::router())
}
