use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};

use accountsys_core::{AccountId, UserId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/:id", get(get_user))
        .route(
            "/users/:user_id/accounts/:account_id",
            delete(remove_account_from_user),
        )
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateUserRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    let profile = match body.into_profile() {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.users.create_user(profile).await {
        Ok(user) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    id: Result<Path<UserId>, PathRejection>,
) -> Response {
    let Path(id) = match id {
        Ok(p) => p,
        Err(rejection) => return errors::path_rejection(rejection),
    };

    match services.users.get_user(id).await {
        Ok(user) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.users.list_users().await {
        Ok(users) => {
            let items = users.iter().map(dto::user_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn remove_account_from_user(
    Extension(services): Extension<Arc<AppServices>>,
    ids: Result<Path<(UserId, AccountId)>, PathRejection>,
) -> Response {
    let Path((user_id, account_id)) = match ids {
        Ok(p) => p,
        Err(rejection) => return errors::path_rejection(rejection),
    };

    match services.users.remove_account(user_id, account_id).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
