use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use accountsys_core::AccountId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/account/:id", get(get_account))
        .route("/accounts", get(list_accounts))
        .route("/addAccount", post(add_account))
}

/// Unknown ids answer 404 with an empty body.
pub async fn get_account(
    Extension(services): Extension<Arc<AppServices>>,
    id: Result<Path<AccountId>, PathRejection>,
) -> Response {
    let Path(id) = match id {
        Ok(p) => p,
        Err(rejection) => return errors::path_rejection(rejection),
    };

    match services.accounts.get_account(id).await {
        Ok(Some(account)) => (StatusCode::OK, Json(dto::account_to_json(&account))).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_accounts(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.accounts.list_accounts().await {
        Ok(accounts) => {
            let items = accounts.iter().map(dto::account_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn add_account(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::AddAccountRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match services.accounts.create_account(body.into_new_account()).await {
        Ok(account) => (StatusCode::OK, Json(dto::account_to_json(&account))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
