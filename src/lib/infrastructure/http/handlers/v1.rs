//! Version 1 API routes

use axum::{
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{
    domain::contact::ContactService,
    infrastructure::http::{open_api::ApiDocs, state::AppState},
};

pub mod contact;
pub mod uptime;

/// Routes mounted under `/api/v1`
pub fn router<C: ContactService>() -> Router<AppState<C>> {
    Router::new()
        .route(
            "/contact",
            post(contact::handler).fallback(contact::method_not_allowed),
        )
        .route("/openapi.json", get(Json(ApiDocs::openapi())))
        .route("/uptime", get(uptime::handler))
}
