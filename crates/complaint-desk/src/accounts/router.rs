use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;

use super::credentials::CredentialHasher;
use super::domain::{AccountView, LoginRequest, RegistrationRequest};
use super::repository::AccountRepository;
use super::service::AccountService;
use crate::error::ApiError;
use crate::store::run_blocking;

#[derive(Debug, Serialize)]
pub(crate) struct AccountEnvelope {
    pub(crate) message: &'static str,
    pub(crate) user: AccountView,
}

/// Router builder exposing `/auth/register` and `/auth/login`.
pub fn auth_router<R, H>(service: Arc<AccountService<R, H>>) -> Router
where
    R: AccountRepository + 'static,
    H: CredentialHasher + 'static,
{
    Router::new()
        .route("/auth/register", post(register_handler::<R, H>))
        .route("/auth/login", post(login_handler::<R, H>))
        .with_state(service)
}

pub(crate) async fn register_handler<R, H>(
    State(service): State<Arc<AccountService<R, H>>>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AccountEnvelope>), ApiError>
where
    R: AccountRepository + 'static,
    H: CredentialHasher + 'static,
{
    let Json(request) = payload?;
    let user = run_blocking(move || service.register(request)).await??;
    Ok((
        StatusCode::CREATED,
        Json(AccountEnvelope {
            message: "User registered successfully",
            user,
        }),
    ))
}

pub(crate) async fn login_handler<R, H>(
    State(service): State<Arc<AccountService<R, H>>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AccountEnvelope>, ApiError>
where
    R: AccountRepository + 'static,
    H: CredentialHasher + 'static,
{
    let Json(request) = payload?;
    let user = run_blocking(move || service.login(request)).await??;
    Ok(Json(AccountEnvelope {
        message: "Login successful",
        user,
    }))
}
