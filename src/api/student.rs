/// Student registration and login endpoints
use crate::{
    account::{LoginOutcome, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    api::extract::JsonBody,
    context::AppContext,
    error::{GateError, GateResult},
};
use axum::{extract::State, routing::post, Json, Router};

/// Build student login route
pub fn login_routes() -> Router<AppContext> {
    Router::new().route("/api/auth/login", post(login))
}

/// Build remaining student routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/api/auth/register", post(register))
}

/// Register a student account
async fn register(
    State(ctx): State<AppContext>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> GateResult<Json<RegisterResponse>> {
    let id = ctx.registry.register(req.into()).await?;

    Ok(Json(RegisterResponse { success: true, id }))
}

/// Student login
async fn login(
    State(ctx): State<AppContext>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> GateResult<Json<LoginResponse>> {
    match ctx.gate.authenticate(&req.email, &req.password).await? {
        LoginOutcome::Allowed(user) => Ok(Json(LoginResponse {
            success: true,
            user,
        })),
        LoginOutcome::Denied(reason) => Err(GateError::LoginDenied(reason)),
    }
}
