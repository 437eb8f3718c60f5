/// Admin API Endpoints
///
/// Everything except login extracts `AdminAuthContext`, so a request without
/// a current admin grant never reaches the registry.
use crate::{
    account::{Account, AccountStatus},
    admin::{AdminLoginRequest, AdminLoginResponse, ChangeSecretRequest},
    api::extract::{JsonBody, PathParam},
    auth::AdminAuthContext,
    context::AppContext,
    error::{GateError, GateResult},
    rate_limit::ADMIN_LOGIN_PATH,
    usage::UsageSnapshot,
};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Build admin login route
pub fn login_routes() -> Router<AppContext> {
    Router::new().route(ADMIN_LOGIN_PATH, post(admin_login))
}

/// Build admin API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/admin/members", get(list_members))
        .route("/api/admin/members/:id/status", post(update_status))
        .route("/api/admin/members/:id/subscription", post(update_subscription))
        .route("/api/admin/settings/password", post(change_password))
        .route("/api/admin/stats", get(get_stats))
}

/// Exchange the admin secret for a grant token
async fn admin_login(
    State(ctx): State<AppContext>,
    JsonBody(req): JsonBody<AdminLoginRequest>,
) -> GateResult<Json<AdminLoginResponse>> {
    let grant = ctx
        .admin_authority
        .authorize(&req.password)
        .await?
        .ok_or_else(|| GateError::Authentication("Incorrect admin secret".to_string()))?;

    let token = ctx.admin_authority.issue_token(&grant)?;

    Ok(Json(AdminLoginResponse {
        success: true,
        token,
        expires_at: grant.expires_at(),
    }))
}

/// List every account, newest first
async fn list_members(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
) -> GateResult<Json<Vec<Account>>> {
    let members = ctx.registry.list_all(&auth.grant).await?;

    Ok(Json(members))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    #[serde(default)]
    status: String,
}

/// Set an account's status
async fn update_status(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    PathParam(id): PathParam<i64>,
    JsonBody(req): JsonBody<UpdateStatusRequest>,
) -> GateResult<Json<Value>> {
    let status: AccountStatus = req.status.parse()?;
    ctx.registry.set_status(&auth.grant, id, status).await?;

    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
struct UpdateSubscriptionRequest {
    days: i64,
}

/// Set an account's remaining subscription days
async fn update_subscription(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    PathParam(id): PathParam<i64>,
    JsonBody(req): JsonBody<UpdateSubscriptionRequest>,
) -> GateResult<Json<Value>> {
    ctx.registry
        .set_subscription_days(&auth.grant, id, req.days)
        .await?;

    Ok(Json(json!({ "success": true })))
}

/// Replace the admin secret
///
/// The caller's token is void afterwards; log in again with the new secret.
async fn change_password(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    JsonBody(req): JsonBody<ChangeSecretRequest>,
) -> GateResult<Json<Value>> {
    ctx.admin_authority
        .change_secret(&auth.grant, &req.new_password)
        .await?;

    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    stats: UsageSnapshot,
    total_users: i64,
}

/// Usage counters and account total
async fn get_stats(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
) -> GateResult<Json<StatsResponse>> {
    let stats = ctx.usage.snapshot().await?;
    let total_users = ctx.registry.count_all().await?;

    Ok(Json(StatsResponse { stats, total_users }))
}
