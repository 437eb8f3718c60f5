/// Usage counter endpoints
use crate::{context::AppContext, error::GateResult};
use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};

/// Build stats routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/api/stats/lesson-watch", post(lesson_watch))
}

/// Record that a lesson link was opened
async fn lesson_watch(State(ctx): State<AppContext>) -> GateResult<Json<Value>> {
    ctx.usage.record_lesson_watch().await?;

    Ok(Json(json!({ "success": true })))
}
