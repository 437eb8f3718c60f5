/// API routes and handlers
pub mod admin;
pub mod extract;
pub mod middleware;
pub mod stats;
pub mod student;

use crate::{context::AppContext, rate_limit::login_rate_limit};
use axum::Router;

/// Build API routes
///
/// Login routes sit behind the login rate limiter.
pub fn routes(ctx: AppContext) -> Router<AppContext> {
    let logins = Router::new()
        .merge(student::login_routes())
        .merge(admin::login_routes())
        .route_layer(axum::middleware::from_fn_with_state(ctx, login_rate_limit));

    Router::new()
        .merge(logins)
        .merge(student::routes())
        .merge(admin::routes())
        .merge(stats::routes())
}
