/// Login throttling
///
/// Student and admin login endpoints each get a quota per client address, so
/// one client running out its budget never locks out another. The admin
/// authority itself keeps no attempt counter.
use crate::{
    config::RateLimitConfig,
    context::AppContext,
    error::{GateError, GateResult},
};
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota,
    RateLimiter as GovernorLimiter,
};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
};

/// Path of the admin login route
pub const ADMIN_LOGIN_PATH: &str = "/api/admin/login";

type KeyedLimiter = GovernorLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// Login rate limiter
#[derive(Clone)]
pub struct LoginRateLimiter {
    enabled: bool,
    student: Arc<KeyedLimiter>,
    admin: Arc<KeyedLimiter>,
}

impl LoginRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let per_minute =
            NonZeroU32::new(config.login_requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_minute(per_minute);

        Self {
            enabled: config.enabled,
            student: Arc::new(GovernorLimiter::keyed(quota)),
            admin: Arc::new(GovernorLimiter::keyed(quota)),
        }
    }

    /// Check rate limit for a student login attempt from `client`
    pub fn check_student(&self, client: IpAddr) -> GateResult<()> {
        Self::check(self.enabled, &self.student, client)
    }

    /// Check rate limit for an admin login attempt from `client`
    pub fn check_admin(&self, client: IpAddr) -> GateResult<()> {
        Self::check(self.enabled, &self.admin, client)
    }

    /// Drop state for clients whose quota has fully replenished
    pub fn retain_recent(&self) {
        self.student.retain_recent();
        self.admin.retain_recent();
    }

    fn check(enabled: bool, limiter: &KeyedLimiter, client: IpAddr) -> GateResult<()> {
        if !enabled {
            return Ok(());
        }
        limiter
            .check_key(&client)
            .map_err(|_| GateError::RateLimitExceeded)
    }
}

/// Peer address of the connection; unspecified when the server was not
/// started with connect info
pub fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Rate limiting middleware for the login routes
pub async fn login_rate_limit(
    State(ctx): State<AppContext>,
    request: Request,
    next: Next,
) -> Result<Response, GateError> {
    let client = client_ip(&request);
    let result = if request.uri().path() == ADMIN_LOGIN_PATH {
        ctx.login_limiter.check_admin(client)
    } else {
        ctx.login_limiter.check_student(client)
    };

    if let Err(e) = result {
        tracing::warn!(path = %request.uri().path(), client = %client, "Login rate limit exceeded");
        return Err(e);
    }

    Ok(next.run(request).await)
}
