/// Authentication extractors
use crate::{
    admin::AdminGrant, api::middleware::extract_bearer_token, context::AppContext,
    error::GateError,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Admin authentication context - requires a valid admin grant token
#[derive(Debug, Clone)]
pub struct AdminAuthContext {
    pub grant: AdminGrant,
}

#[async_trait]
impl FromRequestParts<AppContext> for AdminAuthContext {
    type Rejection = GateError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| GateError::Authentication("Missing authorization header".to_string()))?;

        let grant = state.admin_authority.verify_token(&token).await?;
        tracing::debug!(token_id = %grant.token_id(), "AdminAuthContext: admin grant verified");

        Ok(AdminAuthContext { grant })
    }
}
