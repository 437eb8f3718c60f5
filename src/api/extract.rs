/// Extractors whose rejections render as `GateError` bodies
use crate::error::GateError;
use axum::extract::{
    rejection::{JsonRejection, PathRejection},
    FromRequest, FromRequestParts,
};

/// `axum::Json` with a `{success, error, message}` rejection
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(GateError))]
pub struct JsonBody<T>(pub T);

/// `axum::extract::Path` with a `{success, error, message}` rejection
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(GateError))]
pub struct PathParam<T>(pub T);

impl From<JsonRejection> for GateError {
    fn from(rejection: JsonRejection) -> Self {
        GateError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for GateError {
    fn from(rejection: PathRejection) -> Self {
        GateError::InvalidInput(rejection.body_text())
    }
}
