//! Body extractors that reject malformed input with the gateway's JSON
//! error body instead of axum's plain-text rejection.

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{FromRequest, Request};
use axum::{Form, Json};

use crate::GatewayError;

/// `Json<T>` with rejections mapped to `400 {"detail": ...}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// `Form<T>` with rejections mapped to `400 {"detail": ...}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiForm<T>(pub T);

#[async_trait::async_trait]
impl<T, S> FromRequest<S> for ApiForm<T>
where
    Form<T>: FromRequest<S, Rejection = FormRejection>,
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::BadRequest(rejection.body_text())
    }
}

impl From<FormRejection> for GatewayError {
    fn from(rejection: FormRejection) -> Self {
        GatewayError::BadRequest(rejection.body_text())
    }
}
