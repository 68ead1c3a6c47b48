use async_trait::async_trait;
use axum::{
    extract::{Form, FromRequest, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    service::email::{build_contact_email_html, contact_subject, OutgoingEmail},
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ContactResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ContactResponse {
            ok: false,
            error: Some(message.to_string()),
        }),
    )
        .into_response()
}

/// Accepts the contact payload as JSON or as a classic URL-encoded form post.
pub struct JsonOrForm<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send + 'static,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if content_type.starts_with("application/json") {
            let Json(payload) = Json::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(Self(payload));
        }
        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(payload) = Form::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(Self(payload));
        }
        Err(StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response())
    }
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/contact", post(contact))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Message relayed", body = ContactResponse),
        (status = 400, description = "Missing required fields", body = ContactResponse),
        (status = 429, description = "Rate limit exceeded"),
        (status = 500, description = "Relay failure", body = ContactResponse)
    ),
    tag = "contact"
)]
pub async fn contact(
    State(state): State<Arc<AppState>>,
    JsonOrForm(payload): JsonOrForm<ContactRequest>,
) -> Response {
    let name = payload.name.as_deref().unwrap_or_default();
    let email = payload.email.as_deref().unwrap_or_default();
    let message = payload.message.as_deref().unwrap_or_default();

    if name.is_empty() || email.is_empty() || message.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "Missing fields.");
    }

    let subject = payload.subject.as_deref();
    let config = state.config().values();

    let outgoing = OutgoingEmail {
        from: format!(
            "Portfolio Contact <{}>",
            config.from_email.as_deref().unwrap_or_default()
        ),
        to: config.to_email.clone().unwrap_or_default(),
        reply_to: Some(email.to_string()),
        subject: contact_subject(subject),
        html_body: build_contact_email_html(name, email, subject, message),
    };

    match state.email().send(outgoing).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ContactResponse {
                ok: true,
                error: None,
            }),
        )
            .into_response(),
        Err(err) => {
            // Full detail stays server-side; the client gets a generic error.
            tracing::error!(code = err.code, "contact email send failed: {}", err.message);
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send email.")
        }
    }
}
