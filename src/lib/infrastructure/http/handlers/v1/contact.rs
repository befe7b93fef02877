//! Contact form handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::contact::{ContactForm, ContactService, Delivery, SessionId},
    infrastructure::http::{
        errors::{ApiError, ErrorResponse},
        state::AppState,
    },
};

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "contact_session";

/// Send message response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendMessageResponse {
    /// Always `true`
    #[schema(example = true)]
    pub success: bool,

    /// Confirmation shown to the sender
    #[schema(example = "Your message has been sent.")]
    pub message: String,
}

impl SendMessageResponse {
    fn sent() -> Self {
        Self {
            success: true,
            message: "Your message has been sent.".to_string(),
        }
    }
}

/// Send a message through the contact form
#[utoipa::path(
    post,
    operation_id = "send_contact_message",
    tag = "Contact",
    path = "/api/v1/contact",
    request_body = ContactForm,
    responses(
        (status = StatusCode::OK, description = "Message sent", body = SendMessageResponse),
        (status = StatusCode::BAD_REQUEST, description = "Malformed JSON", body = ErrorResponse, example = json!({"success": false, "error": "Invalid data."})),
        (status = StatusCode::METHOD_NOT_ALLOWED, description = "Not a POST request", body = ErrorResponse),
        (status = StatusCode::UNSUPPORTED_MEDIA_TYPE, description = "Not a JSON body", body = ErrorResponse),
        (status = StatusCode::UNPROCESSABLE_ENTITY, description = "Validation failed", body = ErrorResponse, example = json!({"success": false, "errors": ["Invalid name.", "Invalid email."]})),
        (status = StatusCode::TOO_MANY_REQUESTS, description = "Sent too recently", body = ErrorResponse),
        (status = StatusCode::INTERNAL_SERVER_ERROR, description = "Could not send", body = ErrorResponse),
    )
)]
pub async fn handler<C: ContactService>(
    State(state): State<AppState<C>>,
    jar: CookieJar,
    request: Result<Json<ContactForm>, JsonRejection>,
) -> Result<(CookieJar, Json<SendMessageResponse>), ApiError> {
    let Json(form) = request?;
    let (session, jar) = session(jar, state.config.secure_cookies);

    // Discarded bot submissions get exactly the same answer as real sends.
    match state.contact.send_message(&session, form).await? {
        Delivery::Sent | Delivery::Discarded => Ok((jar, Json(SendMessageResponse::sent()))),
    }
}

/// Rejects every method but POST
pub async fn method_not_allowed() -> ApiError {
    ApiError::new_405("Method not allowed.")
}

/// Reads the session id from `jar`, minting and setting a new one if absent
fn session(jar: CookieJar, secure: bool) -> (SessionId, CookieJar) {
    if let Some(session) = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| SessionId::parse(cookie.value()))
    {
        return (session, jar);
    }

    let session = SessionId::generate();
    let cookie = Cookie::build((SESSION_COOKIE, session.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax);

    (session, jar.add(cookie))
}
