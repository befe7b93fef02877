//! HTTP Server

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    Router,
};
use axum_server::Handle;
use clap::Parser;
use handlers::{panic_handler, v1};
use state::AppState;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info_span};

use crate::domain::contact::ContactService;

pub mod client;
pub mod errors;
pub mod handlers;
pub mod open_api;
pub mod servers;
pub mod state;

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
pub struct HttpServerConfig {
    /// The port to listen on
    #[arg(long, env = "HTTP_PORT", default_value = "3000")]
    pub http_port: u16,

    /// TLS certificate (PEM); serves HTTPS when set together with the key
    #[arg(long, env = "TLS_CERT_PATH", requires = "key_path")]
    pub cert_path: Option<String>,

    /// TLS private key (PEM)
    #[arg(long, env = "TLS_KEY_PATH", requires = "cert_path")]
    pub key_path: Option<String>,
}

/// Configuration for the contact endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
pub struct ContactConfig {
    /// The only origin allowed to call the API from a browser, without trailing slash
    #[arg(long, env = "CONTACT_ALLOWED_ORIGIN")]
    pub allowed_origin: String,

    /// Where contact messages are delivered
    #[arg(long = "contact-recipient", env = "CONTACT_RECIPIENT")]
    pub recipient: String,

    /// Prefix of every outgoing subject line
    #[arg(
        long = "contact-subject-prefix",
        env = "CONTACT_SUBJECT_PREFIX",
        default_value = "[Contact] New message"
    )]
    pub subject_prefix: String,

    /// Site name shown in outgoing emails
    #[arg(long = "contact-site-name", env = "CONTACT_SITE_NAME", default_value = "Contact")]
    pub site_name: String,

    /// Minimum number of seconds between two messages from one session
    #[arg(
        long = "contact-rate-limit-seconds",
        env = "CONTACT_RATE_LIMIT_SECONDS",
        default_value = "60"
    )]
    pub rate_limit_seconds: u32,
}

/// A runnable server
#[async_trait]
pub trait Server {
    /// Serve requests until a shutdown signal arrives
    async fn run(self) -> Result<()>;
}

/// Create the application's router
pub fn router<C: ContactService>(state: AppState<C>) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        let uri = request.uri().to_string();
        info_span!("http_request", method = ?request.method(), uri)
    });

    let cors_layer = CorsLayer::new()
        .allow_origin(AllowOrigin::list([state.config.allowed_origin.clone()]))
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .nest("/api/v1", v1::router())
        .layer(cors_layer)
        .layer(middleware::from_fn_with_state(
            state.config.allowed_origin.clone(),
            strip_foreign_cors_headers,
        ))
        .layer(CompressionLayer::new())
        .layer(CatchPanicLayer::custom(panic_handler))
        .layer(trace_layer)
        .with_state(state)
}

/// Removes every CORS header from responses to origins other than `allowed_origin`
async fn strip_foreign_cors_headers(
    State(allowed_origin): State<HeaderValue>,
    request: Request,
    next: Next,
) -> Response {
    let foreign = request
        .headers()
        .get(header::ORIGIN)
        .is_some_and(|origin| *origin != allowed_origin);

    let mut response = next.run(request).await;

    if foreign {
        let headers = response.headers_mut();
        for name in [
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            header::ACCESS_CONTROL_ALLOW_METHODS,
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            header::ACCESS_CONTROL_EXPOSE_HEADERS,
            header::ACCESS_CONTROL_MAX_AGE,
        ] {
            headers.remove(name);
        }
    }

    response
}

/// Resolves once Ctrl+C or SIGTERM is received, then starts a graceful shutdown
#[mutants::skip]
pub async fn shutdown_signal(handle: Option<Handle>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    if let Some(handle) = handle {
        debug!("shutting down gracefully");
        handle.graceful_shutdown(Some(Duration::from_secs(10)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_contact_config(rate_limit: &str) -> Result<ContactConfig, clap::Error> {
        ContactConfig::try_parse_from([
            "server",
            "--allowed-origin=https://www.example.com",
            "--contact-recipient=owner@example.com",
            &format!("--contact-rate-limit-seconds={rate_limit}"),
        ])
    }

    #[test]
    fn test_rate_limit_seconds_is_parsed() -> Result<(), clap::Error> {
        assert_eq!(parse_contact_config("90")?.rate_limit_seconds, 90);

        Ok(())
    }

    #[test]
    fn test_negative_rate_limit_is_rejected() {
        assert!(parse_contact_config("-5").is_err());
    }

    #[test]
    fn test_oversized_rate_limit_is_rejected() {
        assert!(parse_contact_config("99999999999999999999").is_err());
    }
}
