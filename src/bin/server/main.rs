#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Contact form gateway server

use std::{
    net::{Ipv6Addr, SocketAddr},
    sync::Arc,
};

use anyhow::{anyhow, Result};
use chrono::Duration;
use clap::Parser;
use contact_gateway::{
    domain::{
        communication::email_addresses::EmailAddress,
        contact::{ContactServiceImpl, ContactSettings},
    },
    infrastructure::{
        email::smtp::{SMTPConfig, SMTPMailer},
        http::{
            servers::{http::HttpServer, https::HttpsServer},
            state::{AppConfig, AppState},
            ContactConfig, HttpServerConfig, Server,
        },
        rate_limit::memory::InMemoryRateLimitStore,
    },
};
use tracing::info;

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// The HTTP server configuration
    #[clap(flatten)]
    pub server: HttpServerConfig,

    /// The contact endpoint configuration
    #[clap(flatten)]
    pub contact: ContactConfig,

    /// The SMTP configuration
    #[clap(flatten)]
    pub smtp: SMTPConfig,
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let rate_limit_window = Duration::seconds(i64::from(args.contact.rate_limit_seconds));
    let settings = ContactSettings {
        recipient: EmailAddress::new(&args.contact.recipient)
            .map_err(|e| anyhow!("invalid contact recipient: {e}"))?,
        subject_prefix: args.contact.subject_prefix,
        site_name: args.contact.site_name,
        rate_limit_window,
    };

    let contact = ContactServiceImpl::new(
        settings,
        Arc::new(InMemoryRateLimitStore::new(rate_limit_window)),
        Arc::new(SMTPMailer::new(args.smtp)?),
    );

    let tls = args.server.cert_path.is_some() && args.server.key_path.is_some();
    let config = AppConfig::new(&args.contact.allowed_origin)?.with_secure_cookies(tls);
    let state = AppState::new(config, contact);
    let address = SocketAddr::new(Ipv6Addr::UNSPECIFIED.into(), args.server.http_port);

    info!(%address, "starting contact gateway");

    match (&args.server.cert_path, &args.server.key_path) {
        (Some(cert_path), Some(key_path)) => {
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| anyhow!("failed to install the rustls crypto provider"))?;

            HttpsServer::new(address, cert_path, key_path, state)
                .await?
                .run()
                .await
        }
        _ => HttpServer::new(address, state).await?.run().await,
    }
}
