//! HTTPS application server

use std::net::SocketAddr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::Router;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing::{debug, info};

use crate::{
    domain::contact::ContactService,
    infrastructure::http::{router, shutdown_signal, state::AppState, Server},
};

/// The application's HTTPS server
#[derive(Debug)]
pub struct HttpsServer {
    router: Router,
    address: SocketAddr,
    tls_config: RustlsConfig,
}

impl HttpsServer {
    /// Returns a new HTTPS server for `address`, using the PEM files at the given paths.
    pub async fn new(
        address: SocketAddr,
        cert_path: &str,
        key_path: &str,
        state: AppState<impl ContactService>,
    ) -> Result<Self> {
        let tls_config = RustlsConfig::from_pem_file(cert_path, key_path)
            .await
            .context("failed to load TLS config")?;

        Ok(Self {
            router: router(state),
            address,
            tls_config,
        })
    }
}

#[async_trait]
impl Server for HttpsServer {
    #[mutants::skip]
    async fn run(self) -> Result<()> {
        debug!("HTTPS Server listening on {}", self.address);

        let handle = Handle::new();
        tokio::spawn(shutdown_signal(Some(handle.clone())));

        axum_server::bind_rustls(self.address, self.tls_config)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await
            .context("server error")?;

        info!("HTTPS server stopped");

        Ok(())
    }
}
