//! Plain HTTP application server

use std::net::{SocketAddr, TcpListener};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::Router;
use axum_server::Handle;
use tracing::{debug, info};

use crate::{
    domain::contact::ContactService,
    infrastructure::http::{router, shutdown_signal, state::AppState, Server},
};

/// The application's HTTP server
#[derive(Debug)]
pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    /// Returns a new HTTP server bound to `address`.
    pub async fn new(address: SocketAddr, state: AppState<impl ContactService>) -> Result<Self> {
        let listener = TcpListener::bind(address)
            .with_context(|| format!("failed to listen on {address}"))?;
        listener
            .set_nonblocking(true)
            .context("failed to make listener non-blocking")?;

        Ok(Self {
            router: router(state),
            listener,
        })
    }

    /// The address the server is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("failed to get local address")
    }

    /// Serves requests until `handle` is shut down, draining open connections first.
    pub async fn serve(self, handle: Handle) -> Result<()> {
        debug!("HTTP Server listening on {}", self.local_addr()?);

        axum_server::from_tcp(self.listener)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await
            .context("server error")?;

        info!("HTTP server stopped");

        Ok(())
    }
}

#[async_trait]
impl Server for HttpServer {
    /// Runs the HTTP server.
    #[mutants::skip]
    async fn run(self) -> Result<()> {
        let handle = Handle::new();
        tokio::spawn(shutdown_signal(Some(handle.clone())));

        self.serve(handle).await
    }
}
