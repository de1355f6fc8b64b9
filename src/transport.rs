// src/transport.rs
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::HttpSettings;
use crate::error::FetchError;

/// A fully read response. The body is drained while the host slot is held.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Process-wide HTTP transport shared by the checker, feed client and uploader.
///
/// Cloning is cheap: the connection pool and the per-host limits are shared.
#[derive(Clone)]
pub struct Transport {
    client: Client,
    max_conns_per_host: usize,
    hosts: Arc<Mutex<HashMap<String, Arc<Semaphore>>>>,
}

impl Transport {
    pub fn new(cfg: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .pool_max_idle_per_host(cfg.max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
            .build()
            .context("building http client")?;
        Ok(Self {
            client,
            max_conns_per_host: cfg.max_conns_per_host.max(1),
            hosts: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Send a request and read its whole body while holding a connection
    /// slot for its host. The slot is released on every exit path.
    pub async fn send(&self, req: RequestBuilder) -> Result<Fetched, FetchError> {
        let req = req.build().map_err(FetchError::Request)?;
        let _permit = self.acquire(req.url().host_str().unwrap_or_default()).await;
        let resp = self.client.execute(req).await?;
        let status = resp.status();
        let body = resp.bytes().await?.to_vec();
        Ok(Fetched { status, body })
    }

    async fn acquire(&self, host: &str) -> Option<OwnedSemaphorePermit> {
        let sem = {
            let mut hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
            hosts
                .entry(host.to_string())
                .or_insert_with(|| Arc::new(Semaphore::new(self.max_conns_per_host)))
                .clone()
        };
        // The semaphore is never closed, so this only fails if that changes.
        sem.acquire_owned().await.ok()
    }
}
