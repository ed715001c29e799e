//! HTTP surface and server host.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::middleware;
use axum::routing::get;
use contacts_store::ContactStore;
use contacts_types::{ContactId, PhoneId};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::cache::ResponseCache;
use crate::config::ApiConfig;
use crate::endpoint::{ContactsEndpoint, EndpointResponse};
use crate::error::ApiError;
use crate::middleware::{advertise_versions, cors, log_requests};

type HandlerResult = Result<EndpointResponse, ApiError>;

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    search: Option<String>,
}

/// Build the application router over an endpoint.
pub fn router(endpoint: ContactsEndpoint) -> Router {
    let config = Arc::clone(endpoint.config());
    Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route(
            "/contacts/{id}",
            get(get_contact).put(update_contact).patch(patch_contact).delete(delete_contact),
        )
        .route("/contacts/{id}/phones", get(list_phones))
        .route("/contacts/{id}/phones/{phone_id}", get(get_phone))
        .layer(middleware::from_fn_with_state(Arc::clone(&config), cors))
        .layer(middleware::from_fn_with_state(config, advertise_versions))
        .layer(middleware::from_fn(log_requests))
        .with_state(endpoint)
}

async fn list_contacts(State(endpoint): State<ContactsEndpoint>, Query(query): Query<ListQuery>, headers: HeaderMap) -> HandlerResult {
    endpoint.list_contacts(&headers, query.search.as_deref()).await
}

async fn get_contact(State(endpoint): State<ContactsEndpoint>, Path(id): Path<ContactId>, headers: HeaderMap) -> HandlerResult {
    endpoint.get_contact(&headers, id).await
}

async fn create_contact(State(endpoint): State<ContactsEndpoint>, headers: HeaderMap, body: Bytes) -> HandlerResult {
    endpoint.create_contact(&headers, &body).await
}

async fn update_contact(State(endpoint): State<ContactsEndpoint>, Path(id): Path<ContactId>, headers: HeaderMap, body: Bytes) -> HandlerResult {
    endpoint.update_contact(&headers, id, &body).await
}

async fn patch_contact(State(endpoint): State<ContactsEndpoint>, Path(id): Path<ContactId>, headers: HeaderMap, body: Bytes) -> HandlerResult {
    endpoint.patch_contact(&headers, id, &body).await
}

async fn delete_contact(State(endpoint): State<ContactsEndpoint>, Path(id): Path<ContactId>, headers: HeaderMap) -> HandlerResult {
    endpoint.delete_contact(&headers, id).await
}

async fn list_phones(State(endpoint): State<ContactsEndpoint>, Path(id): Path<ContactId>, headers: HeaderMap) -> HandlerResult {
    endpoint.list_phones(&headers, id).await
}

async fn get_phone(
    State(endpoint): State<ContactsEndpoint>,
    Path((id, phone_id)): Path<(ContactId, PhoneId)>,
    headers: HeaderMap,
) -> HandlerResult {
    endpoint.get_phone(&headers, id, phone_id).await
}

/// Host configuration for a contacts API server instance.
#[derive(Clone)]
pub struct ContactsHttpServer {
    bind_address: SocketAddr,
    endpoint: ContactsEndpoint,
}

impl ContactsHttpServer {
    /// Create a server for a validated configuration and a store.
    pub fn new(config: ApiConfig, store: Arc<dyn ContactStore>) -> Result<Self> {
        let bind_address: SocketAddr = config
            .bind_address
            .parse()
            .map_err(|error| anyhow!("invalid bind address '{}': {error}", config.bind_address))?;
        Ok(Self {
            bind_address,
            endpoint: ContactsEndpoint::new(Arc::new(config), store),
        })
    }

    /// Override the configured bind address.
    pub fn with_bind_address(mut self, bind_address: SocketAddr) -> Self {
        self.bind_address = bind_address;
        self
    }

    /// Start serving and return a handle for inspection and shutdown.
    pub async fn start(self) -> Result<RunningContactsHttpServer> {
        let cancellation_token = CancellationToken::new();
        let sweeper_handle = spawn_cache_sweeper(self.endpoint.cache().clone(), cancellation_token.child_token());

        let listener = tokio::net::TcpListener::bind(self.bind_address).await?;
        let bound_address = listener.local_addr()?;
        let app = router(self.endpoint);

        let server_handle = tokio::spawn({
            let shutdown = cancellation_token.child_token();
            async move {
                let served = axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        shutdown.cancelled().await;
                    })
                    .await;
                if let Err(error) = served {
                    error!(%error, "contacts HTTP server stopped with an error");
                }
            }
        });

        info!(address = %bound_address, "contacts HTTP server listening");
        Ok(RunningContactsHttpServer {
            bind_address: bound_address,
            cancellation_token,
            server_handle,
            sweeper_handle,
        })
    }
}

/// Runtime handle for a running contacts API server.
#[derive(Debug)]
pub struct RunningContactsHttpServer {
    bind_address: SocketAddr,
    cancellation_token: CancellationToken,
    server_handle: JoinHandle<()>,
    sweeper_handle: JoinHandle<()>,
}

impl RunningContactsHttpServer {
    /// Return the bound socket address for the running server.
    pub fn bound_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Stop the server and wait for background tasks to finish.
    pub async fn stop(self) -> Result<()> {
        self.cancellation_token.cancel();
        self.sweeper_handle
            .await
            .map_err(|error| anyhow!("cache sweeper task failed: {error}"))?;
        self.server_handle
            .await
            .map_err(|error| anyhow!("contacts HTTP server task failed: {error}"))?;
        info!(address = %self.bind_address, "contacts HTTP server stopped");
        Ok(())
    }
}

/// Periodically drop expired entries that no reader has touched since they expired.
fn spawn_cache_sweeper(cache: ResponseCache, cancellation_token: CancellationToken) -> JoinHandle<()> {
    let period = cache.time_to_live().max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => break,
                _ = ticker.tick() => {
                    let evicted = cache.evict_expired();
                    if evicted > 0 {
                        debug!(evicted, "swept expired cache entries");
                    }
                }
            }
        }
    })
}
