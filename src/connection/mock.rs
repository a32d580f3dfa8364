//! Scripted backend for unit tests

use super::factory::ConnectionFactory;
use super::types::{ApiRequest, ApiResponse, Connection, ConnectionRequest};
use crate::auth::AuthToken;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

pub(crate) type Handler = Arc<dyn Fn(&ApiRequest) -> Result<ApiResponse> + Send + Sync>;

/// Connection answering every request through a handler
pub(crate) struct ScriptedConnection {
    server_url: Url,
    auth: AuthToken,
    handler: Handler,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
    closed: bool,
}

impl ScriptedConnection {
    pub(crate) fn new(server_url: &str, handler: Handler) -> Self {
        Self {
            server_url: Url::parse(server_url).unwrap(),
            auth: AuthToken::Anonymous,
            handler,
            requests: Arc::new(Mutex::new(Vec::new())),
            closed: false,
        }
    }

    /// Shared log of every request received
    pub(crate) fn requests(&self) -> Arc<Mutex<Vec<ApiRequest>>> {
        Arc::clone(&self.requests)
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    fn server_url(&self) -> &Url {
        &self.server_url
    }

    fn auth(&self) -> &AuthToken {
        &self.auth
    }

    async fn execute(&mut self, request: ApiRequest) -> Result<ApiResponse> {
        if self.closed {
            return Err(Error::UseAfterClose);
        }
        self.requests.lock().unwrap().push(request.clone());
        (self.handler)(&request)?.error_for_status()
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Factory with fixed answers to `can_open`/`priority`, counting `open` calls
pub(crate) struct ScriptedFactory {
    pub(crate) name: String,
    pub(crate) claims: bool,
    pub(crate) priority: i32,
    pub(crate) opened: AtomicUsize,
    handler: Handler,
}

impl ScriptedFactory {
    pub(crate) fn new(name: &str, claims: bool, priority: i32) -> Self {
        Self::with_handler(
            name,
            claims,
            priority,
            Arc::new(|_: &ApiRequest| Ok(ApiResponse::new(200, "{}"))),
        )
    }

    pub(crate) fn with_handler(name: &str, claims: bool, priority: i32, handler: Handler) -> Self {
        Self {
            name: name.to_string(),
            claims,
            priority,
            opened: AtomicUsize::new(0),
            handler,
        }
    }

    pub(crate) fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionFactory for ScriptedFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_open(&self, _request: &ConnectionRequest) -> bool {
        self.claims
    }

    fn priority(&self, _request: &ConnectionRequest) -> i32 {
        self.priority
    }

    async fn open(&self, request: &ConnectionRequest) -> Result<Box<dyn Connection>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedConnection::new(
            request.server_url(),
            Arc::clone(&self.handler),
        )))
    }
}
