//! Cached Client
//!
//! The request pipeline: the interceptor prepares the write side, the cache
//! transport gets the first chance to answer, and the real transport handles
//! everything else. Callers see the same success/error outcome whether or not
//! a response came from cache.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::{CacheContext, StatsSnapshot};
use crate::config::CacheConfig;
use crate::error::FetchError;
use crate::interceptor::{Interceptor, SuccessHandler};
use crate::models::{CacheOptions, Completion, Payload, Request, ResponseKind};
use crate::tasks::spawn_sweep_task;
use crate::transport::{CacheTransport, Dispatch, Transport, PARSE_ERROR};

/// Receives the failure of a request.
pub type ErrorHandler = Box<dyn FnOnce(FetchError) + Send>;

/// Completion handlers for one request.
#[derive(Default)]
pub struct Handlers {
    pub success: Option<SuccessHandler>,
    pub error: Option<ErrorHandler>,
}

impl Handlers {
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Payload) + Send + 'static,
    {
        self.success = Some(Box::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: FnOnce(FetchError) + Send + 'static,
    {
        self.error = Some(Box::new(f));
        self
    }
}

// == Cached Client ==
#[derive(Clone)]
pub struct CachedClient {
    ctx: Arc<CacheContext>,
    interceptor: Interceptor,
    cache_transport: CacheTransport,
    transport: Arc<dyn Transport>,
}

impl CachedClient {
    // == Constructor ==
    pub fn new(ctx: CacheContext, transport: Arc<dyn Transport>) -> Self {
        let ctx = Arc::new(ctx);
        Self {
            interceptor: Interceptor::new(Arc::clone(&ctx)),
            cache_transport: CacheTransport::new(Arc::clone(&ctx)),
            ctx,
            transport,
        }
    }

    /// Creates a client from configuration, with the default file store.
    pub fn from_config(config: &CacheConfig, transport: Arc<dyn Transport>) -> Self {
        Self::new(CacheContext::from_config(config), transport)
    }

    pub fn context(&self) -> &Arc<CacheContext> {
        &self.ctx
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.ctx.stats().snapshot()
    }

    /// Starts sweeping the default storage at the context's sweep interval.
    ///
    /// Must be called from within a tokio runtime. Abort the returned handle
    /// on shutdown.
    pub fn spawn_sweep(&self) -> JoinHandle<()> {
        spawn_sweep_task(
            Arc::clone(self.ctx.default_storage()),
            Arc::clone(self.ctx.clock()),
            self.ctx.sweep_interval(),
        )
    }

    // == Execute ==
    /// Runs `request` through the pipeline and returns its dispatch.
    ///
    /// On a cache hit the handlers have already run when this returns. The
    /// returned dispatch can be cancelled; for a cache hit that is a no-op.
    pub fn execute(
        &self,
        request: Request,
        options: &CacheOptions,
        handlers: Handlers,
    ) -> Dispatch {
        let success = self.interceptor.prefilter(&request, options, handlers.success);

        let mut dispatch = match self.cache_transport.handler(&request, options) {
            Some(hit) => Dispatch::SyntheticHit(hit),
            None => Dispatch::RealDispatch(self.transport.open(&request)),
        };
        debug!(
            url = %request.url,
            cache_enabled = options.is_enabled(),
            cache_hit = dispatch.is_cache_hit(),
            "Dispatching request"
        );

        let kind = request.response_kind.clone();
        let error = handlers.error;
        dispatch.send(
            &request,
            Box::new(move |completion| deliver(completion, &kind, success, error)),
        );
        dispatch
    }

    // == Fetch ==
    /// Runs `request` and waits for its payload.
    pub async fn fetch(
        &self,
        request: Request,
        options: &CacheOptions,
    ) -> Result<Payload, FetchError> {
        let (tx, rx) = oneshot::channel();
        let tx = Arc::new(Mutex::new(Some(tx)));
        let on_error = Arc::clone(&tx);

        let handlers = Handlers::default()
            .on_success(move |payload| {
                if let Some(tx) = tx.lock().take() {
                    let _ = tx.send(Ok(payload));
                }
            })
            .on_error(move |err| {
                if let Some(tx) = on_error.lock().take() {
                    let _ = tx.send(Err(err));
                }
            });

        let _dispatch = self.execute(request, options, handlers);
        rx.await.map_err(|_| FetchError::Cancelled)?
    }
}

/// Routes a completion to the success or the error handler.
fn deliver(
    mut completion: Completion,
    kind: &ResponseKind,
    success: Option<SuccessHandler>,
    error: Option<ErrorHandler>,
) {
    let outcome = if completion.status == 0 {
        Err(FetchError::Transport(completion.status_text.clone()))
    } else if !completion.is_success() {
        Err(FetchError::Status {
            status: completion.status,
            status_text: completion.status_text.clone(),
        })
    } else if completion.status_text == PARSE_ERROR {
        Err(FetchError::Parse(kind.as_str().to_string()))
    } else {
        completion
            .take_payload(kind)
            .ok_or_else(|| FetchError::Parse(kind.as_str().to_string()))
    };

    match outcome {
        Ok(payload) => {
            if let Some(handler) = success {
                handler(payload);
            }
        }
        Err(err) => {
            if let Some(handler) = error {
                handler(err);
            }
        }
    }
}
