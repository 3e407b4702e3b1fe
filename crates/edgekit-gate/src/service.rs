//! Gate service implementation.

use crate::error::GateError;
use crate::gate::ConnectionGate;
use edgekit_core::PeerAddr;
use futures::future::BoxFuture;
use http::Request;
use std::task::{Context, Poll};
use tower::Service;

/// Service that counts each call against its remote IP's connection budget.
///
/// The remote IP is read from the [`PeerAddr`] request extension inserted by
/// the transport; requests without one fall into the shared "unknown"
/// bucket. The permit is held for the duration of the wrapped call.
#[derive(Clone)]
pub struct Gate<S> {
    inner: S,
    gate: ConnectionGate,
}

impl<S> Gate<S> {
    pub(crate) fn new(inner: S, gate: ConnectionGate) -> Self {
        Self { inner, gate }
    }
}

impl<S, B> Service<Request<B>> for Gate<S>
where
    S: Service<Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    S::Error: From<GateError> + Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        let peer = request
            .extensions()
            .get::<PeerAddr>()
            .copied()
            .unwrap_or(PeerAddr(None));
        let gate = self.gate.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let permit = gate.try_acquire(peer)?;
            let result = inner.call(request).await;
            drop(permit);
            result
        })
    }
}
