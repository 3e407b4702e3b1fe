//! Business-error boundary.
//!
//! Errors escaping the business handler are caught here, logged at warn
//! with a bounded source chain, and mapped to a bare 500. The boundary sits
//! below the filter stages, so gate rejections (which must reach the
//! transport as errors, not responses) are unaffected.

use bytes::Bytes;
use futures::future::BoxFuture;
use http::{header, Request, Response, StatusCode};
use std::marker::PhantomData;
use std::task::{Context, Poll};
use tower::{Layer, Service};

// Frames of the error source chain worth logging.
const MAX_CHAIN_DEPTH: usize = 10;

/// Layer that converts inner-service errors into 500 responses.
///
/// `E` is the error type the surrounding stack expects; the boundary itself
/// never produces one.
pub struct ErrorBoundaryLayer<E> {
    _marker: PhantomData<fn() -> E>,
}

impl<E> ErrorBoundaryLayer<E> {
    /// Creates the layer.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E> Default for ErrorBoundaryLayer<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for ErrorBoundaryLayer<E> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<S, E> Layer<S> for ErrorBoundaryLayer<E> {
    type Service = ErrorBoundary<S, E>;

    fn layer(&self, service: S) -> Self::Service {
        ErrorBoundary {
            inner: service,
            _marker: PhantomData,
        }
    }
}

/// Service converting inner errors into 500 responses.
pub struct ErrorBoundary<S, E> {
    inner: S,
    _marker: PhantomData<fn() -> E>,
}

impl<S: Clone, E> Clone for ErrorBoundary<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S, B, E> Service<Request<B>> for ErrorBoundary<S, E>
where
    S: Service<Request<B>, Response = Response<Bytes>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: std::error::Error + Send + 'static,
    B: Send + 'static,
    E: Send + 'static,
{
    type Response = Response<Bytes>;
    type Error = E;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        let mut inner = self.inner.clone();
        Box::pin(async move {
            match inner.call(request).await {
                Ok(response) => Ok(response),
                Err(error) => {
                    tracing::warn!(
                        error = %error,
                        chain = %render_chain(&error),
                        "business handler failed, answering 500"
                    );
                    Ok(internal_error())
                }
            }
        })
    }
}

fn render_chain(error: &dyn std::error::Error) -> String {
    let mut rendered = String::new();
    let mut source = error.source();
    let mut depth = 0;
    while let Some(cause) = source {
        if depth >= MAX_CHAIN_DEPTH {
            rendered.push_str(" -> ...");
            break;
        }
        rendered.push_str(" -> ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
        depth += 1;
    }
    rendered
}

fn internal_error() -> Response<Bytes> {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_LENGTH, 0)
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "close")
        .body(Bytes::new())
        .unwrap_or_else(|_| Response::new(Bytes::new()))
}
