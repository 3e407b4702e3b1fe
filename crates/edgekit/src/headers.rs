//! Standard response header decoration.
//!
//! Success responses leaving the pipeline carry the cross-origin headers and
//! a `Connection` header matching the client's preference. Rejections built
//! inside the pipeline already carry their own header set.

use bytes::Bytes;
use futures::future::BoxFuture;
use http::{header, HeaderValue, Request, Response};
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Layer applying the standard outbound header set.
#[derive(Clone, Default)]
pub struct StandardHeadersLayer;

impl StandardHeadersLayer {
    /// Creates the layer.
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for StandardHeadersLayer {
    type Service = StandardHeaders<S>;

    fn layer(&self, service: S) -> Self::Service {
        StandardHeaders { inner: service }
    }
}

/// Service applying the standard outbound header set.
#[derive(Clone)]
pub struct StandardHeaders<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for StandardHeaders<S>
where
    S: Service<Request<B>, Response = Response<Bytes>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    B: Send + 'static,
{
    type Response = Response<Bytes>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        let keep_alive = request
            .headers()
            .get(header::CONNECTION)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.eq_ignore_ascii_case("keep-alive"))
            .unwrap_or(false);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let mut response = inner.call(request).await?;
            let headers = response.headers_mut();

            headers.insert(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            );
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("POST, GET, OPTIONS, PUT"),
            );
            if !headers.contains_key(header::CONNECTION) {
                headers.insert(
                    header::CONNECTION,
                    HeaderValue::from_static(if keep_alive { "keep-alive" } else { "close" }),
                );
            }
            if !headers.contains_key(header::CONTENT_LENGTH) {
                if let Ok(length) = HeaderValue::from_str(&response.body().len().to_string()) {
                    response.headers_mut().insert(header::CONTENT_LENGTH, length);
                }
            }
            Ok(response)
        })
    }
}
