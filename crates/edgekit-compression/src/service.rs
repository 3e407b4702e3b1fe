//! Compression service implementation.

use crate::config::CompressionConfig;
use crate::encoding::Encoding;
use bytes::Bytes;
use futures::future::BoxFuture;
use http::{header, Request, Response};
use std::task::{Context, Poll};
use tower::Service;

/// Service that encodes response bodies when the client and content allow.
#[derive(Clone)]
pub struct Compression<S> {
    inner: S,
    config: CompressionConfig,
}

impl<S> Compression<S> {
    pub(crate) fn new(inner: S, config: CompressionConfig) -> Self {
        Self { inner, config }
    }
}

impl<S, B> Service<Request<B>> for Compression<S>
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
        let accepted = request
            .headers()
            .get(header::ACCEPT_ENCODING)
            .and_then(|value| value.to_str().ok())
            .and_then(Encoding::negotiate);
        let config = self.config.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let response = inner.call(request).await?;

            let Some(encoding) = accepted else {
                return Ok(response);
            };
            if !should_compress(&config, &response) {
                return Ok(response);
            }

            let (mut parts, body) = response.into_parts();
            match encoding.encode(&body) {
                Ok(encoded) => {
                    parts
                        .headers
                        .insert(header::CONTENT_ENCODING, static_value(encoding.token()));
                    if let Ok(length) = http::HeaderValue::from_str(&encoded.len().to_string()) {
                        parts.headers.insert(header::CONTENT_LENGTH, length);
                    }
                    parts
                        .headers
                        .insert(header::VARY, static_value("accept-encoding"));
                    Ok(Response::from_parts(parts, Bytes::from(encoded)))
                }
                Err(error) => {
                    // Serve the original body rather than fail the request.
                    tracing::warn!(
                        compressor = %config.name,
                        %error,
                        "response encoding failed, sending identity"
                    );
                    Ok(Response::from_parts(parts, body))
                }
            }
        })
    }
}

fn static_value(token: &'static str) -> http::HeaderValue {
    http::HeaderValue::from_static(token)
}

fn should_compress(config: &CompressionConfig, response: &Response<Bytes>) -> bool {
    // Already encoded responses are left alone.
    if response.headers().contains_key(header::CONTENT_ENCODING) {
        return false;
    }

    let declared = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| response.body().len());
    if declared < config.threshold {
        return false;
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let normalized = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if normalized.starts_with("image/")
        || normalized.starts_with("audio/")
        || normalized.starts_with("video/")
    {
        return false;
    }
    if config
        .excluded_mime_types
        .iter()
        .any(|excluded| *excluded == normalized)
    {
        return false;
    }
    true
}
