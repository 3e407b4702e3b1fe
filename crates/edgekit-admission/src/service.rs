//! Admission service implementation.

use crate::config::AdmissionConfig;
use crate::framing::FramingError;
use bytes::Bytes;
use edgekit_core::{PeerAddr, RequestContext};
use futures::future::BoxFuture;
use http::{header, Method, Request, Response, StatusCode};
use std::task::{Context, Poll};
use tower::Service;

/// Service that runs the staged admission checks.
#[derive(Clone)]
pub struct Admission<S> {
    inner: S,
    config: AdmissionConfig,
}

impl<S> Admission<S> {
    pub(crate) fn new(inner: S, config: AdmissionConfig) -> Self {
        Self { inner, config }
    }
}

impl<S> Service<Request<Bytes>> for Admission<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response<Bytes>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Bytes>) -> Self::Future {
        // Context goes on the request before stage 1 runs.
        let remote_ip = request
            .extensions()
            .get::<PeerAddr>()
            .copied()
            .unwrap_or(PeerAddr(None))
            .display_key();
        let content_length = declared_or_actual_length(&request);
        let context = RequestContext::new(
            remote_ip.clone(),
            content_length,
            request.method().to_string(),
            request.uri().to_string(),
        );
        request.extensions_mut().insert(context);

        let policy = self.config.policy.load();
        let probe = self.config.probe.clone();
        let name = self.config.name.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let keep_alive = wants_keep_alive(&request);
            let method = request.method().clone();
            let path = request.uri().path().to_string();

            // 1. Health probe fast path.
            if let Some(response) = probe.respond(&method, &path) {
                return Ok(response);
            }

            // 2. Framing validity.
            if let Some(failure) = request.extensions().get::<FramingError>() {
                let status = failure.status();
                tracing::info!(
                    filter = %name,
                    remote_ip = %remote_ip,
                    %status,
                    "request rejected: framing failure"
                );
                return Ok(reject(status, keep_alive));
            }

            // 3. IP denial.
            if policy
                .denied_ip_prefixes
                .iter()
                .any(|prefix| remote_ip.starts_with(prefix.as_str()))
            {
                tracing::info!(
                    filter = %name,
                    remote_ip = %remote_ip,
                    "request rejected: denied IP prefix"
                );
                return Ok(reject(StatusCode::FORBIDDEN, keep_alive));
            }

            // 4. URI sanity.
            if !uri_is_sound(&path, &policy.denied_uri_prefixes, &policy.denied_extensions) {
                tracing::info!(
                    filter = %name,
                    remote_ip = %remote_ip,
                    uri = %path,
                    "request rejected: unsound URI"
                );
                return Ok(reject(StatusCode::NOT_FOUND, keep_alive));
            }

            // 5. Body size.
            if content_length > policy.max_body_bytes
                || request.body().len() as u64 > policy.max_body_bytes
            {
                tracing::info!(
                    filter = %name,
                    remote_ip = %remote_ip,
                    content_length,
                    "request rejected: body over limit"
                );
                return Ok(reject(StatusCode::PAYLOAD_TOO_LARGE, keep_alive));
            }

            // 6. Content type, for methods that carry a body.
            if carries_body(&method) {
                let content_type = request
                    .headers()
                    .get(header::CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("");
                let allowed = policy
                    .allowed_content_types
                    .iter()
                    .any(|token| content_type.contains(token.as_str()));
                if !allowed {
                    tracing::info!(
                        filter = %name,
                        remote_ip = %remote_ip,
                        content_type = %content_type,
                        "request rejected: content type not allowed"
                    );
                    return Ok(reject(StatusCode::UNSUPPORTED_MEDIA_TYPE, keep_alive));
                }
            }

            inner.call(request).await
        })
    }
}

fn declared_or_actual_length(request: &Request<Bytes>) -> u64 {
    request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| request.body().len() as u64)
}

fn wants_keep_alive(request: &Request<Bytes>) -> bool {
    request
        .headers()
        .get(header::CONNECTION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.eq_ignore_ascii_case("keep-alive"))
        .unwrap_or(false)
}

fn carries_body(method: &Method) -> bool {
    *method != Method::GET && *method != Method::HEAD && *method != Method::DELETE
}

fn uri_is_sound(path: &str, denied_prefixes: &[String], denied_extensions: &[String]) -> bool {
    if path.is_empty() || path.contains("..") || path.contains("//") {
        return false;
    }
    let lowered = path.to_ascii_lowercase();
    if denied_extensions.iter().any(|ext| lowered.ends_with(ext.as_str())) {
        return false;
    }
    if denied_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str())) {
        return false;
    }
    true
}

fn reject(status: StatusCode, keep_alive: bool) -> Response<Bytes> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_LENGTH, 0)
        .header(header::CACHE_CONTROL, "no-cache")
        .header(
            header::CONNECTION,
            if keep_alive { "keep-alive" } else { "close" },
        )
        .body(Bytes::new())
        .unwrap_or_else(|_| Response::new(Bytes::new()))
}
