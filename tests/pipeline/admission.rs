//! Admission scenarios.

use bytes::Bytes;
use edgekit_admission::{AdmissionConfig, AdmissionLayer, FilterPolicy, FramingError};
use edgekit_core::PeerAddr;
use http::{header, Method, Request, Response, StatusCode};
use std::net::IpAddr;
use tower::{ServiceBuilder, ServiceExt};

type Svc = tower::util::BoxCloneService<
    Request<Bytes>,
    Response<Bytes>,
    std::convert::Infallible,
>;

fn pipeline(layer: AdmissionLayer) -> Svc {
    let service = ServiceBuilder::new().layer(layer).service_fn(|_req: Request<Bytes>| async {
        Ok::<_, std::convert::Infallible>(Response::new(Bytes::from_static(b"downstream")))
    });
    tower::util::BoxCloneService::new(service)
}

fn request(method: Method, uri: &str, body: &'static [u8]) -> Request<Bytes> {
    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Bytes::from_static(body))
        .unwrap();
    req.extensions_mut()
        .insert(PeerAddr(Some("203.0.113.9".parse::<IpAddr>().unwrap())));
    req
}

#[tokio::test]
async fn healthz_is_byte_exact_with_headers() {
    let service = pipeline(AdmissionConfig::builder().build());
    let response = service
        .oneshot(request(Method::GET, "/healthz", b""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body().as_ref(), b"ok\n");
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain; charset=UTF-8"
    );
    assert_eq!(response.headers().get(header::CONTENT_LENGTH).unwrap(), "3");
}

#[tokio::test]
async fn every_health_endpoint_bypasses_the_filters() {
    // Health paths answer even when the policy would otherwise reject the IP.
    let layer = AdmissionConfig::builder()
        .policy(FilterPolicy {
            denied_ip_prefixes: vec!["203.".to_string()],
            ..FilterPolicy::default()
        })
        .build();
    let service = pipeline(layer);

    for path in ["/health", "/ping", "/readyz", "/_status"] {
        let response = service
            .clone()
            .oneshot(request(Method::GET, path, b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "path {path}");
    }

    // A non-health path from the same IP is denied.
    let response = service
        .oneshot(request(Method::GET, "/api/data", b""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn framing_failures_short_circuit_before_policy() {
    let service = pipeline(AdmissionConfig::builder().build());
    let mut req = request(Method::GET, "/api/data", b"");
    req.extensions_mut().insert(FramingError::Timeout);

    let response = service.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn admitted_uri_is_clean() {
    // A request that produces 200 never carries `..` or `//` or a denied
    // extension; anything with them stops at 404.
    let service = pipeline(AdmissionConfig::builder().build());

    for uri in ["/api/a/../b", "/api//b", "/files/setup.exe"] {
        let response = service
            .clone()
            .oneshot(request(Method::GET, uri, b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri {uri}");
    }

    let response = service
        .oneshot(request(Method::GET, "/api/a/b", b""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn content_length_boundary_at_the_limit() {
    let layer = AdmissionConfig::builder()
        .policy(FilterPolicy {
            max_body_bytes: 4,
            ..FilterPolicy::default()
        })
        .build();
    let service = pipeline(layer);

    let mut at_limit = request(Method::POST, "/api/data", b"abcd");
    at_limit
        .headers_mut()
        .insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
    let response = service.clone().oneshot(at_limit).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let over = request(Method::POST, "/api/data", b"abcde");
    let response = service.oneshot(over).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn put_xml_allowed_protobuf_rejected() {
    let service = pipeline(AdmissionConfig::builder().build());

    let mut xml = request(Method::PUT, "/api/data", b"<a/>\n");
    xml.headers_mut()
        .insert(header::CONTENT_TYPE, "application/xml".parse().unwrap());
    let response = service.clone().oneshot(xml).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut protobuf = request(Method::PUT, "/api/data", b"\x08\x01");
    protobuf
        .headers_mut()
        .insert(header::CONTENT_TYPE, "application/protobuf".parse().unwrap());
    let response = service.oneshot(protobuf).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn policy_reload_applies_to_subsequent_requests() {
    let layer = AdmissionConfig::builder().build();
    let handle = layer.policy().clone();
    let service = pipeline(layer);

    let response = service
        .clone()
        .oneshot(request(Method::GET, "/api/data", b""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    handle.store(FilterPolicy {
        denied_uri_prefixes: vec!["/api".to_string()],
        ..FilterPolicy::default()
    });

    let response = service
        .oneshot(request(Method::GET, "/api/data", b""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
