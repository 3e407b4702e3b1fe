//! Security filter scenarios.

use crate::support::{captured, install_capture};
use bytes::Bytes;
use edgekit_core::PeerAddr;
use edgekit_security::{SecurityConfig, SecurityLayer};
use http::{Method, Request, Response, StatusCode};
use std::net::IpAddr;
use std::time::Duration;
use tower::{ServiceBuilder, ServiceExt};

type Svc = tower::util::BoxCloneService<
    Request<Bytes>,
    Response<Bytes>,
    std::convert::Infallible,
>;

fn pipeline(layer: SecurityLayer) -> Svc {
    let service = ServiceBuilder::new().layer(layer).service_fn(|_req: Request<Bytes>| async {
        Ok::<_, std::convert::Infallible>(Response::new(Bytes::from_static(b"downstream")))
    });
    tower::util::BoxCloneService::new(service)
}

fn sqli_request(ip: &str) -> Request<Bytes> {
    let mut req = Request::builder()
        .method(Method::POST)
        .uri("/api/login?x=1%20UNION%20SELECT%20*%20FROM%20users--")
        .body(Bytes::from_static(b"{}"))
        .unwrap();
    req.extensions_mut()
        .insert(PeerAddr(Some(ip.parse::<IpAddr>().unwrap())));
    req
}

#[tokio::test]
async fn repeated_attacks_blacklist_with_the_normative_logs() {
    let (buffer, _guard) = install_capture(tracing::Level::WARN);

    let layer = SecurityConfig::builder()
        .max_attempts_before_block(5)
        .blacklist_duration(Duration::from_secs(600))
        .build();
    let service = pipeline(layer);

    // First attempt: 403 with an empty body.
    let response = service.clone().oneshot(sqli_request("10.0.0.5")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.body().is_empty());

    // Four more identical attempts; the fifth crosses the threshold.
    for _ in 0..4 {
        let response = service.clone().oneshot(sqli_request("10.0.0.5")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
    assert!(
        captured(&buffer).contains("IP blacklisted due to repeated attacks"),
        "missing blacklist log: {}",
        captured(&buffer)
    );

    // A sixth request within the blacklist window is blocked up front.
    let response = service.oneshot(sqli_request("10.0.0.5")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(
        captured(&buffer).contains("Blocked request from blacklisted IP"),
        "missing block log: {}",
        captured(&buffer)
    );
}

#[tokio::test]
async fn nothing_reaches_downstream_while_blacklisted() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    let reached = Arc::new(AtomicUsize::new(0));
    let r = Arc::clone(&reached);

    let layer = SecurityConfig::builder().max_attempts_before_block(1).build();
    let service = ServiceBuilder::new().layer(layer).service_fn(move |_req: Request<Bytes>| {
        let r = Arc::clone(&r);
        async move {
            r.fetch_add(1, Ordering::SeqCst);
            Ok::<_, std::convert::Infallible>(Response::new(Bytes::new()))
        }
    });

    // Blacklisted after the first detection.
    service.clone().oneshot(sqli_request("10.0.0.6")).await.unwrap();

    let mut clean = Request::builder()
        .uri("/api/users")
        .body(Bytes::new())
        .unwrap();
    clean
        .extensions_mut()
        .insert(PeerAddr(Some("10.0.0.6".parse::<IpAddr>().unwrap())));
    service.oneshot(clean).await.unwrap();

    assert_eq!(reached.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn first_request_after_expiry_passes_with_zeroed_attempts() {
    let layer = SecurityConfig::builder()
        .max_attempts_before_block(1)
        .blacklist_duration(Duration::from_millis(20))
        .build();
    let ledger = std::sync::Arc::clone(layer.ledger());
    let service = pipeline(layer);

    service.clone().oneshot(sqli_request("10.0.0.7")).await.unwrap();
    assert!(ledger.blacklisted_until("10.0.0.7").is_some());

    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut clean = Request::builder()
        .uri("/api/users")
        .body(Bytes::new())
        .unwrap();
    clean
        .extensions_mut()
        .insert(PeerAddr(Some("10.0.0.7".parse::<IpAddr>().unwrap())));
    let response = service.oneshot(clean).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(ledger.attempts("10.0.0.7"), 0);
}
