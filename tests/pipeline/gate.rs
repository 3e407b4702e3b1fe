//! Gate scenarios.

use crate::support::{captured, install_capture};
use edgekit_core::PeerAddr;
use edgekit_gate::{GateConfig, GateError, GateLayer};
use std::net::IpAddr;

fn peer() -> PeerAddr {
    PeerAddr(Some("10.0.0.5".parse::<IpAddr>().unwrap()))
}

#[test]
fn three_accepted_fourth_closed_with_log_lines() {
    let (buffer, _guard) = install_capture(tracing::Level::INFO);

    let layer = GateConfig::builder().max_per_ip(3).build();
    let gate = layer.gate();

    let p1 = gate.try_acquire(peer()).unwrap();
    let p2 = gate.try_acquire(peer()).unwrap();
    let p3 = gate.try_acquire(peer()).unwrap();
    let rejected = gate.try_acquire(peer());
    assert!(matches!(rejected, Err(GateError::LimitExceeded { .. })));

    let logs = captured(&buffer);
    for total in 1..=3 {
        assert!(
            logs.contains(&format!("Connection accepted from IP: 10.0.0.5 (total: {total})")),
            "missing accept log for total {total}: {logs}"
        );
    }
    assert!(
        logs.contains("Connection limit exceeded for IP: 10.0.0.5 (current: 4)"),
        "missing limit log: {logs}"
    );

    // The fourth connection was rolled back, not counted.
    assert_eq!(gate.active("10.0.0.5"), 3);
    drop((p1, p2, p3));
    assert_eq!(gate.active("10.0.0.5"), 0);
}

#[test]
fn counter_settles_to_accepts_minus_closes() {
    let layer = GateLayer::builder().max_per_ip(10).build();
    let gate = layer.gate();

    let permits: Vec<_> = (0..7).map(|_| gate.try_acquire(peer()).unwrap()).collect();
    assert_eq!(gate.active("10.0.0.5"), 7);

    drop(permits);
    assert_eq!(gate.active("10.0.0.5"), 0);
    assert_eq!(gate.tracked_ips(), 0);
}

#[tokio::test]
async fn rejection_crosses_the_error_channel_not_the_response() {
    use bytes::Bytes;
    use http::{Request, Response};
    use tower::{ServiceBuilder, ServiceExt};

    #[derive(Debug)]
    enum EdgeError {
        Gate(GateError),
    }
    impl From<GateError> for EdgeError {
        fn from(e: GateError) -> Self {
            EdgeError::Gate(e)
        }
    }

    let layer = GateConfig::builder().max_per_ip(1).build();
    let gate = layer.gate().clone();
    let _held = gate.try_acquire(peer()).unwrap();

    let service = ServiceBuilder::new().layer(layer).service_fn(|_req: Request<Bytes>| async {
        Ok::<_, EdgeError>(Response::new(Bytes::new()))
    });

    let mut request = Request::builder().uri("/x").body(Bytes::new()).unwrap();
    request.extensions_mut().insert(peer());

    // No response is written for a gated connection; the transport just closes.
    let result = service.oneshot(request).await;
    assert!(matches!(result, Err(EdgeError::Gate(GateError::LimitExceeded { .. }))));
}
