//! The full composed pipeline: gate → admission → security → business →
//! compression, with the standard header decoration on top.

use bytes::Bytes;
use edgekit::{EdgeConfig, EdgeRuntime, ErrorBoundaryLayer, StandardHeadersLayer};
use edgekit_core::PeerAddr;
use edgekit_gate::GateError;
use http::{header, Method, Request, Response, StatusCode};
use std::net::IpAddr;
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

fn request(method: Method, uri: &str, ip: &str) -> Request<Bytes> {
    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ACCEPT_ENCODING, "gzip")
        .header(header::CONNECTION, "keep-alive")
        .body(Bytes::new())
        .unwrap();
    req.extensions_mut()
        .insert(PeerAddr(Some(ip.parse::<IpAddr>().unwrap())));
    req
}

async fn with_stack<F, Fut>(check: F)
where
    F: FnOnce(
        tower::util::BoxCloneService<Request<Bytes>, Response<Bytes>, EdgeError>,
        EdgeRuntime,
    ) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let runtime = EdgeRuntime::from_config(EdgeConfig::default()).unwrap();

    let body = Bytes::from("{\"rows\":".to_string() + &"1,".repeat(4096) + "0}");
    let service = ServiceBuilder::new()
        .layer(StandardHeadersLayer::new())
        .layer(runtime.gate_layer())
        .layer(runtime.admission_layer())
        .layer(runtime.security_layer())
        .layer(runtime.compression_layer())
        .service_fn(move |_req: Request<Bytes>| {
            let body = body.clone();
            async move {
                Ok::<_, EdgeError>(
                    Response::builder()
                        .status(StatusCode::OK)
                        .header(header::CONTENT_TYPE, "application/json; charset=UTF-8")
                        .header(header::CONTENT_LENGTH, body.len())
                        .body(body)
                        .unwrap(),
                )
            }
        });

    check(tower::util::BoxCloneService::new(service), runtime.clone()).await;
    runtime.shutdown().await;
}

#[tokio::test]
async fn clean_request_flows_through_every_stage() {
    with_stack(|service, _runtime| async move {
        let response = service
            .oneshot(request(Method::GET, "/api/rows", "198.51.100.7"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        // Compressed by the response stage.
        assert_eq!(
            response.headers().get(header::CONTENT_ENCODING).unwrap(),
            "gzip"
        );
        // Decorated by the header stage.
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
        assert_eq!(
            response.headers().get(header::CONNECTION).unwrap(),
            "keep-alive"
        );
    })
    .await;
}

#[tokio::test]
async fn health_answers_ahead_of_the_business_handler() {
    with_stack(|service, _runtime| async move {
        let response = service
            .oneshot(request(Method::GET, "/healthz", "198.51.100.7"))
            .await
            .unwrap();
        assert_eq!(response.body().as_ref(), b"ok\n");
    })
    .await;
}

#[tokio::test]
async fn business_failures_surface_as_500_not_as_closed_sockets() {
    let runtime = EdgeRuntime::from_config(EdgeConfig::default()).unwrap();

    let service = ServiceBuilder::new()
        .layer(StandardHeadersLayer::new())
        .layer(runtime.gate_layer())
        .layer(runtime.admission_layer())
        .layer(runtime.security_layer())
        .layer(ErrorBoundaryLayer::<EdgeError>::new())
        .service_fn(|_req: Request<Bytes>| async {
            Err::<Response<Bytes>, _>(std::io::Error::other("replica lag"))
        });

    let response = service
        .oneshot(request(Method::GET, "/api/rows", "198.51.100.9"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.body().is_empty());

    runtime.shutdown().await;
}

#[tokio::test]
async fn attack_is_stopped_before_the_business_handler() {
    with_stack(|service, _runtime| async move {
        let response = service
            .oneshot(request(
                Method::GET,
                "/api/rows?q=1%20UNION%20SELECT%20name%20FROM%20users",
                "198.51.100.8",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.body().is_empty());
    })
    .await;
}
