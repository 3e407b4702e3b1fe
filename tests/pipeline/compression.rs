//! Compression scenarios through the response path.

use bytes::Bytes;
use edgekit_compression::CompressionConfig;
use flate2::read::GzDecoder;
use http::{header, Request, Response, StatusCode};
use std::io::Read;
use tower::{ServiceBuilder, ServiceExt};

fn json_service(
    body: Bytes,
) -> impl tower::Service<
    Request<Bytes>,
    Response = Response<Bytes>,
    Error = std::convert::Infallible,
> + Clone {
    ServiceBuilder::new()
        .layer(CompressionConfig::builder().build())
        .service_fn(move |_req: Request<Bytes>| {
            let body = body.clone();
            async move {
                Ok(Response::builder()
                    .status(StatusCode::OK)
                    .header(header::CONTENT_TYPE, "application/json; charset=UTF-8")
                    .header(header::CONTENT_LENGTH, body.len())
                    .body(body)
                    .unwrap())
            }
        })
}

#[tokio::test]
async fn negotiated_gzip_roundtrips() {
    let payload = Bytes::from(format!(
        "{{\"rows\":[{}]}}",
        "\"row\",".repeat(2000)
    ));
    let service = json_service(payload.clone());

    let request = Request::builder()
        .uri("/api/rows")
        .header(header::ACCEPT_ENCODING, "gzip, deflate, br")
        .body(Bytes::new())
        .unwrap();
    let response = service.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(header::CONTENT_ENCODING).unwrap(),
        "gzip"
    );
    assert_eq!(
        response.headers().get(header::VARY).unwrap(),
        "accept-encoding"
    );

    let mut decoder = GzDecoder::new(response.body().as_ref());
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded).unwrap();
    assert_eq!(decoded, payload.as_ref());
}

#[tokio::test]
async fn threshold_boundary_skips_small_payloads() {
    let service = json_service(Bytes::from(vec![b'x'; 100]));
    let request = Request::builder()
        .uri("/small")
        .header(header::ACCEPT_ENCODING, "gzip")
        .body(Bytes::new())
        .unwrap();
    let response = service.oneshot(request).await.unwrap();

    assert!(!response.headers().contains_key(header::CONTENT_ENCODING));
    assert_eq!(response.body().len(), 100);
}
