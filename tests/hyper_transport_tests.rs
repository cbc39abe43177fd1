//! End-to-end tests running the hyper transport against a local gateway.

use bytes::Bytes;
use fezz_functions::prelude::*;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::{Frame, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

type GatewayBody = UnsyncBoxBody<Bytes, Infallible>;

fn full(body: impl Into<Bytes>) -> GatewayBody {
    Full::new(body.into()).boxed_unsync()
}

/// Start a minimal gateway on an ephemeral port.
async fn spawn_gateway() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let io = TokioIo::new(stream);
            tokio::spawn(async move {
                let _ = http1::Builder::new()
                    .serve_connection(io, service_fn(handle))
                    .await;
            });
        }
    });

    addr
}

async fn handle(req: Request<Incoming>) -> Result<Response<GatewayBody>, Infallible> {
    let path = req.uri().path().to_string();
    let builder = Response::builder();

    let response = match path.as_str() {
        "/functions/v1/echo" => {
            let method = req.method().to_string();
            let headers: serde_json::Map<String, serde_json::Value> = req
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), json!(v.to_str().unwrap_or_default())))
                .collect();
            let body = req.into_body().collect().await.unwrap().to_bytes();
            let payload = json!({
                "method": method,
                "headers": headers,
                "body": String::from_utf8_lossy(&body),
            });
            builder
                .header("content-type", "application/json")
                .body(full(payload.to_string()))
        }
        "/functions/v1/text" => builder
            .header("content-type", "text/plain")
            .body(full("Hello, World!")),
        "/functions/v1/relay" => builder
            .header("content-type", "application/json")
            .header("x-relay-error", "true")
            .body(full(r#"{"message":"upstream failed"}"#)),
        "/functions/v1/stream" => {
            let frames = ["a", "b", "c"]
                .map(|c| Ok::<_, Infallible>(Frame::data(Bytes::from_static(c.as_bytes()))));
            builder
                .header("content-type", "text/plain")
                .body(StreamBody::new(futures_util::stream::iter(frames)).boxed_unsync())
        }
        "/functions/v1/trickle" => {
            let frames = futures_util::stream::unfold(0u8, |step| async move {
                match step {
                    0 => Some((
                        Ok::<_, Infallible>(Frame::data(Bytes::from_static(b"a"))),
                        1,
                    )),
                    1 => {
                        tokio::time::sleep(Duration::from_secs(2)).await;
                        Some((Ok(Frame::data(Bytes::from_static(b"b"))), 2))
                    }
                    _ => None,
                }
            });
            builder.body(StreamBody::new(frames).boxed_unsync())
        }
        "/functions/v1/slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            builder.body(full("late"))
        }
        _ => builder.status(404).body(full("function not found")),
    };

    Ok(response.unwrap())
}

async fn functions() -> Functions {
    let addr = spawn_gateway().await;
    let credentials = Credentials::new(format!("http://{}", addr), "anon-key", "service-token");
    Functions::with_hyper(credentials)
}

#[tokio::test]
async fn test_echo_round_trip() {
    let functions = functions().await;
    let options = InvokeOptions::new()
        .region(Region::EuCentral1)
        .body(json!({"name": "Fezz"}));

    let response = functions.invoke("echo", options).await.unwrap();
    let echoed = response.body.as_json().unwrap();

    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["headers"]["authorization"], "Bearer service-token");
    assert_eq!(echoed["headers"]["apikey"], "anon-key");
    assert_eq!(echoed["headers"]["x-region"], "eu-central-1");
    assert_eq!(echoed["headers"]["content-type"], "application/json");
    assert!(echoed["headers"]["user-agent"]
        .as_str()
        .unwrap()
        .starts_with("fezz-functions/"));

    let sent: serde_json::Value = serde_json::from_str(echoed["body"].as_str().unwrap()).unwrap();
    assert_eq!(sent, json!({"name": "Fezz"}));
}

#[tokio::test]
async fn test_method_and_auth_override_on_wire() {
    let functions = functions().await;
    let options = InvokeOptions::new().method(Method::Put).auth("user-jwt");

    let response = functions.invoke("echo", options).await.unwrap();
    let echoed = response.body.as_json().unwrap();

    assert_eq!(echoed["method"], "PUT");
    assert_eq!(echoed["headers"]["authorization"], "Bearer user-jwt");
    assert!(echoed["headers"].get("x-region").is_none());
}

#[tokio::test]
async fn test_text_response() {
    let response = functions()
        .await
        .invoke("text", InvokeOptions::new())
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text_body(), Some("Hello, World!"));
}

#[tokio::test]
async fn test_relay_error_response() {
    let err = functions()
        .await
        .invoke("relay", InvokeOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Relay);
    let response = err.response().unwrap();
    assert_eq!(
        response.body,
        ResponseBody::Json(json!({"message": "upstream failed"}))
    );
}

#[tokio::test]
async fn test_not_found_is_not_an_error() {
    let response = functions()
        .await
        .invoke("missing", InvokeOptions::new())
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.text_body(), Some("function not found"));
}

#[tokio::test]
async fn test_streaming_collects_chunks() {
    let body = functions()
        .await
        .invoke_streaming("stream", InvokeOptions::new(), CollectBody)
        .await
        .unwrap();

    assert_eq!(body, Bytes::from_static(b"abc"));
}

#[tokio::test]
async fn test_request_timeout() {
    let err = functions()
        .await
        .invoke("slow", InvokeOptions::new().timeout(Duration::from_millis(200)))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_stream_stalls_past_timeout() {
    let err = functions()
        .await
        .invoke_streaming(
            "trickle",
            InvokeOptions::new().timeout(Duration::from_millis(300)),
            CollectBody,
        )
        .await
        .unwrap_err();

    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_connection_refused() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let credentials = Credentials::new(format!("http://{}", addr), "anon-key", "token");

    let err = Functions::with_hyper(credentials)
        .invoke("echo", InvokeOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FunctionsError::Transport(TransportError::Connect(_))
    ));
}
